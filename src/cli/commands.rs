use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{init_config, Config},
    provider::ProviderGateway,
    speech::SpeechBridge,
};

use super::Commands;

/// Handle CLI subcommands; returns `false` when the chat session should start
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing AI Connect configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Chat => Ok(false),
    }
}

/// Show version information
pub fn show_version() {
    println!("AI Connect v{}", env!("CARGO_PKG_VERSION"));
    println!("   An interactive, multi-modal assistant client");
}

/// Show provider and speech status
async fn show_status(config: &Config) -> Result<()> {
    println!("AI Connect Status:");
    println!();

    let settings = &config.provider;
    println!("  Provider: {:?} / {}", settings.kind, settings.model.green());

    if settings.resolve_api_key().is_some() {
        println!("  [OK] Credential: found");
    } else {
        println!(
            "  [WARNING] Credential: not found (set {} or provider.api_key)",
            settings.api_key_env
        );
    }

    match ProviderGateway::from_config(config) {
        Ok(gateway) => match gateway.check_connection().await {
            Ok(true) => println!("  [OK] Provider: reachable"),
            Ok(false) => println!("  [ERROR] Provider: not reachable"),
            Err(e) => println!("  [ERROR] Provider: {}", e),
        },
        Err(e) => println!("  [ERROR] Provider: {}", e),
    }

    let speech = SpeechBridge::from_settings(&config.speech);
    let mark = |ok: bool| if ok { "[OK]" } else { "[--]" };
    println!(
        "  {} Dictation: {}",
        mark(speech.can_listen()),
        if speech.can_listen() { "available" } else { "unavailable (set speech.listen_command)" }
    );
    println!(
        "  {} Read aloud: {}",
        mark(speech.can_speak()),
        if speech.can_speak() { "available" } else { "unavailable (no TTS program found)" }
    );

    println!();
    Ok(())
}
