use anyhow::Result;
use clap::Parser;

use aiconnect::{
    cli::Cli,
    runtime::{load_image, resolve_config, NonInteractiveRunner, Orchestrator},
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    // Check if running in non-interactive mode
    if let Some(prompt) = cli.prompt.clone() {
        run_non_interactive(cli, prompt).await
    } else {
        let orchestrator = Orchestrator::new(cli)?;
        orchestrator.run().await
    }
}

/// Run in non-interactive mode
async fn run_non_interactive(cli: Cli, prompt: String) -> Result<()> {
    let config = resolve_config(&cli)?;

    let image = match &cli.image {
        Some(path) => Some(load_image(path).await?),
        None => None,
    };

    let runner = NonInteractiveRunner::new(&config)?;
    let result = runner.execute(prompt, image).await?;

    let formatted = runner.format_result(&result, cli.output_format);
    println!("{}", formatted);

    // Exit with appropriate code
    if result.error.is_some() {
        std::process::exit(1);
    }

    Ok(())
}
