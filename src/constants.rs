/// Constants module to avoid magic numbers in the codebase

// Provider Configuration
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_OPENAI_COMPAT_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 3;
pub const PROVIDER_PACING_DELAY_MS: u64 = 1000;
pub const LISTEN_TIMEOUT_SECS: u64 = 30;

// User-facing fallback written into the ledger when the provider fails
pub const APOLOGY_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

// Canned answers for locally handled intents
pub const GREETING_RESPONSE: &str =
    "Hello! I'm AI Connect. Ask me anything, or attach an image and I'll take a look.";
pub const IDENTITY_RESPONSE: &str = "I am AI Connect, an intelligent chat interface powered by \
    Google's Gemini AI, designed to make AI interactions more accessible and intuitive. \
    While I use Gemini's capabilities for processing, my interface and implementation \
    were developed independently.";

pub const IDENTITY_PHRASES: &[&str] = &[
    "who made you",
    "who created you",
    "who developed you",
    "who built you",
    "your creator",
    "who programmed you",
];

pub const GREETING_PHRASES: &[&str] = &[
    "hi",
    "hey",
    "hello",
    "hi there",
    "hey there",
    "hello there",
    "good morning",
    "good afternoon",
    "good evening",
];

// Text-to-speech programs probed on PATH, in preference order
pub const TTS_PROGRAMS: &[&str] = &["espeak-ng", "espeak", "say", "spd-say"];

// Image extensions accepted by the terminal front-end
pub const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("heic", "image/heic"),
];
