//! External endpoints, prompt vocabulary and fixed strings shared across the crate.

// Streaming platform (Twitch)
pub const TWITCH_AUTHORIZE_URL: &str = "https://id.twitch.tv/oauth2/authorize";
pub const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
pub const TWITCH_API_BASE: &str = "https://api.twitch.tv/helix";
pub const TWITCH_SCOPES: &str = "user:read:email user:read:follows";
pub const DEFAULT_FOLLOW_LIMIT: u32 = 40;

// Generative language model (Gemini)
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

// Service names used in errors, logs and metric labels
pub const SERVICE_PLATFORM: &str = "twitch";
pub const SERVICE_MODEL: &str = "gemini";
pub const SERVICE_OCR: &str = "ocr";

/// Genre taxonomy offered to the model when classifying followed channels.
pub const INTEREST_TAXONOMY: [&str; 7] = [
    "FPS",
    "MOBA",
    "Battle Royale",
    "Strategy",
    "Variety",
    "eSports Teams",
    "Other (if applicable)",
];

/// Returned without calling the model when the user gave no links.
pub const NO_LINKS_PROVIDED: &str = "no links provided";
/// The model is told to answer exactly this when no link qualifies.
pub const NO_RELEVANT_LINKS: &str = "No relevant links identified.";

// Persistence
pub const FANS_TABLE: &str = "esports_fans";
pub const DEFAULT_DATABASE_PATH: &str = "data/fans.db";

// HTTP surface
pub const DEFAULT_PORT: u16 = 8501;
pub const SESSION_COOKIE: &str = "fan_session";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Linked profiles expire after this long; the oldest is evicted past the cap.
pub const SESSION_TTL: std::time::Duration = std::time::Duration::from_secs(60 * 60);
pub const MAX_SESSIONS: usize = 10_000;
pub const TOP_STREAMERS: usize = 10;

/// Document types the OCR step accepts, by extension and by MIME type.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
pub const ACCEPTED_CONTENT_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];
