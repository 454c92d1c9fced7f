pub mod gemini;
pub mod http_client;
pub mod sqlite_store;
pub mod tesseract;
pub mod twitch;

pub use gemini::GeminiClient;
pub use sqlite_store::SqliteFanStore;
pub use tesseract::TesseractOcr;
pub use twitch::TwitchClient;
