use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_DATABASE_PATH, DEFAULT_FOLLOW_LIMIT, DEFAULT_MODEL, DEFAULT_PORT, GEMINI_API_BASE,
    TWITCH_API_BASE, TWITCH_AUTHORIZE_URL, TWITCH_TOKEN_URL,
};
use crate::error::{FanError, Result};

const DEFAULT_CONFIG_FILE: &str = "fan_intake.toml";

/// Non-secret settings, read from the optional TOML file. Every key has a default.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub port: u16,
    pub database_path: PathBuf,
    pub model: String,
    pub model_api_base: String,
    pub ocr_command: String,
    pub ocr_language: Option<String>,
    pub external_timeout_secs: u64,
    pub follow_limit: u32,
    pub twitch_authorize_url: String,
    pub twitch_token_url: String,
    pub twitch_api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            model: DEFAULT_MODEL.to_string(),
            model_api_base: GEMINI_API_BASE.to_string(),
            ocr_command: "tesseract".to_string(),
            ocr_language: None,
            external_timeout_secs: 30,
            follow_limit: DEFAULT_FOLLOW_LIMIT,
            twitch_authorize_url: TWITCH_AUTHORIZE_URL.to_string(),
            twitch_token_url: TWITCH_TOKEN_URL.to_string(),
            twitch_api_base: TWITCH_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwitchConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub follow_limit: u32,
    pub authorize_url: String,
    pub token_url: String,
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    pub command: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub external_timeout: Duration,
    /// `None` hides the platform-linking step.
    pub twitch: Option<TwitchConfig>,
    pub model: ModelConfig,
    pub ocr: OcrConfig,
}

impl AppConfig {
    /// `.env`, then the TOML file named by `FAN_INTAKE_CONFIG` (if it exists), then the environment.
    pub fn load() -> Result<Self> {
        let settings = Settings::load()?;
        Self::from_sources(settings, |key| std::env::var(key).ok())
    }

    /// Only the database location; needs no credentials.
    pub fn database_path() -> Result<PathBuf> {
        let settings = Settings::load()?;
        Ok(std::env::var("DATABASE_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(settings.database_path))
    }

    /// Overlays environment values from `lookup` on top of file settings.
    pub fn from_sources<F>(settings: Settings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let parse = |key: &str| -> Result<Option<u64>> {
            get(key)
                .map(|v| {
                    v.parse::<u64>()
                        .map_err(|e| FanError::Config(format!("{key} must be a number: {e}")))
                })
                .transpose()
        };

        let port = match parse("PORT")? {
            Some(p) => u16::try_from(p).map_err(|_| FanError::Config(format!("PORT out of range: {p}")))?,
            None => settings.port,
        };
        let timeout_secs = parse("EXTERNAL_TIMEOUT_SECS")?.unwrap_or(settings.external_timeout_secs);
        let follow_limit = match parse("TWITCH_FOLLOW_LIMIT")? {
            Some(n) => u32::try_from(n)
                .map_err(|_| FanError::Config(format!("TWITCH_FOLLOW_LIMIT out of range: {n}")))?,
            None => settings.follow_limit,
        };

        let twitch = match (
            get("TWITCH_CLIENT_ID"),
            get("TWITCH_CLIENT_SECRET"),
            get("TWITCH_REDIRECT_URI"),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Some(TwitchConfig {
                client_id,
                client_secret,
                redirect_uri,
                follow_limit,
                authorize_url: settings.twitch_authorize_url.clone(),
                token_url: settings.twitch_token_url.clone(),
                api_base: settings.twitch_api_base.clone(),
            }),
            (None, None, None) => None,
            _ => {
                return Err(FanError::Config(
                    "TWITCH_CLIENT_ID, TWITCH_CLIENT_SECRET and TWITCH_REDIRECT_URI must be set together"
                        .to_string(),
                ))
            }
        };

        let api_key = get("GENAI_API_KEY")
            .ok_or_else(|| FanError::Config("GENAI_API_KEY environment variable not set".to_string()))?;

        Ok(Self {
            port,
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(settings.database_path),
            external_timeout: Duration::from_secs(timeout_secs),
            twitch,
            model: ModelConfig {
                api_key,
                model: get("GENAI_MODEL").unwrap_or(settings.model),
                api_base: settings.model_api_base,
            },
            ocr: OcrConfig {
                command: get("OCR_COMMAND").unwrap_or(settings.ocr_command),
                language: get("OCR_LANGUAGE").or(settings.ocr_language),
            },
        })
    }
}

impl Settings {
    fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let path = std::env::var("FAN_INTAKE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_file(Path::new(&path))
    }

    /// A missing file means defaults; an unreadable or invalid one is an error.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            FanError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }
}
