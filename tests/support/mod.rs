#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use fan_intake::app::ports::{FanStorePort, LanguageModelPort, OcrPort, StreamingPlatformPort};
use fan_intake::app::{PlatformLinkUseCase, SubmissionUseCase};
use fan_intake::error::ExternalServiceError;
use fan_intake::infra::SqliteFanStore;
use fan_intake::server::AppState;
use fan_intake::session::SessionStore;
use fan_intake::types::{AccessToken, PlatformUser, SubmissionForm, UploadedDocument};

pub const VALID_TAX_ID: &str = "111.444.777-35";

/// OCR engine that always "reads" the same text.
pub struct FixedOcr {
    text: String,
    calls: AtomicUsize,
}

impl FixedOcr {
    pub fn reading(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrPort for FixedOcr {
    async fn recognize(&self, _image: &[u8]) -> Result<String, ExternalServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

pub struct FixedModel {
    answer: Result<String, ExternalServiceError>,
    calls: AtomicUsize,
}

impl FixedModel {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(answer.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            answer: Err(ExternalServiceError::Status {
                service: "gemini",
                status: 503,
                body: "overloaded".into(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModelPort for FixedModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ExternalServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

/// Accepts the code "good" and follows the given channels.
pub struct FakeTwitch {
    follows: Vec<String>,
}

impl FakeTwitch {
    pub fn following(follows: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            follows: follows.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[async_trait]
impl StreamingPlatformPort for FakeTwitch {
    fn authorize_url(&self) -> String {
        "https://id.example/authorize?client_id=test".to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, ExternalServiceError> {
        if code == "good" {
            Ok(AccessToken::new("token"))
        } else {
            Err(ExternalServiceError::Auth {
                service: "twitch",
                message: "invalid authorization code".into(),
            })
        }
    }

    async fn current_user(&self, _token: &AccessToken) -> Result<Option<PlatformUser>, ExternalServiceError> {
        Ok(Some(PlatformUser {
            id: "42".into(),
            login: "maria_gamer".into(),
        }))
    }

    async fn followed_channels(
        &self,
        _token: &AccessToken,
        _user_id: &str,
    ) -> Result<Vec<String>, ExternalServiceError> {
        Ok(self.follows.clone())
    }
}

pub fn sqlite_store(dir: &TempDir) -> Arc<SqliteFanStore> {
    let store = SqliteFanStore::new(dir.path().join("fans.db"));
    store.init_schema().expect("schema");
    Arc::new(store)
}

pub fn form(name: &str, tax_id: &str) -> SubmissionForm {
    SubmissionForm {
        name: name.to_string(),
        tax_id: tax_id.to_string(),
        address: "Rua das Flores, 10".to_string(),
        interests: "FPS, MOBA".to_string(),
        events_2024: "IEM Rio, CBLOL Finals".to_string(),
        purchases_2024: "FURIA jersey".to_string(),
        profile_links: String::new(),
    }
}

pub fn png() -> UploadedDocument {
    UploadedDocument {
        file_name: Some("id.png".to_string()),
        content_type: Some("image/png".to_string()),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

pub fn app_state(
    ocr: Arc<dyn OcrPort>,
    model: Arc<dyn LanguageModelPort>,
    store: Arc<dyn FanStorePort>,
    platform: Option<Arc<dyn StreamingPlatformPort>>,
) -> AppState {
    AppState {
        submissions: Arc::new(SubmissionUseCase::new(ocr, model.clone(), store.clone())),
        platform: platform.map(|p| Arc::new(PlatformLinkUseCase::new(p, model))),
        store,
        sessions: Arc::new(SessionStore::new()),
        metrics: None,
    }
}
