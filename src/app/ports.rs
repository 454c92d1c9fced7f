use async_trait::async_trait;

use crate::error::{ExternalServiceError, Result};
use crate::types::{AccessToken, FanSubmission, PlatformUser};

/// Turns image bytes into whatever text the engine can read.
#[async_trait]
pub trait OcrPort: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> std::result::Result<String, ExternalServiceError>;
}

/// Free-text prompt in, free-text completion out.
#[async_trait]
pub trait LanguageModelPort: Send + Sync {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, ExternalServiceError>;
}

// Streaming platform side
#[async_trait]
pub trait StreamingPlatformPort: Send + Sync {
    fn authorize_url(&self) -> String;
    async fn exchange_code(&self, code: &str) -> std::result::Result<AccessToken, ExternalServiceError>;
    async fn current_user(
        &self,
        token: &AccessToken,
    ) -> std::result::Result<Option<PlatformUser>, ExternalServiceError>;
    async fn followed_channels(
        &self,
        token: &AccessToken,
        user_id: &str,
    ) -> std::result::Result<Vec<String>, ExternalServiceError>;
}

#[async_trait]
pub trait FanStorePort: Send + Sync {
    async fn insert(&self, submission: &FanSubmission) -> Result<()>;
    /// Every row, ordered by name.
    async fn list_all(&self) -> Result<Vec<FanSubmission>>;
}
