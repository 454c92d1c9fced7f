use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::app::ports::{LanguageModelPort, StreamingPlatformPort};
use crate::classify::InterestClassifier;
use crate::constants::SERVICE_PLATFORM;
use crate::error::{ExternalServiceError, Result};
use crate::observability::metrics;
use crate::types::PlatformProfile;

/// Exchanges an OAuth code for the visitor's followed channels and the interests they imply.
pub struct PlatformLinkUseCase {
    platform: Arc<dyn StreamingPlatformPort>,
    model: Arc<dyn LanguageModelPort>,
}

impl PlatformLinkUseCase {
    pub fn new(platform: Arc<dyn StreamingPlatformPort>, model: Arc<dyn LanguageModelPort>) -> Self {
        Self { platform, model }
    }

    pub fn authorize_url(&self) -> String {
        self.platform.authorize_url()
    }

    /// The access token lives only for the duration of this call.
    #[instrument(skip_all)]
    pub async fn link(&self, code: &str) -> Result<PlatformProfile> {
        let result = self.fetch_profile(code).await;
        match &result {
            Ok(profile) if profile.followed_channels.is_empty() => metrics::platform_link("no_follows"),
            Ok(_) => metrics::platform_link("linked"),
            Err(e) => {
                warn!("Platform linking failed: {}", e);
                metrics::platform_link("failed");
            }
        }
        result
    }

    async fn fetch_profile(&self, code: &str) -> Result<PlatformProfile> {
        let started = Instant::now();
        let calls = self.platform_calls(code).await;
        metrics::external_call(SERVICE_PLATFORM, started.elapsed(), calls.is_ok());
        let (login, followed_channels) = calls?;

        info!(login = %login, follows = followed_channels.len(), "Platform account linked");
        let detected_themes = InterestClassifier::new(self.model.as_ref())
            .classify(&followed_channels)
            .await?;

        Ok(PlatformProfile {
            login,
            followed_channels,
            detected_themes,
        })
    }

    async fn platform_calls(
        &self,
        code: &str,
    ) -> std::result::Result<(String, Vec<String>), ExternalServiceError> {
        let token = self.platform.exchange_code(code).await?;
        let user = self
            .platform
            .current_user(&token)
            .await?
            .ok_or_else(|| ExternalServiceError::Auth {
                service: SERVICE_PLATFORM,
                message: "could not fetch the platform user".to_string(),
            })?;
        let channels = self.platform.followed_channels(&token, &user.id).await?;
        Ok((user.login, channels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::ScriptedPlatform;
    use crate::classify::test_support::ScriptedModel;
    use crate::error::FanError;

    #[tokio::test]
    async fn follows_are_classified_into_themes() {
        let platform = ScriptedPlatform::with_follows(&["gaules", "loud_coringa"]);
        let model = Arc::new(ScriptedModel::answering("FPS, Battle Royale"));
        let uc = PlatformLinkUseCase::new(Arc::new(platform), model.clone());

        let profile = uc.link("abc").await.unwrap();
        assert_eq!(profile.login, "maria_gamer");
        assert_eq!(profile.followed_channels, vec!["gaules", "loud_coringa"]);
        assert_eq!(profile.detected_themes_joined(), "FPS, Battle Royale");
        assert_eq!(model.calls().await, 1);
    }

    #[tokio::test]
    async fn no_follows_gives_empty_profile_without_model_call() {
        let model = Arc::new(ScriptedModel::answering("FPS"));
        let uc = PlatformLinkUseCase::new(Arc::new(ScriptedPlatform::with_follows(&[])), model.clone());

        let profile = uc.link("abc").await.unwrap();
        assert!(profile.followed_channels.is_empty());
        assert!(profile.detected_themes.is_empty());
        assert_eq!(model.calls().await, 0);
    }

    #[tokio::test]
    async fn rejected_code_is_an_auth_error() {
        let mut platform = ScriptedPlatform::with_follows(&["gaules"]);
        platform.reject_code = true;
        let uc = PlatformLinkUseCase::new(Arc::new(platform), Arc::new(ScriptedModel::answering("FPS")));

        let err = uc.link("bad").await.unwrap_err();
        assert!(matches!(
            err,
            FanError::ExternalService(ExternalServiceError::Auth { .. })
        ));
    }

    #[tokio::test]
    async fn missing_user_is_an_auth_error() {
        let mut platform = ScriptedPlatform::with_follows(&["gaules"]);
        platform.user = None;
        let uc = PlatformLinkUseCase::new(Arc::new(platform), Arc::new(ScriptedModel::answering("FPS")));

        assert!(uc.link("abc").await.is_err());
    }
}
