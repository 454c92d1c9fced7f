use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::app::ports::{FanStorePort, LanguageModelPort, OcrPort, StreamingPlatformPort};
use crate::app::{PlatformLinkUseCase, SubmissionUseCase};
use crate::config::AppConfig;
use crate::error::Result;
use crate::infra::{GeminiClient, SqliteFanStore, TesseractOcr, TwitchClient};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub submissions: Arc<SubmissionUseCase>,
    /// `None` when no platform credentials are configured.
    pub platform: Option<Arc<PlatformLinkUseCase>>,
    pub store: Arc<dyn FanStorePort>,
    pub sessions: Arc<SessionStore>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wires the production adapters and makes sure the table exists.
    pub fn from_config(config: &AppConfig, metrics: Option<PrometheusHandle>) -> Result<Self> {
        let model: Arc<dyn LanguageModelPort> =
            Arc::new(GeminiClient::new(config.model.clone(), config.external_timeout)?);
        let ocr: Arc<dyn OcrPort> =
            Arc::new(TesseractOcr::new(config.ocr.clone(), config.external_timeout));

        let sqlite = SqliteFanStore::new(&config.database_path);
        sqlite.init_schema()?;
        let store: Arc<dyn FanStorePort> = Arc::new(sqlite);

        let platform = match &config.twitch {
            Some(twitch) => {
                let client: Arc<dyn StreamingPlatformPort> =
                    Arc::new(TwitchClient::new(twitch.clone(), config.external_timeout)?);
                Some(Arc::new(PlatformLinkUseCase::new(client, model.clone())))
            }
            None => None,
        };

        Ok(Self {
            submissions: Arc::new(SubmissionUseCase::new(ocr, model, store.clone())),
            platform,
            store,
            sessions: Arc::new(SessionStore::new()),
            metrics,
        })
    }

    pub fn connect_url(&self) -> Option<String> {
        self.platform.as_ref().map(|p| p.authorize_url())
    }
}
