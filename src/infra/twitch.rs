use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::http_client::{build_client, read_json};
use crate::app::ports::StreamingPlatformPort;
use crate::config::TwitchConfig;
use crate::constants::{SERVICE_PLATFORM, TWITCH_SCOPES};
use crate::error::{ExternalServiceError, Result};
use crate::types::{AccessToken, PlatformUser};

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HelixPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct FollowedChannel {
    pub broadcaster_name: String,
}

/// Twitch OAuth + Helix client.
pub struct TwitchClient {
    http: reqwest::Client,
    config: TwitchConfig,
}

impl TwitchClient {
    pub fn new(config: TwitchConfig, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            config,
        })
    }

    fn helix(&self, path: &str, token: &AccessToken) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}/{}", self.config.api_base.trim_end_matches('/'), path))
            .bearer_auth(token.secret())
            .header("Client-Id", &self.config.client_id)
    }
}

/// Authorization-code redirect URL for the configured client.
pub fn authorize_url(config: &TwitchConfig) -> String {
    let params = [
        ("response_type", "code"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("scope", TWITCH_SCOPES),
    ];
    match Url::parse_with_params(&config.authorize_url, &params) {
        Ok(url) => url.to_string(),
        Err(_) => config.authorize_url.clone(),
    }
}

pub fn token_from_response(resp: TokenResponse) -> std::result::Result<AccessToken, ExternalServiceError> {
    match resp.access_token {
        Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
        _ => Err(ExternalServiceError::Auth {
            service: SERVICE_PLATFORM,
            message: resp
                .message
                .unwrap_or_else(|| "no access token in response".to_string()),
        }),
    }
}

#[async_trait]
impl StreamingPlatformPort for TwitchClient {
    fn authorize_url(&self) -> String {
        authorize_url(&self.config)
    }

    #[instrument(skip_all)]
    async fn exchange_code(&self, code: &str) -> std::result::Result<AccessToken, ExternalServiceError> {
        let resp = self
            .http
            .post(&self.config.token_url)
            .query(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ExternalServiceError::from_reqwest(SERVICE_PLATFORM, e))?;

        // A rejected code comes back as 400 with a JSON message; report it as an auth failure.
        let status = resp.status();
        let body: std::result::Result<TokenResponse, _> = read_json(SERVICE_PLATFORM, resp).await;
        match body {
            Ok(token) => token_from_response(token),
            Err(ExternalServiceError::Status { body, .. }) if status.is_client_error() => {
                Err(ExternalServiceError::Auth {
                    service: SERVICE_PLATFORM,
                    message: body,
                })
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip_all)]
    async fn current_user(
        &self,
        token: &AccessToken,
    ) -> std::result::Result<Option<PlatformUser>, ExternalServiceError> {
        let resp = self
            .helix("users", token)
            .send()
            .await
            .map_err(|e| ExternalServiceError::from_reqwest(SERVICE_PLATFORM, e))?;
        let page: HelixPage<PlatformUser> = read_json(SERVICE_PLATFORM, resp).await?;
        Ok(page.data.into_iter().next())
    }

    #[instrument(skip(self, token))]
    async fn followed_channels(
        &self,
        token: &AccessToken,
        user_id: &str,
    ) -> std::result::Result<Vec<String>, ExternalServiceError> {
        let first = self.config.follow_limit.to_string();
        let resp = self
            .helix("channels/followed", token)
            .query(&[("user_id", user_id), ("first", first.as_str())])
            .send()
            .await
            .map_err(|e| ExternalServiceError::from_reqwest(SERVICE_PLATFORM, e))?;
        let page: HelixPage<FollowedChannel> = read_json(SERVICE_PLATFORM, resp).await?;
        debug!(count = page.data.len(), "Followed channels fetched");
        Ok(page.data.into_iter().map(|c| c.broadcaster_name).collect())
    }
}
