use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One persisted row of the `esports_fans` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanSubmission {
    pub name: String,
    pub tax_id: String,
    pub address: String,
    pub interests: String,
    pub events_2024: String,
    pub purchases_2024: String,
    pub detected_themes: String,
    pub followed_channels: String,
    pub validated_links: String,
    pub submitted_at: DateTime<Utc>,
}

/// Raw form values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionForm {
    pub name: String,
    pub tax_id: String,
    pub address: String,
    pub interests: String,
    pub events_2024: String,
    pub purchases_2024: String,
    pub profile_links: String,
}

/// The identity document uploaded alongside the form.
#[derive(Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Short-lived OAuth access token. Used for the follow lookup and then dropped.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformUser {
    pub id: String,
    pub login: String,
}

/// What the platform-linking step learned about the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformProfile {
    pub login: String,
    pub followed_channels: Vec<String>,
    pub detected_themes: Vec<String>,
}

impl PlatformProfile {
    pub fn detected_themes_joined(&self) -> String {
        self.detected_themes.join(", ")
    }

    pub fn followed_channels_joined(&self) -> String {
        self.followed_channels.join(", ")
    }
}

/// Session-scoped data handed to the submission pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionContext {
    pub profile: Option<PlatformProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelevantLink {
    pub link: String,
    pub category: String,
}

/// Result of the link relevance review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReview {
    /// Model answer as stored in `validated_links`.
    pub raw: String,
    pub entries: Vec<RelevantLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub submission: FanSubmission,
    pub link_review: LinkReview,
}
