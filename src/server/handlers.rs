use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::app::InsightsReport;
use crate::error::FanError;
use crate::server::state::AppState;
use crate::server::templates::{
    render, render_with_status, FansTemplate, FormTemplate, InsightsTemplate, Notice,
};
use crate::session::{session_cookie, session_id};
use crate::types::{PlatformProfile, SubmissionForm, UploadedDocument};

/// Query string of the form page. The platform redirects back here after authorization.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

pub async fn form_page(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let existing = session_id(&headers);
    let mut new_session = None;
    let mut notices = Vec::new();

    if let Some(err) = params.error.as_deref() {
        let reason = params.error_description.as_deref().unwrap_or(err);
        notices.push(Notice::warning(format!("Platform connection was not completed: {reason}")));
    }

    if let Some(code) = params.code.as_deref() {
        match state.platform.as_ref() {
            Some(platform) => match platform.link(code).await {
                Ok(profile) => {
                    if let Some(old) = existing {
                        state.sessions.end_session(old).await;
                    }
                    new_session = Some(state.sessions.start_session(profile).await);
                }
                Err(e) => notices.push(Notice::error(format!("Could not connect your account: {e}"))),
            },
            None => debug!("Authorization code received but platform linking is not configured"),
        }
    }

    let context = state.sessions.context(new_session.or(existing)).await;
    notices.extend(profile_notices(context.profile.as_ref()));

    let page = FormTemplate::new(state.connect_url(), context.profile.as_ref(), notices);
    let mut response = render(&page);
    if let Some(id) = new_session {
        response.headers_mut().insert(header::SET_COOKIE, session_cookie(id));
    }
    response
}

fn profile_notices(profile: Option<&PlatformProfile>) -> Vec<Notice> {
    let Some(profile) = profile else {
        return Vec::new();
    };
    if profile.followed_channels.is_empty() {
        return vec![Notice::info("No followed channels found on your account.")];
    }
    let mut notices = vec![Notice::info(format!(
        "Followed channels: {}",
        profile.followed_channels_joined()
    ))];
    if !profile.detected_themes.is_empty() {
        notices.push(Notice::info(format!(
            "Interests detected from your channels: {}",
            profile.detected_themes_joined()
        )));
    }
    notices
}

pub async fn submit(State(state): State<AppState>, headers: HeaderMap, multipart: Multipart) -> Response {
    let context = state.sessions.context(session_id(&headers)).await;

    let (form, document) = match read_submission(multipart).await {
        Ok(parts) => parts,
        Err(e) => {
            warn!("Unreadable form upload: {}", e);
            return (StatusCode::BAD_REQUEST, format!("Invalid form upload: {e}")).into_response();
        }
    };

    match state.submissions.submit(&form, document.as_ref(), &context).await {
        Ok(receipt) => {
            let mut page = FormTemplate::new(
                state.connect_url(),
                context.profile.as_ref(),
                vec![Notice::success("Data submitted successfully!")],
            );
            page.relevant_links = receipt.link_review.entries;
            page.link_review = Some(receipt.link_review.raw);
            render(&page)
        }
        Err(err) => {
            let mut page = FormTemplate::new(state.connect_url(), context.profile.as_ref(), Vec::new());
            page.values = form;
            page.apply_error(&err);
            render_with_status(rejection_status(&err), &page)
        }
    }
}

fn rejection_status(err: &FanError) -> StatusCode {
    match err {
        FanError::Validation(_) | FanError::Consistency(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FanError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Collects the text fields and the optional document. An empty file input counts as no document.
async fn read_submission(
    mut multipart: Multipart,
) -> Result<(SubmissionForm, Option<UploadedDocument>), MultipartError> {
    let mut form = SubmissionForm::default();
    let mut document = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "document" {
            let file_name = field
                .file_name()
                .map(str::to_string)
                .filter(|n| !n.is_empty());
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                document = Some(UploadedDocument {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "name" => form.name = value,
            "tax_id" => form.tax_id = value,
            "address" => form.address = value,
            "interests" => form.interests = value,
            "events_2024" => form.events_2024 = value,
            "purchases_2024" => form.purchases_2024 = value,
            "profile_links" => form.profile_links = value,
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }
    Ok((form, document))
}

pub async fn insights(State(state): State<AppState>) -> Response {
    match state.store.list_all().await {
        Ok(rows) => render(&InsightsTemplate {
            report: InsightsReport::from_rows(&rows),
            error: None,
        }),
        Err(e) => {
            error!("Failed to load submissions for insights: {}", e);
            render(&InsightsTemplate {
                report: InsightsReport::default(),
                error: Some(format!("Error fetching data: {e}")),
            })
        }
    }
}

pub async fn fans(State(state): State<AppState>) -> Response {
    match state.store.list_all().await {
        Ok(rows) => render(&FansTemplate { rows, error: None }),
        Err(e) => {
            error!("Failed to load submissions: {}", e);
            render(&FansTemplate {
                rows: Vec::new(),
                error: Some(format!("Error fetching data: {e}")),
            })
        }
    }
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "fan_intake",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
