use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use crate::app::InsightsReport;
use crate::error::{FanError, Field};
use crate::types::{FanSubmission, PlatformProfile, RelevantLink, SubmissionForm};

/// A banner line on the form page. `kind` doubles as the CSS class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: &'static str,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: "success", text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: "info", text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { kind: "warning", text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: "error", text: text.into() }
    }
}

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub notices: Vec<Notice>,
    pub connect_url: Option<String>,
    pub linked_login: Option<String>,
    pub values: SubmissionForm,
    pub name_error: Option<String>,
    pub tax_id_error: Option<String>,
    pub document_error: Option<String>,
    pub link_review: Option<String>,
    pub relevant_links: Vec<RelevantLink>,
}

impl FormTemplate {
    /// Empty form. A linked profile pre-fills the interests field with the detected themes.
    pub fn new(connect_url: Option<String>, profile: Option<&PlatformProfile>, notices: Vec<Notice>) -> Self {
        let values = SubmissionForm {
            interests: profile.map(|p| p.detected_themes_joined()).unwrap_or_default(),
            ..SubmissionForm::default()
        };
        Self {
            notices,
            connect_url,
            linked_login: profile.map(|p| p.login.clone()),
            values,
            name_error: None,
            tax_id_error: None,
            document_error: None,
            link_review: None,
            relevant_links: Vec::new(),
        }
    }

    /// Turns a rejected submission into field warnings and banners.
    pub fn apply_error(&mut self, err: &FanError) {
        match err {
            FanError::Validation(errors) => {
                for e in &errors.0 {
                    let message = e.error.to_string();
                    match e.field {
                        Field::Name => self.name_error = Some(message.clone()),
                        Field::TaxId => self.tax_id_error = Some(message.clone()),
                        Field::Document => self.document_error = Some(message.clone()),
                    }
                    self.notices
                        .push(Notice::warning(format!("Error in {}: {}", e.field.label(), message)));
                }
            }
            FanError::Consistency(e) => self.notices.push(Notice::warning(e.to_string())),
            FanError::ExternalService(e) => self
                .notices
                .push(Notice::error(format!("{e}. Nothing was saved, please submit again."))),
            other => self
                .notices
                .push(Notice::error(format!("Your data could not be saved: {other}"))),
        }
    }
}

#[derive(Template)]
#[template(path = "insights.html")]
pub struct InsightsTemplate {
    pub report: InsightsReport,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "fans.html")]
pub struct FansTemplate {
    pub rows: Vec<FanSubmission>,
    pub error: Option<String>,
}

pub fn render<T: Template>(template: &T) -> Response {
    render_with_status(StatusCode::OK, template)
}

pub fn render_with_status<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConsistencyError, FieldErrors, NameIssue, ValidationError};

    #[test]
    fn linked_profile_prefills_interests() {
        let profile = PlatformProfile {
            login: "maria_gamer".into(),
            followed_channels: vec!["gaules".into()],
            detected_themes: vec!["FPS".into(), "Variety".into()],
        };
        let page = FormTemplate::new(None, Some(&profile), Vec::new());
        assert_eq!(page.values.interests, "FPS, Variety");
        assert_eq!(page.linked_login.as_deref(), Some("maria_gamer"));
    }

    #[test]
    fn validation_errors_land_on_their_fields() {
        let mut errors = FieldErrors::default();
        errors.push(Field::Name, ValidationError::InvalidName(NameIssue::SingleWord));
        errors.push(Field::TaxId, ValidationError::CheckDigitMismatch);

        let mut page = FormTemplate::new(None, None, Vec::new());
        page.apply_error(&FanError::Validation(errors));

        assert!(page.name_error.is_some());
        assert!(page.tax_id_error.is_some());
        assert!(page.document_error.is_none());
        assert_eq!(page.notices.len(), 2);
        assert!(page.notices.iter().all(|n| n.kind == "warning"));
    }

    #[test]
    fn relevant_links_are_listed_in_the_summary() {
        let mut page = FormTemplate::new(None, None, vec![Notice::success("Data submitted successfully!")]);
        page.link_review = Some("https://www.hltv.org/player/1 - professional player".into());
        page.relevant_links = vec![RelevantLink {
            link: "https://www.hltv.org/player/1".into(),
            category: "professional player".into(),
        }];

        let html = page.render().unwrap();
        assert!(html.contains("Relevant links"));
        assert!(html.contains("<strong>professional player</strong>"));
    }

    #[test]
    fn rendered_form_escapes_values() {
        let mut page = FormTemplate::new(Some("https://id.example/authorize".into()), None, Vec::new());
        page.values.name = "<script>".into();
        page.apply_error(&FanError::Consistency(ConsistencyError::TaxIdNotFound));

        let html = page.render().unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Tax ID not found in the uploaded document."));
        assert!(html.contains("Connect with Twitch"));
    }
}
