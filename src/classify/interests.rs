use tracing::{info, instrument};

use super::{ask, malformed, strip_code_fence};
use crate::app::ports::LanguageModelPort;
use crate::constants::INTEREST_TAXONOMY;
use crate::error::ExternalServiceError;

const MAX_LABEL_CHARS: usize = 40;

/// Infers game-genre interest categories from the channels a user follows.
pub struct InterestClassifier<'a> {
    model: &'a dyn LanguageModelPort,
}

impl<'a> InterestClassifier<'a> {
    pub fn new(model: &'a dyn LanguageModelPort) -> Self {
        Self { model }
    }

    /// Empty input short-circuits to an empty list without calling the model.
    #[instrument(skip_all, fields(channels = channels.len()))]
    pub async fn classify(&self, channels: &[String]) -> Result<Vec<String>, ExternalServiceError> {
        if channels.is_empty() {
            return Ok(Vec::new());
        }
        let answer = ask(self.model, &build_prompt(channels)).await?;
        let categories = parse_categories(&answer)?;
        info!(categories = categories.len(), "Interest categories detected");
        Ok(categories)
    }
}

pub fn build_prompt(channels: &[String]) -> String {
    let taxonomy: String = INTEREST_TAXONOMY
        .iter()
        .map(|c| format!("- {c}\n"))
        .collect();
    format!(
        "Based on the following list of streamers followed on Twitch:\n\
         {channels}\n\n\
         Classify the user's interests into game categories such as:\n\
         {taxonomy}\n\
         Answer only with a simple comma-separated list of the identified categories; \
         avoid catch-all terms such as variety or other.\n\
         Do not include explanations or justifications, only the categories. \
         Try to analyse every followed channel.",
        channels = channels.join(", "),
    )
}

/// Comma-separated labels, one line, each short and starting with a letter or digit.
/// Labels are not checked against the taxonomy.
pub fn parse_categories(answer: &str) -> Result<Vec<String>, ExternalServiceError> {
    let body = strip_code_fence(answer);
    let body = body.strip_suffix('.').unwrap_or(body).trim();
    if body.is_empty() {
        return Err(malformed("empty category list"));
    }
    if body.contains('\n') {
        return Err(malformed("category list spans several lines"));
    }

    let mut categories = Vec::new();
    for label in body.split(',').map(str::trim).filter(|l| !l.is_empty()) {
        let starts_ok = label.chars().next().map_or(false, char::is_alphanumeric);
        if !starts_ok || label.chars().count() > MAX_LABEL_CHARS {
            return Err(malformed(format!("unexpected category label '{label}'")));
        }
        categories.push(label.to_string());
    }
    if categories.is_empty() {
        return Err(malformed("empty category list"));
    }
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::test_support::ScriptedModel;

    fn channels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_channel_list_skips_model() {
        let model = ScriptedModel::answering("FPS");
        let out = InterestClassifier::new(&model).classify(&[]).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(model.calls().await, 0);
    }

    #[tokio::test]
    async fn splits_and_trims_answer() {
        let model = ScriptedModel::answering(" FPS ,MOBA, , Battle Royale\n");
        let out = InterestClassifier::new(&model)
            .classify(&channels(&["gaules", "loud_coringa"]))
            .await
            .unwrap();
        assert_eq!(out, vec!["FPS", "MOBA", "Battle Royale"]);

        let prompts = model.prompts.lock().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("gaules, loud_coringa"));
        assert!(prompts[0].contains("- Battle Royale"));
    }

    #[tokio::test]
    async fn model_failure_is_surfaced() {
        let err = ExternalServiceError::Timeout { service: "gemini" };
        let model = ScriptedModel::failing(err.clone());
        let out = InterestClassifier::new(&model).classify(&channels(&["x"])).await;
        assert_eq!(out, Err(err));
    }

    #[test]
    fn categories_outside_taxonomy_are_kept() {
        assert_eq!(
            parse_categories("Fighting games, Racing.").unwrap(),
            vec!["Fighting games", "Racing"]
        );
    }

    #[test]
    fn prose_answers_are_malformed() {
        let chatty = "Sure! Here are the categories:\nFPS, MOBA";
        assert!(matches!(
            parse_categories(chatty),
            Err(ExternalServiceError::MalformedResponse { .. })
        ));
        let long = "The user seems to mostly enjoy tactical shooters and competitive team play";
        assert!(parse_categories(long).is_err());
        assert!(parse_categories("   ").is_err());
        assert!(parse_categories("- FPS").is_err());
    }
}
