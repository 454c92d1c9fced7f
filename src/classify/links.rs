use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, instrument};

use super::{ask, malformed, strip_code_fence};
use crate::app::ports::LanguageModelPort;
use crate::constants::{NO_LINKS_PROVIDED, NO_RELEVANT_LINKS};
use crate::error::ExternalServiceError;
use crate::types::{LinkReview, RelevantLink};

static LINK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+)\s+[-–]\s+(\S.*)$").expect("valid link line pattern"));

/// Keeps only profile links that belong to the competitive esports scene.
pub struct LinkRelevanceClassifier<'a> {
    model: &'a dyn LanguageModelPort,
}

impl<'a> LinkRelevanceClassifier<'a> {
    pub fn new(model: &'a dyn LanguageModelPort) -> Self {
        Self { model }
    }

    /// `links_text` holds one candidate per line. With no candidates the model is
    /// not called and the review is the literal "no links provided".
    #[instrument(skip_all)]
    pub async fn review(
        &self,
        links_text: &str,
        declared_interests: &str,
    ) -> Result<LinkReview, ExternalServiceError> {
        let links = candidate_links(links_text);
        if links.is_empty() {
            return Ok(LinkReview {
                raw: NO_LINKS_PROVIDED.to_string(),
                entries: Vec::new(),
            });
        }

        let answer = ask(self.model, &build_prompt(&links, declared_interests)).await?;
        let entries = parse_review(&answer)?;
        info!(
            candidates = links.len(),
            relevant = entries.len(),
            "Profile links reviewed"
        );
        Ok(LinkReview {
            raw: answer.trim().to_string(),
            entries,
        })
    }
}

pub fn candidate_links(links_text: &str) -> Vec<&str> {
    links_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

pub fn build_prompt(links: &[&str], declared_interests: &str) -> String {
    let interests: String = declared_interests
        .split(',')
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .map(|i| format!("- {i}\n"))
        .collect();
    format!(
        "You are an esports expert. Review each link in the list below and keep **only** \
         the ones that belong to profiles directly tied to the competitive esports scene. \
         That includes:\n\n\
         - Professional players\n\
         - Esports organizations and teams\n\
         - Official data platforms such as Liquipedia, HLTV, etc.\n\
         - Team or league channels on Twitch, YouTube, etc.\n\
         - Technical staff or recognized public figures of the competitive scene\n\n\
         **Do not include** regular users, fans, casual streamers or unrelated profiles.\n\n\
         ### Links:\n\
         {links}\n\n\
         ### User interests:\n\
         {interests}\n\
         ### Answer format:\n\
         - Answer only with the relevant links, judged against the user interests above.\n\
         - When in doubt, do not treat the link as relevant.\n\
         - Write each relevant link followed by a hyphen and its category, one per line.\n\
         - Example: `link - professional player`\n\
         - Ignore the links that are **not** relevant.\n\
         - If **no link is relevant**, answer exactly: `{sentinel}`",
        links = links.join("\n"),
        sentinel = NO_RELEVANT_LINKS,
    )
}

/// Accepts the sentinel phrase or `link - category` lines, nothing else.
pub fn parse_review(answer: &str) -> Result<Vec<RelevantLink>, ExternalServiceError> {
    let body = strip_code_fence(answer);
    if body.is_empty() {
        return Err(malformed("empty link review"));
    }
    if is_sentinel(body) {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let line = line
            .strip_prefix("- ")
            .or_else(|| line.strip_prefix("* "))
            .or_else(|| line.strip_prefix("• "))
            .unwrap_or(line);
        let line = line.trim().trim_matches('`').trim();
        let caps = LINK_LINE
            .captures(line)
            .ok_or_else(|| malformed(format!("unexpected line '{line}'")))?;
        entries.push(RelevantLink {
            link: caps[1].to_string(),
            category: caps[2].trim().to_string(),
        });
    }
    Ok(entries)
}

fn is_sentinel(body: &str) -> bool {
    let phrase = body.trim_matches('`').trim();
    phrase.eq_ignore_ascii_case(NO_RELEVANT_LINKS)
        || phrase.eq_ignore_ascii_case(NO_RELEVANT_LINKS.trim_end_matches('.'))
}
