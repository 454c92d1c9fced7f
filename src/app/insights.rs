use std::collections::HashMap;

use crate::constants::TOP_STREAMERS;
use crate::types::FanSubmission;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRow {
    pub label: String,
    pub count: usize,
    /// Share of the largest count in the same list, 0..=100.
    pub percent_of_max: usize,
}

/// Aggregates shown on the insights view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightsReport {
    pub total_fans: usize,
    pub categories: Vec<CountRow>,
    pub events: Vec<CountRow>,
    pub top_streamers: Vec<CountRow>,
}

impl InsightsReport {
    pub fn from_rows(rows: &[FanSubmission]) -> Self {
        Self {
            total_fans: rows.len(),
            categories: count_fragments(rows.iter().map(|r| r.detected_themes.as_str()), None),
            events: count_fragments(rows.iter().map(|r| r.events_2024.as_str()), None),
            top_streamers: count_fragments(
                rows.iter().map(|r| r.followed_channels.as_str()),
                Some(TOP_STREAMERS),
            ),
        }
    }
}

/// Splits every value on commas and counts the trimmed, non-empty fragments.
/// Most frequent first, ties alphabetical.
pub fn count_fragments<'a>(
    values: impl Iterator<Item = &'a str>,
    limit: Option<usize>,
) -> Vec<CountRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        for fragment in value.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            *counts.entry(fragment).or_insert(0) += 1;
        }
    }

    let mut sorted: Vec<(&str, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    if let Some(n) = limit {
        sorted.truncate(n);
    }

    let max = sorted.first().map(|(_, c)| *c).unwrap_or(0);
    sorted
        .into_iter()
        .map(|(label, count)| CountRow {
            label: label.to_string(),
            count,
            percent_of_max: if max == 0 { 0 } else { count * 100 / max },
        })
        .collect()
}
