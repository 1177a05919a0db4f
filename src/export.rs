use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::state::MatchCard;

pub const EXPORT_MIME: &str = "application/json;charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedMatch {
    pub title: String,
    pub score: Option<String>,
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl From<&MatchCard> for ExportedMatch {
    fn from(card: &MatchCard) -> Self {
        Self {
            title: card.title.trim().to_string(),
            score: card.score_raw.clone(),
            reasons: card.reasons.clone(),
        }
    }
}

pub fn collect_matches(cards: &[MatchCard]) -> Vec<ExportedMatch> {
    cards.iter().map(ExportedMatch::from).collect()
}

/// Pretty-printed (2-space indented) JSON array of every card.
pub fn export_json(cards: &[MatchCard]) -> Result<String> {
    serde_json::to_string_pretty(&collect_matches(cards)).context("serialize matches export")
}

pub fn data_uri(contents: &str) -> String {
    format!("data:{EXPORT_MIME};base64,{}", STANDARD.encode(contents))
}

/// Reads an export file back into cards. The visible text of a loaded card is
/// its title followed by its reasons. A `null` score loads as a card without a
/// progress indicator, so it filters the same way it did before export.
pub fn load_matches(raw: &str) -> Result<Vec<MatchCard>> {
    let rows: Vec<ExportedMatch> =
        serde_json::from_str(raw).context("parse matches export")?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let mut text = row.title.clone();
            for reason in &row.reasons {
                text.push('\n');
                text.push_str(reason);
            }
            let has_indicator = row.score.is_some();
            MatchCard::new(row.title, row.score, has_indicator, text, row.reasons)
        })
        .collect())
}
