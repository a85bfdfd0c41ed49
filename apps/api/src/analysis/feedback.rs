//! Feedback returned by the AI adapter, parsed from its text payload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::strip_json_fences;

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Good,
    Improve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsTip {
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedTip {
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub tip: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsFeedback {
    pub score: u8,
    #[serde(default)]
    pub tips: Vec<AtsTip>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFeedback {
    pub score: u8,
    #[serde(default)]
    pub tips: Vec<DetailedTip>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub overall_score: u8,
    #[serde(rename = "ATS")]
    pub ats: AtsFeedback,
    pub tone_and_style: CategoryFeedback,
    pub content: CategoryFeedback,
    pub structure: CategoryFeedback,
    pub skills: CategoryFeedback,
}

/// Tips that carry a `type` tag.
pub trait Tip {
    fn kind(&self) -> TipKind;
}

impl Tip for AtsTip {
    fn kind(&self) -> TipKind {
        self.kind
    }
}

impl Tip for DetailedTip {
    fn kind(&self) -> TipKind {
        self.kind
    }
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback is empty")]
    Empty,

    #[error("feedback is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} score {score} is outside 0-100")]
    ScoreOutOfRange { field: &'static str, score: u8 },
}

impl Feedback {
    /// Every sub-score and the overall score must sit in [0, 100].
    pub fn validate(&self) -> Result<(), FeedbackError> {
        let scores = [
            ("overallScore", self.overall_score),
            ("ATS", self.ats.score),
            ("toneAndStyle", self.tone_and_style.score),
            ("content", self.content.score),
            ("structure", self.structure.score),
            ("skills", self.skills.score),
        ];
        for (field, score) in scores {
            if score > MAX_SCORE {
                return Err(FeedbackError::ScoreOutOfRange { field, score });
            }
        }
        Ok(())
    }

    /// Category sections in display order.
    pub fn categories(&self) -> [(&'static str, &'static str, &CategoryFeedback); 4] {
        [
            ("tone-style", "Tone & Style", &self.tone_and_style),
            ("content", "Content", &self.content),
            ("structure", "Structure", &self.structure),
            ("skills", "Skills", &self.skills),
        ]
    }
}

/// Parses the model's text into a validated [`Feedback`].
pub fn parse_feedback(text: &str) -> Result<Feedback, FeedbackError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(FeedbackError::Empty);
    }
    let feedback: Feedback = serde_json::from_str(text)?;
    feedback.validate()?;
    Ok(feedback)
}
