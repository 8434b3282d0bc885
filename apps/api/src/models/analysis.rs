use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Per-dimension scores, each 0–100.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryScores {
    #[serde(deserialize_with = "lenient_score")]
    pub formatting: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub content: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub keywords: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub impact: u8,
}

/// Feedback attached to an uploaded resume once analysis completes.
///
/// Stored analyses may have been written with whatever the model returned,
/// so every field is optional and scores are clamped on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeAnalysis {
    #[serde(deserialize_with = "lenient_score")]
    pub overall_score: u8,
    pub category_scores: CategoryScores,
    pub suggestions: Vec<String>,
    pub strengths: Vec<String>,
    pub analysis_timestamp: DateTime<Utc>,
}

/// Shape the model is asked to return. Lenient: numbers may arrive as floats
/// or out of range, and any field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAnalysis {
    pub overall_score: f64,
    pub category_scores: RawCategoryScores,
    pub suggestions: Vec<String>,
    pub strengths: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCategoryScores {
    pub formatting: f64,
    pub content: f64,
    pub keywords: f64,
    pub impact: f64,
}

impl RawAnalysis {
    pub fn finalize(self, analysis_timestamp: DateTime<Utc>) -> ResumeAnalysis {
        let c = self.category_scores;
        ResumeAnalysis {
            overall_score: clamp_score(self.overall_score),
            category_scores: CategoryScores {
                formatting: clamp_score(c.formatting),
                content: clamp_score(c.content),
                keywords: clamp_score(c.keywords),
                impact: clamp_score(c.impact),
            },
            suggestions: self.suggestions,
            strengths: self.strengths,
            analysis_timestamp,
        }
    }
}

fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    Ok(clamp_score(f64::deserialize(deserializer)?))
}

fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
