use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::analysis::ResumeAnalysis;
use crate::ownership::Owner;
use crate::store::Record;

/// A resume file the user uploaded, with its extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedResume {
    pub id: String,
    #[serde(alias = "userId")]
    pub owner_id: Owner,
    pub original_filename: String,
    pub parsed_text: String,
    pub upload_timestamp: DateTime<Utc>,
    /// Absent until analysis completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ResumeAnalysis>,
    /// Keys written by older versions, preserved on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct UploadedDraft {
    pub owner: Owner,
    pub original_filename: String,
    pub parsed_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct UploadedPatch {
    pub original_filename: Option<String>,
    pub parsed_text: Option<String>,
    pub analysis: Option<ResumeAnalysis>,
}

impl Record for UploadedResume {
    type Draft = UploadedDraft;
    type Patch = UploadedPatch;

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: UploadedDraft) -> Self {
        Self {
            id,
            owner_id: draft.owner,
            original_filename: draft.original_filename,
            parsed_text: draft.parsed_text,
            upload_timestamp: created_at,
            analysis: None,
            extra: Map::new(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &Owner {
        &self.owner_id
    }

    fn set_owner(&mut self, owner: Owner) {
        self.owner_id = owner;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.upload_timestamp
    }

    fn apply(&mut self, patch: UploadedPatch) {
        if let Some(name) = patch.original_filename {
            self.original_filename = name;
        }
        if let Some(text) = patch.parsed_text {
            self.parsed_text = text;
        }
        if let Some(analysis) = patch.analysis {
            self.analysis = Some(analysis);
        }
    }
}

/// List view returned by `GET /api/resumes`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedSummary {
    pub id: String,
    pub original_filename: String,
    pub upload_timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_timestamp: Option<DateTime<Utc>>,
}

impl From<&UploadedResume> for UploadedSummary {
    fn from(r: &UploadedResume) -> Self {
        Self {
            id: r.id.clone(),
            original_filename: r.original_filename.clone(),
            upload_timestamp: r.upload_timestamp,
            overall_score: r.analysis.as_ref().map(|a| a.overall_score),
            analysis_timestamp: r.analysis.as_ref().map(|a| a.analysis_timestamp),
        }
    }
}

/// Detail view returned by `GET /api/resumes/:id`. Omits the parsed text.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDetail {
    pub id: String,
    pub original_filename: String,
    pub upload_timestamp: DateTime<Utc>,
    pub analysis: Option<ResumeAnalysis>,
}

impl From<UploadedResume> for UploadedDetail {
    fn from(r: UploadedResume) -> Self {
        Self {
            id: r.id,
            original_filename: r.original_filename,
            upload_timestamp: r.upload_timestamp,
            analysis: r.analysis,
        }
    }
}
