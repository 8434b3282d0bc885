use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ownership::Owner;
use crate::store::Record;

/// A resume produced by the builder: the user's inputs plus generated content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResume {
    pub id: String,
    #[serde(alias = "userId")]
    pub owner_id: Owner,
    pub created_at: DateTime<Utc>,
    #[serde(default = "first_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_target_role: Option<String>,
    #[serde(default = "empty_inputs")]
    pub inputs: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn first_version() -> u32 {
    1
}

fn empty_inputs() -> Value {
    Value::Object(Map::new())
}

#[derive(Debug, Clone)]
pub struct GeneratedDraft {
    pub owner: Owner,
    pub input_name: Option<String>,
    pub input_target_role: Option<String>,
    pub inputs: Value,
    pub content: Option<String>,
    /// Defaults to 1.
    pub version: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct GeneratedPatch {
    pub input_name: Option<String>,
    pub input_target_role: Option<String>,
    pub inputs: Option<Value>,
    pub content: Option<String>,
    /// Increments the version counter when set.
    pub bump_version: bool,
}

impl Record for GeneratedResume {
    type Draft = GeneratedDraft;
    type Patch = GeneratedPatch;

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: GeneratedDraft) -> Self {
        Self {
            id,
            owner_id: draft.owner,
            created_at,
            version: draft.version.unwrap_or_else(first_version),
            input_name: draft.input_name,
            input_target_role: draft.input_target_role,
            inputs: draft.inputs,
            content: draft.content,
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
        self.created_at
    }

    fn apply(&mut self, patch: GeneratedPatch) {
        if let Some(name) = patch.input_name {
            self.input_name = Some(name);
        }
        if let Some(role) = patch.input_target_role {
            self.input_target_role = Some(role);
        }
        if let Some(inputs) = patch.inputs {
            self.inputs = inputs;
        }
        if let Some(content) = patch.content {
            self.content = Some(content);
        }
        if patch.bump_version {
            self.version = self.version.saturating_add(1);
        }
    }
}

/// List view returned by `GET /api/builder/generated`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub input_name: Option<String>,
    pub input_target_role: Option<String>,
    pub version: u32,
}

impl From<&GeneratedResume> for GeneratedSummary {
    fn from(r: &GeneratedResume) -> Self {
        Self {
            id: r.id.clone(),
            created_at: r.created_at,
            input_name: r.input_name.clone(),
            input_target_role: r.input_target_role.clone(),
            version: r.version,
        }
    }
}
