//! Axum route handlers for builder-generated resumes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::{GeneratedDraft, GeneratedPatch, GeneratedResume, GeneratedSummary};
use crate::routes::require_access;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGeneratedRequest {
    pub input_name: Option<String>,
    pub input_target_role: Option<String>,
    #[serde(default)]
    pub inputs: Value,
    pub content: Option<String>,
    pub version: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGeneratedRequest {
    pub input_name: Option<String>,
    pub input_target_role: Option<String>,
    pub inputs: Option<Value>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGeneratedResponse {
    pub generated_resume_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedListResponse {
    pub generated_resumes: Vec<GeneratedSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDetailResponse {
    pub generated_resume: GeneratedResume,
}

/// Builder inputs are always stored as an object; a missing value becomes `{}`.
fn check_inputs(inputs: Value) -> Result<Value, AppError> {
    match inputs {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(inputs),
        _ => Err(AppError::Validation("inputs must be a JSON object".to_string())),
    }
}

/// GET /api/builder/generated
pub async fn handle_list(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Json<GeneratedListResponse> {
    let generated_resumes = state
        .generated
        .list_by_owner(&caller)
        .await
        .iter()
        .map(GeneratedSummary::from)
        .collect();
    Json(GeneratedListResponse { generated_resumes })
}

/// POST /api/builder/generated
pub async fn handle_create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<CreateGeneratedRequest>,
) -> Result<(StatusCode, Json<CreateGeneratedResponse>), AppError> {
    let inputs = check_inputs(req.inputs)?;
    if req.version == Some(0) {
        return Err(AppError::Validation("version starts at 1".to_string()));
    }

    let generated_resume_id = state
        .generated
        .add(GeneratedDraft {
            owner: caller,
            input_name: req.input_name,
            input_target_role: req.input_target_role,
            inputs,
            content: req.content,
            version: req.version,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateGeneratedResponse {
            generated_resume_id,
        }),
    ))
}

/// GET /api/builder/generated/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<GeneratedDetailResponse>, AppError> {
    let access = state.generated.resolve(&id, &caller, true).await?;
    Ok(Json(GeneratedDetailResponse {
        generated_resume: require_access(access, "Generated resume")?,
    }))
}

/// PATCH /api/builder/generated/:id
/// Owner-only: anonymous records are not claimed through an edit.
pub async fn handle_update(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    Json(req): Json<UpdateGeneratedRequest>,
) -> Result<Json<GeneratedDetailResponse>, AppError> {
    let inputs = req.inputs.map(check_inputs).transpose()?;
    let access = state
        .generated
        .update_owned(
            &id,
            &caller,
            GeneratedPatch {
                input_name: req.input_name,
                input_target_role: req.input_target_role,
                inputs,
                content: req.content,
                bump_version: true,
            },
        )
        .await?;
    require_access(access, "Generated resume")?;

    let generated_resume = state
        .generated
        .get_for_caller(&id, &caller, false)
        .await?
        .ok_or_else(|| AppError::NotFound("Generated resume not found".to_string()))?;
    Ok(Json(GeneratedDetailResponse { generated_resume }))
}

/// DELETE /api/builder/generated/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let access = state.generated.delete_owned(&id, &caller).await?;
    require_access(access, "Generated resume")?;
    Ok(StatusCode::NO_CONTENT)
}
