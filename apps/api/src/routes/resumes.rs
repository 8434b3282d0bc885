//! Axum route handlers for uploaded resumes.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::extract::{extract_text, DocumentKind};
use crate::models::{ResumeAnalysis, UploadedDetail, UploadedDraft, UploadedPatch, UploadedSummary};
use crate::routes::require_access;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "resumeFile";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    pub resume_id: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<UploadedSummary>,
}

#[derive(Debug, Serialize)]
pub struct ResumeDetailResponse {
    pub resume: UploadedDetail,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub message: &'static str,
    pub analysis: ResumeAnalysis,
}

struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

/// GET /api/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Json<ResumeListResponse> {
    let resumes: Vec<UploadedSummary> = state
        .uploaded
        .list_by_owner(&caller)
        .await
        .iter()
        .map(UploadedSummary::from)
        .collect();
    info!("Found {} uploaded resumes for {caller}", resumes.len());
    Json(ResumeListResponse { resumes })
}

/// POST /api/resumes/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    Caller(caller): Caller,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let file = read_upload(multipart)
        .await?
        .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    let kind = DocumentKind::detect(file.content_type.as_deref(), file.file_name.as_deref())
        .ok_or(AppError::UnsupportedMedia)?;
    info!(
        "Processing upload {:?} ({kind:?}, {} bytes) for {caller}",
        file.file_name,
        file.data.len()
    );

    let parsed_text = extract_text(kind, file.data).await?;
    let resume_id = state
        .uploaded
        .add(UploadedDraft {
            owner: caller,
            original_filename: file.file_name.unwrap_or_else(|| "resume".to_string()),
            parsed_text,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Resume uploaded and parsed successfully",
            resume_id,
        }),
    ))
}

async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid file upload: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid file upload: {e}")))?;
        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            data,
        }));
    }
    Ok(None)
}

/// GET /api/resumes/:resumeId
pub async fn handle_get(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(resume_id): Path<String>,
) -> Result<Json<ResumeDetailResponse>, AppError> {
    let access = state.uploaded.resolve(&resume_id, &caller, true).await?;
    let record = require_access(access, "Resume")?;
    Ok(Json(ResumeDetailResponse {
        resume: record.into(),
    }))
}

/// POST /api/resumes/:resumeId/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(resume_id): Path<String>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let access = state.uploaded.resolve(&resume_id, &caller, true).await?;
    let record = require_access(access, "Resume")?;

    if record.parsed_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Cannot analyze empty resume text".to_string(),
        ));
    }
    let analyzer = state
        .analyzer
        .as_ref()
        .ok_or(AppError::AnalysisUnavailable)?;

    info!("Starting analysis for resume {resume_id}, caller {caller}");
    let analysis = analyzer.analyze(&record.parsed_text).await?;

    // Re-checked: the record may have been deleted or claimed during analysis.
    let access = state
        .uploaded
        .update_owned(
            &resume_id,
            &caller,
            UploadedPatch {
                analysis: Some(analysis.clone()),
                ..Default::default()
            },
        )
        .await?;
    require_access(access, "Resume")?;

    Ok(Json(AnalyzeResponse {
        message: "Resume analyzed successfully",
        analysis,
    }))
}

/// DELETE /api/resumes/:resumeId
pub async fn handle_delete(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(resume_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let access = state.uploaded.delete_owned(&resume_id, &caller).await?;
    require_access(access, "Resume")?;
    Ok(StatusCode::NO_CONTENT)
}
