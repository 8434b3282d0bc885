pub mod builder;
pub mod health;
pub mod resumes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::ownership::Access;
use crate::state::AppState;

/// Maps an ownership outcome to the record or a 403/404.
pub(crate) fn require_access<R>(access: Access<R>, what: &str) -> Result<R, AppError> {
    match access {
        Access::Granted(record) | Access::Claimed(record) => Ok(record),
        Access::Denied => Err(AppError::Forbidden(format!(
            "You do not own this {}",
            what.to_lowercase()
        ))),
        Access::NotFound => Err(AppError::NotFound(format!("{what} not found"))),
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Uploaded resumes
        .route("/api/resumes", get(resumes::handle_list))
        .route("/api/resumes/upload", post(resumes::handle_upload))
        .route(
            "/api/resumes/:resume_id",
            get(resumes::handle_get).delete(resumes::handle_delete),
        )
        .route(
            "/api/resumes/:resume_id/analyze",
            post(resumes::handle_analyze),
        )
        // Builder output
        .route(
            "/api/builder/generated",
            get(builder::handle_list).post(builder::handle_create),
        )
        .route(
            "/api/builder/generated/:id",
            get(builder::handle_get)
                .patch(builder::handle_update)
                .delete(builder::handle_delete),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::ResumeAnalyzer;
    use crate::auth::TrustedBearer;
    use crate::collection::Collection;
    use crate::config::{AuthMode, Config, StoreBackend};
    use crate::models::{
        GeneratedDraft, GeneratedResume, RawAnalysis, RawCategoryScores, ResumeAnalysis,
        UploadedDraft, UploadedResume,
    };
    use crate::ownership::Owner;
    use crate::store::MemoryStore;

    struct FixedAnalyzer;

    #[async_trait]
    impl ResumeAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _resume_text: &str) -> Result<ResumeAnalysis, AppError> {
            Ok(RawAnalysis {
                overall_score: 77.0,
                category_scores: RawCategoryScores {
                    formatting: 80.0,
                    content: 70.0,
                    keywords: 60.0,
                    impact: 90.0,
                },
                suggestions: vec!["Add metrics".to_string()],
                strengths: vec!["Clear layout".to_string()],
            }
            .finalize(Utc::now()))
        }
    }

    fn test_state(with_analyzer: bool) -> AppState {
        AppState {
            uploaded: Arc::new(Collection::new(
                "uploaded",
                Arc::new(MemoryStore::<UploadedResume>::new()),
            )),
            generated: Arc::new(Collection::new(
                "generated",
                Arc::new(MemoryStore::<GeneratedResume>::new()),
            )),
            analyzer: if with_analyzer {
                Some(Arc::new(FixedAnalyzer))
            } else {
                None
            },
            identity: Arc::new(TrustedBearer),
            config: Config {
                port: 0,
                data_dir: PathBuf::from("unused"),
                store_backend: StoreBackend::Memory,
                gemini_api_key: None,
                gemini_model: "test".to_string(),
                auth_mode: AuthMode::TrustedBearer,
                max_upload_bytes: 1024 * 1024,
                rust_log: "info".to_string(),
            },
        }
    }

    async fn send(
        state: &AppState,
        method: Method,
        uri: &str,
        uid: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(uid) = uid {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {uid}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn seed_upload(state: &AppState, owner: Owner, text: &str) -> String {
        state
            .uploaded
            .add(UploadedDraft {
                owner,
                original_filename: "cv.pdf".to_string(),
                parsed_text: text.to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state(false);
        let (status, body) = send(&state, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_caller() {
        let state = test_state(false);
        let mine = seed_upload(&state, Owner::User("u1".into()), "a").await;
        seed_upload(&state, Owner::User("u2".into()), "b").await;
        seed_upload(&state, Owner::Anonymous, "c").await;

        let (status, body) = send(&state, Method::GET, "/api/resumes", Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        let resumes = body["resumes"].as_array().unwrap();
        assert_eq!(resumes.len(), 1);
        assert_eq!(resumes[0]["id"], mine.as_str());
        assert_eq!(resumes[0]["originalFilename"], "cv.pdf");
        assert!(resumes[0].get("overallScore").is_none());

        let (_, anon) = send(&state, Method::GET, "/api/resumes", None, None).await;
        assert_eq!(anon["resumes"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_claims_then_forbids_others() {
        let state = test_state(false);
        let id = seed_upload(&state, Owner::Anonymous, "hello").await;
        let uri = format!("/api/resumes/{id}");

        let (status, body) = send(&state, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume"]["id"], id.as_str());
        assert!(body["resume"]["analysis"].is_null());
        assert!(body["resume"].get("parsedText").is_none());

        let (status, _) = send(&state, Method::GET, &uri, Some("user-42"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            state.uploaded.get(&id).await.unwrap().owner_id,
            Owner::User("user-42".into())
        );

        let (status, body) = send(&state, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");

        let (status, _) = send(&state, Method::GET, &uri, Some("user-7"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) =
            send(&state, Method::GET, "/api/resumes/missing", Some("user-42"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_analyze_persists_analysis() {
        let state = test_state(true);
        let id = seed_upload(&state, Owner::User("u1".into()), "Rust engineer").await;
        let uri = format!("/api/resumes/{id}/analyze");

        let (status, body) = send(&state, Method::POST, &uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"]["overallScore"], 77);

        let stored = state.uploaded.get(&id).await.unwrap();
        assert_eq!(stored.analysis.unwrap().overall_score, 77);
        assert_eq!(stored.parsed_text, "Rust engineer");

        let (_, list) = send(&state, Method::GET, "/api/resumes", Some("u1"), None).await;
        assert_eq!(list["resumes"][0]["overallScore"], 77);
        assert!(list["resumes"][0]["analysisTimestamp"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_rejects_empty_text() {
        let state = test_state(true);
        let id = seed_upload(&state, Owner::Anonymous, "   ").await;
        let uri = format!("/api/resumes/{id}/analyze");

        let (status, _) = send(&state, Method::POST, &uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_without_analyzer_is_unavailable() {
        let state = test_state(false);
        let id = seed_upload(&state, Owner::Anonymous, "text").await;
        let uri = format!("/api/resumes/{id}/analyze");

        let (status, body) = send(&state, Method::POST, &uri, None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "ANALYSIS_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_delete_requires_owner_and_does_not_claim() {
        let state = test_state(false);
        let anon = seed_upload(&state, Owner::Anonymous, "a").await;
        let owned = seed_upload(&state, Owner::User("u1".into()), "b").await;

        let (status, _) = send(
            &state,
            Method::DELETE,
            &format!("/api/resumes/{anon}"),
            Some("u1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            state.uploaded.get(&anon).await.unwrap().owner_id,
            Owner::Anonymous
        );

        let uri = format!("/api/resumes/{owned}");
        let (status, _) = send(&state, Method::DELETE, &uri, Some("u2"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&state, Method::DELETE, &uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.uploaded.get(&owned).await.is_none());

        let (status, _) = send(&state, Method::DELETE, &uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected() {
        let state = test_state(false);
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhi\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/resumes/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type() {
        let state = test_state(false);
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"resumeFile\"; filename=\"cv.txt\"\r\nContent-Type: text/plain\r\n\r\nplain text\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/resumes/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(state.uploaded.list_by_owner(&Owner::Anonymous).await.is_empty());
    }

    #[tokio::test]
    async fn test_builder_lifecycle() {
        let state = test_state(false);

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/builder/generated",
            Some("u1"),
            Some(json!({
                "inputName": "Ada",
                "inputTargetRole": "Engineer",
                "inputs": { "skills": ["rust"] }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["generatedResumeId"].as_str().unwrap().to_string();
        let uri = format!("/api/builder/generated/{id}");

        let (status, list) =
            send(&state, Method::GET, "/api/builder/generated", Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        let items = list["generatedResumes"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["version"], 1);
        assert_eq!(items[0]["inputName"], "Ada");

        let (status, body) = send(
            &state,
            Method::PATCH,
            &uri,
            Some("u1"),
            Some(json!({ "content": "Generated body" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generatedResume"]["version"], 2);
        assert_eq!(body["generatedResume"]["content"], "Generated body");
        assert_eq!(body["generatedResume"]["inputs"], json!({ "skills": ["rust"] }));

        let (status, _) = send(
            &state,
            Method::PATCH,
            &uri,
            Some("u2"),
            Some(json!({ "content": "hijack" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&state, Method::DELETE, &uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&state, Method::GET, &uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_builder_get_claims_anonymous() {
        let state = test_state(false);
        let id = state
            .generated
            .add(GeneratedDraft {
                owner: Owner::Anonymous,
                input_name: None,
                input_target_role: None,
                inputs: json!({}),
                content: None,
                version: None,
            })
            .await
            .unwrap();

        let uri = format!("/api/builder/generated/{id}");
        let (status, body) = send(&state, Method::GET, &uri, Some("u9"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generatedResume"]["ownerId"], "u9");
    }

    #[tokio::test]
    async fn test_builder_rejects_non_object_inputs() {
        let state = test_state(false);
        let (status, _) = send(
            &state,
            Method::POST,
            "/api/builder/generated",
            None,
            Some(json!({ "inputs": [1, 2, 3] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_builder_missing_inputs_stored_as_empty_object() {
        let state = test_state(false);
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/builder/generated",
            Some("u3"),
            Some(json!({ "inputName": "Ada", "inputs": null })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!(
            "/api/builder/generated/{}",
            body["generatedResumeId"].as_str().unwrap()
        );
        let (status, body) = send(&state, Method::GET, &uri, Some("u3"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generatedResume"]["inputs"], json!({}));
    }
}
