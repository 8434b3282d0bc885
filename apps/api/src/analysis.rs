//! Resume analysis — pluggable, trait-based scorer for extracted resume text.
//!
//! `AppState` holds an `Option<Arc<dyn ResumeAnalyzer>>`; it is `None` when no
//! model API key is configured.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::resume_analysis_prompt;
use crate::llm_client::LlmClient;
use crate::models::{RawAnalysis, ResumeAnalysis};

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, resume_text: &str) -> Result<ResumeAnalysis, AppError>;
}

/// Scores resumes with the hosted generative model.
pub struct LlmAnalyzer {
    llm: LlmClient,
}

impl LlmAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeAnalyzer for LlmAnalyzer {
    async fn analyze(&self, resume_text: &str) -> Result<ResumeAnalysis, AppError> {
        let prompt = resume_analysis_prompt(resume_text);
        let raw: RawAnalysis = self
            .llm
            .call_json(&prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Failed to analyze resume: {e}")))?;

        let analysis = raw.finalize(Utc::now());
        info!(
            "Analysis from {} scored {}",
            self.llm.model(),
            analysis.overall_score
        );
        Ok(analysis)
    }
}
