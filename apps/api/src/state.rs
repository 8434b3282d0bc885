use std::sync::Arc;

use crate::analysis::ResumeAnalyzer;
use crate::auth::IdentityProvider;
use crate::collection::Collection;
use crate::config::Config;
use crate::models::{GeneratedResume, UploadedResume};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub uploaded: Arc<Collection<UploadedResume>>,
    pub generated: Arc<Collection<GeneratedResume>>,
    /// `None` when no model API key is configured.
    pub analyzer: Option<Arc<dyn ResumeAnalyzer>>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Config,
}
