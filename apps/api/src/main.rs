mod analysis;
mod auth;
mod collection;
mod config;
mod errors;
mod extract;
mod llm_client;
mod models;
mod ownership;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{LlmAnalyzer, ResumeAnalyzer};
use crate::auth::{AnonymousOnly, IdentityProvider, TrustedBearer};
use crate::collection::Collection;
use crate::config::{AuthMode, Config, StoreBackend};
use crate::llm_client::LlmClient;
use crate::models::{GeneratedResume, UploadedResume};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{JsonFileStore, MemoryStore, RecordStore};

const UPLOADED_FILE: &str = "resumes.json";
const GENERATED_FILE: &str = "generated-resumes.json";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    let (uploaded_store, generated_store) = open_stores(&config).await?;

    // Analysis engine (optional)
    let analyzer: Option<Arc<dyn ResumeAnalyzer>> = match &config.gemini_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.gemini_model.clone())?;
            info!("LLM client initialized (model: {})", llm.model());
            Some(Arc::new(LlmAnalyzer::new(llm)))
        }
        None => {
            warn!("GEMINI_API_KEY not set; resume analysis is disabled");
            None
        }
    };

    let identity: Arc<dyn IdentityProvider> = match config.auth_mode {
        AuthMode::Anonymous => Arc::new(AnonymousOnly),
        AuthMode::TrustedBearer => {
            warn!("AUTH_MODE=trusted-bearer: bearer tokens are trusted as uids, do not use in production");
            Arc::new(TrustedBearer)
        }
    };

    let state = AppState {
        uploaded: Arc::new(Collection::new("uploaded", uploaded_store)),
        generated: Arc::new(Collection::new("generated", generated_store)),
        analyzer,
        identity,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

type Stores = (
    Arc<dyn RecordStore<UploadedResume>>,
    Arc<dyn RecordStore<GeneratedResume>>,
);

/// Builds the backing store for each collection (one JSON file each by default).
async fn open_stores(config: &Config) -> Result<Stores> {
    match config.store_backend {
        StoreBackend::File => {
            let uploaded =
                JsonFileStore::<UploadedResume>::open(&config.data_dir, UPLOADED_FILE).await?;
            let generated =
                JsonFileStore::<GeneratedResume>::open(&config.data_dir, GENERATED_FILE).await?;
            info!(
                "Collections stored at {} and {}",
                uploaded.path().display(),
                generated.path().display()
            );
            let uploaded: Arc<dyn RecordStore<UploadedResume>> = Arc::new(uploaded);
            let generated: Arc<dyn RecordStore<GeneratedResume>> = Arc::new(generated);
            Ok((uploaded, generated))
        }
        StoreBackend::Memory => {
            warn!("STORE_BACKEND=memory: collections are not persisted");
            let uploaded: Arc<dyn RecordStore<UploadedResume>> =
                Arc::new(MemoryStore::<UploadedResume>::new());
            let generated: Arc<dyn RecordStore<GeneratedResume>> =
                Arc::new(MemoryStore::<GeneratedResume>::new());
            Ok((uploaded, generated))
        }
    }
}
