use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, SummarizerProvider};
use crate::error::AppError;
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use crate::middleware::metrics::metrics_middleware;
use crate::middleware::tracing::request_id_middleware;
use crate::services::registry::MAX_UPLOAD_BYTES;
use crate::services::{
    ActivityLog, CollabHub, CommentThreads, DocumentRegistry, FolderHierarchy,
    HuggingFaceSummarizer, LocalStorage, MockSummarizer, Storage, Summarizer,
};
use crate::store::{MongoStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn Store>,
    pub registry: DocumentRegistry,
    pub threads: CommentThreads,
    pub hierarchy: FolderHierarchy,
    pub activity: ActivityLog,
    pub collab: CollabHub,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Production wiring: Mongo store, local blob storage, configured
    /// summarizer provider.
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        let mongo = MongoStore::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        mongo.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;
        let store: Arc<dyn Store> = Arc::new(mongo);

        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(&config.storage.local_path)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to initialize local storage at {}: {}",
                        config.storage.local_path,
                        e
                    );
                    e
                })?,
        );

        let summarizer: Arc<dyn Summarizer> = match config.summarizer.provider {
            SummarizerProvider::HuggingFace => Arc::new(HuggingFaceSummarizer::new(
                config.summarizer.api_url.clone(),
                config.summarizer.api_token.clone(),
            )?),
            SummarizerProvider::Mock => Arc::new(MockSummarizer::new(true)),
        };

        Self::with_store(config, store, storage, summarizer).await
    }

    /// Wiring with injected dependencies; tests use this with the in-memory
    /// store, a temp-dir storage and the mock summarizer.
    pub async fn with_store(
        config: AppConfig,
        store: Arc<dyn Store>,
        storage: Arc<dyn Storage>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Result<Self, AppError> {
        let activity = ActivityLog::new(store.clone());
        let registry = DocumentRegistry::new(
            store.clone(),
            storage,
            summarizer,
            activity.clone(),
            config.storage.quota_bytes,
        );
        let threads = CommentThreads::new(store.clone(), activity.clone());
        let hierarchy = FolderHierarchy::new(store.clone(), activity.clone());

        let state = AppState {
            config: config.clone(),
            store,
            registry,
            threads,
            hierarchy,
            activity,
            collab: CollabHub::new(),
        };

        let router = build_router(state.clone())?;

        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, router);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

fn build_router(state: AppState) -> Result<Router, AppError> {
    let api = Router::new()
        .route("/documents", get(handlers::list_documents))
        .route(
            "/documents/upload",
            post(handlers::upload_document)
                // Raise axum's 2 MiB default above the file cap; the slack
                // covers multipart boundaries and the folderId field. The
                // handler still enforces the cap with a structured error.
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .route("/documents/workflow/:id", put(handlers::update_workflow))
        .route("/documents/file/:id", get(handlers::download_file))
        .route("/documents/rename/:id", put(handlers::rename_document))
        .route(
            "/documents/:id",
            get(handlers::get_document)
                .put(handlers::update_content)
                .delete(handlers::delete_document),
        )
        .route("/comments/replies/:id", get(handlers::list_replies))
        .route(
            "/comments/:id",
            post(handlers::add_comment)
                .get(handlers::list_comments)
                .delete(handlers::delete_comment),
        )
        .route("/folders/create", post(handlers::create_folder))
        .route("/folders/move/:id", put(handlers::move_document))
        .route("/folders/:id", delete(handlers::delete_folder))
        .route("/folders", get(handlers::list_folders))
        .route("/activities", get(handlers::list_activities))
        .route("/ai/search", post(handlers::search_documents))
        .route("/ai/summarize/:id", get(handlers::summarize_document))
        .route("/users/me", get(handlers::me))
        .route("/users", get(handlers::list_users))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        // Added after the auth layer: the relay carries no auth (non-goal).
        .route("/collab/:id", get(handlers::collab_ws));

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .nest("/api", api)
        .layer(cors_layer(&state.config)?)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

fn cors_layer(config: &AppConfig) -> Result<CorsLayer, AppError> {
    let origins = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid CORS origin {}: {}", origin, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}
