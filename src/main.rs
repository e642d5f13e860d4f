//! Embedding Server - Main Entry Point
//!
//! Loads the multilingual sentence-embedding model once, warms it up, and
//! only then starts accepting requests.

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use embed_server::config::Config;
use embed_server::handlers::{self, AppState};
use embed_server::{OnnxEncoder, EMBEDDING_DIM, MODEL_NAME};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "embed_server=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    info!("🚀 Starting Embedding Server v{}", env!("CARGO_PKG_VERSION"));
    info!("📦 Model: {} ({}D)", MODEL_NAME, EMBEDDING_DIM);
    info!("🔧 Port: {}", config.port);

    if let Err(e) = config.validate_model_files() {
        tracing::error!("❌ Model files missing: {}", e);
        tracing::error!("Please download the model files:");
        tracing::error!("  - Model: {}", config.model_path);
        tracing::error!("  - Tokenizer: {}", config.tokenizer_path);
        tracing::error!("");
        tracing::error!("The ONNX export of {} is available from:", MODEL_NAME);
        tracing::error!("  https://huggingface.co/{}", MODEL_NAME);
        return Err(e);
    }

    // Load the model once; it lives for the rest of the process.
    let encoder = Arc::new(OnnxEncoder::new(&config)?);
    info!("✅ Embedding model initialized");

    // Warm-up before binding. A failure here is fatal rather than a latency
    // spike on the first real request.
    encoder.warmup().await?;

    let state = Arc::new(AppState {
        encoder: encoder.clone(),
    });

    // Build HTTP routes
    let app = Router::new()
        // Liveness probe
        .route("/", get(handlers::health))
        // Embedding endpoint
        .route("/embed", post(handlers::embed))
        // State
        .with_state(state)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = SocketAddr::new(config.host.parse()?, config.port);
    info!("✅ Embedding Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
