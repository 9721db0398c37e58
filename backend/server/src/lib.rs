//! Documentation of the farm map backend.
//!
//! Serves the farmer/farm dataset to the map front end as JSON.
//!
//!
//!
//! # General Infrastructure
//! - Dataset is a single CSV object in an S3 bucket, uploaded by hand
//! - Server reads it with S3 `GetObject`, signed with credentials from the AWS chain
//! - Front end is a static site on another origin, so CORS allows any origin
//! - All routes are read-only `GET`s
//!
//!
//!
//! # Routes
//!
//! | Route | Response |
//! |---|---|
//! | `/farmers` | one record per farmer, first farm's details |
//! | `/farms` | one record per farm with decoded coordinates and boundary polygon |
//! | `/farmers/count` | `totalFarmers` plus certification counts |
//!
//! Any failure fetching or parsing the dataset is a `500` with `{"error": ...}`.
//! Partial data is never returned.
//!
//!
//!
//! # Notes
//!
//! ## Reloading
//! Every request fetches and parses the whole object again. The file is small and
//! traffic is light, and an upload shows up on the next request without a restart.
//! `DATASET_CACHE=none` is the only accepted cache setting so this stays a
//! visible choice.
//!
//! ## Identifiers
//! Farmer and farm ids are derived from row order, see [`dataset`]. Reordering the
//! CSV renumbers them.
//!
//!
//!
//! # Configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `RUST_PORT` | `8080` |
//! | `OBJECT_STORE_ENDPOINT` | unset (AWS S3), set for S3-compatible stores |
//! | `DATASET_BUCKET` | `chakus3bucket` |
//! | `DATASET_KEY` | `MVP/MVP_Dataframe.csv` |
//! | `FETCH_TIMEOUT_SECS` | `15` |
//! | `DATASET_CACHE` | `none` |
//! | `RUST_LOG` | `info` |
//!
//! Credentials and region come from the usual AWS sources: `AWS_ACCESS_KEY_ID` /
//! `AWS_SECRET_ACCESS_KEY`, `AWS_REGION`, `~/.aws` profiles or instance roles.
//! Region falls back to `us-east-1`. A custom endpoint uses path-style addressing.
//!
//!
//!
//! # Setup
//!
//! Run locally.
//! ```sh
//! RUST_LOG=debug cargo run --bin farm-map
//! ```
//!
//! Query.
//! ```sh
//! curl localhost:8080/farmers/count
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::{Context, Error};
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};

use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use routes::{farmer_count_handler, farmers_handler, farms_handler};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/farmers", get(farmers_handler))
        .route("/farmers/count", get(farmer_count_handler))
        .route("/farms", get(farms_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<(), Error> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Initializing state...");
    let state = AppState::new(Config::load()?).await?;

    info!(
        "Serving s3://{}/{} from {}",
        state.location.bucket,
        state.location.key,
        state.config.object_store_endpoint.as_deref().unwrap_or("AWS S3")
    );

    info!("Starting server...");
    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
