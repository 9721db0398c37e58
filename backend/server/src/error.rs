use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dataset::DatasetError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(#[from] DatasetError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::DataUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("{self}");

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
