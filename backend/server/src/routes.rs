use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::{debug, info};

use crate::{
    error::AppError,
    models::{FarmRecord, FarmerCount, FarmerRecord},
    state::AppState,
    utils::{farm_records, farmer_count, farmer_records},
};

pub async fn farmers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FarmerRecord>>, AppError> {
    let dataset = state.load_dataset().await?;
    let farmers = farmer_records(&dataset);

    info!("Returning {} farmers", farmers.len());

    Ok(Json(farmers))
}

pub async fn farms_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FarmRecord>>, AppError> {
    let dataset = state.load_dataset().await?;
    let farms = farm_records(&dataset);

    info!("Returning {} farms with coordinates", farms.len());
    debug!("Sample farm data: {:?}", farms.first());

    Ok(Json(farms))
}

pub async fn farmer_count_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FarmerCount>, AppError> {
    let dataset = state.load_dataset().await?;

    Ok(Json(farmer_count(&dataset)))
}
