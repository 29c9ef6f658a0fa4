use axum::{extract::State, Json};
use std::sync::Arc;

use crate::inventory::Inventory;
use crate::AppState;

use super::ApiError;

/// Every configured unit list
pub async fn get_inventory(State(state): State<Arc<AppState>>) -> Result<Json<Inventory>, ApiError> {
    let cfg = state.store.load_config()?;
    Ok(Json(Inventory::from_config(&cfg)?))
}
