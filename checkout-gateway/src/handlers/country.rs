//! Available payment countries for an order.

use axum::{
    extract::{Path, State},
    Json,
};

use gateway_core::billing::types::GetCountriesForOrderRequest;
use gateway_core::error::ApiError;

use crate::startup::AppState;

use super::{failed_call, require_item, validate_request};

pub async fn get_payment_countries(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = GetCountriesForOrderRequest { order_id };
    validate_request(&state, &req)?;

    let rsp = state
        .billing
        .get_countries_list_for_order(&req)
        .await
        .map_err(|err| failed_call(&err, "GetCountriesListForOrder", &req))?;

    Ok(Json(require_item(rsp, "GetCountriesListForOrder")?))
}
