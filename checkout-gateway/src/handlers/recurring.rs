//! Saved payment instruments.

use axum::{extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;

use gateway_core::billing::types::DeleteSavedCardRequest;
use gateway_core::error::ApiError;
use gateway_core::middleware::raw_body::RawBody;

use crate::startup::AppState;

use super::{bind_and_validate, failed_call, session_token};

pub async fn remove_saved_card(
    State(state): State<AppState>,
    jar: CookieJar,
    RawBody(body): RawBody,
) -> Result<StatusCode, ApiError> {
    let mut req: DeleteSavedCardRequest = bind_and_validate(&state, &body)?;
    req.cookie = session_token(&jar);

    let rsp = state
        .billing
        .delete_saved_card(&req)
        .await
        .map_err(|err| failed_call(&err, "DeleteSavedCard", &req))?;

    if !rsp.is_ok() {
        return Err(ApiError::from_business(rsp.status, rsp.message));
    }

    Ok(StatusCode::OK)
}
