//! Payment submission.
//!
//! The field set of a payment submission depends on the chosen payment
//! method, so the payload is bound with the flexible key/value binder and
//! forwarded to the billing service as a string map.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use gateway_core::billing::types::PaymentCreateRequest;
use gateway_core::error::{ApiError, ResponseErrorMessage};
use gateway_core::middleware::raw_body::RawBody;
use gateway_core::request::{client_ip, header_value, HEADER_ACCEPT_LANGUAGE, HEADER_USER_AGENT};

use crate::startup::AppState;

use super::{failed_call, require_item};

#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    /// The redirection URL.
    pub redirect_url: String,
    /// True when the client must follow the redirect to finish the payment.
    pub need_redirect: bool,
}

pub async fn create_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> Result<Json<RedirectResponse>, ApiError> {
    let data = gateway_core::binder::bind_payment_data(&body)
        .map_err(|_| ApiError::bad_request(ResponseErrorMessage::request_data_invalid()))?;

    let req = PaymentCreateRequest {
        data,
        accept_language: header_value(&headers, HEADER_ACCEPT_LANGUAGE),
        user_agent: header_value(&headers, HEADER_USER_AGENT),
        ip: client_ip(&headers),
    };

    let rsp = state
        .billing
        .payment_create_process(&req)
        .await
        .map_err(|err| failed_call(&err, "PaymentCreateProcess", &req))?;

    let result = require_item(rsp, "PaymentCreateProcess")?;

    Ok(Json(RedirectResponse {
        redirect_url: result.redirect_url,
        need_redirect: result.need_redirect,
    }))
}
