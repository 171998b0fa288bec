//! HTTP handlers and the helpers they all share.

pub mod country;
pub mod order;
pub mod payment;
pub mod recurring;

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::Validate;

use gateway_core::billing::types::CheckSignatureRequest;
use gateway_core::billing::{log_failed_call, TransportError, BILLING_SERVICE_NAME};
use gateway_core::error::{ApiError, ResponseErrorMessage};
use gateway_core::request::{CUSTOMER_TOKEN_COOKIE, HEADER_X_API_SIGNATURE};

use crate::startup::AppState;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "checkout-gateway",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Default bind + validate pipeline used by handlers without a specialized
/// binder: decode the captured body, then run the declarative constraints
/// and translate the first failure.
pub(crate) fn bind_and_validate<T>(state: &AppState, body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let req: T = gateway_core::binder::bind_json(body)
        .map_err(|_| ApiError::bad_request(ResponseErrorMessage::request_params_incorrect()))?;
    validate_request(state, &req)?;
    Ok(req)
}

pub(crate) fn validate_request<T: Validate>(state: &AppState, req: &T) -> Result<(), ApiError> {
    req.validate()
        .map_err(|errors| ApiError::bad_request(state.validation.translate(&errors)))
}

/// Uniform handling of a facade transport failure: log service, method and
/// payload server-side, answer with the generic internal error.
pub(crate) fn failed_call<R: std::fmt::Debug>(
    err: &TransportError,
    method: &str,
    req: &R,
) -> ApiError {
    log_failed_call(err, BILLING_SERVICE_NAME, method, req);
    ApiError::internal()
}

/// Business-status check plus the OK-implies-payload invariant. A backend
/// that reports OK without an item is broken and becomes a 500.
pub(crate) fn require_item<T>(
    rsp: gateway_core::billing::ServiceResponse<T>,
    method: &str,
) -> Result<T, ApiError> {
    if !rsp.is_ok() {
        return Err(ApiError::from_business(rsp.status, rsp.message));
    }
    rsp.item.ok_or_else(|| {
        tracing::error!(method = method, "billing reported OK without a payload");
        ApiError::internal()
    })
}

/// Signature gate for partner requests carrying a user object. The raw body
/// bytes, not a re-encoding, are what the billing service signs against.
pub(crate) async fn check_project_signature(
    state: &AppState,
    headers: &HeaderMap,
    raw_body: &[u8],
    project_id: &str,
) -> Result<(), ApiError> {
    let signature = gateway_core::request::header_value(headers, HEADER_X_API_SIGNATURE);

    if signature.is_empty() {
        return Err(ApiError::bad_request(
            ResponseErrorMessage::signature_header_empty(),
        ));
    }

    let req = CheckSignatureRequest {
        body: String::from_utf8_lossy(raw_body).into_owned(),
        project_id: project_id.to_string(),
        signature,
    };

    let rsp = state
        .billing
        .check_project_request_signature(&req)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "signature check call failed");
            ApiError::unknown()
        })?;

    if !rsp.is_ok() {
        return Err(ApiError::from_business(rsp.status, rsp.message));
    }

    Ok(())
}

pub(crate) fn session_token(jar: &CookieJar) -> String {
    jar.get(CUSTOMER_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_default()
}

/// Session cookie with the configured domain and lifetime. The token value
/// is opaque; the gateway only transports it.
pub(crate) fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    Cookie::build((CUSTOMER_TOKEN_COOKIE, value))
        .domain(state.config.cookie_domain.clone())
        .path("/")
        .max_age(time::Duration::seconds(
            state.config.customer_token_cookie_lifetime,
        ))
        .http_only(true)
        .same_site(SameSite::None)
        .build()
}
