//! Order orchestration: creation/reuse, payment form data, order-bound
//! preference changes and the paylink redirect flow.

use std::collections::HashMap;

use axum::{
    extract::{Path, RawQuery, State},
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use url::Url;

use gateway_core::billing::types::{
    ChangeCustomerRequest, ChangeLangRequest, ChangePlatformRequest, IsOrderCanBePayingRequest,
    Order, OrderCreateByPaylinkRequest, OrderRecreateRequest, OrderReceiptRequest,
    PaylinkRequestById, PaymentFormDataRequest, ProcessBillingAddressRequest, SetUserNotifyRequest,
};
use gateway_core::error::{ApiError, ResponseErrorMessage};
use gateway_core::middleware::raw_body::RawBody;
use gateway_core::request::{
    client_ip, header_value, HEADER_ACCEPT_LANGUAGE, HEADER_REFERER, HEADER_USER_AGENT,
    QUERY_UTM_CAMPAIGN, QUERY_UTM_MEDIUM, QUERY_UTM_SOURCE,
};

use crate::startup::AppState;

use super::{
    bind_and_validate, check_project_signature, failed_call, require_item, session_cookie,
    session_token, validate_request,
};

/// Browser-facing error page for the paylink flow; that endpoint is
/// navigated, not consumed as an API.
const ERROR_PAGE: &str = "<!DOCTYPE html>\
<html><head><title>Payment error</title></head>\
<body><h1>Something went wrong</h1>\
<p>The payment cannot be processed right now. Please try the link again later.</p>\
</body></html>";

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    /// The unique identifier for the order.
    pub id: String,
    /// The URL of the hosted payment form.
    pub payment_form_url: String,
}

fn payment_form_url(state: &AppState, order_uuid: &str) -> String {
    format!("{}{}", state.config.order_inline_form_url_mask, order_uuid)
}

/// Create a payment order, or reuse a prepared one.
///
/// A payload carrying a non-empty `psp_order_uuid` asks for reuse: the
/// order is fetched and checked for payability instead of being created.
/// A payload carrying a `user` object is a signed partner request and must
/// pass the signature gate before anything else happens.
pub async fn create_order(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let mut req = gateway_core::binder::bind_order_create(&body)
        .map_err(|_| ApiError::bad_request(ResponseErrorMessage::request_params_incorrect()))?;

    req.cookie = session_token(&jar);

    validate_request(&state, &req)?;

    if req.user.is_some() {
        check_project_signature(&state, &headers, &body, &req.project_id).await?;
    }

    req.issuer_url = header_value(&headers, HEADER_REFERER);

    let order = if !req.psp_order_uuid.is_empty() {
        let check = IsOrderCanBePayingRequest {
            order_id: req.psp_order_uuid.clone(),
            project_id: req.project_id.clone(),
        };
        let rsp = state
            .billing
            .is_order_can_be_paying(&check)
            .await
            .map_err(|err| failed_call(&err, "IsOrderCanBePaying", &check))?;
        require_item(rsp, "IsOrderCanBePaying")?
    } else {
        let rsp = state
            .billing
            .order_create_process(&req)
            .await
            .map_err(|err| failed_call(&err, "OrderCreateProcess", &req))?;
        require_item(rsp, "OrderCreateProcess")?
    };

    Ok(Json(CreateOrderResponse {
        payment_form_url: payment_form_url(&state, &order.uuid),
        id: order.uuid,
    }))
}

/// Fetch the data needed to render the payment form. Rotates the customer
/// session cookie on success.
pub async fn get_payment_form_data(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let req = PaymentFormDataRequest {
        order_id,
        locale: header_value(&headers, HEADER_ACCEPT_LANGUAGE),
        ip: client_ip(&headers),
        referer: header_value(&headers, HEADER_REFERER),
        cookie: session_token(&jar),
    };

    validate_request(&state, &req)?;

    let rsp = state
        .billing
        .payment_form_json_data(&req)
        .await
        .map_err(|err| failed_call(&err, "PaymentFormJsonDataProcess", &req))?;

    let cookie = rsp.cookie.clone();
    let item = require_item(rsp, "PaymentFormJsonDataProcess")?;

    let jar = match cookie.filter(|c| !c.is_empty()) {
        Some(token) => jar.add(session_cookie(&state, token)),
        None => jar,
    };

    Ok((jar, Json(item)).into_response())
}

/// Recreate an order from an existing order id. Repeating the call against
/// an unchanged backend yields the same order.
pub async fn recreate_order(
    State(state): State<AppState>,
    RawBody(body): RawBody,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let req: OrderRecreateRequest = bind_and_validate(&state, &body)?;

    let rsp = state
        .billing
        .order_recreate_process(&req)
        .await
        .map_err(|err| failed_call(&err, "OrderReCreateProcess", &req))?;

    let order: Order = require_item(rsp, "OrderReCreateProcess")?;

    Ok(Json(CreateOrderResponse {
        payment_form_url: payment_form_url(&state, &order.uuid),
        id: order.uuid,
    }))
}

pub async fn change_language(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut req: ChangeLangRequest = bind_json_only(&body)?;
    req.order_id = order_id;
    req.accept_language = header_value(&headers, HEADER_ACCEPT_LANGUAGE);
    req.user_agent = header_value(&headers, HEADER_USER_AGENT);
    req.ip = client_ip(&headers);
    validate_request(&state, &req)?;

    let rsp = state
        .billing
        .payment_form_language_changed(&req)
        .await
        .map_err(|err| failed_call(&err, "PaymentFormLanguageChanged", &req))?;

    Ok(Json(require_item(rsp, "PaymentFormLanguageChanged")?))
}

pub async fn change_customer(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut req: ChangeCustomerRequest = bind_json_only(&body)?;
    req.order_id = order_id;
    req.accept_language = header_value(&headers, HEADER_ACCEPT_LANGUAGE);
    req.user_agent = header_value(&headers, HEADER_USER_AGENT);
    req.ip = client_ip(&headers);
    validate_request(&state, &req)?;

    let rsp = state
        .billing
        .payment_form_payment_account_changed(&req)
        .await
        .map_err(|err| failed_call(&err, "PaymentFormPaymentAccountChanged", &req))?;

    Ok(Json(require_item(rsp, "PaymentFormPaymentAccountChanged")?))
}

pub async fn change_platform(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    RawBody(body): RawBody,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut req: ChangePlatformRequest = bind_json_only(&body)?;
    req.order_id = order_id;
    validate_request(&state, &req)?;

    let rsp = state
        .billing
        .payment_form_platform_changed(&req)
        .await
        .map_err(|err| failed_call(&err, "PaymentFormPlatformChanged", &req))?;

    Ok(Json(require_item(rsp, "PaymentFormPlatformChanged")?))
}

/// Process the customer's billing address. Rotates the session cookie.
pub async fn process_billing_address(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    jar: CookieJar,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> Result<Response, ApiError> {
    let mut req: ProcessBillingAddressRequest = bind_json_only(&body)?;
    req.order_id = order_id;
    req.cookie = session_token(&jar);
    req.ip = client_ip(&headers);
    validate_request(&state, &req)?;

    let rsp = state
        .billing
        .process_billing_address(&req)
        .await
        .map_err(|err| failed_call(&err, "ProcessBillingAddress", &req))?;

    let cookie = rsp.cookie.clone();
    let item = require_item(rsp, "ProcessBillingAddress")?;

    let jar = match cookie.filter(|c| !c.is_empty()) {
        Some(token) => jar.add(session_cookie(&state, token)),
        None => jar,
    };

    Ok((jar, Json(item)).into_response())
}

pub async fn notify_sale(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    RawBody(body): RawBody,
) -> Result<StatusCode, ApiError> {
    let mut req: SetUserNotifyRequest = bind_json_only(&body)?;
    req.order_id = order_id;
    validate_request(&state, &req)?;

    state
        .billing
        .set_user_notify_sales(&req)
        .await
        .map_err(|err| failed_call(&err, "SetUserNotifySales", &req))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn notify_new_region(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    RawBody(body): RawBody,
) -> Result<StatusCode, ApiError> {
    let mut req: SetUserNotifyRequest = bind_json_only(&body)?;
    req.order_id = order_id;
    validate_request(&state, &req)?;

    state
        .billing
        .set_user_notify_new_region(&req)
        .await
        .map_err(|err| failed_call(&err, "SetUserNotifyNewRegion", &req))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_receipt(
    State(state): State<AppState>,
    Path((receipt_id, order_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = OrderReceiptRequest {
        receipt_id,
        order_id,
    };
    validate_request(&state, &req)?;

    let rsp = state
        .billing
        .order_receipt(&req)
        .await
        .map_err(|err| failed_call(&err, "OrderReceipt", &req))?;

    Ok(Json(require_item(rsp, "OrderReceipt")?))
}

/// Resolve a paylink into a fresh order and redirect the visitor to the
/// payment form.
///
/// The visit counter is incremented on a detached task with its own
/// lifetime: the redirect below must not abandon the call, and a counting
/// failure is logged but never changes the visible outcome.
pub async fn get_order_for_paylink(
    State(state): State<AppState>,
    Path(paylink_id): Path<String>,
    RawQuery(query): RawQuery,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    {
        let billing = state.billing.clone();
        let visit = PaylinkRequestById {
            id: paylink_id.clone(),
        };
        tokio::spawn(async move {
            if let Err(err) = billing.incr_paylink_visits(&visit).await {
                gateway_core::billing::log_failed_call(
                    &err,
                    gateway_core::billing::BILLING_SERVICE_NAME,
                    "IncrPaylinkVisits",
                    &visit,
                );
            }
        });
    }

    let query = query.unwrap_or_default();
    let params: HashMap<String, String> =
        serde_urlencoded::from_str(&query).unwrap_or_default();
    let utm = |name: &str| params.get(name).cloned().unwrap_or_default();

    let req = OrderCreateByPaylinkRequest {
        paylink_id,
        payer_ip: client_ip(&headers),
        issuer_url: header_value(&headers, HEADER_REFERER),
        utm_source: utm(QUERY_UTM_SOURCE),
        utm_medium: utm(QUERY_UTM_MEDIUM),
        utm_campaign: utm(QUERY_UTM_CAMPAIGN),
        is_embedded: false,
        cookie: session_token(&jar),
    };

    let rsp = match state.billing.order_create_by_paylink(&req).await {
        Ok(rsp) => rsp,
        Err(err) => {
            gateway_core::billing::log_failed_call(
                &err,
                gateway_core::billing::BILLING_SERVICE_NAME,
                "OrderCreateByPaylink",
                &req,
            );
            return (StatusCode::BAD_REQUEST, Html(ERROR_PAGE)).into_response();
        }
    };

    let order = match require_item(rsp, "OrderCreateByPaylink") {
        Ok(order) => order,
        Err(err) => return err.into_response(),
    };

    let mut raw_url = payment_form_url(&state, &order.uuid);
    if !query.is_empty() {
        raw_url.push('?');
        raw_url.push_str(&query);
    }

    let location = match Url::parse(&raw_url) {
        Ok(url) => url,
        Err(err) => {
            tracing::error!(error = %err, url = %raw_url, "payment form redirect url is invalid");
            return ApiError::unknown().into_response();
        }
    };

    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// Decode without validating; used when handler-populated fields (path id,
/// headers) must be attached before the constraints run.
fn bind_json_only<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    gateway_core::binder::bind_json(body)
        .map_err(|_| ApiError::bad_request(ResponseErrorMessage::request_params_incorrect()))
}
