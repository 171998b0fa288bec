//! Billing service facade.
//!
//! The single outbound interface to the remote order-processing engine.
//! Every call yields a three-way outcome: a [`TransportError`] (remote
//! unreachable, malformed reply), a business-status failure carried inside
//! the [`ServiceResponse`] envelope, or success. The facade performs no
//! retries and no caching.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ResponseErrorMessage;
use types::*;

/// Business status signalling success inside a [`ServiceResponse`].
pub const STATUS_OK: i32 = 200;

/// Service name used in failure logs.
pub const BILLING_SERVICE_NAME: &str = "billing";

/// Response envelope returned by every billing operation.
///
/// Invariant: `status == STATUS_OK` carries a non-empty `item` for read and
/// create operations; any other status carries a `message` and `item` must
/// not be trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    pub status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ResponseErrorMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    /// Rotated customer session token, present on operations that mint or
    /// refresh it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
}

impl<T> ServiceResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn ok(item: T) -> Self {
        Self {
            status: STATUS_OK,
            message: None,
            item: Some(item),
            cookie: None,
        }
    }

    pub fn failed(status: i32, message: ResponseErrorMessage) -> Self {
        Self {
            status,
            message: Some(message),
            item: None,
            cookie: None,
        }
    }
}

/// Transport-level failure: the call never produced a business answer.
/// These are logged server-side and never forwarded to the client.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("billing request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("billing service unavailable: {0}")]
    Unavailable(String),
}

/// One method per remote billing operation. Implementations must not retry;
/// cancellation follows the caller's future being dropped.
#[async_trait]
pub trait BillingService: Send + Sync {
    async fn order_create_process(
        &self,
        req: &OrderCreateRequest,
    ) -> Result<ServiceResponse<Order>, TransportError>;

    async fn is_order_can_be_paying(
        &self,
        req: &IsOrderCanBePayingRequest,
    ) -> Result<ServiceResponse<Order>, TransportError>;

    async fn order_recreate_process(
        &self,
        req: &OrderRecreateRequest,
    ) -> Result<ServiceResponse<Order>, TransportError>;

    async fn payment_form_json_data(
        &self,
        req: &PaymentFormDataRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn check_project_request_signature(
        &self,
        req: &CheckSignatureRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn payment_form_language_changed(
        &self,
        req: &ChangeLangRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn payment_form_payment_account_changed(
        &self,
        req: &ChangeCustomerRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn payment_form_platform_changed(
        &self,
        req: &ChangePlatformRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn process_billing_address(
        &self,
        req: &ProcessBillingAddressRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn set_user_notify_sales(
        &self,
        req: &SetUserNotifyRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn set_user_notify_new_region(
        &self,
        req: &SetUserNotifyRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn order_receipt(
        &self,
        req: &OrderReceiptRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn order_create_by_paylink(
        &self,
        req: &OrderCreateByPaylinkRequest,
    ) -> Result<ServiceResponse<Order>, TransportError>;

    async fn incr_paylink_visits(
        &self,
        req: &PaylinkRequestById,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn payment_create_process(
        &self,
        req: &PaymentCreateRequest,
    ) -> Result<ServiceResponse<PaymentCreateResult>, TransportError>;

    async fn delete_saved_card(
        &self,
        req: &DeleteSavedCardRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;

    async fn get_countries_list_for_order(
        &self,
        req: &GetCountriesForOrderRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError>;
}

/// Log a failed facade call with enough context to reproduce it. The
/// original cause stays server-side; the caller responds with a generic
/// internal error.
pub fn log_failed_call<R: std::fmt::Debug>(
    err: &TransportError,
    service: &str,
    method: &str,
    req: &R,
) {
    tracing::error!(
        service = service,
        method = method,
        error = %err,
        request = ?req,
        "billing service call failed"
    );
}

/// Configuration for [`HttpBillingClient`].
#[derive(Debug, Clone)]
pub struct BillingClientConfig {
    /// Base URL of the billing service RPC endpoint.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for BillingClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:50051".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// JSON-over-HTTP implementation of the facade. Each operation posts its
/// request to `<endpoint>/<Method>` and decodes the envelope.
#[derive(Debug, Clone)]
pub struct HttpBillingClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpBillingClient {
    pub fn new(config: BillingClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn call<Req, T>(
        &self,
        method: &str,
        req: &Req,
    ) -> Result<ServiceResponse<T>, TransportError>
    where
        Req: Serialize + Sync,
        T: DeserializeOwned + Default,
    {
        let url = format!("{}/{}", self.endpoint, method);
        let response = self.http.post(&url).json(req).send().await?;
        let envelope = response.json::<ServiceResponse<T>>().await?;
        Ok(envelope)
    }
}

#[async_trait]
impl BillingService for HttpBillingClient {
    async fn order_create_process(
        &self,
        req: &OrderCreateRequest,
    ) -> Result<ServiceResponse<Order>, TransportError> {
        self.call("OrderCreateProcess", req).await
    }

    async fn is_order_can_be_paying(
        &self,
        req: &IsOrderCanBePayingRequest,
    ) -> Result<ServiceResponse<Order>, TransportError> {
        self.call("IsOrderCanBePaying", req).await
    }

    async fn order_recreate_process(
        &self,
        req: &OrderRecreateRequest,
    ) -> Result<ServiceResponse<Order>, TransportError> {
        self.call("OrderReCreateProcess", req).await
    }

    async fn payment_form_json_data(
        &self,
        req: &PaymentFormDataRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("PaymentFormJsonDataProcess", req).await
    }

    async fn check_project_request_signature(
        &self,
        req: &CheckSignatureRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("CheckProjectRequestSignature", req).await
    }

    async fn payment_form_language_changed(
        &self,
        req: &ChangeLangRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("PaymentFormLanguageChanged", req).await
    }

    async fn payment_form_payment_account_changed(
        &self,
        req: &ChangeCustomerRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("PaymentFormPaymentAccountChanged", req).await
    }

    async fn payment_form_platform_changed(
        &self,
        req: &ChangePlatformRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("PaymentFormPlatformChanged", req).await
    }

    async fn process_billing_address(
        &self,
        req: &ProcessBillingAddressRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("ProcessBillingAddress", req).await
    }

    async fn set_user_notify_sales(
        &self,
        req: &SetUserNotifyRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("SetUserNotifySales", req).await
    }

    async fn set_user_notify_new_region(
        &self,
        req: &SetUserNotifyRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("SetUserNotifyNewRegion", req).await
    }

    async fn order_receipt(
        &self,
        req: &OrderReceiptRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("OrderReceipt", req).await
    }

    async fn order_create_by_paylink(
        &self,
        req: &OrderCreateByPaylinkRequest,
    ) -> Result<ServiceResponse<Order>, TransportError> {
        self.call("OrderCreateByPaylink", req).await
    }

    async fn incr_paylink_visits(
        &self,
        req: &PaylinkRequestById,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("IncrPaylinkVisits", req).await
    }

    async fn payment_create_process(
        &self,
        req: &PaymentCreateRequest,
    ) -> Result<ServiceResponse<PaymentCreateResult>, TransportError> {
        self.call("PaymentCreateProcess", req).await
    }

    async fn delete_saved_card(
        &self,
        req: &DeleteSavedCardRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("DeleteSavedCard", req).await
    }

    async fn get_countries_list_for_order(
        &self,
        req: &GetCountriesForOrderRequest,
    ) -> Result<ServiceResponse<serde_json::Value>, TransportError> {
        self.call("GetCountriesListForOrder", req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_decodes_with_item() {
        let raw = r#"{"status":200,"item":{"uuid":"a","amount":9.99}}"#;
        let rsp: ServiceResponse<Order> = serde_json::from_str(raw).unwrap();
        assert!(rsp.is_ok());
        assert_eq!(rsp.item.unwrap().uuid, "a");
        assert!(rsp.message.is_none());
    }

    #[test]
    fn failed_envelope_decodes_with_message() {
        let raw = r#"{"status":400,"message":{"code":"fm000001","message":"bad order"}}"#;
        let rsp: ServiceResponse<Order> = serde_json::from_str(raw).unwrap();
        assert!(!rsp.is_ok());
        assert!(rsp.item.is_none());
        assert_eq!(rsp.message.unwrap().code, "fm000001");
    }

    #[test]
    fn envelope_carries_rotated_cookie() {
        let raw = r#"{"status":200,"item":{},"cookie":"tok"}"#;
        let rsp: ServiceResponse<serde_json::Value> = serde_json::from_str(raw).unwrap();
        assert_eq!(rsp.cookie.as_deref(), Some("tok"));
    }
}
