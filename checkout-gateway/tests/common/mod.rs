use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use checkout_gateway::config::{BillingConfig, Config, ServerConfig};
use checkout_gateway::startup::Application;
use gateway_core::billing::types::*;
use gateway_core::billing::{BillingService, ServiceResponse, TransportError};
use gateway_core::error::ResponseErrorMessage;

pub const FORM_URL_MASK: &str = "https://checkout.example.com/pay/order/";

/// Scripted outcome for one billing method.
#[allow(dead_code)]
pub enum MockOutcome {
    /// Transport-level failure; the handler must answer with a generic
    /// internal error.
    Transport,
    /// Business-status failure; status and message pass through verbatim.
    Business(i32, ResponseErrorMessage),
    /// Success with the given item payload.
    Ok(Value),
    /// Success with an item and a rotated session cookie.
    OkWithCookie(Value, String),
    /// Panic inside the call, for exercising panic containment.
    Panic,
}

/// Billing facade double. Methods without a scripted outcome answer OK
/// with no payload, which the handlers treat as a broken backend.
#[derive(Default)]
pub struct MockBilling {
    outcomes: Mutex<HashMap<&'static str, MockOutcome>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockBilling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, method: &'static str, outcome: MockOutcome) {
        self.outcomes.lock().unwrap().insert(method, outcome);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn respond<T: DeserializeOwned>(
        &self,
        method: &'static str,
    ) -> Result<ServiceResponse<T>, TransportError> {
        self.calls.lock().unwrap().push(method.to_string());

        match self.outcomes.lock().unwrap().get(method) {
            None => Ok(ServiceResponse {
                status: 200,
                message: None,
                item: None,
                cookie: None,
            }),
            Some(MockOutcome::Transport) => Err(TransportError::Unavailable(format!(
                "{method} forced to fail"
            ))),
            Some(MockOutcome::Business(status, message)) => {
                Ok(ServiceResponse::failed(*status, message.clone()))
            }
            Some(MockOutcome::Ok(item)) => Ok(ServiceResponse::ok(
                serde_json::from_value(item.clone()).expect("mock item does not fit payload type"),
            )),
            Some(MockOutcome::OkWithCookie(item, cookie)) => {
                let mut rsp = ServiceResponse::ok(
                    serde_json::from_value(item.clone())
                        .expect("mock item does not fit payload type"),
                );
                rsp.cookie = Some(cookie.clone());
                Ok(rsp)
            }
            Some(MockOutcome::Panic) => panic!("scripted panic in {method}"),
        }
    }
}

#[async_trait]
impl BillingService for MockBilling {
    async fn order_create_process(
        &self,
        _req: &OrderCreateRequest,
    ) -> Result<ServiceResponse<Order>, TransportError> {
        self.respond("OrderCreateProcess")
    }

    async fn is_order_can_be_paying(
        &self,
        _req: &IsOrderCanBePayingRequest,
    ) -> Result<ServiceResponse<Order>, TransportError> {
        self.respond("IsOrderCanBePaying")
    }

    async fn order_recreate_process(
        &self,
        _req: &OrderRecreateRequest,
    ) -> Result<ServiceResponse<Order>, TransportError> {
        self.respond("OrderReCreateProcess")
    }

    async fn payment_form_json_data(
        &self,
        _req: &PaymentFormDataRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("PaymentFormJsonDataProcess")
    }

    async fn check_project_request_signature(
        &self,
        _req: &CheckSignatureRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("CheckProjectRequestSignature")
    }

    async fn payment_form_language_changed(
        &self,
        _req: &ChangeLangRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("PaymentFormLanguageChanged")
    }

    async fn payment_form_payment_account_changed(
        &self,
        _req: &ChangeCustomerRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("PaymentFormPaymentAccountChanged")
    }

    async fn payment_form_platform_changed(
        &self,
        _req: &ChangePlatformRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("PaymentFormPlatformChanged")
    }

    async fn process_billing_address(
        &self,
        _req: &ProcessBillingAddressRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("ProcessBillingAddress")
    }

    async fn set_user_notify_sales(
        &self,
        _req: &SetUserNotifyRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("SetUserNotifySales")
    }

    async fn set_user_notify_new_region(
        &self,
        _req: &SetUserNotifyRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("SetUserNotifyNewRegion")
    }

    async fn order_receipt(
        &self,
        _req: &OrderReceiptRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("OrderReceipt")
    }

    async fn order_create_by_paylink(
        &self,
        _req: &OrderCreateByPaylinkRequest,
    ) -> Result<ServiceResponse<Order>, TransportError> {
        self.respond("OrderCreateByPaylink")
    }

    async fn incr_paylink_visits(
        &self,
        _req: &PaylinkRequestById,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("IncrPaylinkVisits")
    }

    async fn payment_create_process(
        &self,
        _req: &PaymentCreateRequest,
    ) -> Result<ServiceResponse<PaymentCreateResult>, TransportError> {
        self.respond("PaymentCreateProcess")
    }

    async fn delete_saved_card(
        &self,
        _req: &DeleteSavedCardRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("DeleteSavedCard")
    }

    async fn get_countries_list_for_order(
        &self,
        _req: &GetCountriesForOrderRequest,
    ) -> Result<ServiceResponse<Value>, TransportError> {
        self.respond("GetCountriesListForOrder")
    }
}

pub struct TestApp {
    pub address: String,
    pub billing: Arc<MockBilling>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(MockBilling::new())).await
    }

    pub async fn spawn_with(billing: Arc<MockBilling>) -> Self {
        Self::spawn_with_mask(billing, FORM_URL_MASK).await
    }

    /// Spawn with a custom payment form URL mask; the default mask is a
    /// valid absolute URL, which some redirect tests must not have.
    pub async fn spawn_with_mask(billing: Arc<MockBilling>, mask: &str) -> Self {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            cookie_domain: "example.com".to_string(),
            customer_token_cookie_lifetime: 3600,
            allow_origin: "*".to_string(),
            order_inline_form_url_mask: mask.to_string(),
            billing: BillingConfig {
                endpoint: "http://127.0.0.1:1".to_string(),
                connect_timeout_secs: 1,
                request_timeout_secs: 1,
            },
        };

        let app = Application::build(config, billing.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to come up.
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        TestApp { address, billing }
    }

    /// Client that does not follow redirects, for asserting on 302s.
    pub fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }
}
