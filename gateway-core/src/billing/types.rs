//! Request and response payloads exchanged with the billing service.
//!
//! Handler-populated fields (cookie, issuer url, client ip, raw body) are
//! never taken from the inbound JSON; they are set explicitly by the
//! handler after binding and before the facade call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use validator::{ValidationError, ValidationErrors};

use crate::validation::{
    is_us_zip, validate_object_id, validate_uuid, validate_uuid_or_empty, ZIP_USA_TAG,
};

/// Backend-owned order record. Only the fields the gateway actually reads
/// are typed; the rest of the payload stays with the billing service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    pub uuid: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrderUser {
    #[validate(length(min = 1))]
    pub external_id: String,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrderCreateRequest {
    #[validate(custom(function = "validate_object_id"))]
    pub project_id: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    /// Merchant-side order identifier, free-form.
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Prepared-order identifier. Non-empty means "reuse this order instead
    /// of creating a new one".
    #[serde(default)]
    #[validate(custom(function = "validate_uuid_or_empty"))]
    pub psp_order_uuid: String,
    /// Signed partner requests carry a user object; its presence triggers
    /// the signature gate.
    #[serde(default)]
    #[validate(nested)]
    pub user: Option<OrderUser>,
    #[serde(default)]
    pub url_success: Option<String>,
    #[serde(default)]
    pub url_fail: Option<String>,
    #[serde(default)]
    pub r#type: Option<String>,

    // Populated by the handler, never bound from the inbound JSON.
    #[serde(skip_deserializing)]
    pub cookie: String,
    #[serde(skip_deserializing)]
    pub issuer_url: String,
    #[serde(skip_deserializing)]
    pub raw_body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IsOrderCanBePayingRequest {
    #[validate(custom(function = "validate_uuid"))]
    pub order_id: String,
    #[validate(custom(function = "validate_object_id"))]
    pub project_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrderRecreateRequest {
    #[validate(custom(function = "validate_uuid"))]
    pub order_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PaymentFormDataRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_uuid"))]
    pub order_id: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub referer: String,
    #[serde(default)]
    pub cookie: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSignatureRequest {
    pub body: String,
    pub project_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ChangeLangRequest {
    #[serde(skip_deserializing)]
    #[validate(custom(function = "validate_uuid"))]
    pub order_id: String,
    #[validate(length(equal = 2))]
    pub lang: String,
    #[serde(skip_deserializing)]
    pub accept_language: String,
    #[serde(skip_deserializing)]
    pub user_agent: String,
    #[serde(skip_deserializing)]
    pub ip: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ChangeCustomerRequest {
    #[serde(skip_deserializing)]
    #[validate(custom(function = "validate_uuid"))]
    pub order_id: String,
    #[validate(custom(function = "validate_object_id"))]
    pub method_id: String,
    #[validate(length(min = 1))]
    pub account: String,
    #[serde(skip_deserializing)]
    pub accept_language: String,
    #[serde(skip_deserializing)]
    pub user_agent: String,
    #[serde(skip_deserializing)]
    pub ip: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ChangePlatformRequest {
    #[serde(skip_deserializing)]
    #[validate(custom(function = "validate_uuid"))]
    pub order_id: String,
    #[validate(length(min = 1))]
    pub platform: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessBillingAddressRequest {
    #[serde(skip_deserializing)]
    pub order_id: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip: String,
    #[serde(skip_deserializing)]
    pub cookie: String,
    #[serde(skip_deserializing)]
    pub ip: String,
}

// The ZIP constraint depends on the country field, which the derive cannot
// express, so this request validates by hand.
impl Validate for ProcessBillingAddressRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if validate_uuid(&self.order_id).is_err() {
            errors.add("order_id", ValidationError::new("uuid"));
        }

        if self.country.len() != 2 || !self.country.bytes().all(|b| b.is_ascii_alphabetic()) {
            errors.add("country", ValidationError::new("len"));
        }

        if self.country.eq_ignore_ascii_case("US") && !is_us_zip(&self.zip) {
            errors.add("zip", ValidationError::new(ZIP_USA_TAG));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SetUserNotifyRequest {
    #[serde(skip_deserializing)]
    #[validate(custom(function = "validate_uuid"))]
    pub order_id: String,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub enable_notification: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrderReceiptRequest {
    #[validate(custom(function = "validate_uuid"))]
    pub receipt_id: String,
    #[validate(custom(function = "validate_uuid"))]
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaylinkRequestById {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderCreateByPaylinkRequest {
    pub paylink_id: String,
    pub payer_ip: String,
    pub issuer_url: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub is_embedded: bool,
    pub cookie: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentCreateRequest {
    pub data: HashMap<String, String>,
    pub accept_language: String,
    pub user_agent: String,
    pub ip: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentCreateResult {
    pub redirect_url: String,
    pub need_redirect: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DeleteSavedCardRequest {
    #[validate(length(min = 1))]
    pub id: String,
    #[serde(skip_deserializing)]
    pub cookie: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct GetCountriesForOrderRequest {
    #[validate(custom(function = "validate_uuid"))]
    pub order_id: String,
}
