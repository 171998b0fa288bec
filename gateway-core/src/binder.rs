//! Content binders: explicit per-route decoding strategies.
//!
//! Each handler picks its binder at the call site instead of relying on a
//! framework-wide body extractor, because the decode rules differ per route:
//! the order-create route must keep the byte-identical body for signature
//! verification, and the payment route accepts a payment-method-dependent
//! field set that cannot be statically typed.

use std::collections::HashMap;

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::billing::types::OrderCreateRequest;

#[derive(Debug, Error)]
pub enum BindError {
    #[error("request body is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request body is not a json object")]
    NotAnObject,
}

/// Default binder: structural JSON decode of the captured body.
pub fn bind_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, BindError> {
    Ok(serde_json::from_slice(body)?)
}

/// Raw-preserving binder for order creation. Decodes the payload and keeps
/// the exact original bytes in `raw_body`, so the billing service verifies
/// the signature against what the partner actually sent, not a re-encoding.
pub fn bind_order_create(body: &Bytes) -> Result<OrderCreateRequest, BindError> {
    let mut req: OrderCreateRequest = serde_json::from_slice(body)?;
    req.raw_body = String::from_utf8_lossy(body).into_owned();
    Ok(req)
}

/// Flexible key/value binder for payment submissions. Coerces every value
/// of a JSON object to a string: booleans become "1"/"0", strings are kept
/// as-is, everything else goes through the generic JSON formatter.
pub fn bind_payment_data(body: &[u8]) -> Result<HashMap<String, String>, BindError> {
    let untyped: Value = serde_json::from_slice(body)?;
    let object = match untyped {
        Value::Object(map) => map,
        _ => return Err(BindError::NotAnObject),
    };

    let mut data = HashMap::with_capacity(object.len());
    for (key, value) in object {
        data.insert(key, coerce_value(&value));
    }

    Ok(data)
}

fn coerce_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
