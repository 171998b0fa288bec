//! Raw request body capture.
//!
//! Reads the body exactly once, stores the bytes as a typed extension and
//! reinstalls a fresh body so any later extractor can still consume it.
//! Binders and the signature check both need the byte-identical payload,
//! which a streamed body cannot provide twice.

use std::convert::Infallible;

use axum::{
    async_trait,
    body::{Body, Bytes},
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use http_body_util::BodyExt;

/// The captured request body. Present on every request that passed through
/// [`raw_body_middleware`]; empty when the body read failed or the request
/// had no body.
#[derive(Debug, Clone, Default)]
pub struct RawBody(pub Bytes);

#[async_trait]
impl<S> FromRequestParts<S> for RawBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<RawBody>().cloned().unwrap_or_default())
    }
}

/// Must be installed before any route that binds a body. A failed read does
/// not abort the request: downstream binding sees an empty body and fails
/// with the ordinary 400.
pub async fn raw_body_middleware(req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();

    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read request body");
            Bytes::new()
        }
    };

    let mut req = Request::from_parts(parts, Body::from(bytes.clone()));
    req.extensions_mut().insert(RawBody(bytes));

    next.run(req).await
}
