//! Panic containment for the request pipeline.
//!
//! Installed via `tower_http::catch_panic::CatchPanicLayer::custom`. A panic
//! anywhere below the layer is logged with a backtrace and surfaces as the
//! generic 500 body; other in-flight requests are unaffected.

use std::any::Any;
use std::backtrace::Backtrace;

use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(
        panic = %detail,
        stacktrace = %Backtrace::force_capture(),
        "request handler panicked"
    );

    ApiError::internal().into_response()
}
