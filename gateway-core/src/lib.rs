//! gateway-core: shared infrastructure for the checkout gateway.

pub mod billing;
pub mod binder;
pub mod error;
pub mod middleware;
pub mod request;
pub mod validation;

pub use axum;
pub use serde;
pub use serde_json;
pub use tracing;
pub use validator;
