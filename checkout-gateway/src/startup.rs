//! Application startup: state wiring, route table and the middleware chain.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::Method;
use axum::middleware::from_fn;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use gateway_core::billing::BillingService;
use gateway_core::middleware::panic_handler::handle_panic;
use gateway_core::middleware::raw_body::raw_body_middleware;
use gateway_core::middleware::request_id::request_id_middleware;
use gateway_core::validation::ValidationConfig;

use crate::config::Config;
use crate::handlers;

/// Shared application state. Read-only after startup; per-request state
/// travels through extractors, never through shared mutation.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub billing: Arc<dyn BillingService>,
    pub validation: Arc<ValidationConfig>,
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(handlers::order::create_order))
        .route("/order/:order_id", get(handlers::order::get_payment_form_data))
        .route("/order/recreate", post(handlers::order::recreate_order))
        .route(
            "/orders/:order_id/language",
            patch(handlers::order::change_language),
        )
        .route(
            "/orders/:order_id/customer",
            patch(handlers::order::change_customer),
        )
        .route(
            "/orders/:order_id/platform",
            patch(handlers::order::change_platform),
        )
        .route(
            "/orders/:order_id/billing_address",
            post(handlers::order::process_billing_address),
        )
        .route(
            "/orders/:order_id/notify_sale",
            post(handlers::order::notify_sale),
        )
        .route(
            "/orders/:order_id/notify_new_region",
            post(handlers::order::notify_new_region),
        )
        .route(
            "/orders/receipt/:receipt_id/:order_id",
            get(handlers::order::get_receipt),
        )
        .route("/paylink/:id", get(handlers::order::get_order_for_paylink))
        .route(
            "/payment_countries/:order_id",
            get(handlers::country::get_payment_countries),
        )
        .route("/payment", post(handlers::payment::create_payment))
        .route("/saved_card", delete(handlers::recurring::remove_saved_card))
}

fn cors_layer(config: &Config) -> CorsLayer {
    // Credentialed requests cannot use a literal wildcard origin.
    let allow_origin = if config.allow_origin.trim() == "*" {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(
            config
                .allow_origin
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([AUTHORIZATION, CONTENT_TYPE, SET_COOKIE, COOKIE])
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Assemble the application. The billing facade is injected so tests
    /// can run the full pipeline against a scripted backend.
    pub async fn build(
        config: Config,
        billing: Arc<dyn BillingService>,
    ) -> anyhow::Result<Self> {
        let state = AppState {
            validation: Arc::new(ValidationConfig::new()),
            billing,
            config: config.clone(),
        };

        // Layer order, outermost first at runtime: trace, request id,
        // panic containment, CORS, raw-body capture, routes. Raw-body must
        // be the innermost so every binder sees the captured bytes.
        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .nest("/api/v1", api_routes())
            .layer(from_fn(raw_body_middleware))
            .layer(cors_layer(&config))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .with_state(state);

        // Port 0 binds an ephemeral port for tests.
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("listening on port {}", self.port);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
