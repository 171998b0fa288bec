use std::env;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use gateway_core::billing::BillingClientConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    /// Domain for the customer session cookie.
    pub cookie_domain: String,
    /// Session cookie lifetime, seconds.
    pub customer_token_cookie_lifetime: i64,
    /// Comma-separated list of allowed CORS origins, `*` for any.
    pub allow_origin: String,
    /// Base of the hosted payment form, e.g.
    /// `https://checkout.example.com/pay/order/`. The order UUID is
    /// appended as a path segment.
    pub order_inline_form_url_mask: String,
    pub billing: BillingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct BillingConfig {
    pub endpoint: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("GATEWAY_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()?;

        let cookie_domain = env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN must be set");
        let order_inline_form_url_mask =
            env::var("ORDER_INLINE_FORM_URL_MASK").expect("ORDER_INLINE_FORM_URL_MASK must be set");

        let customer_token_cookie_lifetime = env::var("CUSTOMER_TOKEN_COOKIE_LIFETIME")
            .unwrap_or_else(|_| "2592000".to_string())
            .parse()?;

        let allow_origin = env::var("ALLOW_ORIGIN").unwrap_or_else(|_| "*".to_string());

        let billing_endpoint = env::var("BILLING_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:50051".to_string());
        let connect_timeout_secs = env::var("BILLING_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?;
        let request_timeout_secs = env::var("BILLING_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;

        Ok(Self {
            server: ServerConfig { host, port },
            cookie_domain,
            customer_token_cookie_lifetime,
            allow_origin,
            order_inline_form_url_mask,
            billing: BillingConfig {
                endpoint: billing_endpoint,
                connect_timeout_secs,
                request_timeout_secs,
            },
        })
    }

    pub fn billing_client_config(&self) -> BillingClientConfig {
        BillingClientConfig {
            endpoint: self.billing.endpoint.clone(),
            connect_timeout: Duration::from_secs(self.billing.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.billing.request_timeout_secs),
        }
    }
}
