use std::sync::Arc;

use checkout_gateway::{config::Config, startup::Application};
use gateway_core::billing::HttpBillingClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,checkout_gateway=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");
    let billing = HttpBillingClient::new(config.billing_client_config())?;

    let application = Application::build(config, Arc::new(billing)).await?;
    application.run_until_stopped().await?;

    Ok(())
}
