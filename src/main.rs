use std::env;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use youtube_kit::config::{log_capacity_from_env, ClientConfig};
use youtube_kit::logger::RequestsLogger;
use youtube_kit::{api, YouTubeClient};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .init();

    let config = ClientConfig::from_env();
    let logger = Arc::new(RequestsLogger::new(log_capacity_from_env()));
    let client = YouTubeClient::new(config).with_logger(logger.clone());
    let app = api::create_router(client, logger);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, bind_addr = %bind_addr, "failed to bind");
            return;
        }
    };
    tracing::info!(bind_addr = %bind_addr, "Server starting");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
    }
}
