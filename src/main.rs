use std::env;

use benefit_engine::api::{AppState, create_router};
use benefit_engine::config::ConfigLoader;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("benefit_engine=debug,info")),
        )
        .init();

    let config_dir =
        env::var("BENEFIT_ENGINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let addr = env::var("BENEFIT_ENGINE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let config = match ConfigLoader::load(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            error!(config_dir = %config_dir, "Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        scheme = %config.scheme().name,
        version = %config.scheme().version,
        "Configuration loaded"
    );

    let app = create_router(AppState::from_config(config));

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, "Failed to bind: {}", e);
            std::process::exit(1);
        }
    };
    info!(addr = %addr, "Listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
