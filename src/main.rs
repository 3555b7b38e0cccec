use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sparkcall::{
    api,
    config::AppConfig,
    countries::{default_countries, CountryDirectory, DialCodeProvider, RestCountriesProvider, StaticProvider},
    state::AppState,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sparkcall=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SparkCall...");

    let config = AppConfig::from_env();

    let provider: Box<dyn DialCodeProvider> =
        match RestCountriesProvider::new(config.countries.url.clone(), config.countries.timeout) {
            Ok(provider) => Box::new(provider),
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize country provider: {}. Using the built-in list.",
                    e
                );
                Box::new(StaticProvider::new(default_countries()))
            }
        };
    let countries = CountryDirectory::new(
        provider,
        config.countries.max_retries,
        config.countries.retry_delay,
    );

    let addr = config.bind_addr;
    let state = Arc::new(AppState::new(config, countries));
    let app = api::create_router(state);

    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
