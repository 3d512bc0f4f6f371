//! Tienda - storefront and catalog admin service

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tienda::{admin::AdminClient, build_app, AppState, Catalog, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load();
    let http = reqwest::Client::builder().timeout(config.http_timeout).build()?;
    let catalog = Catalog::load_or_empty(&config.catalog_source, &http).await;

    let nats = match config.nats_url.as_deref() {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "NATS unavailable, hand-off events will only be logged");
                None
            }
        },
        None => None,
    };
    let admin = config.script_url.as_ref().map(|url| AdminClient::new(http.clone(), url.clone()));
    if admin.is_none() {
        warn!("SCRIPT_URL not set, admin routes disabled");
    }

    let port = config.port;
    let state = AppState::new(catalog, config, admin, nats);
    state.spawn_session_sweeper();
    let app = build_app(state);

    info!("🚀 Tienda listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
