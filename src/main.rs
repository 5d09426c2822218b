use anyhow::Context;
use salon_store::{config, http, logging, AuthConfig, RecordStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_default()?;
    logging::init(cfg.logging.format);

    let store = RecordStore::builder(&cfg.store.path)
        .pretty(cfg.store.pretty)
        .auth(AuthConfig::from(&cfg.auth))
        .build()
        .context("cannot open record store")?;
    info!(
        path = %store.path().display(),
        services = store.service_count(),
        "record store ready"
    );

    let router = http::build_router(Arc::new(store), http::cors_layer(&cfg.cors.allowed_origins));
    let addr = cfg.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    http::serve(listener, router).await
}
