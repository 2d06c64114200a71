use std::sync::Arc;

use tavola::config::ViewerConfig;
use tavola::error::ViewerResult;
use tavola::server::{self, AppState};
use tavola::source::{CachedSource, SheetsClient};

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> ViewerResult<()> {
    let config = ViewerConfig::from_env()?;
    tracing::info!(
        sheets = config.sheets.len(),
        cache_ttl_sec = config.cache_ttl.as_secs(),
        "configuration loaded"
    );

    let client =
        SheetsClient::new(&config.api_base, config.api_key.clone(), config.sheets.clone())?;
    let source = Arc::new(CachedSource::new(client, config.cache_ttl));
    let state = AppState {
        source,
        page_size_default: config.page_size_default,
    };
    server::serve(state, &config.bind_addr).await
}
