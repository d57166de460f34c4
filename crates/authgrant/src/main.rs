//! authgrant server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use authgrant::config::Config;
use authgrant::grant::GrantService;
use authgrant::http;
use authgrant::store::{self, MemoryStore, Storage};

#[derive(Parser, Debug)]
#[command(name = "authgrant")]
#[command(about = "OAuth 2.0 authorization code grant server")]
#[command(version)]
struct Cli {
    /// HMAC secret for access tokens
    #[arg(long, env = "ACCESS_TOKEN_SECRET", hide_env_values = true)]
    access_token_secret: String,

    /// HMAC secret for refresh tokens
    #[arg(long, env = "REFRESH_TOKEN_SECRET", hide_env_values = true)]
    refresh_token_secret: String,

    /// HTTP server port
    #[arg(long, default_value = "3000", env = "PORT")]
    port: u16,

    /// Subject identifier for the authenticated resource owner
    /// (stands in for an upstream authentication layer)
    #[arg(long, default_value = "resource-owner", env = "SUBJECT_ID")]
    subject: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting authgrant server");

    let config = Config::new(cli.access_token_secret, cli.refresh_token_secret);
    let store: Arc<dyn Storage> = Arc::new(MemoryStore::new());
    store::start_cleanup_task(Arc::clone(&store));
    let grants = GrantService::new(store, &config);
    let router = http::create_router(grants, cli.subject);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C handler");
    tracing::info!("Received shutdown signal");
}
