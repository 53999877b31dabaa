use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::net::TcpListener;

use keyrelay::app::{AppState, build_router};
use keyrelay::config::{Config, normalize_base_url};
use keyrelay::redemption;
use keyrelay::upstream::UpstreamClient;

#[derive(Parser)]
#[command(name = "keyrelay", version, about = "Redemption-key relay for the card service")]
struct Cli {
    /// Bind host (overrides HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Bind port (overrides PORT)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Upstream base URL (overrides UPSTREAM_BASE_URL)
    #[arg(long, global = true)]
    upstream: Option<String>,

    /// Per-call upstream timeout in milliseconds (overrides UPSTREAM_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Redeem one key from the command line and print the result
    Redeem {
        /// The redemption key
        key: String,
    },
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(upstream) = &self.upstream {
            config.upstream_base_url = normalize_base_url(upstream);
        }
        if let Some(timeout_ms) = self.timeout_ms.filter(|ms| *ms > 0) {
            config.upstream_timeout_ms = timeout_ms;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Redeem { key } => redeem_once(config, key).await,
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(&config);
    let app = build_router(state, &config);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(
        upstream = %config.upstream_base_url,
        timeout_ms = config.upstream_timeout_ms,
        "keyrelay listening on {}",
        addr
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn redeem_once(config: Config, key: String) -> anyhow::Result<()> {
    let client = UpstreamClient::new(&config);
    let response = redemption::process(&client, &json!({ "key_id": key }))
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.ok {
        std::process::exit(1);
    }
    Ok(())
}
