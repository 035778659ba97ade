use claude_relay::{build_router, AppState, RelayConfig, SharedLogger};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "claude-relay",
    about = "Local relay exposing an OpenAI-style chat endpoint backed by Anthropic's Messages API",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log file path
    #[arg(long, default_value = "claude-relay.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claude_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = RelayConfig::find_and_load(cli.config.as_deref())?;

    if let Some(port) = cli.port {
        config.port = port;
    }

    let logger = SharedLogger::new(&cli.log_file)?;

    info!("claude-relay v{}", env!("CARGO_PKG_VERSION"));
    info!("  Upstream:      {}", config.upstream.url);
    info!("  API version:   {}", config.upstream.api_version);
    info!("  Default model: {}", config.defaults.model);
    info!("  Max tokens:    {}", config.defaults.max_tokens);
    info!("  Port:          {}", config.port);
    info!("  Log file:      {}", cli.log_file.display());

    logger.info(
        "startup",
        format!(
            "Starting claude-relay upstream={} port={}",
            config.upstream.url, config.port
        ),
    );

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let port = config.port;
    let state = Arc::new(AppState {
        config,
        client,
        logger,
    });

    let app = build_router(state);
    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Listening on http://{bind_addr}");
    info!("");
    info!("  Set the API endpoint to: http://localhost:{port}/v1/chat/completions");
    info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
