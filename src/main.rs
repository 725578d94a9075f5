use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tokio::net::TcpListener;

use marketlens::{
    client,
    monitoring::{dashboard, logger},
    normalize::extract_market_ref,
    server::{self, AppState},
    types::AppConfig,
};

#[derive(Parser, Debug)]
#[command(name = "marketlens")]
#[command(about = "Normalizing HTTP proxy for prediction-market data", long_about = None)]
struct Cli {
    /// Optional path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Upstream API origin
    #[arg(long, env = "POLYMARKET_API_BASE")]
    upstream_base: Option<String>,

    /// Listen host
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {},
    /// Parse a market URL, slug or id and print the reference as JSON
    Resolve {
        input: String,
    },
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "api", error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "api", "shutdown signal received");
}

async fn run_server(settings: AppConfig) -> anyhow::Result<()> {
    let source = client::build_source(&settings.upstream)?;
    let listener = TcpListener::bind(settings.server.bind_addr()).await?;
    tracing::info!(target: "api", addr = %listener.local_addr()?, "marketlens data service listening");

    let _dashboard = dashboard::spawn_dashboard_task(std::time::Duration::from_secs(
        settings.monitoring.metrics_log_secs,
    ));

    server::serve(listener, AppState::new(source), shutdown_signal()).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::init_tracing();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => {
            tracing::debug!(target: "api", config = %path, "loading config");
            AppConfig::from_file(path)?
        }
        None => AppConfig::default(),
    }
    .with_overrides(cli.upstream_base, cli.host, cli.port);

    match cli.command.unwrap_or(Commands::Serve {}) {
        Commands::Serve {} => {
            logger::log_startup(&settings);
            run_server(settings).await?;
        }
        Commands::Resolve { input } => match extract_market_ref(&input) {
            Some(market_ref) => println!("{}", serde_json::to_string(&market_ref)?),
            None => {
                eprintln!("unrecognized input: {input}");
                std::process::exit(2);
            }
        },
    }

    Ok(())
}
