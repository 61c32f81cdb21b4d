use clap::{Parser, ValueEnum};
use cwmetrics_client::{Client, ClientConfig, MetricsSink};
use cwmetrics_plugin::{config::DEFAULT_LISTEN_ADDR, Server, ServerConfig, StatsChannel};
use serde_json::Value;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "cwmetrics", about = "Forward load-test reports to a metrics backend")]
struct Args {
    /// Path to the script JSON; either the whole script (with a `config` key) or its `config` object.
    #[arg(long)]
    config: std::path::PathBuf,

    /// Address the report ingest server listens on.
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    listen: SocketAddr,

    /// Metrics backend address as `host:port`.
    #[arg(long)]
    endpoint: String,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(&args);

    let script: Value = serde_json::from_str(&std::fs::read_to_string(&args.config)?)?;
    let script_config = match script.get("config") {
        Some(config) => config.clone(),
        None => script,
    };

    let sink: Arc<dyn MetricsSink> = Arc::new(Client::new(ClientConfig { endpoint: args.endpoint.clone() }));
    let channel = StatsChannel::default();
    match cwmetrics_plugin::init(&script_config, &channel, sink) {
        Ok(_) => {}
        Err(e) if e.is_config_error() => {
            error!(error = %e, "Invalid cloudwatch plugin configuration");
            process::exit(2);
        }
        Err(e) => return Err(e.into()),
    }

    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        if let Ok(addr) = ready_rx.await {
            info!(%addr, "Listening for reports");
        }
    });

    Server::new(ServerConfig { address: args.listen }, channel).run(ready_tx).await?;
    Ok(())
}

fn init_tracing(args: &Args) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match args.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
