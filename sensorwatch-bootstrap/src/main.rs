use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;

use sensorwatch_domain::parse_instant;
use sensorwatch_infrastructure::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "sensorwatch")]
#[command(about = "Sensor anomaly detection service", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// Run a single detection, print the report and exit
    #[arg(long)]
    once: bool,

    /// Window start for --once
    #[arg(long, value_parser = parse_bound)]
    start: Option<DateTime<Utc>>,

    /// Window end for --once
    #[arg(long, value_parser = parse_bound)]
    end: Option<DateTime<Utc>>,
}

fn parse_bound(text: &str) -> Result<DateTime<Utc>, String> {
    parse_instant(text).ok_or_else(|| format!("not a timestamp: {}", text))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => AppConfig::load_from(path).await?,
        None => AppConfig::load().await?,
    };

    if args.once {
        sensorwatch_bootstrap::run_once(&config, args.start, args.end).await
    } else {
        sensorwatch_bootstrap::run_standalone(&config).await
    }
}
