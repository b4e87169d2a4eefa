use anyhow::{Context, Result};
use std::env;
use std::io::{self, Read};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cookify::app::{load_request, parse_request, App};
use cookify::config::{AppConfig, LogFormat};

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    // Ignore the error when a subscriber is already installed
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Logging first, so messages emitted while loading the config are kept
    init_logging(LogFormat::from_env()?);
    let config = AppConfig::from_env()?;

    info!("Starting cookify");

    // Request comes from the file given as first argument, or stdin
    let request = match env::args().nth(1) {
        Some(path) => load_request(Path::new(&path))?,
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read request from stdin")?;
            parse_request(&input)?
        }
    };

    let app = App::new(config)?;
    let response = match app.handle(request).await {
        Ok(response) => response,
        Err(err) => {
            error!("Request failed: {:#}", err);
            return Err(err);
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
