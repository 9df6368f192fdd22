use anyhow::Result;
use artfolio_variants::models::S3Event;
use artfolio_variants::pipeline::Pipeline;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "artfolio-variants")]
#[command(about = "Generate responsive image variants from storage notifications")]
struct CliArgs {
    /// Path to a notification event JSON document. Reads stdin when omitted.
    #[arg(value_name = "EVENT_FILE")]
    event_file: Option<PathBuf>,
}

fn read_event(event_file: Option<&PathBuf>) -> Result<S3Event> {
    let raw = match event_file {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artfolio_variants=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting artfolio-variants");

    let args = CliArgs::parse();
    let event = read_event(args.event_file.as_ref())?;

    match Pipeline::from_env().await {
        Ok(pipeline) => {
            let response = pipeline.handle(&event).await;
            println!("{}", serde_json::to_string_pretty(&response)?);

            if response.status_code >= 400 {
                error!("Invocation failed with status {}", response.status_code);
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            error!("Failed to initialize pipeline: {}", e);
            std::process::exit(1);
        }
    }
}
