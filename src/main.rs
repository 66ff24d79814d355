use anyhow::Result;
use marks_predictor::{load_artifacts, logging, server, ServiceConfig};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "marks_predictor")]
struct Cli {
    /// Path to config file (defaults to marks_predictor.toml when present)
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Listening port; overrides the config file and PORT
    #[structopt(short, long)]
    port: Option<u16>,

    /// Model artifact path
    #[structopt(long, parse(from_os_str))]
    model: Option<PathBuf>,

    /// Scaler artifact path
    #[structopt(long, parse(from_os_str))]
    scaler: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::from_args();
    let mut cfg = ServiceConfig::load(args.config.as_deref())?;
    cfg.apply_env()?;
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(model) = args.model {
        cfg.model_path = model;
    }
    if let Some(scaler) = args.scaler {
        cfg.scaler_path = scaler;
    }

    logging::init(&cfg)?;
    log::info!("Starting application...");

    let predictor = load_artifacts(&cfg);
    server::serve(&cfg, predictor).await?;

    log::info!("Application shutdown");
    Ok(())
}
