//! can-hyper entrypoint: one batch build from the JSON config named by CAN_HYPER_CONFIG
//! (default `config.json`). Logs go to stderr; the run summary is printed to stdout as one JSON line.

use can_hyper::{config::PipelineConfig, logging::StructuredLogger, FeatureTableBuilder};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("CAN_HYPER_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let config = PipelineConfig::try_load(&config_path)?;

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(config = %config_path.display(), input_dir = ?config.input_dir, "can-hyper starting");

    let builder = FeatureTableBuilder::new(config)?;
    let summary = match builder.run() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "build failed");
            return Err(e.into());
        }
    };

    StructuredLogger::emit_json(&summary, &mut std::io::stdout().lock())?;
    info!(run_id = %summary.run_id, "can-hyper done");
    Ok(())
}
