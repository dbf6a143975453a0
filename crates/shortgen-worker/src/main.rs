//! Shortgen worker binary: turns one source video into vertical shorts.

use std::path::PathBuf;

use tracing::{error, info};

use shortgen_models::{DurationPolicy, LayoutMode};
use shortgen_worker::ai::OpenAiClient;
use shortgen_worker::logging::init_tracing;
use shortgen_worker::titles::TitleLanguage;
use shortgen_worker::{Pipeline, PipelineOptions, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let input = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: shortgen-worker <video> [short|long] [full|split] [auto|es|en]");
            std::process::exit(2);
        }
    };
    let policy: DurationPolicy = args.next().as_deref().unwrap_or("short").parse()?;
    let layout_mode: LayoutMode = args.next().as_deref().unwrap_or("full").parse()?;
    let title_language: TitleLanguage = args.next().as_deref().unwrap_or("auto").parse()?;

    let config = WorkerConfig::from_env();
    let client = OpenAiClient::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let job_id = uuid::Uuid::new_v4().to_string();
    info!(job_id = %job_id, input = %input.display(), "Starting job");

    let pipeline = Pipeline::new(&client, &client, &config);
    let options = PipelineOptions {
        policy,
        layout_mode,
        title_language,
    };

    match pipeline.run(&job_id, &input, &options).await {
        Ok(shorts) => {
            for short in &shorts {
                info!(
                    index = short.index,
                    file = %short.filename,
                    score = short.score,
                    duration = short.duration,
                    "Rendered short"
                );
            }
            info!(count = shorts.len(), "Job complete");
            Ok(())
        }
        Err(e) => {
            error!(job_id = %job_id, "Job failed: {e}");
            std::process::exit(1);
        }
    }
}
