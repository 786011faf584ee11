use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use region_annotations::AnnotatePipeline;
use region_annotations::config::Config;
use region_annotations::region::RegionCatalog;
use region_annotations::run_log::{ExecutionSink, FileExecutionLog};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Component name written to the execution log for one input
fn component_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "region_annotations=debug,region_annotate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let inputs: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if inputs.is_empty() {
        bail!("usage: region-annotate <label-raster>...");
    }

    // Load configuration from environment
    let config = Config::from_env();
    info!(
        "Loaded configuration: catalog={}, output={}, max_jobs={}",
        config.catalog_path.display(),
        config.output.dir.display(),
        config.pipeline.max_jobs
    );

    let catalog = RegionCatalog::load(&config.catalog_path)
        .with_context(|| format!("loading catalog {}", config.catalog_path.display()))?;

    let pipeline = Arc::new(
        AnnotatePipeline::new(config.pipeline.clone(), Arc::new(catalog))
            .with_colorized_output(config.output.write_colorized),
    );
    let execution_log: Arc<dyn ExecutionSink> = Arc::new(FileExecutionLog::new(&config.log));
    let output_dir = Arc::new(config.output.dir.clone());

    // One blocking task per image, at most `max_jobs` at a time
    let permits = Arc::new(Semaphore::new(config.pipeline.max_jobs));
    let mut tasks = JoinSet::new();

    for path in inputs {
        let permit = permits.clone().acquire_owned().await?;
        let pipeline = pipeline.clone();
        let execution_log = execution_log.clone();
        let output_dir = output_dir.clone();

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let component = component_name(&path);
            let result = pipeline.run(&path, &output_dir);

            let (success, message) = match &result {
                Ok(output) => (true, format!("{} regions", output.region_count)),
                Err(e) => {
                    error!("Failed to process {}: {}", path.display(), e);
                    (false, e.to_string())
                }
            };
            if let Err(e) = execution_log.record(&component, success, Some(&message)) {
                warn!("Failed to write execution log: {}", e);
            }
            success
        });
    }

    let mut failed = 0usize;
    let mut total = 0usize;
    while let Some(joined) = tasks.join_next().await {
        total += 1;
        if !joined.context("image worker panicked")? {
            failed += 1;
        }
    }

    info!("Processed {} images, {} failed", total, failed);
    if failed > 0 {
        bail!("{} of {} images failed", failed, total);
    }

    Ok(())
}
