//! Annotator configuration
//!
//! Configuration is loaded from environment variables. Unset or unparsable
//! variables keep their default value.

use std::env;
use std::path::PathBuf;

/// Main annotator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the region catalog JSON file
    pub catalog_path: PathBuf,

    /// Output configuration
    pub output: OutputConfig,

    /// Pipeline configuration
    pub pipeline: PipelineConfig,

    /// Execution log configuration
    pub log: ExecutionLogConfig,
}

/// Output-related configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Directory receiving annotation documents and colorized masks
    pub dir: PathBuf,
    /// Whether to write the colorized mask next to the annotation document
    pub write_colorized: bool,
}

/// Per-image processing configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum images processed at the same time
    pub max_jobs: usize,
    /// Measurement name used for the per-region pixel count
    pub area_measurement: String,
}

/// Execution log configuration
#[derive(Debug, Clone)]
pub struct ExecutionLogConfig {
    /// Log file path
    pub path: PathBuf,
    /// Width of the component name column
    pub name_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("configs/regions.json"),
            output: OutputConfig::default(),
            pipeline: PipelineConfig::default(),
            log: ExecutionLogConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            write_colorized: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_jobs: 2,
            area_measurement: "area".to_string(),
        }
    }
}

impl Default for ExecutionLogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/executions.log"),
            name_width: 40,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("REGIONS_CATALOG")
            && !path.is_empty()
        {
            config.catalog_path = PathBuf::from(path);
        }

        // Output config
        if let Ok(dir) = env::var("OUTPUT_DIR")
            && !dir.is_empty()
        {
            config.output.dir = PathBuf::from(dir);
        }
        if let Ok(val) = env::var("WRITE_COLORIZED") {
            config.output.write_colorized = val.to_lowercase() == "true" || val == "1";
        }

        // Pipeline config
        if let Ok(val) = env::var("MAX_JOBS")
            && let Ok(jobs) = val.parse::<usize>()
            && jobs > 0
        {
            config.pipeline.max_jobs = jobs;
        }
        if let Ok(name) = env::var("AREA_MEASUREMENT")
            && !name.is_empty()
        {
            config.pipeline.area_measurement = name;
        }

        // Execution log config
        if let Ok(path) = env::var("EXECUTION_LOG_PATH")
            && !path.is_empty()
        {
            config.log.path = PathBuf::from(path);
        }
        if let Ok(val) = env::var("EXECUTION_LOG_NAME_WIDTH")
            && let Ok(width) = val.parse()
        {
            config.log.name_width = width;
        }

        config
    }
}
