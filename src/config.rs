//! Command-line options and the resolved pipeline settings.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::runner::{DEFAULT_ADAPTER_R1, DEFAULT_ADAPTER_R2, DEFAULT_TOOL};

pub const LOG_FILE_NAME: &str = "pairtrim.log";
pub const SUMMARY_FILE_NAME: &str = "pairtrim.json";

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(
    name = "pairtrim",
    version,
    about = "Runs cutadapt on every R1/R2 pair in a directory and fixes read headers"
)]
pub struct Cli {
    /// Directory holding the *_R1*.fastq.gz / *_R2*.fastq.gz files
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Directory for trimmed files (same names as the inputs)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Number of pairs trimmed concurrently (default: min(pairs, cores))
    #[arg(short = 'w', long = "workers")]
    pub workers: Option<usize>,
    /// CPU capacity to divide between jobs (default: all cores)
    #[arg(long = "cores")]
    pub cores: Option<usize>,

    // Trimmer
    #[arg(long = "tool", default_value = DEFAULT_TOOL)]
    pub tool: String,
    #[arg(long = "adapter-r1", default_value = DEFAULT_ADAPTER_R1)]
    pub adapter_r1: String,
    #[arg(long = "adapter-r2", default_value = DEFAULT_ADAPTER_R2)]
    pub adapter_r2: String,

    /// gzip level used when rewriting headers
    #[arg(short = 'z', long = "compression", default_value_t = 4, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub compression: u32,

    // Reporting
    /// Log file (default: <output>/pairtrim.log)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
    /// JSON run summary (default: <output>/pairtrim.json)
    #[arg(short = 'j', long = "json")]
    pub json: Option<PathBuf>,
}

/// Settings the pipeline runs with, resolved from [`Cli`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub worker_override: Option<usize>,
    pub cores: Option<usize>,
    pub tool: String,
    pub adapter_r1: String,
    pub adapter_r2: String,
    pub compression: u32,
    pub summary_path: PathBuf,
}

impl PipelineConfig {
    /// Defaults for everything but the two directories.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let output = output.into();
        Self {
            input: input.into(),
            summary_path: output.join(SUMMARY_FILE_NAME),
            output,
            worker_override: None,
            cores: None,
            tool: DEFAULT_TOOL.to_string(),
            adapter_r1: DEFAULT_ADAPTER_R1.to_string(),
            adapter_r2: DEFAULT_ADAPTER_R2.to_string(),
            compression: 4,
        }
    }
}

impl Cli {
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| self.output.join(LOG_FILE_NAME))
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            worker_override: self.workers,
            cores: self.cores,
            tool: self.tool.clone(),
            adapter_r1: self.adapter_r1.clone(),
            adapter_r2: self.adapter_r2.clone(),
            compression: self.compression,
            summary_path: self.json.clone().unwrap_or_else(|| self.output.join(SUMMARY_FILE_NAME)),
        }
    }
}
