use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Target, WriteStyle};
use log::error;

use pairtrim::config::Cli;
use pairtrim::diagnostics::LogDiagnostics;
use pairtrim::pipeline;
use pairtrim::runner::ProcessLauncher;

/// Sends log output to the log file and to stdout.
struct Tee {
    file: File,
    stdout: io::Stdout,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        self.stdout.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.stdout.flush()
    }
}

fn init_logging(log_path: &Path) -> Result<()> {
    let file = File::create(log_path).with_context(|| format!("Failed to create log file {}", log_path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(Tee { file, stdout: io::stdout() })))
        .write_style(WriteStyle::Never)
        .init();
    Ok(())
}

fn try_main() -> Result<bool> {
    let cli = Cli::parse();

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory {}", cli.output.display()))?;
    init_logging(&cli.log_path())?;

    let summary = pipeline::run(&cli.pipeline_config(), Arc::new(ProcessLauncher), Arc::new(LogDiagnostics))?;
    Ok(summary.is_success())
}

fn main() -> ExitCode {
    match try_main() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            // the logger may not be up yet
            if log::log_enabled!(log::Level::Error) {
                error!("{e:#}");
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
