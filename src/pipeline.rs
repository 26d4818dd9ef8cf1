//! End-to-end run: preconditions, pairing, budgeting, the worker pool and the
//! final report.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::budget::{available_capacity, ResourceBudget};
use crate::config::PipelineConfig;
use crate::diagnostics::Diagnostics;
use crate::errors::RunError;
use crate::pairs::discover_pairs;
use crate::report::RunSummary;
use crate::runner::{ExternalCommand, TrimTool};
use crate::threading::{run_jobs, Job, TrimAndNormalize};

/// Runs the whole pipeline. `Err` means nothing was dispatched; an `Ok`
/// summary may still contain failed jobs.
pub fn run(
    config: &PipelineConfig,
    command: Arc<dyn ExternalCommand>,
    diagnostics: Arc<dyn Diagnostics>,
) -> Result<RunSummary, RunError> {
    diagnostics.info(&format!("Starting {} processing of {}", config.tool, config.input.display()));

    fs::create_dir_all(&config.output)
        .map_err(|source| RunError::Io { path: config.output.clone(), source })?;
    check_distinct_dirs(&config.input, &config.output)?;

    if !command.is_available(&config.tool) {
        return Err(RunError::ToolNotFound { tool: config.tool.clone() });
    }

    let pairs = discover_pairs(&config.input, diagnostics.as_ref())?;
    if pairs.is_empty() {
        return Err(RunError::NoPairsDiscovered { dir: config.input.clone() });
    }

    let capacity = config.cores.unwrap_or_else(available_capacity);
    let budget = ResourceBudget::compute(pairs.len(), capacity, config.worker_override);
    diagnostics.info(&format!(
        "{} pairs, {} workers, {} threads per job (capacity {})",
        pairs.len(),
        budget.worker_count,
        budget.per_job_share,
        budget.total_capacity
    ));

    let tool = TrimTool {
        program: config.tool.clone(),
        adapter_r1: config.adapter_r1.clone(),
        adapter_r2: config.adapter_r2.clone(),
        ..TrimTool::new(&config.output)
    };
    let executor = Arc::new(TrimAndNormalize {
        tool,
        command,
        diagnostics: diagnostics.clone(),
        compression_level: config.compression,
    });

    let jobs = Job::plan(pairs, &budget);
    let results = run_jobs(jobs, budget.worker_count, executor, diagnostics.clone());

    let summary = RunSummary::from_results(&results).with_budget(budget);
    summary.emit(diagnostics.as_ref());
    if let Err(e) = summary.write_json(&config.summary_path) {
        diagnostics.warn(&format!("Could not write summary {}: {e}", config.summary_path.display()));
    }
    Ok(summary)
}

fn check_distinct_dirs(input: &Path, output: &Path) -> Result<(), RunError> {
    let canonical = |p: &Path| p.canonicalize().map_err(|source| RunError::Io { path: p.to_path_buf(), source });
    let output_dir = canonical(output)?;
    if canonical(input)? == output_dir {
        return Err(RunError::OutputIsInput { dir: output_dir });
    }
    Ok(())
}
