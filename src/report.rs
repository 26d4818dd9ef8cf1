//! Reduction of job results into the run verdict and failure report.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::budget::ResourceBudget;
use crate::diagnostics::Diagnostics;
use crate::threading::JobResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub sample: String,
    pub detail: String,
}

/// Reduction of all job results. Failures keep completion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<Failure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<ResourceBudget>,
}

impl RunSummary {
    pub fn from_results(results: &[JobResult]) -> Self {
        let failures: Vec<Failure> = results
            .iter()
            .filter(|r| !r.succeeded)
            .map(|r| Failure {
                sample: r.sample.clone(),
                detail: r.error.clone().unwrap_or_else(|| "unknown error".to_string()),
            })
            .collect();

        Self {
            total: results.len(),
            succeeded: results.len() - failures.len(),
            failed: failures.len(),
            failures,
            budget: None,
        }
    }

    pub fn with_budget(mut self, budget: ResourceBudget) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Logs the final verdict; one error line per failed sample.
    pub fn emit(&self, diagnostics: &dyn Diagnostics) {
        if self.is_success() {
            diagnostics.info(&format!("Processing finished successfully ({} pairs)", self.total));
            return;
        }
        diagnostics.error(&format!("{} of {} pairs failed:", self.failed, self.total));
        for f in &self.failures {
            diagnostics.error(&format!("  {}: {}", f.sample, f.detail));
        }
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut w, self)?;
        writeln!(w)?;
        w.flush()
    }
}
