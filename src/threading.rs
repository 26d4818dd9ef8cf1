//! Job planning and the fixed-size worker pool that runs them.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::budget::ResourceBudget;
use crate::diagnostics::Diagnostics;
use crate::errors::JobError;
use crate::fastq::normalize_file;
use crate::pairs::SamplePair;
use crate::runner::{ExternalCommand, TrimTool};

/// One pair plus its thread share. `id` is the pairing-order index.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: usize,
    pub pair: SamplePair,
    pub share: usize,
}

impl Job {
    pub fn plan(pairs: Vec<SamplePair>, budget: &ResourceBudget) -> Vec<Job> {
        pairs
            .into_iter()
            .enumerate()
            .map(|(id, pair)| Job { id, pair, share: budget.per_job_share })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub id: usize,
    pub sample: String,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl JobResult {
    fn from_outcome(job: &Job, outcome: Result<(), JobError>) -> Self {
        match outcome {
            Ok(()) => Self { id: job.id, sample: job.pair.sample.clone(), succeeded: true, error: None },
            Err(e) => Self {
                id: job.id,
                sample: job.pair.sample.clone(),
                succeeded: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Work done for one job by a pool worker.
pub trait JobExecutor: Send + Sync {
    fn execute(&self, job: &Job) -> Result<(), JobError>;
}

/// Trim, then normalize both outputs. Normalization only runs after a
/// successful trim.
pub struct TrimAndNormalize {
    pub tool: TrimTool,
    pub command: Arc<dyn ExternalCommand>,
    pub diagnostics: Arc<dyn Diagnostics>,
    pub compression_level: u32,
}

impl JobExecutor for TrimAndNormalize {
    fn execute(&self, job: &Job) -> Result<(), JobError> {
        let trimmed = self.tool.run(job, self.command.as_ref(), self.diagnostics.as_ref())?;
        self.diagnostics.info(&format!("{} finished for {}", self.tool.program, job.pair.sample));

        for path in [&trimmed.mate1, &trimmed.mate2] {
            self.diagnostics.info(&format!("Fixing headers in {}", path.display()));
            let stats = normalize_file(path, self.compression_level)?;
            self.diagnostics.debug(&format!(
                "{}: {} lines, {} headers rewritten",
                path.display(),
                stats.lines,
                stats.headers_rewritten
            ));
        }
        Ok(())
    }
}

/// Runs every job on a pool of `worker_count` threads and returns one result
/// per job, in completion order. All jobs are queued before any worker
/// starts; a failing or panicking job does not stop the others.
pub fn run_jobs(
    jobs: Vec<Job>,
    worker_count: usize,
    executor: Arc<dyn JobExecutor>,
    diagnostics: Arc<dyn Diagnostics>,
) -> Vec<JobResult> {
    let expected = jobs.len();
    if expected == 0 {
        return Vec::new();
    }

    let (tx_job, rx_job): (Sender<Job>, Receiver<Job>) = unbounded();
    let (tx_result, rx_result): (Sender<JobResult>, Receiver<JobResult>) = unbounded();

    let labels: Vec<(usize, String)> = jobs.iter().map(|j| (j.id, j.pair.sample.clone())).collect();
    for job in jobs {
        // receiver is alive in this scope
        let _ = tx_job.send(job);
    }
    drop(tx_job);

    let mut workers = Vec::new();
    for _ in 0..worker_count.clamp(1, expected) {
        let rx = rx_job.clone();
        let tx = tx_result.clone();
        let executor = executor.clone();
        let diagnostics = diagnostics.clone();

        workers.push(thread::spawn(move || {
            while let Ok(job) = rx.recv() {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    diagnostics.info(&format!(
                        "Starting {} ({} / {})",
                        job.pair.sample,
                        file_name(&job.pair.mate1),
                        file_name(&job.pair.mate2)
                    ));
                    executor.execute(&job)
                }))
                .unwrap_or_else(|payload| Err(JobError::Unexpected(panic_message(payload.as_ref()))));
                let result = JobResult::from_outcome(&job, outcome);
                match &result.error {
                    None => diagnostics.info(&format!("Finished {}", result.sample)),
                    Some(e) => diagnostics.error(&format!("Failed {}: {e}", result.sample)),
                }
                if tx.send(result).is_err() {
                    break;
                }
            }
        }));
    }
    drop(tx_result);

    let mut results = Vec::with_capacity(expected);
    for result in rx_result.iter() {
        results.push(result);
        if results.len() == expected {
            break;
        }
    }

    for w in workers {
        // job panics were caught above
        let _ = w.join();
    }

    // a worker that died outside a job leaves its job unreported
    if results.len() < expected {
        let reported: HashSet<usize> = results.iter().map(|r| r.id).collect();
        for (id, sample) in labels.into_iter().filter(|(id, _)| !reported.contains(id)) {
            diagnostics.error(&format!("Failed {sample}: worker exited without a result"));
            results.push(JobResult {
                id,
                sample,
                succeeded: false,
                error: Some(JobError::Unexpected("worker exited without a result".to_string()).to_string()),
            });
        }
    }
    results
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
