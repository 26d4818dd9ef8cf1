//! Static partitioning of CPU capacity between concurrent jobs.

use serde::Serialize;

/// Worker count and per-job thread share, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceBudget {
    pub total_capacity: usize,
    pub worker_count: usize,
    pub per_job_share: usize,
}

impl ResourceBudget {
    /// `worker_count = min(pair_count, override or capacity)`, at least 1 when
    /// there is any pair. `per_job_share = max(1, capacity / worker_count)`.
    /// The shares never sum past the capacity unless the floor of 1 forces it.
    pub fn compute(pair_count: usize, capacity: usize, worker_override: Option<usize>) -> Self {
        let total_capacity = capacity.max(1);
        let bound = match worker_override {
            Some(n) if n > 0 => n,
            _ => total_capacity,
        };

        let mut worker_count = pair_count.min(bound);
        if pair_count >= 1 {
            worker_count = worker_count.max(1);
        }

        let per_job_share = (total_capacity / worker_count.max(1)).max(1);

        Self { total_capacity, worker_count, per_job_share }
    }
}

/// Logical cores on this machine.
pub fn available_capacity() -> usize {
    num_cpus::get()
}
