//! Parallel adapter trimming of paired FASTQ files.
//!
//! Pairs `*_R1*.fastq.gz` / `*_R2*.fastq.gz` files, runs an external trimmer
//! on each pair from a bounded worker pool, and normalizes read headers in the
//! trimmed output.

pub mod budget;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod fastq;
pub mod pairs;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod threading;
