//! Error types for pairtrim runs.
//!
//! Errors come in three flavours: [`RunError`] stops the run before any job is
//! dispatched, [`PairingIssue`] is a warning raised while pairing files, and
//! [`JobError`] fails a single job without touching the others.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal, pre-run errors.
#[derive(Error, Debug)]
pub enum RunError {
    /// The trimming tool is not on `PATH`
    #[error("Executable '{tool}' was not found on PATH")]
    ToolNotFound {
        /// Name of the missing program
        tool: String,
    },

    /// The input directory held no mated pairs
    #[error("No paired FASTQ files found in '{}'", dir.display())]
    NoPairsDiscovered {
        /// Directory that was scanned
        dir: PathBuf,
    },

    /// Output and input resolve to the same directory
    #[error("Output directory '{}' is the input directory; trimmed files would overwrite their inputs", dir.display())]
    OutputIsInput {
        /// The shared directory
        dir: PathBuf,
    },

    /// Filesystem failure outside of any job
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Non-fatal problems found while pairing files.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairingIssue {
    #[error("Mate file for {mate1} not found (expected {expected})")]
    UnmatchedMate { mate1: String, expected: String },

    #[error("{mate1} derives mate {mate2}, which is already paired; skipping")]
    DuplicateDerivedMate { mate1: String, mate2: String },
}

/// Per-job failures. These never leave the job that raised them.
#[derive(Error, Debug)]
pub enum JobError {
    /// The trimming tool could not be launched or exited non-zero
    #[error("{tool} failed: {detail}")]
    ExternalProcessFailure {
        /// Program that was run
        tool: String,
        /// Exit status or launch error, plus captured stderr
        detail: String,
    },

    /// Header normalization of an output file failed
    #[error("Header rewrite failed for '{}': {source}", path.display())]
    HeaderRewriteFailure {
        /// File being rewritten
        path: PathBuf,
        /// Underlying I/O or decompression error
        #[source]
        source: io::Error,
    },

    /// Anything else, including a panicking worker
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
