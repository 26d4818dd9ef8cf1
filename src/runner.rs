//! Invocation of the external adapter trimmer.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::diagnostics::Diagnostics;
use crate::errors::JobError;
use crate::threading::Job;

pub const DEFAULT_TOOL: &str = "cutadapt";
pub const DEFAULT_ADAPTER_R1: &str = "AGATCGGAAGAGCACACGTCTGAACTCCAGTCA";
pub const DEFAULT_ADAPTER_R2: &str = "AGATCGGAAGAGCGTCGTGTAGGGAAAGAGTGT";

/// Lines of stderr kept in a failure detail.
const STDERR_TAIL_LINES: usize = 5;

/// What came back from one subprocess run.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code; `None` when killed by a signal.
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self { status: Some(0), success: true, ..Self::default() }
    }

    pub fn failed(status: i32, stderr: &str) -> Self {
        Self { status: Some(status), success: false, stdout: String::new(), stderr: stderr.to_string() }
    }
}

/// Narrow seam over process launching.
pub trait ExternalCommand: Send + Sync {
    /// Runs `program` with `args` to completion.
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;

    /// Whether `program` can be launched at all.
    fn is_available(&self, program: &str) -> bool;
}

/// Launches real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl ExternalCommand for ProcessLauncher {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            status: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn is_available(&self, program: &str) -> bool {
        find_on_path(program).is_some()
    }
}

/// Resolves `program` the way a shell would: paths with a separator are
/// checked directly, bare names are searched in `PATH`.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).map(|dir| dir.join(program)).find(|p| is_executable(p))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata().map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Output files of a successful trim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedPair {
    pub mate1: PathBuf,
    pub mate2: PathBuf,
}

/// Fixed trimmer parameters shared by every job.
#[derive(Debug, Clone)]
pub struct TrimTool {
    pub program: String,
    pub adapter_r1: String,
    pub adapter_r2: String,
    pub output_dir: PathBuf,
}

impl TrimTool {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: DEFAULT_TOOL.to_string(),
            adapter_r1: DEFAULT_ADAPTER_R1.to_string(),
            adapter_r2: DEFAULT_ADAPTER_R2.to_string(),
            output_dir: output_dir.into(),
        }
    }

    /// Output paths keep the input basenames.
    pub fn outputs(&self, job: &Job) -> TrimmedPair {
        let name = |p: &Path| self.output_dir.join(p.file_name().unwrap_or(p.as_os_str()));
        TrimmedPair { mate1: name(&job.pair.mate1), mate2: name(&job.pair.mate2) }
    }

    /// Argument list for one job.
    pub fn args(&self, job: &Job) -> Vec<String> {
        let out = self.outputs(job);
        vec![
            "-b".to_string(),
            self.adapter_r1.clone(),
            "-B".to_string(),
            self.adapter_r2.clone(),
            "-j".to_string(),
            job.share.to_string(),
            "-o".to_string(),
            out.mate1.display().to_string(),
            "-p".to_string(),
            out.mate2.display().to_string(),
            job.pair.mate1.display().to_string(),
            job.pair.mate2.display().to_string(),
        ]
    }

    /// Trims one pair. Failure is returned, never raised past the job.
    pub fn run(
        &self,
        job: &Job,
        command: &dyn ExternalCommand,
        diagnostics: &dyn Diagnostics,
    ) -> Result<TrimmedPair, JobError> {
        let args = self.args(job);
        let output = command.run(&self.program, &args).map_err(|e| JobError::ExternalProcessFailure {
            tool: self.program.clone(),
            detail: format!("could not launch: {e}"),
        })?;

        if !output.stdout.trim().is_empty() {
            let report = output.stdout.trim_end();
            diagnostics.debug(&format!("{} report for {}:\n{report}", self.program, job.pair.sample));
        }

        if !output.success {
            return Err(JobError::ExternalProcessFailure {
                tool: self.program.clone(),
                detail: describe_failure(&output),
            });
        }
        Ok(self.outputs(job))
    }
}

fn describe_failure(output: &CommandOutput) -> String {
    let status = match output.status {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    };
    let lines: Vec<&str> = output.stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return status;
    }
    let tail = &lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..];
    format!("{status}: {}", tail.join(" | "))
}
