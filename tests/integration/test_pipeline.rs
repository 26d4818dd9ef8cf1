//! End-to-end runs over real directories with a fake trimmer.

use std::sync::Arc;

use pairtrim::config::PipelineConfig;
use pairtrim::diagnostics::{Level, RecordingDiagnostics};
use pairtrim::pipeline;
use tempfile::TempDir;

use crate::helpers::{expected_normalized, fastq_text, read_gz, write_pair, Behaviour, FakeTrimmer};

struct Dirs {
    _root: TempDir,
    config: PipelineConfig,
}

fn dirs() -> Dirs {
    let root = TempDir::new().unwrap();
    let input = root.path().join("raw");
    std::fs::create_dir(&input).unwrap();
    let config = PipelineConfig::new(input, root.path().join("trimmed"));
    Dirs { _root: root, config }
}

#[test]
fn test_all_pairs_trimmed_and_normalized() {
    let d = dirs();
    write_pair(&d.config.input, "S1");
    write_pair(&d.config.input, "S2");

    let tool = Arc::new(FakeTrimmer::new().with("S1", Behaviour::Copy));
    let diag = Arc::new(RecordingDiagnostics::new());
    let summary = pipeline::run(&d.config, tool.clone(), diag.clone()).unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.total, 2);
    assert_eq!(tool.calls().len(), 2);

    for sample in ["S1", "S2"] {
        for mate in [1u8, 2] {
            let out = d.config.output.join(format!("{sample}_R{mate}.fastq.gz"));
            assert_eq!(read_gz(&out), expected_normalized(&fastq_text(sample, mate)));
        }
        // inputs are untouched
        let input = d.config.input.join(format!("{sample}_R1.fastq.gz"));
        assert_eq!(read_gz(&input), fastq_text(sample, 1));
    }
    assert!(diag.at(Level::Error).is_empty());
    assert!(d.config.summary_path.exists());
}

#[test]
fn test_round_trip_changes_only_header_delimiters() {
    let d = dirs();
    write_pair(&d.config.input, "S1");

    pipeline::run(&d.config, Arc::new(FakeTrimmer::new()), Arc::new(RecordingDiagnostics::new())).unwrap();

    let before = fastq_text("S1", 1);
    let after = read_gz(&d.config.output.join("S1_R1.fastq.gz"));
    let before_lines: Vec<&str> = before.lines().collect();
    let after_lines: Vec<&str> = after.lines().collect();
    assert_eq!(before_lines.len(), after_lines.len());

    for (i, (b, a)) in before_lines.iter().zip(&after_lines).enumerate() {
        if i % 4 == 0 {
            assert_eq!(*a, b.replace('/', " "));
        } else {
            assert_eq!(a, b, "line {i} changed");
        }
    }
}

#[test]
fn test_failed_job_is_isolated() {
    let d = dirs();
    for s in ["S1", "S2", "S3"] {
        write_pair(&d.config.input, s);
    }

    let mut config = d.config.clone();
    config.worker_override = Some(2);
    let tool = Arc::new(FakeTrimmer::new().with("S2", Behaviour::ExitNonZero));
    let diag = Arc::new(RecordingDiagnostics::new());
    let summary = pipeline::run(&config, tool.clone(), diag.clone()).unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].sample, "S2");
    assert!(summary.failures[0].detail.contains("simulated failure"));
    assert_eq!(tool.calls().len(), 3);

    assert!(config.output.join("S1_R1.fastq.gz").exists());
    assert!(config.output.join("S3_R2.fastq.gz").exists());
    assert!(!config.output.join("S2_R1.fastq.gz").exists());
    assert!(diag.at(Level::Error).iter().any(|m| m.contains("S2")));
}

#[test]
fn test_header_rewrite_failure_fails_only_that_job() {
    let d = dirs();
    write_pair(&d.config.input, "S1");
    write_pair(&d.config.input, "S2");

    let tool = Arc::new(FakeTrimmer::new().with("S1", Behaviour::WriteGarbage));
    let summary = pipeline::run(&d.config, tool, Arc::new(RecordingDiagnostics::new())).unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].sample, "S1");
    assert!(summary.failures[0].detail.contains("Header rewrite failed"));

    // no temp files left beside the outputs
    let leftovers: Vec<_> = std::fs::read_dir(&d.config.output)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| !n.ends_with(".fastq.gz") && !n.ends_with(".json"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[test]
fn test_unmatched_file_warned_and_skipped() {
    let d = dirs();
    write_pair(&d.config.input, "S1");
    crate::helpers::write_gz(&d.config.input.join("Lonely_R1.fastq.gz"), &fastq_text("Lonely", 1));

    let tool = Arc::new(FakeTrimmer::new());
    let diag = Arc::new(RecordingDiagnostics::new());
    let summary = pipeline::run(&d.config, tool.clone(), diag.clone()).unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.total, 1);
    assert_eq!(tool.calls().len(), 1);
    let warnings = diag.at(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Lonely_R1.fastq.gz"));
}

#[test]
fn test_thread_share_passed_to_tool() {
    let d = dirs();
    write_pair(&d.config.input, "S1");
    write_pair(&d.config.input, "S2");

    let mut config = d.config.clone();
    config.cores = Some(8);
    let tool = Arc::new(FakeTrimmer::new());
    let summary = pipeline::run(&config, tool.clone(), Arc::new(RecordingDiagnostics::new())).unwrap();

    let budget = summary.budget.unwrap();
    assert_eq!(budget.worker_count, 2);
    assert_eq!(budget.per_job_share, 4);
    for call in tool.calls() {
        let j = call.iter().position(|a| a == "-j").unwrap();
        assert_eq!(call[j + 1], "4");
    }
}
