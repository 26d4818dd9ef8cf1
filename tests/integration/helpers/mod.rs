//! Shared fixtures: gzipped FASTQ files and a fake trimming tool.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use pairtrim::runner::{CommandOutput, ExternalCommand};

/// Two records whose headers carry `/` delimiters; sequence and quality
/// lines carry them too so we can check they survive.
pub fn fastq_text(sample: &str, mate: u8) -> String {
    format!(
        "@{sample}:1:FC/1 {mate}/N\nACGT/ACGT\n+{sample}/1\nII/IIII@\n@{sample}:2:FC/2 {mate}/N\nTTTT\n+\n@III\n"
    )
}

pub fn write_gz(path: &Path, content: &str) {
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    enc.write_all(content.as_bytes()).unwrap();
    enc.finish().unwrap();
}

pub fn read_gz(path: &Path) -> String {
    let mut s = String::new();
    MultiGzDecoder::new(File::open(path).unwrap()).read_to_string(&mut s).unwrap();
    s
}

/// Writes `{sample}_R1.fastq.gz` and `{sample}_R2.fastq.gz` into `dir`.
pub fn write_pair(dir: &Path, sample: &str) {
    write_gz(&dir.join(format!("{sample}_R1.fastq.gz")), &fastq_text(sample, 1));
    write_gz(&dir.join(format!("{sample}_R2.fastq.gz")), &fastq_text(sample, 2));
}

/// Header-normalized form of `fastq_text`.
pub fn expected_normalized(text: &str) -> String {
    text.split_inclusive('\n')
        .enumerate()
        .map(|(i, line)| if i % 4 == 0 && line.starts_with('@') { line.replace('/', " ") } else { line.to_string() })
        .collect()
}

/// How the fake tool behaves for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Copy,
    ExitNonZero,
    WriteGarbage,
}

/// Stands in for cutadapt: copies `<mate1> <mate2>` to `-o` / `-p`.
pub struct FakeTrimmer {
    pub available: bool,
    failing: HashSet<String>,
    garbage: HashSet<String>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeTrimmer {
    pub fn new() -> Self {
        Self { available: true, failing: HashSet::new(), garbage: HashSet::new(), calls: Mutex::new(Vec::new()) }
    }

    pub fn missing() -> Self {
        Self { available: false, ..Self::new() }
    }

    pub fn with(mut self, sample: &str, behaviour: Behaviour) -> Self {
        match behaviour {
            Behaviour::Copy => {}
            Behaviour::ExitNonZero => {
                self.failing.insert(format!("{sample}_R1"));
            }
            Behaviour::WriteGarbage => {
                self.garbage.insert(format!("{sample}_R1"));
            }
        }
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    fn matches(set: &HashSet<String>, mate1: &str) -> bool {
        let name = Path::new(mate1).file_name().unwrap().to_string_lossy().into_owned();
        set.iter().any(|s| name.starts_with(s.as_str()))
    }
}

fn flag_value(args: &[String], flag: &str) -> PathBuf {
    let idx = args.iter().position(|a| a == flag).unwrap();
    PathBuf::from(&args[idx + 1])
}

impl ExternalCommand for FakeTrimmer {
    fn run(&self, _program: &str, args: &[String]) -> io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(args.to_vec());

        let n = args.len();
        let (in1, in2) = (&args[n - 2], &args[n - 1]);
        if Self::matches(&self.failing, in1) {
            return Ok(CommandOutput::failed(1, "cutadapt: error: simulated failure"));
        }

        let (out1, out2) = (flag_value(args, "-o"), flag_value(args, "-p"));
        if Self::matches(&self.garbage, in1) {
            fs::write(&out1, b"not gzip at all")?;
            fs::copy(in2, &out2)?;
        } else {
            fs::copy(in1, &out1)?;
            fs::copy(in2, &out2)?;
        }
        Ok(CommandOutput { stdout: "=== Summary ===".to_string(), ..CommandOutput::ok() })
    }

    fn is_available(&self, _program: &str) -> bool {
        self.available
    }
}
