//! Discovery of mated R1/R2 FASTQ files in a directory.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostics;
use crate::errors::{PairingIssue, RunError};

pub const MATE1_MARKER: &str = "_R1";
pub const MATE2_MARKER: &str = "_R2";
pub const FASTQ_GZ_EXT: &str = ".fastq.gz";

/// One sample's mate-1 and mate-2 files, living in the same directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePair {
    pub sample: String,
    pub mate1: PathBuf,
    pub mate2: PathBuf,
}

/// True for names like `S1_R1_001.fastq.gz`: the mate-1 marker must appear
/// before the extension.
pub fn is_mate1_candidate(name: &str) -> bool {
    name.strip_suffix(FASTQ_GZ_EXT)
        .is_some_and(|stem| stem.contains(MATE1_MARKER))
}

/// Expected mate-2 file name for a mate-1 name, or `None` if `name` is not a
/// mate-1 candidate. Every marker occurrence is substituted.
pub fn derive_mate2_name(name: &str) -> Option<String> {
    if !is_mate1_candidate(name) {
        return None;
    }
    Some(name.replace(MATE1_MARKER, MATE2_MARKER))
}

/// Sample label: everything before the first mate-1 marker.
pub fn sample_label(mate1_name: &str) -> String {
    match mate1_name.find(MATE1_MARKER) {
        Some(idx) => mate1_name[..idx].to_string(),
        None => mate1_name.to_string(),
    }
}

/// Pairs up file names without touching the filesystem. Issues are returned
/// alongside the pairs, in name order.
pub fn pair_names<'a, I>(names: I) -> (Vec<(String, String)>, Vec<PairingIssue>)
where
    I: IntoIterator<Item = &'a str>,
{
    let all: BTreeSet<&str> = names.into_iter().collect();
    let mut claimed: HashSet<String> = HashSet::new();
    let mut pairs = Vec::new();
    let mut issues = Vec::new();

    for name in all.iter().copied() {
        let Some(mate2) = derive_mate2_name(name) else { continue };
        if !all.contains(mate2.as_str()) {
            issues.push(PairingIssue::UnmatchedMate { mate1: name.to_string(), expected: mate2 });
            continue;
        }
        if !claimed.insert(mate2.clone()) {
            issues.push(PairingIssue::DuplicateDerivedMate { mate1: name.to_string(), mate2 });
            continue;
        }
        pairs.push((name.to_string(), mate2));
    }

    (pairs, issues)
}

/// Scans `dir` for mated pairs. Each unmatched or duplicate candidate is
/// reported once through `diagnostics` and left out of the result.
pub fn discover_pairs(dir: &Path, diagnostics: &dyn Diagnostics) -> Result<Vec<SamplePair>, RunError> {
    let io_err = |source| RunError::Io { path: dir.to_path_buf(), source };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.path().is_file() {
            continue;
        }
        // names that are not UTF-8 cannot carry the marker convention
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }

    let (named_pairs, issues) = pair_names(names.iter().map(String::as_str));
    for issue in &issues {
        diagnostics.warn(&issue.to_string());
    }

    Ok(named_pairs
        .into_iter()
        .map(|(mate1, mate2)| SamplePair {
            sample: sample_label(&mate1),
            mate1: dir.join(&mate1),
            mate2: dir.join(&mate2),
        })
        .collect())
}
