use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Outcome {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "PIXIVUTIL_NO_METADATA")]
    NoMetadata,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::NoMetadata => "PIXIVUTIL_NO_METADATA",
        }
    }
}

/// Archive ids grouped by outcome, each list in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RunResult {
    buckets: BTreeMap<Outcome, Vec<String>>,
}

impl RunResult {
    pub fn record(&mut self, outcome: Outcome, arcid: &str) {
        self.buckets.entry(outcome).or_default().push(arcid.to_string());
    }

    pub fn ids(&self, outcome: Outcome) -> &[String] {
        self.buckets.get(&outcome).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Writes the ledger as `update-job-<timestamp>.json` under `dir`.
pub fn write_results(dir: &Path, result: &RunResult, now: DateTime<Local>) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    let path = dir.join(format!("update-job-{}.json", now.format("%Y-%m-%d-%H-%M-%S")));
    let file = File::create(&path).with_context(|| format!("Failed to create result file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, result).context("Failed to write run results")?;
    writer.flush()?;
    Ok(path)
}
