//! Report Batch Module
//!
//! Loads a batch of DMARC report files into a single explicit object that is
//! passed through the pipeline. A file that fails extraction or parsing is
//! skipped and reported; the remaining files continue. There is no shared
//! state between files, so the resulting record set does not depend on
//! processing order.

use crate::config::Config;
use crate::error::DmarcError;
use crate::extract::extract_report;
use crate::models::AuthRecord;
use crate::xml_parser::parse_report;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extensions accepted when scanning a directory for report files.
const REPORT_EXTENSIONS: &[&str] = &["xml", "gz", "zip"];

/// A file that could not be ingested, with the reason it was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// All records extracted from one run's input files, plus the files that
/// had to be skipped.
#[derive(Debug, Default)]
pub struct ReportBatch {
    pub records: Vec<AuthRecord>,
    pub skipped: Vec<SkippedFile>,
    pub parsed_files: usize,
}

impl ReportBatch {
    /// Loads every report file reachable from `paths`.
    ///
    /// Directories are scanned (non-recursively) for files with a report
    /// extension, in name order. Files that fail to extract or parse are
    /// recorded in `skipped` and logged at warn level; the batch continues
    /// with the remaining files.
    pub fn load(paths: &[PathBuf], config: &Config) -> Result<Self, DmarcError> {
        let mut batch = ReportBatch::default();
        for path in Self::expand_paths(paths)? {
            match Self::load_file(&path, config) {
                Ok(records) => {
                    log::debug!("Parsed {} records from {}", records.len(), path.display());
                    batch.records.extend(records);
                    batch.parsed_files += 1;
                }
                Err(error) => {
                    log::warn!("{}", error);
                    let reason = match error {
                        DmarcError::Parse { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    batch.skipped.push(SkippedFile { path, reason });
                }
            }
        }
        Ok(batch)
    }

    /// Expands the supplied paths into a flat file list, scanning directories
    /// for report files.
    fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, DmarcError> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|p| p.is_file() && has_report_extension(p))
                    .collect();
                entries.sort();
                files.extend(entries);
            } else {
                files.push(path.clone());
            }
        }
        Ok(files)
    }

    /// Extracts and parses a single report file into records.
    fn load_file(path: &Path, config: &Config) -> Result<Vec<AuthRecord>, DmarcError> {
        let parse_error = |e: &dyn std::fmt::Display| DmarcError::Parse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        let documents = extract_report(path, config).map_err(|e| parse_error(&e))?;
        let mut records = Vec::new();
        for xml in &documents {
            records.extend(parse_report(xml).map_err(|e| parse_error(&e))?);
        }
        Ok(records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fails with [`DmarcError::EmptyBatch`] when no file yielded any
    /// records, including the case where every file failed to parse. An
    /// empty batch is fatal for the run: nothing may be summarized or
    /// rendered from it.
    pub fn require_records(self) -> Result<Self, DmarcError> {
        if self.records.is_empty() {
            Err(DmarcError::EmptyBatch)
        } else {
            Ok(self)
        }
    }
}

fn has_report_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| REPORT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
