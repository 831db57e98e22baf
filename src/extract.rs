//! Report File Extraction Module
//!
//! DMARC receivers deliver aggregate reports as plain XML, gzipped XML, or ZIP
//! archives; this module turns any of the three into XML text ready for the
//! parser. Untrusted archives are held to the limits in [`Config`]: input and
//! decompressed sizes, entry counts, compression ratio, entry-name length, and
//! no path traversal.
use crate::config::Config;
use crate::error::DmarcError;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::ZipArchive;

/// Extracts the XML documents contained in one report file, dispatching on
/// the `.xml`, `.gz`, or `.zip` extension.
///
/// A ZIP archive yields one document per entry after its entry count, names,
/// compression ratio, and declared sizes pass the configured limits. Gzip
/// declares no trustworthy size up front, so its decompression is bounded
/// while reading. Plain XML is read subject to the input size limit.
pub fn extract_report<P: AsRef<Path>>(file_path: P, config: &Config) -> Result<Vec<String>> {
    let file = File::open(&file_path).context("Failed to open file")?;
    let file_size = file.metadata()?.len();
    if file_size > config.max_file_size as u64 {
        return Err(DmarcError::FileTooLarge("File too large".to_string()).into());
    }
    let file_name = file_path
        .as_ref()
        .file_name()
        .map(|x| x.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = file_name.split('.').next_back().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "zip" => {
            let mut archive = ZipArchive::new(file)?;
            if archive.len() > config.max_files_in_zip {
                return Err(anyhow::anyhow!("Too many files in archive"));
            }
            let mut extracted = Vec::new();
            for i in 0..archive.len() {
                let mut file_in_zip = archive.by_index(i)?;
                let inner_name = file_in_zip.name().to_string();
                // Prevent path traversal
                if inner_name.contains("..")
                    || inner_name.starts_with('/')
                    || inner_name.starts_with('\\')
                {
                    return Err(DmarcError::Format(format!(
                        "Path traversal attempt detected: {}",
                        inner_name
                    ))
                    .into());
                }
                // Check filename length
                if inner_name.len() > config.max_filename_length {
                    return Err(DmarcError::Format("Filename too long".to_string()).into());
                }
                let compressed_size = file_in_zip.compressed_size();
                let uncompressed_size = file_in_zip.size();
                if compressed_size > 0 {
                    let compression_ratio = uncompressed_size as f64 / compressed_size as f64;
                    if compression_ratio > config.max_compression_ratio {
                        return Err(DmarcError::Format(format!(
                            "Suspicious compression ratio: {:.2}",
                            compression_ratio
                        ))
                        .into());
                    }
                }
                if uncompressed_size > config.max_decompressed_size as u64 {
                    return Err(DmarcError::FileTooLarge(
                        "Total decompressed size too large".to_string(),
                    )
                    .into());
                }
                let mut contents = String::new();
                file_in_zip.read_to_string(&mut contents)?;
                extracted.push(contents);
            }
            Ok(extracted)
        }
        "gz" => {
            // Gzip carries no trustworthy size metadata, so the limit has to
            // be enforced while decompressing, not after. The extra byte of
            // budget distinguishes "exactly at the limit" from "over it".
            let mut gz_decoder =
                GzDecoder::new(file).take(config.max_decompressed_size as u64 + 1);
            let mut contents = String::new();
            let len = gz_decoder.read_to_string(&mut contents)?;
            if len > config.max_decompressed_size {
                return Err(
                    DmarcError::FileTooLarge("Decompressed size too large".to_string()).into(),
                );
            }
            Ok(vec![contents])
        }
        "xml" => {
            let mut reader = BufReader::new(file);
            let mut contents = String::new();
            let len = reader.read_to_string(&mut contents)?;
            if len as u64 > config.max_file_size as u64 {
                return Err(
                    DmarcError::FileTooLarge("XML file size too large".to_string()).into(),
                );
            }
            Ok(vec![contents])
        }
        _ => Err(DmarcError::UnsupportedFile("Unsupported file type".into()).into()),
    }
}
