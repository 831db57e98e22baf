//! Configuration Module
//!
//! Extraction limits, read from `DMARC_`-prefixed environment variables with
//! defaults suited to normal aggregate-report sizes. The limits exist to keep
//! hostile archives from exhausting memory during extraction; the file-size
//! cap is validated so it cannot be raised past a hard ceiling.

use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub max_file_size: usize,
    pub max_decompressed_size: usize,
    pub max_files_in_zip: usize,
    pub max_compression_ratio: f64,
    pub max_filename_length: usize,
}

impl Config {
    /// Creates a new configuration by reading environment variables.
    /// If a variable is missing or empty, a default value is used.
    pub fn new() -> Result<Self> {
        // Read max file size from env or use default 10MB.
        let max_file_size = env::var("DMARC_MAX_FILE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024);

        if max_file_size > 500_000_000 {
            return Err(anyhow::anyhow!("Max file size too large (500MB limit)"));
        }

        let max_decompressed_size = env::var("DMARC_MAX_DECOMPRESSED_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100 * 1024 * 1024);

        let max_files_in_zip = env::var("DMARC_MAX_FILES_IN_ZIP")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1000);

        let max_compression_ratio = env::var("DMARC_MAX_COMPRESSION_RATIO")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1000.0);

        let max_filename_length = env::var("DMARC_MAX_FILENAME_LENGTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256);

        Ok(Config {
            max_file_size,
            max_decompressed_size,
            max_files_in_zip,
            max_compression_ratio,
            max_filename_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_defaults() {
        // Remove environment variables so that defaults are used.
        env::remove_var("DMARC_MAX_FILE_SIZE");
        env::remove_var("DMARC_MAX_DECOMPRESSED_SIZE");
        env::remove_var("DMARC_MAX_FILES_IN_ZIP");
        env::remove_var("DMARC_MAX_COMPRESSION_RATIO");
        env::remove_var("DMARC_MAX_FILENAME_LENGTH");

        let config = Config::new().unwrap();
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.max_decompressed_size, 100 * 1024 * 1024);
        assert_eq!(config.max_files_in_zip, 1000);
        assert_eq!(config.max_compression_ratio, 1000.0);
        assert_eq!(config.max_filename_length, 256);
    }
}
