//! dmarc-insight Library
//!
//! This library provides the core functionality for dmarc-insight: configuration,
//! error handling, data models, report file extraction, XML parsing, aggregation,
//! and the chart/PDF report assembly.

pub mod batch;
pub mod charts;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod pdf;
pub mod report;
pub mod stats;
pub mod xml_parser;

pub use batch::ReportBatch;
pub use config::Config;
pub use extract::extract_report;
pub use report::Analysis;
pub use stats::Summary;
pub use xml_parser::parse_report;
