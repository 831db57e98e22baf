//! Data Models Module
//!
//! This module defines the core data structures used by dmarc-insight to represent
//! the authentication records extracted from DMARC aggregate reports. SPF/DKIM
//! verdicts and the applied disposition are closed enumerations so the alignment
//! rule in the aggregator is exhaustively checkable.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of a DMARC aggregate report, the unit of analysis.
///
/// DMARC reports are aggregated, so a single record can represent many
/// messages (`count`). Immutable once parsed; consumed by the aggregator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthRecord {
    pub source_ip: String,
    pub count: u32,
    pub header_from: String,
    pub spf: SpfVerdict,
    pub dkim: DkimVerdict,
    pub disposition: Disposition,
}

impl AuthRecord {
    /// DMARC alignment: the record passes if either mechanism passes.
    pub fn passed(&self) -> bool {
        self.spf == SpfVerdict::Pass || self.dkim == DkimVerdict::Pass
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpfVerdict {
    #[default]
    None,
    Pass,
    Fail,
    Neutral,
    TempError,
    PermError,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DkimVerdict {
    #[default]
    None,
    Pass,
    Fail,
    Neutral,
    TempError,
    PermError,
}

/// Policy action the receiver applied per the published DMARC policy.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    #[default]
    None,
    Quarantine,
    Reject,
}

impl fmt::Display for SpfVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpfVerdict::None => write!(f, "none"),
            SpfVerdict::Pass => write!(f, "pass"),
            SpfVerdict::Fail => write!(f, "fail"),
            SpfVerdict::Neutral => write!(f, "neutral"),
            SpfVerdict::TempError => write!(f, "temperror"),
            SpfVerdict::PermError => write!(f, "permerror"),
        }
    }
}

impl fmt::Display for DkimVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DkimVerdict::None => write!(f, "none"),
            DkimVerdict::Pass => write!(f, "pass"),
            DkimVerdict::Fail => write!(f, "fail"),
            DkimVerdict::Neutral => write!(f, "neutral"),
            DkimVerdict::TempError => write!(f, "temperror"),
            DkimVerdict::PermError => write!(f, "permerror"),
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::None => write!(f, "none"),
            Disposition::Quarantine => write!(f, "quarantine"),
            Disposition::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for SpfVerdict {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" => Ok(SpfVerdict::Pass),
            "fail" | "softfail" => Ok(SpfVerdict::Fail),
            "neutral" => Ok(SpfVerdict::Neutral),
            "none" => Ok(SpfVerdict::None),
            "temperror" => Ok(SpfVerdict::TempError),
            "permerror" => Ok(SpfVerdict::PermError),
            _ => Err(format!("Invalid SPF verdict: {}", s)),
        }
    }
}

impl FromStr for DkimVerdict {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" => Ok(DkimVerdict::Pass),
            "fail" => Ok(DkimVerdict::Fail),
            "neutral" => Ok(DkimVerdict::Neutral),
            "none" => Ok(DkimVerdict::None),
            "temperror" => Ok(DkimVerdict::TempError),
            "permerror" => Ok(DkimVerdict::PermError),
            _ => Err(format!("Invalid DKIM verdict: {}", s)),
        }
    }
}

impl FromStr for Disposition {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Disposition::None),
            "quarantine" => Ok(Disposition::Quarantine),
            "reject" => Ok(Disposition::Reject),
            _ => Err(format!("Invalid disposition: {}", s)),
        }
    }
}
