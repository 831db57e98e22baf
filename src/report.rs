//! Report Assembler Module
//!
//! Turns a finalized summary into textual findings and chart payloads, then
//! delegates to the chart and PDF collaborators. All output files land in the
//! chosen output directory under fixed names; pre-existing files of the same
//! name are overwritten without warning, so callers that care about
//! preservation should use distinct directories per run.

use crate::charts;
use crate::error::Result;
use crate::pdf;
use crate::stats::Summary;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const PIE_CHART_FILE: &str = "pie_chart.png";
pub const BAR_CHART_FILE: &str = "bar_chart.png";
pub const PDF_FILE: &str = "DMARC_Analysis_Report.pdf";

/// How many failing domains the narrative names explicitly.
const TOP_DOMAINS_IN_NARRATIVE: usize = 5;

/// Suggested next step for the domain's published DMARC policy, based on the
/// observed failure rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyRecommendation {
    Reject,
    Quarantine,
    Investigate,
}

impl PolicyRecommendation {
    fn from_fail_rate(fail_rate: f64) -> Self {
        if fail_rate < 5.0 {
            PolicyRecommendation::Reject
        } else if fail_rate < 15.0 {
            PolicyRecommendation::Quarantine
        } else {
            PolicyRecommendation::Investigate
        }
    }
}

impl fmt::Display for PolicyRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyRecommendation::Reject => {
                write!(f, "Move to a 'reject' policy")
            }
            PolicyRecommendation::Quarantine => {
                write!(f, "Move to a 'quarantine' policy")
            }
            PolicyRecommendation::Investigate => {
                write!(f, "Stay at a 'none' policy and investigate the failing sources")
            }
        }
    }
}

/// The finalized findings for one run: the summary, the ranked bar-chart
/// payload, and the policy recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub summary: Summary,
    pub ranked_failures: Vec<(String, u64)>,
    pub recommendation: PolicyRecommendation,
}

/// Paths of the files written by [`Analysis::render`].
#[derive(Debug, Clone)]
pub struct RenderedArtifacts {
    pub pie_chart: PathBuf,
    pub bar_chart: PathBuf,
    pub pdf: PathBuf,
}

impl Analysis {
    pub fn from_summary(summary: Summary) -> Self {
        let ranked_failures = summary.ranked_failures();
        let recommendation = PolicyRecommendation::from_fail_rate(summary.fail_rate());
        Analysis {
            summary,
            ranked_failures,
            recommendation,
        }
    }

    /// The textual findings, one line each, shared by the console output and
    /// the PDF document.
    pub fn narrative(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Total messages analyzed: {}", self.summary.total_messages),
            format!(
                "Authentication passed (SPF or DKIM aligned): {} ({:.1}%)",
                self.summary.pass_count,
                self.summary.pass_rate()
            ),
            format!(
                "Authentication failed: {} ({:.1}%)",
                self.summary.fail_count,
                self.summary.fail_rate()
            ),
        ];

        if self.ranked_failures.is_empty() {
            lines.push("No domains produced authentication failures.".to_string());
        } else {
            let top: Vec<String> = self
                .ranked_failures
                .iter()
                .take(TOP_DOMAINS_IN_NARRATIVE)
                .map(|(domain, count)| format!("{} ({})", domain, count))
                .collect();
            lines.push(format!("Top failing domains: {}", top.join(", ")));
        }

        lines.push(format!("Recommendation: {}", self.recommendation));
        lines
    }

    /// Renders the pie chart, the bar chart, and the PDF document into
    /// `out_dir`. Any write failure is fatal and surfaced with the failing
    /// path.
    pub fn render(&self, out_dir: &Path) -> Result<RenderedArtifacts> {
        let pie_chart = out_dir.join(PIE_CHART_FILE);
        let bar_chart = out_dir.join(BAR_CHART_FILE);
        let pdf_path = out_dir.join(PDF_FILE);

        charts::render_pie(&self.summary, &pie_chart)?;
        charts::render_bar(&self.ranked_failures, &bar_chart)?;
        pdf::export(self, &pie_chart, &bar_chart, &pdf_path)?;

        Ok(RenderedArtifacts {
            pie_chart,
            bar_chart,
            pdf: pdf_path,
        })
    }
}
