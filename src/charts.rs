//! Chart Rendering Module
//!
//! Renders the two report charts to PNG files using `plotters`: a pie chart
//! of pass vs. fail counts and a ranked bar chart of per-domain failure
//! counts. Existing files under the same names are overwritten.

use crate::error::{DmarcError, Result};
use crate::stats::Summary;
use plotters::prelude::*;
use std::path::Path;

const PIE_SIZE: (u32, u32) = (900, 700);
const BAR_SIZE: (u32, u32) = (1000, 600);

const PASS_COLOR: RGBColor = RGBColor(76, 175, 80);
const FAIL_COLOR: RGBColor = RGBColor(229, 57, 53);
const BAR_COLOR: RGBColor = RGBColor(66, 133, 244);

fn render_error(path: &Path, err: impl std::fmt::Display) -> DmarcError {
    DmarcError::Render(format!("{}: {}", path.display(), err))
}

/// Renders the pass/fail proportion pie chart.
pub fn render_pie(summary: &Summary, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, PIE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_error(path, e))?;
    root.titled(
        "DMARC Authentication Results",
        TextStyle::from(("sans-serif", 30).into_font()).color(&BLACK),
    )
    .map_err(|e| render_error(path, e))?;

    let dims = root.dim_in_pixel();
    let center = (dims.0 as i32 / 2, dims.1 as i32 / 2 + 20);
    let radius = 250.0;
    let sizes = vec![summary.pass_count as f64, summary.fail_count as f64];
    let colors = vec![PASS_COLOR, FAIL_COLOR];
    let labels = vec!["Pass", "Fail"];

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 24).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 20).into_font().color(&BLACK));
    root.draw(&pie).map_err(|e| render_error(path, e))?;

    root.present().map_err(|e| render_error(path, e))
}

/// Renders the ranked per-domain failure bar chart.
///
/// `ranked` is expected in descending failure-count order with name-ascending
/// tie-breaks; bars are drawn in that order. An empty ranking still produces
/// a valid chart with empty axes.
pub fn render_bar(ranked: &[(String, u64)], path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, BAR_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_error(path, e))?;

    let max_count = ranked.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    let segments = ranked.len().max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Domains Causing DMARC Failures", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(100)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0..segments).into_segmented(),
            0u64..max_count + max_count / 10 + 1,
        )
        .map_err(|e| render_error(path, e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(segments)
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) => ranked
                .get(*i)
                .map(|(domain, _)| domain.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc("Domain")
        .y_desc("Failed messages")
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| render_error(path, e))?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(10)
                .data(ranked.iter().enumerate().map(|(i, (_, count))| (i, *count))),
        )
        .map_err(|e| render_error(path, e))?;

    root.present().map_err(|e| render_error(path, e))
}
