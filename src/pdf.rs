//! PDF Export Module
//!
//! Composes the analysis narrative and the two chart images into a single PDF
//! document using `genpdf` (pure Rust, no external renderer). Fonts are
//! discovered from the usual Liberation/DejaVu system directories and
//! embedded into the document.

use crate::error::{DmarcError, Result};
use crate::report::Analysis;
use chrono::Utc;
use genpdf::elements::{Break, Image, Paragraph};
use genpdf::style::Style;
use genpdf::{fonts, Alignment, Document, Element, SimplePageDecorator};
use std::path::Path;

/// Font directories to search on different platforms.
const FONT_DIRS: &[&str] = &[
    "./fonts",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/dejavu",
    "/System/Library/Fonts",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
];

const FONT_FAMILIES: &[&str] = &["LiberationSans", "DejaVuSans"];

fn load_font_family() -> Result<fonts::FontFamily<fonts::FontData>> {
    // Embedded fonts (no builtin fallback) are required for unicode support.
    FONT_DIRS
        .iter()
        .map(Path::new)
        .filter(|dir| dir.exists())
        .find_map(|dir| {
            let dir_str = dir.to_str()?;
            FONT_FAMILIES
                .iter()
                .find_map(|family| fonts::from_files(dir_str, family, None).ok())
        })
        .ok_or_else(|| {
            DmarcError::Render(format!(
                "No suitable fonts found. Searched: {:?}. Please install Liberation or DejaVu fonts.",
                FONT_DIRS
            ))
        })
}

/// Writes the PDF report embedding the narrative followed by both charts.
pub fn export(analysis: &Analysis, pie_chart: &Path, bar_chart: &Path, out: &Path) -> Result<()> {
    let font_family = load_font_family()?;

    let mut doc = Document::new(font_family);
    doc.set_title("DMARC Analysis Report");
    doc.set_minimal_conformance();
    doc.set_line_spacing(1.25);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new("DMARC ANALYSIS REPORT").styled(Style::new().bold().with_font_size(18)),
    );
    doc.push(
        Paragraph::new(format!(
            "Generated: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ))
        .styled(Style::new().with_font_size(10)),
    );
    doc.push(Break::new(1.0));

    doc.push(Paragraph::new("FINDINGS").styled(Style::new().bold().with_font_size(14)));
    doc.push(Break::new(0.3));
    for line in analysis.narrative() {
        doc.push(Paragraph::new(line).styled(Style::new().with_font_size(11)));
    }
    doc.push(Break::new(1.0));

    doc.push(
        Paragraph::new("Pass vs. Fail Proportion").styled(Style::new().bold().with_font_size(12)),
    );
    doc.push(Break::new(0.3));
    doc.push(embed_image(pie_chart)?);
    doc.push(Break::new(1.0));

    doc.push(
        Paragraph::new("Domains Causing Failures").styled(Style::new().bold().with_font_size(12)),
    );
    doc.push(Break::new(0.3));
    doc.push(embed_image(bar_chart)?);

    doc.render_to_file(out)
        .map_err(|e| DmarcError::Render(format!("{}: {}", out.display(), e)))
}

fn embed_image(path: &Path) -> Result<Image> {
    Ok(Image::from_path(path)
        .map_err(|e| DmarcError::Render(format!("{}: {}", path.display(), e)))?
        .with_alignment(Alignment::Center))
}
