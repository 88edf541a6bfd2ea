//! Read-only formatting checks. Each walks the document once and returns its
//! findings in document order; none depends on another.

use std::collections::HashSet;

use crate::model::{Alignment, Document, StyleName};
use crate::report::{Category, Finding, Report};
use crate::rules::FormatRules;

/// Runs that name a font outside the allowed set. Inherited fonts pass.
pub fn check_fonts(doc: &Document, rules: &FormatRules) -> Vec<Finding> {
    let mut findings = Vec::new();
    for para in doc.paragraphs() {
        for run in &para.runs {
            let Some(font) = run.font.as_deref() else {
                continue;
            };
            if !rules.allows_font(font) {
                findings.push(
                    Finding::new(Category::Font, format!("Disallowed font: {font}"))
                        .at(&para.text(), rules.excerpt_chars),
                );
            }
        }
    }
    findings
}

fn format_spacing(pts: Option<f32>) -> String {
    match pts {
        Some(v) => format!("{v}pt"),
        None => "inherited".to_string(),
    }
}

/// Paragraphs with explicit, non-zero spacing before or after.
pub fn check_spacing(doc: &Document, rules: &FormatRules) -> Vec<Finding> {
    doc.paragraphs()
        .filter(|p| {
            let nonzero = |v: Option<f32>| v.is_some_and(|pts| pts != 0.0);
            nonzero(p.space_before) || nonzero(p.space_after)
        })
        .map(|p| {
            Finding::new(
                Category::Spacing,
                format!(
                    "Paragraph spacing must be 0pt (before: {}, after: {})",
                    format_spacing(p.space_before),
                    format_spacing(p.space_after)
                ),
            )
            .at(&p.text(), rules.excerpt_chars)
        })
        .collect()
}

/// Justified paragraphs. Every other alignment, explicit or inherited, passes.
pub fn check_alignment(doc: &Document, rules: &FormatRules) -> Vec<Finding> {
    doc.paragraphs()
        .filter(|p| p.alignment == Some(Alignment::Justify))
        .map(|p| {
            Finding::new(Category::Alignment, "Justified alignment is not allowed")
                .at(&p.text(), rules.excerpt_chars)
        })
        .collect()
}

/// One finding per required heading level that no paragraph uses.
pub fn check_heading_levels(doc: &Document, rules: &FormatRules) -> Vec<Finding> {
    let headings: HashSet<&StyleName> = doc
        .paragraphs()
        .map(|p| &p.style)
        .filter(|s| s.is_heading())
        .collect();
    log::debug!("Heading styles in use: {headings:?}");
    let levels: HashSet<u8> = headings.iter().filter_map(|s| s.heading_level()).collect();

    rules
        .required_heading_levels
        .iter()
        .filter(|level| !levels.contains(*level))
        .map(|level| {
            Finding::new(
                Category::HeadingLevel,
                format!("Missing required heading level: {}", StyleName::Heading(*level)),
            )
        })
        .collect()
}

/// Passes when one paragraph mentions every appendix marker. Only the text
/// is checked; the appendix content itself is not inspected.
pub fn check_appendix(doc: &Document, rules: &FormatRules) -> Vec<Finding> {
    let present = doc.paragraphs().any(|p| {
        let text = p.text().to_lowercase();
        rules
            .appendix_markers
            .iter()
            .all(|m| text.contains(&m.to_lowercase()))
    });
    if present {
        Vec::new()
    } else {
        vec![Finding::new(Category::Appendix, rules.appendix_message.clone())]
    }
}

/// Run every check and group the findings into a report.
pub fn run_all(doc: &Document, rules: &FormatRules) -> Report {
    let mut report = Report::new();
    for category in Category::ALL {
        let findings = match category {
            Category::Font => check_fonts(doc, rules),
            Category::Spacing => check_spacing(doc, rules),
            Category::Alignment => check_alignment(doc, rules),
            Category::HeadingLevel => check_heading_levels(doc, rules),
            Category::Appendix => check_appendix(doc, rules),
        };
        log::debug!("{category}: {} finding(s)", findings.len());
        report.extend(category, findings);
    }
    report
}
