//! Check a DOCX dissertation against institutional formatting rules, then
//! inject a live page number into every footer and a table-of-contents field
//! at the start of the body.
//!
//! ```no_run
//! let input = std::fs::read("thesis.docx")?;
//! let (report, output) = docxide_review::process(&input)?;
//! println!("{report}");
//! std::fs::write("thesis_formatted.docx", output)?;
//! # Ok::<(), docxide_review::Error>(())
//! ```

pub mod checks;
mod docx;
mod error;
pub mod fields;
mod model;
mod report;
mod rules;

pub use docx::{load, serialize};
pub use error::{Error, Result};
pub use model::{
    Alignment, Document, FieldCode, Footer, FooterLink, Paragraph, Run, Section, StyleName,
    TocOptions,
};
pub use report::{Category, Finding, Report, excerpt};
pub use rules::FormatRules;

use std::path::Path;
use std::time::Instant;

/// Review `input` with the default rules. See [`process_with_rules`].
pub fn process(input: &[u8]) -> Result<(Report, Vec<u8>)> {
    process_with_rules(input, &FormatRules::default())
}

/// Load, check, inject page-number and table-of-contents fields, serialize.
/// Checks run before any mutation, so injected markup never shows up in the
/// report. Any failure aborts the whole run and nothing is returned.
pub fn process_with_rules(input: &[u8], rules: &FormatRules) -> Result<(Report, Vec<u8>)> {
    let t0 = Instant::now();

    let mut doc = docx::load(input)?;
    let t_load = t0.elapsed();

    let report = checks::run_all(&doc, rules);
    let t_check = t0.elapsed();

    fields::add_page_numbers(&mut doc)?;
    fields::insert_table_of_contents(&mut doc, &rules.toc)?;
    let t_inject = t0.elapsed();

    let bytes = docx::serialize(&doc)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: load={:.1}ms, check={:.1}ms, inject={:.1}ms, serialize={:.1}ms, total={:.1}ms ({} findings, output {} bytes)",
        t_load.as_secs_f64() * 1000.0,
        (t_check - t_load).as_secs_f64() * 1000.0,
        (t_inject - t_check).as_secs_f64() * 1000.0,
        (t_total - t_inject).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        report.total(),
        bytes.len(),
    );

    Ok((report, bytes))
}

/// File-to-file convenience over [`process_with_rules`]. The output file is
/// only written when the whole run succeeds.
pub fn review_docx(input: &Path, output: &Path, rules: &FormatRules) -> Result<Report> {
    let bytes = std::fs::read(input).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, input.display())),
        ),
        _ => Error::Io(e),
    })?;
    let (report, formatted) = process_with_rules(&bytes, rules)?;
    std::fs::write(output, &formatted)?;
    Ok(report)
}
