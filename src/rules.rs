use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::TocOptions;

/// Institutional formatting rules. `Default` is the dissertation policy;
/// a JSON file may override any subset of fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatRules {
    /// Fonts a run may name explicitly. Runs with inherited fonts always pass.
    pub allowed_fonts: Vec<String>,
    /// Heading levels that must each appear at least once.
    pub required_heading_levels: Vec<u8>,
    /// Lower-case markers that must all occur in one paragraph.
    pub appendix_markers: Vec<String>,
    pub appendix_message: String,
    /// Length of the paragraph excerpt attached to findings.
    pub excerpt_chars: usize,
    pub toc: TocOptions,
}

impl Default for FormatRules {
    fn default() -> Self {
        Self {
            allowed_fonts: vec!["Times New Roman".into(), "Arial".into()],
            required_heading_levels: vec![1, 2],
            appendix_markers: vec!["appendix a".into(), "irb".into()],
            appendix_message: "Missing Appendix A: IRB approval letter".into(),
            excerpt_chars: 50,
            toc: TocOptions::default(),
        }
    }
}

impl FormatRules {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn allows_font(&self, font: &str) -> bool {
        self.allowed_fonts.iter().any(|f| f == font)
    }
}
