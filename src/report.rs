use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Font,
    Spacing,
    Alignment,
    HeadingLevel,
    Appendix,
}

impl Category {
    /// Report order.
    pub const ALL: [Category; 5] = [
        Category::Font,
        Category::Spacing,
        Category::Alignment,
        Category::HeadingLevel,
        Category::Appendix,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Font => "Font Issues",
            Category::Spacing => "Spacing Issues",
            Category::Alignment => "Alignment Issues",
            Category::HeadingLevel => "Heading Level Issues",
            Category::Appendix => "Appendix Check",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Finding {
    pub category: Category,
    pub message: String,
    /// Leading characters of the offending paragraph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Finding {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, text: &str, max_chars: usize) -> Self {
        self.location = Some(excerpt(text, max_chars));
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} (at \"{loc}\")", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// First `max_chars` characters of `text`.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Findings grouped by category, always holding all five categories in
/// report order.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    groups: Vec<(Category, Vec<Finding>)>,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            groups: Category::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, category: Category, findings: Vec<Finding>) {
        if let Some((_, list)) = self.groups.iter_mut().find(|(c, _)| *c == category) {
            list.extend(findings);
        }
    }

    pub fn get(&self, category: Category) -> &[Finding] {
        self.groups
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, list)| list.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Finding])> {
        self.groups.iter().map(|(c, list)| (*c, list.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, list)| list.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (category, findings) in &self.groups {
            map.serialize_entry(category.label(), findings)?;
        }
        map.end()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (category, findings) in self.iter() {
            writeln!(f, "### {category}")?;
            if findings.is_empty() {
                writeln!(f, "- No issues found")?;
            }
            for finding in findings {
                writeln!(f, "- {finding}")?;
            }
        }
        Ok(())
    }
}
