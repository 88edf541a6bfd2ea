use std::fmt;

use serde::{Deserialize, Serialize};

use crate::docx::xml::{Element, Node};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distribute,
}

/// Display name of a paragraph style. Built-in names get their own variants
/// so the heading rules never depend on string matching.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StyleName {
    Normal,
    Title,
    Subtitle,
    Heading(u8),
    Custom(String),
}

impl StyleName {
    /// Map a style's display name (as Word shows it, or the lower-case
    /// built-in form stored in styles.xml) onto a `StyleName`.
    pub fn from_display(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "normal" => return StyleName::Normal,
            "title" => return StyleName::Title,
            "subtitle" => return StyleName::Subtitle,
            _ => {}
        }
        if let Some(level) = lower
            .strip_prefix("heading ")
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=9).contains(n))
        {
            return StyleName::Heading(level);
        }
        StyleName::Custom(name.to_string())
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self {
            StyleName::Heading(level) => Some(*level),
            _ => None,
        }
    }

    /// True for every style whose display name starts with "Heading",
    /// including custom ones such as "Heading Appendix".
    pub fn is_heading(&self) -> bool {
        match self {
            StyleName::Heading(_) => true,
            StyleName::Custom(name) => name.starts_with("Heading"),
            _ => false,
        }
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleName::Normal => f.write_str("Normal"),
            StyleName::Title => f.write_str("Title"),
            StyleName::Subtitle => f.write_str("Subtitle"),
            StyleName::Heading(level) => write!(f, "Heading {level}"),
            StyleName::Custom(name) => f.write_str(name),
        }
    }
}

/// Switches of a `TOC` field instruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocOptions {
    /// Outline levels collected (`\o "min-max"`).
    pub min_level: u8,
    pub max_level: u8,
    /// `\h`: entries are hyperlinks.
    pub hyperlinks: bool,
    /// `\z`: hide tab leader and page numbers in Web layout view only.
    pub hide_in_web_layout: bool,
    /// `\u`: use paragraph outline levels.
    pub use_outline_levels: bool,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: 3,
            hyperlinks: true,
            hide_in_web_layout: true,
            use_outline_levels: true,
        }
    }
}

impl TocOptions {
    pub fn instruction(&self) -> String {
        let mut instr = format!("TOC \\o \"{}-{}\"", self.min_level, self.max_level);
        if self.hyperlinks {
            instr.push_str(" \\h");
        }
        if self.hide_in_web_layout {
            instr.push_str(" \\z");
        }
        if self.use_outline_levels {
            instr.push_str(" \\u");
        }
        instr
    }

    /// Parse the switches of a `TOC` instruction. Unknown switches are ignored.
    pub fn parse(instr: &str) -> Option<Self> {
        let mut words = instr.split_whitespace();
        if !words.next()?.eq_ignore_ascii_case("TOC") {
            return None;
        }
        let mut opts = TocOptions {
            min_level: 1,
            max_level: 9,
            hyperlinks: false,
            hide_in_web_layout: false,
            use_outline_levels: false,
        };
        while let Some(word) = words.next() {
            match word {
                "\\o" => {
                    let Some(range) = words.next() else { continue };
                    let range = range.trim_matches('"');
                    if let Some((lo, hi)) = range.split_once('-')
                        && let (Ok(lo), Ok(hi)) = (lo.parse(), hi.parse())
                    {
                        opts.min_level = lo;
                        opts.max_level = hi;
                    }
                }
                "\\h" => opts.hyperlinks = true,
                "\\z" => opts.hide_in_web_layout = true,
                "\\u" => opts.use_outline_levels = true,
                _ => {}
            }
        }
        Some(opts)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldCode {
    Page,
    TableOfContents(TocOptions),
    Other(String),
}

impl FieldCode {
    pub fn instruction(&self) -> String {
        match self {
            FieldCode::Page => "PAGE".to_string(),
            FieldCode::TableOfContents(opts) => opts.instruction(),
            FieldCode::Other(instr) => instr.clone(),
        }
    }

    pub fn parse(instr: &str) -> Self {
        let instr = instr.trim();
        let keyword = instr.split_whitespace().next().unwrap_or("");
        if keyword.eq_ignore_ascii_case("PAGE") {
            return FieldCode::Page;
        }
        if let Some(opts) = TocOptions::parse(instr) {
            return FieldCode::TableOfContents(opts);
        }
        FieldCode::Other(instr.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct Run {
    pub text: String,
    /// Explicit `w:rFonts/@w:ascii`. `None` means the font is inherited.
    pub font: Option<String>,
    pub field_code: Option<FieldCode>,
}

#[derive(Clone, Debug)]
pub struct Paragraph {
    pub style: StyleName,
    /// `None` when the paragraph has no `w:jc` of its own.
    pub alignment: Option<Alignment>,
    /// Points. `None` when inherited.
    pub space_before: Option<f32>,
    pub space_after: Option<f32>,
    pub runs: Vec<Run>,
    pub(crate) element: Element,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldCode> {
        self.runs.iter().filter_map(|r| r.field_code.as_ref())
    }
}

#[derive(Clone, Debug)]
pub enum Block {
    Paragraph(Paragraph),
    /// Tables, section properties, whitespace: kept verbatim.
    Other(Node),
}

fn paragraphs(blocks: &[Block]) -> impl Iterator<Item = &Paragraph> {
    blocks.iter().filter_map(|b| match b {
        Block::Paragraph(p) => Some(p),
        Block::Other(_) => None,
    })
}

#[derive(Clone, Debug)]
pub struct Footer {
    pub part_name: String,
    /// `w:ftr` with its children moved into `blocks`.
    pub(crate) root: Element,
    pub(crate) blocks: Vec<Block>,
}

impl Footer {
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        paragraphs(&self.blocks)
    }

    /// Apply `f` to the footer's first paragraph, appending a new paragraph
    /// of `style` when the footer has none.
    pub(crate) fn edit_first_paragraph(
        &mut self,
        style: &StyleName,
        f: impl FnOnce(&mut Paragraph),
    ) {
        let first = self.blocks.iter_mut().find_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Other(_) => None,
        });
        match first {
            Some(paragraph) => f(paragraph),
            None => {
                let mut paragraph = Paragraph::empty(style.clone());
                f(&mut paragraph);
                self.blocks.push(Block::Paragraph(paragraph));
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FooterLink {
    /// Index into `Document::footers`.
    Defined(usize),
    /// No default footer reference; Word reuses the previous section's.
    Inherited,
    /// The reference names a relationship or part that does not exist.
    Unresolved(String),
}

#[derive(Clone, Debug)]
pub struct Section {
    pub footer: FooterLink,
    /// Body block holding this section's `w:sectPr`.
    pub(crate) site: usize,
}

#[derive(Debug)]
pub struct Document {
    pub sections: Vec<Section>,
    pub footers: Vec<Footer>,
    pub(crate) body: Vec<Block>,
    /// `w:document` with the children of `w:body` moved into `body`.
    pub(crate) root: Element,
    pub(crate) default_style: StyleName,
    pub(crate) package: crate::docx::package::Package,
    pub(crate) relationships: Element,
    pub(crate) content_types: Element,
}

impl Document {
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        paragraphs(&self.body)
    }

    pub fn footer(&self, section: usize) -> Option<&Footer> {
        match self.sections.get(section)?.footer {
            FooterLink::Defined(idx) => self.footers.get(idx),
            _ => None,
        }
    }

    /// Insert `paragraph` directly before the first body paragraph.
    /// Returns false when the body has no paragraph to insert before.
    pub(crate) fn insert_before_first_paragraph(&mut self, paragraph: Paragraph) -> bool {
        let Some(at) = self
            .body
            .iter()
            .position(|b| matches!(b, Block::Paragraph(_)))
        else {
            return false;
        };
        self.body.insert(at, Block::Paragraph(paragraph));
        for section in &mut self.sections {
            if section.site >= at {
                section.site += 1;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_instructions_are_classified() {
        assert_eq!(FieldCode::parse(" PAGE  \\* MERGEFORMAT "), FieldCode::Page);
        assert_eq!(
            FieldCode::parse(r#"TOC \o "1-3" \h \z \u"#),
            FieldCode::TableOfContents(TocOptions::default())
        );
        assert_eq!(
            FieldCode::parse("NUMPAGES"),
            FieldCode::Other("NUMPAGES".into())
        );
    }

    #[test]
    fn toc_without_level_switch_covers_all_levels() {
        let opts = TocOptions::parse(r#"TOC \h \f "x""#).unwrap();
        assert_eq!((opts.min_level, opts.max_level), (1, 9));
        assert!(opts.hyperlinks);
        assert!(!opts.use_outline_levels);
        assert!(TocOptions::parse("PAGEREF _Toc1 \\h").is_none());
    }

    #[test]
    fn custom_heading_styles_count_as_headings() {
        assert!(StyleName::Custom("Heading Appendix".into()).is_heading());
        assert!(!StyleName::Custom("Body Heading".into()).is_heading());
        assert_eq!(StyleName::Custom("Heading Appendix".into()).heading_level(), None);
        assert_eq!(StyleName::Heading(3).heading_level(), Some(3));
    }
}
