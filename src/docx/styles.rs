use std::collections::HashMap;

use crate::model::{Alignment, StyleName};

use super::WML_NS;
use super::package::Package;

const STYLES_PART: &str = "word/styles.xml";

/// Paragraph styles by id, plus the style applied when a paragraph names none.
pub(super) struct StyleSheet {
    pub(super) paragraph_styles: HashMap<String, StyleName>,
    pub(super) default_paragraph: Option<StyleName>,
}

impl StyleSheet {
    /// Style of a paragraph carrying `w:pStyle = style_id`. Unknown ids fall
    /// back to the default paragraph style, as Word does.
    pub(super) fn resolve(&self, style_id: Option<&str>) -> StyleName {
        style_id
            .and_then(|id| self.paragraph_styles.get(id))
            .or(self.default_paragraph.as_ref())
            .cloned()
            .unwrap_or(StyleName::Normal)
    }

    pub(super) fn default_style(&self) -> StyleName {
        self.resolve(None)
    }
}

pub(super) fn parse_alignment(val: &str) -> Option<Alignment> {
    match val {
        "left" | "start" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "both" => Some(Alignment::Justify),
        "distribute" | "highKashida" | "lowKashida" | "mediumKashida" | "thaiDistribute" => {
            Some(Alignment::Distribute)
        }
        _ => None,
    }
}

pub(super) fn alignment_value(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
        Alignment::Distribute => "distribute",
    }
}

/// `ST_OnOff` truth value.
fn is_on(value: &str) -> bool {
    matches!(value, "1" | "true" | "on")
}

fn wml_val<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.tag_name().name() == child && n.tag_name().namespace() == Some(WML_NS))
        .and_then(|n| n.attribute((WML_NS, "val")))
}

pub(super) fn parse_styles(package: &Package) -> StyleSheet {
    let mut paragraph_styles = HashMap::new();
    let mut default_paragraph = None;

    let Some(Ok(xml_content)) = package.read_text(STYLES_PART) else {
        return StyleSheet {
            paragraph_styles,
            default_paragraph,
        };
    };
    let xml = match roxmltree::Document::parse(&xml_content) {
        Ok(xml) => xml,
        Err(e) => {
            log::warn!("Ignoring unparsable {STYLES_PART}: {e}");
            return StyleSheet {
                paragraph_styles,
                default_paragraph,
            };
        }
    };

    for style_node in xml.root_element().children() {
        if style_node.tag_name().name() != "style"
            || style_node.tag_name().namespace() != Some(WML_NS)
        {
            continue;
        }
        if style_node.attribute((WML_NS, "type")) != Some("paragraph") {
            continue;
        }
        let Some(style_id) = style_node.attribute((WML_NS, "styleId")) else {
            continue;
        };
        let name = wml_val(style_node, "name")
            .map(StyleName::from_display)
            .unwrap_or_else(|| StyleName::from_display(style_id));

        let is_default = style_node
            .attribute((WML_NS, "default"))
            .is_some_and(is_on);
        if is_default {
            default_paragraph = Some(name.clone());
        }

        paragraph_styles.insert(style_id.to_string(), name);
    }

    log::debug!(
        "Parsed {} paragraph styles (default: {})",
        paragraph_styles.len(),
        default_paragraph
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into())
    );

    StyleSheet {
        paragraph_styles,
        default_paragraph,
    }
}
