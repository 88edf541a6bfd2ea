//! Zip container, relationships and content types.

use std::io::{Cursor, Read, Write};

use crate::error::{Error, Result};

use super::xml::{Element, Node};

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub(crate) const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

#[derive(Debug)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// Every part of the input, in archive order.
#[derive(Debug)]
pub(crate) struct Package {
    parts: Vec<Part>,
}

impl Package {
    pub(crate) fn read(bytes: &[u8]) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|_| Error::CorruptDocument("file is not a ZIP archive".into()))?;

        let mut parts = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| Error::CorruptDocument(format!("unreadable zip entry {i}: {e}")))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| Error::CorruptDocument(format!("{name}: {e}")))?;
            parts.push(Part { name, data });
        }
        Ok(Self { parts })
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    /// UTF-8 text of a part, BOM stripped.
    pub(crate) fn read_text(&self, name: &str) -> Option<Result<String>> {
        let part = self.parts.iter().find(|p| p.name == name)?;
        Some(
            std::str::from_utf8(&part.data)
                .map(|s| s.trim_start_matches('\u{feff}').to_string())
                .map_err(|_| Error::CorruptDocument(format!("{name} is not valid UTF-8"))),
        )
    }

    /// Write every part back out. Parts named in `replaced` take the given
    /// content; replaced parts that did not exist before are appended.
    pub(crate) fn write(&self, replaced: &[(String, String)]) -> Result<Vec<u8>> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for part in &self.parts {
            writer.start_file(part.name.as_str(), options)?;
            match replaced.iter().find(|(name, _)| *name == part.name) {
                Some((_, xml)) => writer.write_all(xml.as_bytes())?,
                None => writer.write_all(&part.data)?,
            }
        }
        for (name, xml) in replaced {
            if !self.contains(name) {
                writer.start_file(name.as_str(), options)?;
                writer.write_all(xml.as_bytes())?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// Resolve a relationship target of a part in `base_dir` to a package part name.
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(abs) => abs.to_string(),
        None => format!("{base_dir}/{target}"),
    };
    let mut segments: Vec<&str> = Vec::new();
    for seg in joined.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

pub(crate) fn empty_relationships() -> Element {
    Element {
        prefix: None,
        namespace: Some(PKG_REL_NS.to_string()),
        name: "Relationships".to_string(),
        declarations: vec![(None, PKG_REL_NS.to_string())],
        attributes: Vec::new(),
        children: Vec::new(),
    }
}

/// Target of an internal relationship `id`.
pub(crate) fn relationship_target<'a>(rels: &'a Element, id: &str) -> Option<&'a str> {
    rels.elements()
        .filter(|r| r.name == "Relationship")
        .filter(|r| r.attr(None, "TargetMode") != Some("External"))
        .find(|r| r.attr(None, "Id") == Some(id))
        .and_then(|r| r.attr(None, "Target"))
}

/// Lowest `rIdN` not yet used in `rels`.
pub(crate) fn fresh_relationship_id(rels: &Element) -> String {
    let taken: Vec<&str> = rels
        .elements()
        .filter_map(|r| r.attr(None, "Id"))
        .collect();
    (1..)
        .map(|n| format!("rId{n}"))
        .find(|id| !taken.contains(&id.as_str()))
        .unwrap_or_default()
}

pub(crate) fn add_relationship(rels: &mut Element, id: &str, rel_type: &str, target: &str) {
    let rel = rels
        .child_like("Relationship")
        .with_attr("Id", id)
        .with_attr("Type", rel_type)
        .with_attr("Target", target);
    rels.children.push(Node::Element(rel));
}

/// Register a content-type override for `part_name` unless one exists.
pub(crate) fn add_override(types: &mut Element, part_name: &str, content_type: &str) {
    let part_name = format!("/{part_name}");
    let exists = types
        .elements()
        .filter(|e| e.name == "Override")
        .any(|e| e.attr(None, "PartName") == Some(part_name.as_str()));
    if exists {
        return;
    }
    let over = types
        .child_like("Override")
        .with_attr("PartName", &part_name)
        .with_attr("ContentType", content_type);
    types.children.push(Node::Element(over));
}

pub(crate) fn is_content_types(root: &Element) -> bool {
    root.is(CONTENT_TYPES_NS, "Types")
}
