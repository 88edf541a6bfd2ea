pub(crate) mod package;
mod styles;
pub(crate) mod xml;

use crate::error::{Error, Result};
use crate::model::{
    Alignment, Block, Document, FieldCode, Footer, FooterLink, Paragraph, Run, Section, StyleName,
};

use package::{
    CONTENT_TYPES_PART, DOCUMENT_RELS_PART, Package, add_override, add_relationship,
    empty_relationships, fresh_relationship_id, is_content_types, relationship_target,
    resolve_target,
};
use styles::{StyleSheet, alignment_value, parse_alignment, parse_styles};
use xml::{Element, Node, universal_measure_attr, wml, wml_attr};

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const FOOTER_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
const FOOTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

const DOCUMENT_PART: &str = "word/document.xml";

/// Elements that follow `w:jc` inside `w:pPr`.
const JC_SUCCESSORS: &[&str] = &[
    "textDirection",
    "textAlignment",
    "textboxTightWrap",
    "outlineLvl",
    "divId",
    "cnfStyle",
    "rPr",
    "sectPr",
    "pPrChange",
];

/// Elements that follow the header/footer references inside `w:sectPr`.
const SECT_PR_SUCCESSORS: &[&str] = &[
    "footnotePr",
    "endnotePr",
    "type",
    "pgSz",
    "pgMar",
    "paperSrc",
    "pgBorders",
    "lnNumType",
    "pgNumType",
    "cols",
    "formProt",
    "vAlign",
    "noEndnote",
    "titlePg",
    "textDirection",
    "bidi",
    "rtlGutter",
    "docGrid",
    "printerSettings",
    "sectPrChange",
];

fn collect_run_nodes<'a>(parent: &'a Element, out: &mut Vec<&'a Element>) {
    for child in parent.elements() {
        if child.namespace.as_deref() != Some(WML_NS) {
            continue;
        }
        match child.name.as_str() {
            "r" => out.push(child),
            "hyperlink" | "ins" | "smartTag" | "fldSimple" => collect_run_nodes(child, out),
            "sdt" => {
                if let Some(content) = wml(child, "sdtContent") {
                    collect_run_nodes(content, out);
                }
            }
            _ => {}
        }
    }
}

fn parse_run(run_node: &Element) -> Run {
    let font = wml(run_node, "rPr")
        .and_then(|rpr| wml(rpr, "rFonts"))
        .and_then(|rfonts| rfonts.wml_attr("ascii"))
        .map(String::from);

    let mut text = String::new();
    let mut instr = String::new();
    for child in run_node.elements() {
        if child.namespace.as_deref() != Some(WML_NS) {
            continue;
        }
        match child.name.as_str() {
            "t" => text.push_str(&child.text()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            "noBreakHyphen" => text.push('-'),
            "instrText" => instr.push_str(&child.text()),
            _ => {}
        }
    }

    let field_code = if instr.trim().is_empty() {
        None
    } else {
        Some(FieldCode::parse(&instr))
    };

    Run {
        text,
        font,
        field_code,
    }
}

fn parse_paragraph(element: Element, styles: &StyleSheet) -> Paragraph {
    let ppr = wml(&element, "pPr");
    let style = styles.resolve(ppr.and_then(|ppr| wml_attr(ppr, "pStyle")));
    let alignment = ppr
        .and_then(|ppr| wml_attr(ppr, "jc"))
        .and_then(parse_alignment);
    let spacing = ppr.and_then(|ppr| wml(ppr, "spacing"));
    let space_before = spacing.and_then(|n| universal_measure_attr(n, "before"));
    let space_after = spacing.and_then(|n| universal_measure_attr(n, "after"));

    let mut run_nodes = Vec::new();
    collect_run_nodes(&element, &mut run_nodes);
    let runs = run_nodes.into_iter().map(parse_run).collect();

    Paragraph {
        style,
        alignment,
        space_before,
        space_after,
        runs,
        element,
    }
}

fn parse_blocks(children: Vec<Node>, styles: &StyleSheet) -> Vec<Block> {
    children
        .into_iter()
        .map(|child| match child {
            Node::Element(el) if el.is_wml("p") => Block::Paragraph(parse_paragraph(el, styles)),
            other => Block::Other(other),
        })
        .collect()
}

fn blocks_to_nodes(blocks: &[Block]) -> Vec<Node> {
    blocks
        .iter()
        .map(|b| match b {
            Block::Paragraph(p) => Node::Element(p.element.clone()),
            Block::Other(node) => node.clone(),
        })
        .collect()
}

/// The `w:sectPr` carried by a body block, if any.
fn section_properties(block: &Block) -> Option<&Element> {
    match block {
        Block::Paragraph(p) => wml(&p.element, "pPr").and_then(|ppr| wml(ppr, "sectPr")),
        Block::Other(Node::Element(e)) if e.is_wml("sectPr") => Some(e),
        Block::Other(_) => None,
    }
}

fn section_properties_mut(block: &mut Block) -> Option<&mut Element> {
    match block {
        Block::Paragraph(p) => p
            .element
            .elements_mut()
            .find(|e| e.is_wml("pPr"))?
            .elements_mut()
            .find(|e| e.is_wml("sectPr")),
        Block::Other(Node::Element(e)) if e.is_wml("sectPr") => Some(e),
        Block::Other(_) => None,
    }
}

fn parse_footer(part_name: String, xml_content: &str, styles: &StyleSheet) -> Result<Footer> {
    let mut root = Element::parse(xml_content)
        .map_err(|e| Error::CorruptDocument(format!("{part_name}: {e}")))?;
    let children = std::mem::take(&mut root.children);
    Ok(Footer {
        blocks: parse_blocks(children, styles),
        part_name,
        root,
    })
}

/// Resolve the default footer of a section, parsing its part on first use.
fn link_footer(
    sect_pr: &Element,
    rels: &Element,
    package: &Package,
    styles: &StyleSheet,
    footers: &mut Vec<Footer>,
) -> Result<FooterLink> {
    let Some(reference) = sect_pr.elements().find(|e| {
        e.is_wml("footerReference") && e.wml_attr("type").is_none_or(|t| t == "default")
    }) else {
        return Ok(FooterLink::Inherited);
    };
    let rel_id = reference.attr(Some(REL_NS), "id").unwrap_or_default();
    let Some(target) = relationship_target(rels, rel_id) else {
        log::warn!("Footer reference {rel_id:?} has no relationship");
        return Ok(FooterLink::Unresolved(rel_id.to_string()));
    };

    let part_name = resolve_target("word", target);
    if let Some(idx) = footers.iter().position(|f| f.part_name == part_name) {
        return Ok(FooterLink::Defined(idx));
    }
    let Some(xml_content) = package.read_text(&part_name) else {
        log::warn!("Footer reference {rel_id:?} points at missing part {part_name}");
        return Ok(FooterLink::Unresolved(rel_id.to_string()));
    };
    footers.push(parse_footer(part_name, &xml_content?, styles)?);
    Ok(FooterLink::Defined(footers.len() - 1))
}

/// Read a DOCX package into a [`Document`].
pub fn load(bytes: &[u8]) -> Result<Document> {
    let package = Package::read(bytes)?;
    let styles = parse_styles(&package);

    let xml_content = package.read_text(DOCUMENT_PART).ok_or_else(|| {
        Error::CorruptDocument("missing word/document.xml (is this a DOCX file?)".into())
    })??;
    let mut root = Element::parse(&xml_content)?;
    if !root.is_wml("document") {
        return Err(Error::CorruptDocument(format!(
            "unexpected root element <{}> in {DOCUMENT_PART}",
            root.name
        )));
    }
    let body_el = root
        .elements_mut()
        .find(|e| e.is_wml("body"))
        .ok_or_else(|| Error::CorruptDocument("missing w:body".into()))?;
    let body_children = std::mem::take(&mut body_el.children);

    let relationships = match package.read_text(DOCUMENT_RELS_PART) {
        Some(text) => Element::parse(&text?)?,
        None => empty_relationships(),
    };
    let content_types = package
        .read_text(CONTENT_TYPES_PART)
        .ok_or_else(|| Error::CorruptDocument(format!("missing {CONTENT_TYPES_PART}")))??;
    let content_types = Element::parse(&content_types)?;
    if !is_content_types(&content_types) {
        return Err(Error::CorruptDocument(format!(
            "{CONTENT_TYPES_PART} is not a content types part"
        )));
    }

    let body = parse_blocks(body_children, &styles);
    let mut footers = Vec::new();
    let mut sections = Vec::new();
    for (site, block) in body.iter().enumerate() {
        if let Some(sect_pr) = section_properties(block) {
            let footer = link_footer(sect_pr, &relationships, &package, &styles, &mut footers)?;
            sections.push(Section { footer, site });
        }
    }

    let doc = Document {
        sections,
        footers,
        body,
        root,
        default_style: styles.default_style(),
        package,
        relationships,
        content_types,
    };
    log::info!(
        "Loaded document: {} paragraphs, {} sections, {} footers",
        doc.paragraphs().count(),
        doc.sections.len(),
        doc.footers.len()
    );
    Ok(doc)
}

/// Write a [`Document`] back out as DOCX bytes. Parts the model does not
/// cover are copied through unchanged.
pub fn serialize(doc: &Document) -> Result<Vec<u8>> {
    let mut root = doc.root.clone();
    let body_el = root
        .elements_mut()
        .find(|e| e.is_wml("body"))
        .ok_or_else(|| Error::MissingStructure("document lost its w:body".into()))?;
    body_el.children = blocks_to_nodes(&doc.body);

    let mut replaced = vec![(DOCUMENT_PART.to_string(), root.to_part_xml())];
    for footer in &doc.footers {
        let mut footer_root = footer.root.clone();
        footer_root.children = blocks_to_nodes(&footer.blocks);
        replaced.push((footer.part_name.clone(), footer_root.to_part_xml()));
    }
    replaced.push((
        DOCUMENT_RELS_PART.to_string(),
        doc.relationships.to_part_xml(),
    ));
    replaced.push((
        CONTENT_TYPES_PART.to_string(),
        doc.content_types.to_part_xml(),
    ));

    doc.package.write(&replaced)
}

impl Paragraph {
    pub(crate) fn empty(style: StyleName) -> Self {
        Paragraph {
            style,
            alignment: None,
            space_before: None,
            space_after: None,
            runs: Vec::new(),
            element: Element::wml("p"),
        }
    }

    pub(crate) fn set_alignment(&mut self, alignment: Alignment) {
        if wml(&self.element, "pPr").is_none() {
            self.element
                .children
                .insert(0, Node::Element(Element::wml("pPr")));
        }
        let value = alignment_value(alignment);
        self.element.edit_wml_child("pPr", &[], |ppr| {
            ppr.edit_wml_child("jc", JC_SUCCESSORS, |jc| jc.set_wml_attr("val", value));
        });
        self.alignment = Some(alignment);
    }

    pub(crate) fn append_run(&mut self, run: Element) {
        self.runs.push(parse_run(&run));
        self.element.children.push(Node::Element(run));
    }
}

impl Document {
    /// Create an empty default footer for `section` and reference it from the
    /// section's properties. Returns the new footer's index.
    pub(crate) fn create_footer(&mut self, section: usize) -> Result<usize> {
        let part_name = (1..)
            .map(|n| format!("word/footer{n}.xml"))
            .find(|name| {
                !self.package.contains(name) && self.footers.iter().all(|f| f.part_name != *name)
            })
            .unwrap_or_default();
        let rel_id = fresh_relationship_id(&self.relationships);

        let rel_prefix = self
            .root
            .declarations
            .iter()
            .find(|(_, uri)| uri == REL_NS)
            .and_then(|(prefix, _)| prefix.clone());
        let rel_prefix = match rel_prefix {
            Some(prefix) => prefix,
            None => {
                self.root.declare("r", REL_NS);
                "r".to_string()
            }
        };
        let mut reference = Element::wml("footerReference").with_wml_attr("type", "default");
        reference.set_attr(&rel_prefix, REL_NS, "id", &rel_id);

        let site = self
            .sections
            .get(section)
            .map(|s| s.site)
            .ok_or_else(|| Error::MissingStructure(format!("no section {}", section + 1)))?;
        let sect_pr = self
            .body
            .get_mut(site)
            .and_then(section_properties_mut)
            .ok_or_else(|| {
                Error::MissingStructure(format!(
                    "section {} has no section properties",
                    section + 1
                ))
            })?;
        sect_pr.insert_wml(reference, SECT_PR_SUCCESSORS);

        let target = part_name.trim_start_matches("word/").to_string();
        add_relationship(&mut self.relationships, &rel_id, FOOTER_REL_TYPE, &target);
        add_override(&mut self.content_types, &part_name, FOOTER_CONTENT_TYPE);

        let mut root = Element::wml("ftr");
        root.declare("w", WML_NS);
        root.declare("r", REL_NS);
        log::info!("Created {part_name} ({rel_id}) for section {}", section + 1);
        self.footers.push(Footer {
            part_name,
            root,
            blocks: vec![Block::Paragraph(Paragraph::empty(self.default_style.clone()))],
        });

        let idx = self.footers.len() - 1;
        self.sections[section].footer = FooterLink::Defined(idx);
        Ok(idx)
    }
}
