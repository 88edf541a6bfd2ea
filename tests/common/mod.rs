#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const FOOTER_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

pub const DEFAULT_SECT_PR: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="HeadingAppendix"><w:name w:val="Heading Appendix"/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/></w:style>
<w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/></w:style>
</w:styles>"#;

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `<w:r>` with plain text and no formatting.
pub fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

/// `<w:r>` naming an explicit ASCII font.
pub fn font_run(font: &str, text: &str) -> String {
    format!(
        r#"<w:r><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape(text)
    )
}

pub fn para(text: &str) -> String {
    format!("<w:p>{}</w:p>", run(text))
}

pub fn para_with(ppr: &str, runs: &str) -> String {
    format!("<w:p><w:pPr>{ppr}</w:pPr>{runs}</w:p>")
}

pub fn styled(style_id: &str, text: &str) -> String {
    para_with(&format!(r#"<w:pStyle w:val="{style_id}"/>"#), &run(text))
}

pub fn footer_xml(paragraphs: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:ftr xmlns:w="{W_NS}" xmlns:r="{R_NS}">{paragraphs}</w:ftr>"#
    )
}

/// `w:sectPr` whose default footer is relationship `rel_id`.
pub fn sect_pr_with_footer(rel_id: &str) -> String {
    format!(
        r#"<w:sectPr><w:footerReference w:type="default" r:id="{rel_id}"/><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>"#
    )
}

struct Rel {
    id: String,
    rel_type: String,
    target: String,
}

/// Assembles a minimal but complete DOCX package in memory.
pub struct DocxBuilder {
    body: Vec<String>,
    trailing_sect_pr: Option<String>,
    parts: Vec<(String, Vec<u8>)>,
    footers: Vec<String>,
    rels: Vec<Rel>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            trailing_sect_pr: Some(DEFAULT_SECT_PR.to_string()),
            parts: Vec::new(),
            footers: Vec::new(),
            rels: vec![Rel {
                id: "rId1".into(),
                rel_type: "styles".into(),
                target: "styles.xml".into(),
            }],
        }
    }

    /// Raw block-level XML appended to the body.
    pub fn block(mut self, xml: &str) -> Self {
        self.body.push(xml.to_string());
        self
    }

    pub fn text(self, text: &str) -> Self {
        let p = para(text);
        self.block(&p)
    }

    pub fn trailing_sect_pr(mut self, sect_pr: Option<&str>) -> Self {
        self.trailing_sect_pr = sect_pr.map(String::from);
        self
    }

    /// Add `word/<file>` as a footer part reachable through `rel_id`.
    pub fn footer(mut self, rel_id: &str, file: &str, xml: &str) -> Self {
        self.rels.push(Rel {
            id: rel_id.into(),
            rel_type: "footer".into(),
            target: file.into(),
        });
        self.footers.push(file.to_string());
        self.parts.push((format!("word/{file}"), xml.as_bytes().to_vec()));
        self
    }

    /// Add an arbitrary part (not referenced from anywhere).
    pub fn part(mut self, name: &str, data: &[u8]) -> Self {
        self.parts.push((name.to_string(), data.to_vec()));
        self
    }

    pub fn document_xml(&self) -> String {
        let mut body = self.body.concat();
        if let Some(sect) = &self.trailing_sect_pr {
            body.push_str(sect);
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>{body}</w:body></w:document>"#
        )
    }

    fn content_types_xml(&self) -> String {
        let mut overrides = String::from(
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
        );
        for file in &self.footers {
            overrides.push_str(&format!(
                r#"<Override PartName="/word/{file}" ContentType="{FOOTER_TYPE}"/>"#
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{overrides}</Types>"#
        )
    }

    fn document_rels_xml(&self) -> String {
        let rels: String = self
            .rels
            .iter()
            .map(|r| {
                format!(
                    r#"<Relationship Id="{}" Type="{R_NS}/{}" Target="{}"/>"#,
                    r.id, r.rel_type, r.target
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let package_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{R_NS}/officeDocument" Target="word/document.xml"/></Relationships>"#
        );
        let mut entries: Vec<(String, Vec<u8>)> = vec![
            ("[Content_Types].xml".into(), self.content_types_xml().into_bytes()),
            ("_rels/.rels".into(), package_rels.into_bytes()),
            ("word/document.xml".into(), self.document_xml().into_bytes()),
            (
                "word/_rels/document.xml.rels".into(),
                self.document_rels_xml().into_bytes(),
            ),
            ("word/styles.xml".into(), STYLES_XML.as_bytes().to_vec()),
        ];
        entries.extend(self.parts.iter().cloned());
        zip_entries(&entries)
    }
}

pub fn zip_entries(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in entries {
        writer.start_file(name.as_str(), options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn read_part(docx: &[u8], name: &str) -> Option<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut entry = archive.by_name(name).ok()?;
    let mut content = String::new();
    entry.read_to_string(&mut content).ok()?;
    Some(content)
}

pub fn read_part_bytes(docx: &[u8], name: &str) -> Option<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut entry = archive.by_name(name).ok()?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data).ok()?;
    Some(data)
}

/// `w:instrText` contents of a part, in document order, parsed with roxmltree.
pub fn instructions(xml: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(xml).unwrap();
    doc.descendants()
        .filter(|n| n.tag_name().name() == "instrText" && n.tag_name().namespace() == Some(W_NS))
        .map(|n| n.text().unwrap_or("").to_string())
        .collect()
}
