//! Dynamic field injection: page numbers in footers and a table of contents
//! at the start of the body.

use std::collections::HashSet;

use crate::docx::xml::{Element, XML_NS};
use crate::error::{Error, Result};
use crate::model::{Alignment, Document, FieldCode, FooterLink, Paragraph, TocOptions};

/// A single run holding a complete `begin` / instruction / `end` field.
/// `dirty` asks the consuming application to refresh the field on open.
fn field_run(code: &FieldCode, dirty: bool) -> Element {
    let mut begin = Element::wml("fldChar").with_wml_attr("fldCharType", "begin");
    if dirty {
        begin.set_wml_attr("dirty", "true");
    }
    let mut instr = Element::wml("instrText").with_text(&code.instruction());
    instr.set_attr("xml", XML_NS, "space", "preserve");
    let end = Element::wml("fldChar").with_wml_attr("fldCharType", "end");

    Element::wml("r")
        .with_child(begin)
        .with_child(instr)
        .with_child(end)
}

/// Append a dynamic field to the end of `paragraph`.
pub fn insert_dynamic_field(paragraph: &mut Paragraph, code: &FieldCode, dirty: bool) {
    paragraph.append_run(field_run(code, dirty));
}

/// Center the first paragraph of every section's footer and append a live
/// `PAGE` field to it. Sections without a footer of their own share the
/// previous section's; the first such section gets a new footer part. A
/// footer shared by several sections is stamped once.
pub fn add_page_numbers(doc: &mut Document) -> Result<()> {
    if doc.sections.is_empty() {
        return Err(Error::MissingStructure(
            "document has no sections to number".into(),
        ));
    }

    let style = doc.default_style.clone();
    let mut stamped = HashSet::new();
    let mut previous: Option<usize> = None;
    for section in 0..doc.sections.len() {
        let footer = match doc.sections[section].footer.clone() {
            FooterLink::Defined(idx) => idx,
            FooterLink::Inherited => match previous {
                Some(idx) => idx,
                None => doc.create_footer(section)?,
            },
            FooterLink::Unresolved(rel_id) => {
                return Err(Error::MissingStructure(format!(
                    "section {} references footer {rel_id:?}, which is not in the package",
                    section + 1
                )));
            }
        };
        previous = Some(footer);
        if !stamped.insert(footer) {
            continue;
        }

        doc.footers[footer].edit_first_paragraph(&style, |paragraph| {
            paragraph.set_alignment(Alignment::Center);
            insert_dynamic_field(paragraph, &FieldCode::Page, false);
        });
        log::debug!(
            "Page number field added to {} (section {})",
            doc.footers[footer].part_name,
            section + 1
        );
    }
    Ok(())
}

/// Insert a table-of-contents field paragraph before the first body
/// paragraph. Word builds the entries when it refreshes the field.
pub fn insert_table_of_contents(doc: &mut Document, options: &TocOptions) -> Result<()> {
    let mut toc = Paragraph::empty(doc.default_style.clone());
    insert_dynamic_field(
        &mut toc,
        &FieldCode::TableOfContents(options.clone()),
        true,
    );
    if !doc.insert_before_first_paragraph(toc) {
        return Err(Error::MissingStructure(
            "document body has no paragraph to place the table of contents before".into(),
        ));
    }
    log::debug!("Table of contents inserted ({})", options.instruction());
    Ok(())
}
