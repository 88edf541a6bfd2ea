mod common;

use common::{
    DocxBuilder, W_NS, font_run, footer_xml, instructions, para, read_part, read_part_bytes,
    sect_pr_with_footer, styled, zip_entries,
};
use docxide_review::{Category, Error, FormatRules, process, process_with_rules, review_docx};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A dissertation that satisfies every default rule.
fn compliant() -> DocxBuilder {
    DocxBuilder::new()
        .block(&styled("Title", "On the Behaviour of Things"))
        .block(&styled("Heading1", "Chapter 1: Introduction"))
        .block(&format!("<w:p>{}</w:p>", font_run("Times New Roman", "Body text.")))
        .block(&styled("Heading2", "1.1 Background"))
        .text("Appendix A: IRB approval letter")
}

#[test]
fn compliant_document_gets_a_clean_report_and_both_fields() {
    init_logs();
    let (report, output) = process(&compliant().build()).unwrap();
    assert!(report.is_clean(), "{report}");

    let footer = read_part(&output, "word/footer1.xml").expect("footer created");
    assert_eq!(instructions(&footer), ["PAGE"]);
    let document = read_part(&output, "word/document.xml").unwrap();
    assert_eq!(instructions(&document), [r#"TOC \o "1-3" \h \z \u"#]);
}

#[test]
fn report_text_lists_categories_in_order() {
    let input = DocxBuilder::new()
        .block(&format!("<w:p>{}</w:p>", font_run("Comic Sans", "Intro")))
        .build();
    let (report, _) = process(&input).unwrap();
    let text = report.to_string();

    let positions: Vec<usize> = Category::ALL
        .iter()
        .map(|c| text.find(&format!("### {}", c.label())).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(text.starts_with(
        "### Font Issues\n- Disallowed font: Comic Sans (at \"Intro\")\n### Spacing Issues\n- No issues found\n"
    ));
    assert!(text.ends_with("### Appendix Check\n- Missing Appendix A: IRB approval letter\n"));
}

#[test]
fn report_json_keeps_category_order() {
    let (report, _) = process(&DocxBuilder::new().text("Intro").build()).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    let positions: Vec<usize> = Category::ALL
        .iter()
        .map(|c| json.find(&format!("\"{}\"", c.label())).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["Font Issues"], serde_json::json!([]));
    assert_eq!(
        value["Heading Level Issues"][0]["message"],
        "Missing required heading level: Heading 1"
    );
    assert!(value["Heading Level Issues"][0].get("location").is_none());
}

#[test]
fn bytes_that_are_not_a_zip_are_corrupt() {
    let err = process(b"PK but not really a zip archive").unwrap_err();
    assert!(matches!(err, Error::CorruptDocument(_)), "{err}");
}

#[test]
fn zip_without_main_document_is_corrupt() {
    let input = zip_entries(&[("hello.txt".into(), b"hi".to_vec())]);
    let err = process(&input).unwrap_err();
    assert!(matches!(err, Error::CorruptDocument(_)), "{err}");
}

#[test]
fn malformed_document_xml_is_corrupt() {
    for xml in ["<w:document><w:body>", "<html><body/></html>"] {
        let input = zip_entries(&[("word/document.xml".into(), xml.as_bytes().to_vec())]);
        let err = process(&input).unwrap_err();
        assert!(matches!(err, Error::CorruptDocument(_)), "{xml}: {err}");
    }
}

#[test]
fn document_without_body_is_corrupt() {
    let xml = format!(r#"<w:document xmlns:w="{W_NS}"/>"#);
    let input = zip_entries(&[("word/document.xml".into(), xml.into_bytes())]);
    let err = process(&input).unwrap_err();
    assert!(matches!(err, Error::CorruptDocument(ref m) if m.contains("w:body")), "{err}");
}

#[test]
fn missing_content_types_is_corrupt() {
    let builder = DocxBuilder::new().text("Body");
    let input = zip_entries(&[(
        "word/document.xml".into(),
        builder.document_xml().into_bytes(),
    )]);
    let err = process(&input).unwrap_err();
    assert!(
        matches!(err, Error::CorruptDocument(ref m) if m.contains("[Content_Types].xml")),
        "{err}"
    );
}

#[test]
fn non_utf8_document_is_corrupt() {
    let input = zip_entries(&[("word/document.xml".into(), vec![0xff, 0xfe, b'<', 0x00])]);
    let err = process(&input).unwrap_err();
    assert!(matches!(err, Error::CorruptDocument(ref m) if m.contains("UTF-8")), "{err}");
}

#[test]
fn missing_structure_aborts_without_output_file() {
    let input = DocxBuilder::new()
        .text("Body")
        .trailing_sect_pr(Some(&sect_pr_with_footer("rId99")))
        .build();
    let dir = tempfile::tempdir().unwrap();
    let in_path = dir.path().join("thesis.docx");
    let out_path = dir.path().join("thesis_formatted.docx");
    std::fs::write(&in_path, input).unwrap();

    let err = review_docx(&in_path, &out_path, &FormatRules::default()).unwrap_err();
    assert!(matches!(err, Error::MissingStructure(_)), "{err}");
    assert!(!out_path.exists());
}

#[test]
fn review_docx_writes_the_formatted_file() {
    let dir = tempfile::tempdir().unwrap();
    let in_path = dir.path().join("thesis.docx");
    let out_path = dir.path().join("thesis_formatted.docx");
    std::fs::write(&in_path, compliant().build()).unwrap();

    let report = review_docx(&in_path, &out_path, &FormatRules::default()).unwrap();
    assert!(report.is_clean());
    let written = std::fs::read(&out_path).unwrap();
    let doc = docxide_review::load(&written).unwrap();
    assert!(doc.footer(0).is_some());
}

#[test]
fn review_docx_reports_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = review_docx(
        &dir.path().join("absent.docx"),
        &dir.path().join("out.docx"),
        &FormatRules::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_string().contains("absent.docx"));
}

#[test]
fn injected_fields_do_not_change_a_second_review() {
    let input = DocxBuilder::new()
        .block(&styled("Heading1", "Chapter 1"))
        .block(&format!("<w:p>{}</w:p>", font_run("Papyrus", "Decorative")))
        .build();
    let (first, output) = process(&input).unwrap();
    let (second, _) = process(&output).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.total(), 3);
}

#[test]
fn same_input_gives_same_report() {
    let input = compliant()
        .block(&format!("<w:p>{}</w:p>", font_run("Papyrus", "x")))
        .build();
    let (a, _) = process(&input).unwrap();
    let (b, _) = process(&input).unwrap();
    assert_eq!(a, b);
}

#[test]
fn unrelated_parts_pass_through_unchanged() {
    let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];
    let custom = br#"<?xml version="1.0"?><root><item  spacing = "kept" /></root>"#;
    let input = compliant()
        .footer("rId7", "footer1.xml", &footer_xml(&para("")))
        .trailing_sect_pr(Some(&sect_pr_with_footer("rId7")))
        .part("word/media/image1.png", &png)
        .part("customXml/item1.xml", custom)
        .build();
    let (_, output) = process(&input).unwrap();

    assert_eq!(
        read_part_bytes(&output, "word/media/image1.png").unwrap(),
        png
    );
    assert_eq!(
        read_part_bytes(&output, "customXml/item1.xml").unwrap(),
        custom
    );
    assert_eq!(
        read_part_bytes(&output, "word/styles.xml"),
        read_part_bytes(&input, "word/styles.xml")
    );
    assert!(read_part(&output, "word/footer2.xml").is_none());
}

#[test]
fn rules_file_changes_policy_and_toc() {
    let rules = FormatRules::from_json(
        r#"{"allowed_fonts": ["Garamond"], "toc": {"max_level": 2}, "excerpt_chars": 4}"#,
    )
    .unwrap();
    let (report, output) = process_with_rules(&compliant().build(), &rules).unwrap();

    let fonts = report.get(Category::Font);
    assert_eq!(fonts.len(), 1);
    assert_eq!(fonts[0].location.as_deref(), Some("Body"));

    let document = read_part(&output, "word/document.xml").unwrap();
    assert_eq!(instructions(&document), [r#"TOC \o "1-2" \h \z \u"#]);
}

#[test]
fn invalid_rules_file_is_rejected() {
    let err = FormatRules::from_json(r#"{"allowed_fonts": "Arial"}"#).unwrap_err();
    assert!(matches!(err, Error::Rules(_)));
}
