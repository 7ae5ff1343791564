/*!
 * Tests for the chapter document tree: parsing, locators, serialization
 */

use epubtrans::document::Document;

#[test]
fn test_parse_simpleChapter_shouldFindParagraphs() {
    let doc = Document::parse(
        b"<html><body><p>First.</p><div><p>Second.</p></div></body></html>",
    );
    let paragraphs = doc.paragraphs();
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(doc.collect_text(paragraphs[0]), "First.");
    assert_eq!(doc.collect_text(paragraphs[1]), "Second.");
}

#[test]
fn test_parse_namespacedParagraph_shouldMatchLocalName() {
    let doc = Document::parse(b"<html><body><xhtml:p>Hello</xhtml:p></body></html>");
    assert_eq!(doc.paragraphs().len(), 1);
}

#[test]
fn test_collectText_mixedContent_shouldIncludeTailsInOrder() {
    let doc = Document::parse(b"<html><body><p>a <em>b</em> c <span>d</span>e</p></body></html>");
    let p = doc.paragraphs()[0];
    assert_eq!(doc.collect_text(p), "a b c de");
}

#[test]
fn test_nodePath_uniqueTags_shouldOmitPositions() {
    let doc = Document::parse(b"<html><body><p>x</p></body></html>");
    let p = doc.paragraphs()[0];
    assert_eq!(doc.node_path(p), "/html/body/p");
}

#[test]
fn test_nodePath_repeatedTags_shouldCarryPositions() {
    let doc = Document::parse(b"<html><body><p>one</p><p>two</p><p>three</p></body></html>");
    let paragraphs = doc.paragraphs();
    assert_eq!(doc.node_path(paragraphs[0]), "/html/body/p[1]");
    assert_eq!(doc.node_path(paragraphs[1]), "/html/body/p[2]");
    assert_eq!(doc.node_path(paragraphs[2]), "/html/body/p[3]");
}

#[test]
fn test_nodePath_shouldBeUniquePerChapter() {
    let doc = Document::parse(
        b"<html><body><div><p>a</p></div><div><p>b</p></div></body></html>",
    );
    let paths: Vec<String> = doc
        .paragraphs()
        .iter()
        .map(|&p| doc.node_path(p))
        .collect();
    let mut deduped = paths.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), paths.len());
}

#[test]
fn test_serialize_untouchedVoidElements_shouldStaySelfClosing() {
    let doc = Document::parse(b"<html><body><p>a<br/>b</p><img src='x.png'/></body></html>");
    let out = String::from_utf8(doc.to_bytes()).unwrap();
    assert!(out.contains("<br/>"));
    assert!(out.contains("<img src=\"x.png\"/>"));
}

#[test]
fn test_serialize_emptyTextElement_shouldUseOpenClosePair() {
    let mut doc = Document::parse(b"<html><body><p><span>x</span></p></body></html>");
    let p = doc.paragraphs()[0];
    let span = doc.children(p)[0];
    doc.node_mut(span).text = Some(String::new());
    let out = String::from_utf8(doc.to_bytes()).unwrap();
    assert!(out.contains("<span></span>"));
    assert!(!out.contains("<span/>"));
}

#[test]
fn test_serialize_attributes_shouldBePreserved() {
    let doc = Document::parse(
        b"<html><body><p class='cotx' id='p1'><span style='font-size:80%'>small</span></p></body></html>",
    );
    let out = String::from_utf8(doc.to_bytes()).unwrap();
    assert!(out.contains("class=\"cotx\""));
    assert!(out.contains("id=\"p1\""));
    assert!(out.contains("style=\"font-size:80%\""));
}

#[test]
fn test_serialize_xmlDeclaration_shouldRoundTrip() {
    let doc = Document::parse(
        b"<?xml version='1.0' encoding='utf-8'?>\n<html><body><p>x</p></body></html>",
    );
    let out = String::from_utf8(doc.to_bytes()).unwrap();
    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
}

#[test]
fn test_serialize_comment_shouldRoundTrip() {
    let doc = Document::parse(b"<html><body><!-- keep me --><p>x</p></body></html>");
    let out = String::from_utf8(doc.to_bytes()).unwrap();
    assert!(out.contains("<!-- keep me -->"));
}

#[test]
fn test_parse_escapedEntities_shouldDecodeAndReencode() {
    let doc = Document::parse(b"<html><body><p>Fish &amp; chips &lt;here&gt;</p></body></html>");
    let p = doc.paragraphs()[0];
    assert_eq!(doc.collect_text(p), "Fish & chips <here>");
    let out = String::from_utf8(doc.to_bytes()).unwrap();
    assert!(out.contains("Fish &amp; chips &lt;here&gt;"));
}

#[test]
fn test_parse_unknownEntity_shouldSurviveRoundTrip() {
    // &nbsp; is not a predefined XML entity but is everywhere in EPUB content.
    let doc = Document::parse(b"<html><body><p>a&nbsp;b</p></body></html>");
    let out = String::from_utf8(doc.to_bytes()).unwrap();
    assert!(out.contains("a&nbsp;b"));
}

#[test]
fn test_parse_malformedMarkup_shouldDegradeWithoutPanicking() {
    // Unclosed tags and stray end tags must never abort a run.
    let doc = Document::parse(b"<html><body><p>open <em>nested</p></body>");
    assert!(!doc.paragraphs().is_empty());
    let _ = doc.to_bytes();

    let doc = Document::parse(b"not xml at all");
    assert!(doc.paragraphs().is_empty());
    let _ = doc.to_bytes();

    let doc = Document::parse(b"");
    assert!(doc.paragraphs().is_empty());
}

#[test]
fn test_normalizedText_shouldCollapseWhitespace() {
    let doc = Document::parse(
        b"<html><body>\n  <p>Hello   world</p>\n  <p>Second\npara</p>\n</body></html>",
    );
    assert_eq!(doc.normalized_text(), "Hello   world Second\npara");
}
