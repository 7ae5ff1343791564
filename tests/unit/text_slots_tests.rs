/*!
 * Tests for text slot extraction and proportional redistribution
 */

use epubtrans::document::Document;
use epubtrans::text_slots::{collect_text_slots, distribute_text, replace_node_text};

fn parse_first_paragraph(body: &str) -> (Document, epubtrans::document::NodeId) {
    let doc = Document::parse(format!("<html><body>{}</body></html>", body).as_bytes());
    let node = doc.paragraphs()[0];
    (doc, node)
}

#[test]
fn test_collectTextSlots_plainParagraph_shouldYieldSingleSlot() {
    let (doc, p) = parse_first_paragraph("<p>Hello world.</p>");
    let slots = collect_text_slots(&doc, p);
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].owner, p);
}

#[test]
fn test_collectTextSlots_dropcapParagraph_shouldYieldSpanTextAndTail() {
    // No leading text on the paragraph itself: only span.text and span.tail.
    let (doc, p) = parse_first_paragraph("<p><span>I</span>t is a fact.</p>");
    let slots = collect_text_slots(&doc, p);
    assert_eq!(slots.len(), 2);
    let span = doc.children(p)[0];
    assert!(slots.iter().all(|slot| slot.owner == span));
}

#[test]
fn test_collectTextSlots_mixedContent_shouldIncludeAllNonEmptySlots() {
    let (doc, p) = parse_first_paragraph("<p>Lead <em>italic</em> tail text.</p>");
    let slots = collect_text_slots(&doc, p);
    // p.text = "Lead ", em.text = "italic", em.tail = " tail text."
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].owner, p);
    let em = doc.children(p)[0];
    assert_eq!(slots[1].owner, em);
    assert_eq!(slots[2].owner, em);
}

#[test]
fn test_distributeText_zeroSlots_shouldReturnEmpty() {
    assert!(distribute_text("Ciao", &[]).is_empty());
}

#[test]
fn test_distributeText_singleSlot_shouldReturnVerbatim() {
    assert_eq!(distribute_text("Ciao mondo.", &[11]), vec!["Ciao mondo."]);
    // The slot weight is irrelevant with a single slot.
    assert_eq!(distribute_text("Ciao mondo.", &[1]), vec!["Ciao mondo."]);
}

#[test]
fn test_distributeText_allZeroWeights_shouldPutEverythingInFirstSlot() {
    let chunks = distribute_text("Tutto qui", &[0, 0, 0]);
    assert_eq!(chunks, vec!["Tutto qui", "", ""]);
}

#[test]
fn test_distributeText_twoEqualSlots_shouldSplitAtSpace() {
    let chunks = distribute_text("Hello world", &[5, 6]);
    assert_eq!(chunks, vec!["Hello", " world"]);
}

#[test]
fn test_distributeText_dropcapWeights_shouldGiveFirstSlotOneWord() {
    // 1-char slot (dropcap "I") and a 28-char slot.
    let translated = "È un fatto della natura umana.";
    let chunks = distribute_text(translated, &[1, 28]);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], "È");
    assert_eq!(chunks.concat(), translated);
}

#[test]
fn test_distributeText_conservation_shouldConcatenateToInput() {
    let cases: &[(&str, &[usize])] = &[
        ("Ciao piccolo mondo.", &[6, 5, 7]),
        ("uno due tre quattro cinque", &[3, 3, 3, 7, 6]),
        ("nessuno spazio", &[1, 1, 1]),
        ("  spazi  iniziali e finali  ", &[10, 8]),
        ("日本語のテキストです", &[4, 6]),
        ("a", &[5, 5]),
    ];
    for (translated, lengths) in cases {
        let chunks = distribute_text(translated, lengths);
        assert_eq!(chunks.len(), lengths.len());
        assert_eq!(&chunks.concat(), translated, "lengths={:?}", lengths);
    }
}

#[test]
fn test_distributeText_midWordIdeal_shouldPreferForwardBoundary() {
    // Ideal split lands inside "abcd": forward distance 1, backward distance 3.
    let chunks = distribute_text("abcd efgh", &[3, 6]);
    assert_eq!(chunks, vec!["abcd", " efgh"]);
}

#[test]
fn test_distributeText_closerBackwardBoundary_shouldKeepSpaceInFirstChunk() {
    // Ideal split lands inside "cdef": no forward whitespace, backward space
    // at distance 2 wins, and the space stays with the first chunk.
    let chunks = distribute_text("ab cdef", &[4, 3]);
    assert_eq!(chunks, vec!["ab ", "cdef"]);
}

#[test]
fn test_distributeText_shortTranslation_shouldLeaveTrailingSlotsEmpty() {
    let chunks = distribute_text("x", &[10, 10, 10]);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks.concat(), "x");
}

#[test]
fn test_replaceNodeText_noSlots_shouldSetLeadingTextDirectly() {
    let (mut doc, p) = parse_first_paragraph("<p></p>");
    replace_node_text(&mut doc, p, "Ciao mondo.");
    assert_eq!(doc.node(p).text.as_deref(), Some("Ciao mondo."));
}

#[test]
fn test_replaceNodeText_dropcap_shouldFillBothSpanSlots() {
    let (mut doc, p) = parse_first_paragraph("<p><span>I</span>t is a fact.</p>");
    replace_node_text(&mut doc, p, "È un fatto.");
    let span = doc.children(p)[0];
    assert_eq!(doc.node(span).text.as_deref(), Some("È"));
    assert_eq!(doc.node(span).tail.as_deref(), Some(" un fatto."));
    assert_eq!(doc.collect_text(p), "È un fatto.");
}

#[test]
fn test_replaceNodeText_emptiedChild_shouldGetExplicitEmptyStrings() {
    // A tiny translation leaves the trailing slots with nothing; the child
    // must still end up with Some("") so it serializes as an open/close pair.
    let (mut doc, p) = parse_first_paragraph("<p>Long leading text here <span>styled</span></p>");
    replace_node_text(&mut doc, p, "Sì");
    let span = doc.children(p)[0];
    assert!(doc.node(span).text.is_some());
    assert!(doc.node(span).tail.is_some());
    let serialized = String::from_utf8(doc.to_bytes()).unwrap();
    assert!(!serialized.contains("<span/>"));
    assert!(!serialized.contains("<span />"));
}
