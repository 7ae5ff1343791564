/*!
 * Tests for backend response sanitization
 */

use epubtrans::sanitizer::Sanitizer;

#[test]
fn test_clean_plainResponse_shouldBeUnchanged() {
    let sanitizer = Sanitizer::default();
    assert_eq!(sanitizer.clean("Ciao mondo", "Hello world"), "Ciao mondo");
}

#[test]
fn test_clean_surroundingWhitespace_shouldBeTrimmed() {
    let sanitizer = Sanitizer::default();
    assert_eq!(sanitizer.clean("  Ciao mondo \n", "Hello world"), "Ciao mondo");
}

#[test]
fn test_clean_surroundingDoubleQuotes_shouldStripOneLayer() {
    let sanitizer = Sanitizer::default();
    assert_eq!(sanitizer.clean("\"Ciao mondo\"", "Hello world"), "Ciao mondo");
}

#[test]
fn test_clean_surroundingSingleQuotes_shouldStripOneLayer() {
    let sanitizer = Sanitizer::default();
    assert_eq!(sanitizer.clean("'Ciao mondo'", "Hello world"), "Ciao mondo");
}

#[test]
fn test_clean_curlyQuotes_shouldStripOneLayer() {
    let sanitizer = Sanitizer::default();
    assert_eq!(sanitizer.clean("“Ciao mondo”", "Hello world"), "Ciao mondo");
}

#[test]
fn test_clean_nestedQuotes_shouldStripOnlyOneLayer() {
    let sanitizer = Sanitizer::default();
    assert_eq!(sanitizer.clean("\"\"Ciao\"\"", "Hello"), "\"Ciao\"");
}

#[test]
fn test_clean_unmatchedQuotes_shouldBeKept() {
    let sanitizer = Sanitizer::default();
    assert_eq!(sanitizer.clean("\"Ciao mondo", "Hello world"), "\"Ciao mondo");
}

#[test]
fn test_clean_leakedTextToTranslateMarker_shouldKeepRemainder() {
    let sanitizer = Sanitizer::default();
    let raw = "CHAPTER CONTEXT (for tone/terminology):\n\
               Some context here about the chapter...\n\n\
               TEXT TO TRANSLATE:\n\
               Capitolo 1";
    assert_eq!(sanitizer.clean(raw, "Chapter 1"), "Capitolo 1");
}

#[test]
fn test_clean_leakedMarkerWithInlineColon_shouldKeepRemainder() {
    let sanitizer = Sanitizer::default();
    assert_eq!(
        sanitizer.clean("TESTO DA TRADURRE: Capitolo 1", "Chapter 1"),
        "Capitolo 1"
    );
}

#[test]
fn test_clean_leakedItalianMarkers_shouldKeepRemainderAfterLast() {
    let sanitizer = Sanitizer::default();
    let raw = "CONTESTO DEL CAPITOLO:\n\
               Qualche contesto...\n\n\
               TESTO DA TRADURRE:\n\
               I Paesi Bassi";
    assert_eq!(sanitizer.clean(raw, "THE NETHERLANDS"), "I Paesi Bassi");
}

#[test]
fn test_clean_markerIsCaseInsensitive_shouldStillMatch() {
    let sanitizer = Sanitizer::default();
    assert_eq!(
        sanitizer.clean("text to translate:\nCapitolo 1", "Chapter 1"),
        "Capitolo 1"
    );
}

#[test]
fn test_clean_markerWithNothingAfter_shouldKeepTextUnchanged() {
    // Never return empty because of marker stripping.
    let sanitizer = Sanitizer::default();
    assert_eq!(sanitizer.clean("TEXT TO TRANSLATE:", "Hello"), "TEXT TO TRANSLATE:");
}

#[test]
fn test_clean_excessiveLengthRatio_shouldKeepTextUnmodified() {
    // Oversized output is surfaced in the log, never truncated.
    let sanitizer = Sanitizer::default();
    let long_response = "A".repeat(1000);
    assert_eq!(sanitizer.clean(&long_response, "Hi"), long_response);
}

#[test]
fn test_clean_emptySource_shouldNotPanic() {
    let sanitizer = Sanitizer::default();
    assert_eq!(sanitizer.clean("Tradotto", ""), "Tradotto");
}

#[test]
fn test_clean_customMarkers_shouldBeUsedInsteadOfDefaults() {
    let sanitizer = Sanitizer::new(&["ZU ÜBERSETZENDER TEXT"]);
    assert_eq!(
        sanitizer.clean("ZU ÜBERSETZENDER TEXT:\nKapitel 1", "Chapter 1"),
        "Kapitel 1"
    );
    // Default markers are no longer active.
    assert_eq!(
        sanitizer.clean("TEXT TO TRANSLATE:\nKapitel 1", "Chapter 1"),
        "TEXT TO TRANSLATE:\nKapitel 1"
    );
}
