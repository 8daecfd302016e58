use std::collections::BTreeSet;

use a11y_compressor::instruction::keywords::{
    instruction_keywords, smart_truncate, truncate_label, DEFAULT_WINDOW,
};

fn kw(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// =========================================================================
// Keyword extraction
// =========================================================================

#[test]
fn stop_words_and_punctuation_are_removed() {
    let keywords = instruction_keywords("Please click the 'Export' button, then open Report.pdf!");
    assert_eq!(keywords, kw(&["export", "then", "report", "pdf"]));
}

#[test]
fn single_characters_are_dropped() {
    let keywords = instruction_keywords("Set column A to 5 and B to x2");
    assert_eq!(keywords, kw(&["set", "column", "and", "x2"]));
}

#[test]
fn unicode_words_survive() {
    let keywords = instruction_keywords("Ouvrir le fichier «Résumé»");
    assert!(keywords.contains("résumé"));
    assert!(keywords.contains("fichier"));
}

#[test]
fn blank_instruction_has_no_keywords() {
    assert!(instruction_keywords("").is_empty());
    assert!(instruction_keywords("   \n ").is_empty());
    assert!(instruction_keywords("click the button").is_empty());
}

// =========================================================================
// Truncation
// =========================================================================

#[test]
fn truncate_collapses_whitespace() {
    assert_eq!(truncate_label("  Save\n\t as   draft ", 140), "Save as draft");
    assert_eq!(truncate_label("abcdef", 3), "abc...");
    assert_eq!(truncate_label("abc", 3), "abc");
}

#[test]
fn smart_truncate_centres_on_the_first_hit() {
    let text = format!("{}needle{}", "x".repeat(200), "y".repeat(200));
    let out = smart_truncate(&text, &kw(&["needle"]), 140, 10);

    assert_eq!(out, format!("...{}needle{}...", "x".repeat(10), "y".repeat(10)));
}

#[test]
fn smart_truncate_without_hit_falls_back() {
    let text = "a".repeat(200);
    assert_eq!(
        smart_truncate(&text, &kw(&["missing"]), 50, DEFAULT_WINDOW),
        truncate_label(&text, 50)
    );
    assert_eq!(smart_truncate("", &kw(&["x"]), 50, DEFAULT_WINDOW), "");
}

#[test]
fn smart_truncate_is_case_insensitive_and_keeps_original_case() {
    let out = smart_truncate("Open the Quarterly Report now", &kw(&["report"]), 140, 100);
    assert_eq!(out, "Open the Quarterly Report now");

    let out = smart_truncate("Open the Quarterly Report now", &kw(&["report"]), 140, 4);
    assert_eq!(out, "...rly Report now");
}

#[test]
fn earliest_keyword_wins() {
    let text = format!("beta {} alpha", "-".repeat(100));
    let out = smart_truncate(&text, &kw(&["alpha", "beta"]), 140, 3);
    assert!(out.starts_with("beta"));
}
