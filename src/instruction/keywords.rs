use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static RE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));
static RE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Words that never identify a target on screen.
pub const STOP_WORDS: &[&str] = &[
    // articles, prepositions
    "the", "a", "an", "in", "on", "at", "to", "for", "of", "with", "by", "from", "is", "are",
    "am", "be", "this", "that", "it",
    // politeness
    "please", "can", "could", "would", "you", "i", "my", "me", "need", "want", "try", "make",
    "let",
    // UI verbs and nouns
    "click", "tap", "press", "hit", "select", "choose", "open", "go", "browse", "navigate",
    "find", "search", "check", "uncheck", "button", "link", "tab", "menu", "window", "page",
    "website", "site", "input", "enter", "type", "fill", "text", "box", "field",
];

pub const DEFAULT_WINDOW: usize = 70;

/// Lower-cased content words of a task instruction. Unicode letters survive,
/// punctuation and one-character words do not.
pub fn instruction_keywords(instruction: &str) -> BTreeSet<String> {
    if instruction.trim().is_empty() {
        return BTreeSet::new();
    }

    let lower = instruction.to_lowercase();
    let clean = RE_PUNCT.replace_all(&lower, " ");

    clean
        .split_whitespace()
        .filter(|w| w.chars().count() > 1 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Collapse whitespace runs and cut to `max_len` characters plus `...`.
pub fn truncate_label(text: &str, max_len: usize) -> String {
    let clean = RE_SPACES.replace_all(text, " ");
    let clean = clean.trim();
    if clean.chars().count() > max_len {
        let head: String = clean.chars().take(max_len).collect();
        format!("{}...", head)
    } else {
        clean.to_string()
    }
}

/// Keep the part of `text` around the earliest keyword hit, `window`
/// characters each side. Without a hit this is [`truncate_label`].
pub fn smart_truncate(
    text: &str,
    keywords: &BTreeSet<String>,
    max_len: usize,
    window: usize,
) -> String {
    if text.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let lower: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    let hit = keywords
        .iter()
        .filter_map(|kw| {
            let needle: Vec<char> = kw.chars().collect();
            find_chars(&lower, &needle).map(|idx| (idx, needle.len()))
        })
        .min();

    let Some((idx, kw_len)) = hit else {
        return truncate_label(text, max_len);
    };

    let start = idx.saturating_sub(window);
    let end = (idx + kw_len + window).min(chars.len());
    let snippet: String = chars[start..end].iter().collect();

    let prefix = if start > 0 { "..." } else { "" };
    let suffix = if end < chars.len() { "..." } else { "" };
    let snippet = RE_SPACES.replace_all(&snippet, " ");

    format!("{}{}{}", prefix, snippet.trim(), suffix)
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
