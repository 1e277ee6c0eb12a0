//! Phrase normalization and stop-phrase handling for es-ES commands.
//!
//! Recognition output is noisy: casing varies, accents are inconsistent and
//! the engine sprinkles punctuation into phrases ("terminar, redacción").
//! Everything that matches spoken phrases goes through these helpers so the
//! tolerance rules live in one place.

use std::sync::OnceLock;

use regex::Regex;

/// Punctuation the engine inserts inside and around spoken phrases.
const PHRASE_PUNCTUATION: &[char] = &[',', '.', ';', ':', '!', '?', '¡', '¿'];

/// Phrases that end a dictation session and return control to command mode.
pub const STOP_PHRASES: &[&str] = &["terminar redacción", "detener dictado", "parar redacción"];

/// Canonical key for command matching: lowercase, accents folded, anything
/// non-alphanumeric collapsed to single spaces.
pub fn normalize_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        for folded in fold_accent(ch) {
            if folded.is_alphanumeric() {
                out.push(folded);
            } else {
                out.push(' ');
            }
        }
    }
    collapse_whitespace(&out)
}

/// Loose normalization for stop-phrase and inline-command detection:
/// lowercase with the fixed punctuation set stripped. Accents are kept
/// (the engine reliably produces "redacción" with its accent).
pub fn normalize_loose(value: &str) -> String {
    let lowered = value.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|ch| !PHRASE_PUNCTUATION.contains(ch))
        .collect();
    collapse_whitespace(&stripped)
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_accent(ch: char) -> impl Iterator<Item = char> {
    let folded = match ch {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'Á' | 'À' | 'Ä' | 'Â' => 'a',
        'É' | 'È' | 'Ë' | 'Ê' => 'e',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'i',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'o',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'u',
        'Ñ' => 'n',
        other => other.to_lowercase().next().unwrap_or(other),
    };
    std::iter::once(folded)
}

/// Regex matching any stop phrase with punctuation or whitespace tolerated
/// between its words, plus adjacent separators, so excision leaves no
/// dangling comma behind.
fn stop_phrase_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let sep = r"[\s,.;:!?¡¿]+";
        let boundary = r"[\s,.;:!?¡¿]*";
        let alternatives: Vec<String> = STOP_PHRASES
            .iter()
            .map(|phrase| {
                phrase
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(sep)
            })
            .collect();
        let pattern = format!(
            r"(?i){b}\b(?:{alts})\b{b}",
            b = boundary,
            alts = alternatives.join("|")
        );
        Regex::new(&pattern).expect("invalid stop-phrase regex")
    })
}

/// Whether the transcript contains any stop phrase, tolerating interleaved
/// punctuation ("terminar, redacción" still matches).
pub fn contains_stop_phrase(transcript: &str) -> bool {
    stop_phrase_regex().is_match(transcript)
}

/// Remove every stop-phrase occurrence (and adjacent separators) from the
/// transcript, preserving whatever was said before or after it.
pub fn excise_stop_phrases(transcript: &str) -> String {
    stop_phrase_regex().replace_all(transcript, " ").trim().to_string()
}

/// Whether `haystack` (already normalized) contains `needle` as a whole
/// word sequence.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack
        .match_indices(needle)
        .any(|(idx, _)| {
            let before_ok = idx == 0
                || haystack[..idx].chars().next_back().is_some_and(|c| !c.is_alphanumeric());
            let end = idx + needle.len();
            let after_ok = end == haystack.len()
                || haystack[end..].chars().next().is_some_and(|c| !c.is_alphanumeric());
            before_ok && after_ok
        })
}
