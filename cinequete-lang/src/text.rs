//! Text cleanup shared by detection, translation, and change comparison.

use regex::Regex;

/// Maximum chunk length accepted by the translation backends.
pub const MAX_CHUNK_LEN: usize = 450;

/// Normalize free text for display and further processing.
///
/// Decodes HTML entities, removes zero-width characters, strips HTML tags,
/// collapses runs of horizontal whitespace to a single space, and collapses
/// whitespace around newlines. Idempotent.
pub fn normalize(text: &str) -> String {
    let mut cleaned = html_escape::decode_html_entities(text).into_owned();
    cleaned.retain(|c| !matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}'));

    if let Ok(re) = Regex::new(r"<[^>]+>") {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    if let Ok(re) = Regex::new(r"[ \t]+") {
        cleaned = re.replace_all(&cleaned, " ").into_owned();
    }
    if let Ok(re) = Regex::new(r"\s*\n\s*") {
        cleaned = re.replace_all(&cleaned, "\n").into_owned();
    }

    cleaned.trim().to_string()
}

/// Comparison key used only to test whether two texts are "the same"
/// regardless of formatting, e.g. to detect a translation that produced no
/// actual change. Never used for display.
pub fn comparison_key(text: &str) -> String {
    let normalized = normalize(text).to_lowercase();
    if let Ok(re) = Regex::new(r"\s+") {
        re.replace_all(&normalized, " ").into_owned()
    } else {
        normalized
    }
}

/// Split normalized text into chunks of at most `max_len` characters at
/// paragraph boundaries.
///
/// Paragraphs accumulate greedily; a paragraph that would push the current
/// chunk past the bound starts a new one. A single paragraph longer than the
/// bound is emitted as its own over-long chunk rather than broken mid-text.
pub fn split_chunks(text: &str, max_len: usize) -> Vec<String> {
    let normalized = normalize(text);
    if normalized.chars().count() <= max_len {
        return vec![normalized];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for paragraph in normalized.split('\n') {
        if paragraph.is_empty() {
            continue;
        }
        let added = paragraph.chars().count() + 1;
        if !current.is_empty() && current_len + added > max_len {
            chunks.push(current.join(" "));
            current = vec![paragraph];
            current_len = paragraph.chars().count();
        } else {
            current.push(paragraph);
            current_len += added;
        }
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_markup_and_whitespace() {
        let raw = "  <b>Nosferatu</b> &amp; le vampire\u{200b}   \n\n   une   symphonie  ";
        assert_eq!(normalize(raw), "Nosferatu & le vampire\nune symphonie");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "  <p>Un film   muet</p>\n  de 1922 ",
            "Plain text already clean",
            "Tabs\tand   spaces\n\n\nnewlines",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_comparison_key_ignores_formatting() {
        assert_eq!(
            comparison_key("Le  Vampire\nDe Düsseldorf"),
            comparison_key("le vampire de düsseldorf")
        );
    }

    #[test]
    fn test_comparison_key_stable_under_normalize() {
        let raw = "  <i>Un  Chien</i>\n  Andalou &amp; co ";
        assert_eq!(comparison_key(raw), comparison_key(&normalize(raw)));
    }

    #[test]
    fn test_split_chunks_respects_bound() {
        let paragraph = "Un paragraphe de taille moyenne pour le test.";
        let text = vec![paragraph; 30].join("\n");
        let chunks = split_chunks(&text, MAX_CHUNK_LEN);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= MAX_CHUNK_LEN);
        }
    }

    #[test]
    fn test_split_chunks_never_breaks_inside_paragraph() {
        let long_paragraph = "x".repeat(1000);
        let chunks = split_chunks(&long_paragraph, MAX_CHUNK_LEN);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chars().count(), 1000);
    }

    #[test]
    fn test_split_chunks_short_text_single_chunk() {
        let chunks = split_chunks("court", MAX_CHUNK_LEN);
        assert_eq!(chunks, vec!["court".to_string()]);
    }
}
