use std::collections::BTreeMap;

use serde::Deserialize;

use crate::entry::{Entry, TranslationCandidate};
use crate::error::{Result, SubtitleError};
use crate::format::{finish, unescape_html};
use crate::timecode;

/// Candidate whose text becomes the entry's translation on import.
pub const PRIMARY_TRANSLATOR: &str = "agent_translator";

#[derive(Debug, Deserialize)]
struct Document {
    sentences: Vec<Sentence>,
}

#[derive(Debug, Deserialize)]
struct Sentence {
    start: f64,
    duration: f64,
    text: String,
    #[serde(default)]
    raw_translations: BTreeMap<String, TranslationCandidate>,
}

/// Imports a sentence document:
///
/// ```text
/// {"sentences": [{"start": 1.0, "duration": 2.5, "text": "...",
///                 "raw_translations": {"agent_translator": {"text": "..."}}}]}
/// ```
///
/// Every candidate is kept in `raw_translations`; the `agent_translator`
/// one, when present, is also copied into `text2`.
pub fn decode(input: &str) -> Result<Vec<Entry>> {
    let document: Document = serde_json::from_str(input)
        .map_err(|e| SubtitleError::format(format!("invalid sentence document: {}", e)))?;

    let mut entries = Vec::with_capacity(document.sentences.len());
    for (i, sentence) in document.sentences.into_iter().enumerate() {
        let end = sentence.start + sentence.duration;
        if timecode::validate_seconds(sentence.start).is_err()
            || timecode::validate_seconds(end).is_err()
        {
            return Err(SubtitleError::format(format!(
                "sentence {} has an invalid time range",
                i + 1
            )));
        }
        let text2 = sentence
            .raw_translations
            .get(PRIMARY_TRANSLATOR)
            .map(|candidate| unescape_html(&candidate.text))
            .unwrap_or_default();
        let mut entry =
            Entry::new(sentence.start, end, unescape_html(&sentence.text)).with_translation(text2);
        entry.raw_translations = sentence.raw_translations;
        entries.push(entry);
    }
    Ok(finish(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_sentences_with_candidates() {
        let input = r#"{
            "sentences": [
                {"start": 3.0, "duration": 1.5, "text": "Second",
                 "raw_translations": {"agent_translator": {"text": "Deuxième", "model": "x"},
                                      "google": {"text": "Seconde"}}},
                {"start": 0.5, "duration": 2.0, "text": "First &amp; best",
                 "raw_translations": {}}
            ]
        }"#;
        let entries = decode(input).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "First & best");
        assert_eq!(entries[0].end_time, 2.5);
        assert_eq!(entries[0].text2, "");
        assert_eq!(entries[1].start_time, 3.0);
        assert_eq!(entries[1].end_time, 4.5);
        assert_eq!(entries[1].text2, "Deuxième");
        assert_eq!(entries[1].raw_translations.len(), 2);
        assert_eq!(entries[1].raw_translations["google"].text, "Seconde");
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(decode("[]").is_err());
        assert!(decode(r#"{"sentences": [{"start": 1.0, "text": "x"}]}"#).is_err());
        assert!(decode(r#"{"sentences": [{"start": -2.0, "duration": 1.0, "text": "x"}]}"#).is_err());
    }
}
