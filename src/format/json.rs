use crate::entry::Entry;
use crate::error::{Result, SubtitleError};
use crate::format::{finish, unescape_html};
use crate::timecode;

/// Serialises the entries as a JSON array of entry objects.
pub fn encode(entries: &[Entry]) -> Result<String> {
    for entry in entries {
        timecode::validate_seconds(entry.start_time)?;
        timecode::validate_seconds(entry.end_time)?;
    }
    serde_json::to_string_pretty(entries).map_err(|e| SubtitleError::format(e.to_string()))
}

/// Reads a JSON array of entry objects. `startTime`, `endTime` and `text`
/// are required; `text2` and `rawTranslations` default to empty.
pub fn decode(input: &str) -> Result<Vec<Entry>> {
    let entries: Vec<Entry> = serde_json::from_str(input)
        .map_err(|e| SubtitleError::format(format!("invalid JSON entries: {}", e)))?;

    let mut decoded = Vec::with_capacity(entries.len());
    for (i, mut entry) in entries.into_iter().enumerate() {
        for time in [entry.start_time, entry.end_time] {
            if timecode::validate_seconds(time).is_err() {
                return Err(SubtitleError::format(format!(
                    "entry {} has an invalid time: {}",
                    i + 1,
                    time
                )));
            }
        }
        entry.text = unescape_html(&entry.text);
        entry.text2 = unescape_html(&entry.text2);
        decoded.push(entry);
    }
    Ok(finish(decoded))
}
