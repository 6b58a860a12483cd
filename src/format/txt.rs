use crate::entry::Entry;
use crate::error::{Result, SubtitleError};

/// One line per entry with the primary text only. Line breaks inside an
/// entry are joined with spaces.
pub fn encode(entries: &[Entry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let line: Vec<&str> = entry
            .text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

pub fn decode(_input: &str) -> Result<Vec<Entry>> {
    Err(SubtitleError::format(
        "plain text carries no timing and cannot be imported",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_entry() {
        let entries = vec![
            Entry::new(0.0, 1.0, "Hello\nthere").with_translation("ignored"),
            Entry::new(1.0, 2.0, "Bye"),
        ];
        assert_eq!(encode(&entries), "Hello there\nBye\n");
    }

    #[test]
    fn cannot_be_decoded() {
        assert!(matches!(decode("Hello\n"), Err(SubtitleError::FormatError(_))));
    }
}
