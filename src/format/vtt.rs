use log::debug;
use nom::combinator::all_consuming;
use nom::error::convert_error;
use nom::Err;

use crate::entry::Entry;
use crate::error::{Result, SubtitleError};
use crate::format::{body_lines, entry_from_lines, finish, show_hide, strip_bom};
use crate::timecode::{seconds_to_timestamp, FormatStyle};

const HEADER: &str = "WEBVTT";

/// Parses a WebVTT document.
///
/// Cue identifiers and cue settings are accepted and discarded. `NOTE`,
/// `STYLE` and `REGION` blocks are skipped.
pub fn decode(input: &str) -> Result<Vec<Entry>> {
    let input = strip_bom(input);
    let mut blocks = blocks(input).into_iter();

    let header = blocks
        .next()
        .and_then(|block| block.first().copied())
        .unwrap_or_default();
    let rest = header.strip_prefix(HEADER);
    if !rest.map_or(false, |r| r.is_empty() || r.starts_with([' ', '\t'])) {
        return Err(SubtitleError::format("missing WEBVTT header"));
    }

    let mut entries = Vec::new();
    for (n, block) in blocks.enumerate() {
        let first = block[0];
        if ["NOTE", "STYLE", "REGION"]
            .iter()
            .any(|kw| first == *kw || first.starts_with(&format!("{} ", kw)))
        {
            debug!("Skipping WebVTT {} block", first.split(' ').next().unwrap_or(first));
            continue;
        }
        let timing_at = if first.contains("-->") { 0 } else { 1 };
        let timing: &str = block.get(timing_at).copied().ok_or_else(|| {
            SubtitleError::format(format!("cue {} has no timing line", n + 1))
        })?;
        let (start, end) = match all_consuming(show_hide)(timing) {
            Ok((_, times)) => times,
            Err(Err::Error(err)) | Err(Err::Failure(err)) => {
                return Err(SubtitleError::format(format!(
                    "invalid timing in cue {}:\n{}",
                    n + 1,
                    convert_error(timing, err)
                )))
            }
            Err(Err::Incomplete(_)) => {
                unreachable!("Incomplete data received by non-streaming parser.")
            }
        };
        entries.push(entry_from_lines(start, end, &block[timing_at + 1..]));
    }
    Ok(finish(entries))
}

pub fn encode(entries: &[Entry]) -> Result<String> {
    let mut out = format!("{}\n\n", HEADER);
    for entry in entries {
        out.push_str(&format!(
            "{} --> {}\n",
            seconds_to_timestamp(entry.start_time, FormatStyle::Vtt)?,
            seconds_to_timestamp(entry.end_time, FormatStyle::Vtt)?
        ));
        for line in body_lines(entry) {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    Ok(out)
}

// Groups non-blank lines into blocks separated by blank lines.
fn blocks(input: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}
