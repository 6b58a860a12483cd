//! Encoders and decoders for the on-disk subtitle formats.
//!
//! Every decoder is a pure function from text to a sorted list of entries;
//! it either succeeds completely or returns a `FormatError`. Every encoder
//! renders a borrowed slice of entries.

pub mod ass;
pub mod json;
pub mod sentences;
pub mod srt;
pub mod txt;
pub mod vtt;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use nom::bytes::complete::tag;
use nom::character::complete::{not_line_ending, space0, space1};
use nom::error::VerboseError;
use nom::IResult;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::entry::{sort_entries, Entry};
use crate::error::{Result, SubtitleError};
use crate::timecode;

static HTML_ENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(amp|lt|gt|quot|#39);").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Srt,
    Vtt,
    Ass,
    /// Plain text, export only.
    Txt,
    Json,
    /// Sentence documents produced by the transcription pipeline, import only.
    Sentences,
}

impl Format {
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "srt" => Some(Format::Srt),
            "vtt" => Some(Format::Vtt),
            "ass" | "ssa" => Some(Format::Ass),
            "txt" => Some(Format::Txt),
            "json" => Some(Format::Json),
            "subtitle" => Some(Format::Sentences),
            _ => None,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Srt => "srt",
            Format::Vtt => "vtt",
            Format::Ass => "ass",
            Format::Txt => "txt",
            Format::Json => "json",
            Format::Sentences => "subtitle",
        }
    }

    pub fn can_encode(self) -> bool {
        self != Format::Sentences
    }

    pub fn can_decode(self) -> bool {
        self != Format::Txt
    }

    pub fn encode(self, entries: &[Entry]) -> Result<String> {
        let text = match self {
            Format::Srt => srt::encode(entries)?,
            Format::Vtt => vtt::encode(entries)?,
            Format::Ass => ass::encode(entries)?,
            Format::Txt => txt::encode(entries),
            Format::Json => json::encode(entries)?,
            Format::Sentences => {
                return Err(SubtitleError::format(
                    "sentence documents can only be imported",
                ))
            }
        };
        debug!("Encoded {} entries as {}", entries.len(), self);
        Ok(text)
    }

    pub fn decode(self, text: &str) -> Result<Vec<Entry>> {
        let entries = match self {
            Format::Srt => srt::decode(text)?,
            Format::Vtt => vtt::decode(text)?,
            Format::Ass => ass::decode(text)?,
            Format::Txt => txt::decode(text)?,
            Format::Json => json::decode(text)?,
            Format::Sentences => sentences::decode(text)?,
        };
        debug!("Decoded {} entries from {}", entries.len(), self);
        Ok(entries)
    }
}

impl FromStr for Format {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "webvtt" => Ok(Format::Vtt),
            "text" => Ok(Format::Txt),
            "sentences" => Ok(Format::Sentences),
            other => Format::from_extension(other)
                .ok_or_else(|| SubtitleError::format(format!("unknown subtitle format '{}'", s))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.extension())
    }
}

/// Replaces the HTML entities `&amp;`, `&lt;`, `&gt;`, `&quot;` and `&#39;`
/// in a single pass, so `&amp;lt;` becomes `&lt;` and not `<`.
pub fn unescape_html(text: &str) -> String {
    HTML_ENTITY_REGEX
        .replace_all(text, |caps: &Captures| {
            let replacement = match &caps[1] {
                "amp" => "&",
                "lt" => "<",
                "gt" => ">",
                "quot" => "\"",
                _ => "'",
            };
            replacement.to_string()
        })
        .into_owned()
}

/// The lines a cue body is made of: the primary text, then the
/// translation (if any). Blank lines would end the cue, so they are dropped.
pub(crate) fn body_lines(entry: &Entry) -> Vec<&str> {
    entry
        .text
        .lines()
        .chain(entry.text2.lines())
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Builds an entry from decoded cue lines. With more than one line, the
/// last line is the translation.
pub(crate) fn entry_from_lines<S: AsRef<str>>(start_time: f64, end_time: f64, lines: &[S]) -> Entry {
    let lines: Vec<String> = lines.iter().map(|l| unescape_html(l.as_ref())).collect();
    let (text, text2) = match lines.split_last() {
        Some((last, rest)) if !rest.is_empty() => (rest.join("\n"), last.clone()),
        _ => (lines.join("\n"), String::new()),
    };
    Entry::new(start_time, end_time, text).with_translation(text2)
}

pub(crate) fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{FEFF}').unwrap_or(input)
}

pub(crate) fn finish(mut entries: Vec<Entry>) -> Vec<Entry> {
    sort_entries(&mut entries);
    entries
}

/// Parses `start --> end`, ignoring anything after the end timestamp
/// (WebVTT cue settings, SRT coordinates).
pub(crate) fn show_hide(input: &str) -> IResult<&str, (f64, f64), VerboseError<&str>> {
    let (input, show_at) = timecode::timestamp(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, hide_at) = timecode::timestamp(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = not_line_ending(input)?;

    Ok((
        input,
        (show_at as f64 / 1000.0, hide_at as f64 / 1000.0),
    ))
}
