use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::entry::Entry;
use crate::error::{Result, SubtitleError};
use crate::format::{body_lines, entry_from_lines, finish, strip_bom};
use crate::timecode::{seconds_to_timestamp, timestamp_to_seconds, FormatStyle};

// `{\b1}`, `{\pos(10,20)\c&H00FF00&}` and friends.
static OVERRIDE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\\[^}]*\}").unwrap());

const EVENT_FIELDS: &str = "Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

const SCRIPT_HEADER: &str = "[Script Info]
ScriptType: v4.00+
PlayResX: 1920
PlayResY: 1080
WrapStyle: 0

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Microsoft YaHei,54,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,2,1,2,20,20,40,1

[Events]
";

/// Renders a complete script with a single `Default` style.
pub fn encode(entries: &[Entry]) -> Result<String> {
    let mut out = String::from(SCRIPT_HEADER);
    out.push_str(&format!("Format: {}\n", EVENT_FIELDS));
    for entry in entries {
        let lines: Vec<String> = body_lines(entry).into_iter().map(escape_line).collect();
        out.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            seconds_to_timestamp(entry.start_time, FormatStyle::Ass)?,
            seconds_to_timestamp(entry.end_time, FormatStyle::Ass)?,
            lines.join("\\N")
        ));
    }
    Ok(out)
}

// An empty `{}` block after every `\` and `{` keeps literal text such as
// `C:\new` or `{\b1}` from being read back as a line break or override tag.
fn escape_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        out.push(c);
        if c == '\\' || c == '{' {
            out.push_str("{}");
        }
    }
    out
}

/// Reads the `Dialogue:` lines of the `[Events]` section.
///
/// Only `Start`, `End` and `Text` are used. Override blocks such as `{\i1}`
/// are removed and `\N` line breaks become cue lines.
pub fn decode(input: &str) -> Result<Vec<Entry>> {
    let input = strip_bom(input);
    let mut section = String::new();
    let mut seen_events = false;
    let mut columns = Columns::default();
    let mut entries = Vec::new();

    for (n, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].to_ascii_lowercase();
            seen_events |= section == "events";
            continue;
        }
        if section != "events" {
            continue;
        }
        if let Some(format) = line.strip_prefix("Format:") {
            columns = Columns::parse(format)
                .ok_or_else(|| SubtitleError::format(format!("line {}: bad event format", n + 1)))?;
        } else if let Some(dialogue) = line.strip_prefix("Dialogue:") {
            entries.push(dialogue_entry(dialogue, &columns).map_err(|e| {
                SubtitleError::format(format!("line {}: {}", n + 1, e))
            })?);
        } else if !line.is_empty() && !line.starts_with(';') {
            debug!("Ignoring event line {}", n + 1);
        }
    }

    if !seen_events {
        return Err(SubtitleError::format("missing [Events] section"));
    }
    Ok(finish(entries))
}

fn dialogue_entry(dialogue: &str, columns: &Columns) -> std::result::Result<Entry, String> {
    let fields: Vec<&str> = dialogue.trim_start().splitn(columns.count, ',').collect();
    if fields.len() < columns.count {
        return Err(format!(
            "expected {} fields, found {}",
            columns.count,
            fields.len()
        ));
    }
    let time = |index: usize| timestamp_to_seconds(fields[index]).map_err(|e| e.to_string());
    let start = time(columns.start)?;
    let end = time(columns.end)?;
    let text = strip_override_tags(fields[columns.text]);
    let lines: Vec<&str> = text.split('\n').collect();
    Ok(entry_from_lines(start, end, &lines))
}

/// Removes `{\...}` override blocks and empty `{}` blocks, and turns `\N`,
/// `\n` and `\h` into line breaks and spaces.
pub fn strip_override_tags(text: &str) -> String {
    OVERRIDE_TAG_REGEX
        .replace_all(text, "")
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ")
        .replace("{}", "")
}

// Column positions taken from an `[Events]` `Format:` line.
struct Columns {
    count: usize,
    start: usize,
    end: usize,
    text: usize,
}

impl Columns {
    fn parse(format: &str) -> Option<Self> {
        let names: Vec<String> = format
            .split(',')
            .map(|name| name.trim().to_ascii_lowercase())
            .collect();
        let find = |wanted: &str| names.iter().position(|name| name == wanted);
        Some(Columns {
            count: names.len(),
            start: find("start")?,
            end: find("end")?,
            text: find("text")?,
        })
    }
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            count: 10,
            start: 1,
            end: 2,
            text: 9,
        }
    }
}
