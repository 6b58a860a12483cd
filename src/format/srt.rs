use crate::entry::Entry;
use crate::error::{Result, SubtitleError};
use crate::format::{body_lines, entry_from_lines, finish, show_hide, strip_bom};
use crate::timecode::{seconds_to_timestamp, FormatStyle};

use nom::bytes::complete::take_while1;
use nom::character::complete::{digit1, line_ending, multispace0, multispace1};
use nom::combinator::map_res;
use nom::error::{convert_error, ErrorKind, VerboseError};
use nom::multi::many_till;
use nom::sequence::terminated;
use nom::{branch::alt, error_position, Err, IResult};

/// Parses an SRT document. Sequence numbers are read but not trusted; the
/// result is ordered by start time.
pub fn decode(input: &str) -> Result<Vec<Entry>> {
    let input = strip_bom(input);
    match srt_file(input) {
        Ok((_, entries)) => Ok(finish(entries)),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => Err(SubtitleError::format(format!(
            "failed to parse SRT:\n{}",
            convert_error(input, err)
        ))),
        Err(Err::Incomplete(_)) => {
            unreachable!("Incomplete data received by non-streaming parser.")
        }
    }
}

/// Renders entries as SRT, numbering the cues from 1.
pub fn encode(entries: &[Entry]) -> Result<String> {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        write_cue(&mut out, i + 1, entry, &body_lines(entry))?;
    }
    Ok(out)
}

/// Renders only the translations. Entries without one are left out and
/// the remaining cues are renumbered.
pub fn encode_translation(entries: &[Entry]) -> Result<String> {
    let mut out = String::new();
    let translated = entries.iter().filter(|e| !e.text2.trim().is_empty());
    for (i, entry) in translated.enumerate() {
        let lines: Vec<&str> = entry
            .text2
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        write_cue(&mut out, i + 1, entry, &lines)?;
    }
    Ok(out)
}

fn write_cue(out: &mut String, seq_num: usize, entry: &Entry, lines: &[&str]) -> Result<()> {
    out.push_str(&format!(
        "{}\n{} --> {}\n",
        seq_num,
        seconds_to_timestamp(entry.start_time, FormatStyle::Srt)?,
        seconds_to_timestamp(entry.end_time, FormatStyle::Srt)?
    ));
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    Ok(())
}

fn srt_file(input: &str) -> IResult<&str, Vec<Entry>, VerboseError<&str>> {
    let (input, subs) = all_subtitles(input)?;
    let (input, _) = end_of_file(input)?;
    Ok((input, subs))
}

fn all_subtitles(input: &str) -> IResult<&str, Vec<Entry>, VerboseError<&str>> {
    let mut parsed_subs = Vec::new();
    let mut input = input;
    loop {
        match subtitle(input) {
            Ok((rem_input, subtitle)) => {
                parsed_subs.push(subtitle);
                input = rem_input;
                let (rem_input, _) = multispace0(input)?;
                input = rem_input;
            }
            Err(err) => {
                let (rest, _) = multispace0(input)?;
                if rest.is_empty() {
                    return Ok((rest, parsed_subs));
                } else {
                    return Err(err);
                }
            }
        }
    }
}

fn subtitle(input: &str) -> IResult<&str, Entry, VerboseError<&str>> {
    let (input, _) = multispace0(input)?;
    let (input, _) = terminated(seq_num, multispace1)(input)?;
    let (input, (show_at, hide_at)) = terminated(show_hide, alt((line_ending, end_of_file)))(input)?;
    let (input, text) = sub_text(input)?;

    Ok((input, entry_from_lines(show_at, hide_at, &text)))
}

fn end_of_file(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    if input.is_empty() {
        Ok((input, input))
    } else {
        std::result::Result::Err(Err::Error(error_position!(input, ErrorKind::Eof)))
    }
}

fn sub_text(input: &str) -> IResult<&str, Vec<&str>, VerboseError<&str>> {
    let line = terminated(
        take_while1(|c: char| c != '\n' && c != '\r'),
        alt((line_ending, end_of_file)),
    );

    let (input, (lines, _)) = many_till(line, alt((line_ending, end_of_file)))(input)?;

    Ok((input, lines))
}

fn seq_num(input: &str) -> IResult<&str, usize, VerboseError<&str>> {
    map_res(digit1, |s: &str| s.parse())(input)
}
