use crate::error::{Result, SubtitleError};

use nom::branch::alt;
use nom::bytes::complete::take_while_m_n;
use nom::character::complete::{char, digit1, one_of};
use nom::combinator::{all_consuming, map, map_res, verify};
use nom::error::{convert_error, ErrorKind, VerboseError};
use nom::sequence::{terminated, tuple};
use nom::{error_position, Err, IResult};

/// Timestamp flavour used when rendering seconds for a particular format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatStyle {
    /// `HH:MM:SS,mmm`
    Srt,
    /// `HH:MM:SS.mmm`
    Vtt,
    /// `H:MM:SS.mmm`
    ///
    /// Keeps millisecond precision. libass and ffmpeg read the ASS fraction
    /// as centiseconds, so burning these files in shifts cue times (a
    /// `.500` fraction is taken as five seconds).
    Ass,
}

/// Renders `seconds` as a timestamp in the given style.
///
/// The value is truncated to whole milliseconds, so `0.9996` renders as
/// `00:00:00,999` and never carries into the next second.
pub fn seconds_to_timestamp(seconds: f64, style: FormatStyle) -> Result<String> {
    let total_millis = seconds_to_millis(seconds)?;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    let ts = match style {
        FormatStyle::Srt => format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis),
        FormatStyle::Vtt => format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis),
        FormatStyle::Ass => format!("{}:{:02}:{:02}.{:03}", hours, minutes, secs, millis),
    };
    Ok(ts)
}

/// Parses a timestamp in any of the supported styles back into seconds.
pub fn timestamp_to_seconds(input: &str) -> Result<f64> {
    let input = input.trim();
    match all_consuming(timestamp)(input) {
        Ok((_, millis)) => Ok(millis as f64 / 1000.0),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => Err(SubtitleError::ParseError(format!(
            "invalid timestamp '{}':\n{}",
            input,
            convert_error(input, err)
        ))),
        Err(Err::Incomplete(_)) => {
            unreachable!("Incomplete data received by non-streaming parser.")
        }
    }
}

/// Truncates a seconds value to whole milliseconds.
pub fn seconds_to_millis(seconds: f64) -> Result<u64> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(SubtitleError::InvalidTime(seconds));
    }
    // Snap to the microsecond grid first, so that values such as 1.001
    // (stored as 1.000999...) do not lose a millisecond when truncated.
    let micros = (seconds * 1_000_000.0).round();
    if micros >= u64::MAX as f64 {
        return Err(SubtitleError::InvalidTime(seconds));
    }
    Ok(micros as u64 / 1000)
}

/// Checks that a seconds value can be represented by the time codec.
pub fn validate_seconds(seconds: f64) -> Result<f64> {
    seconds_to_millis(seconds).map(|_| seconds)
}

/// Parses a timestamp and returns its value in milliseconds.
///
/// Accepts `H+:MM:SS[,.]f` as well as the WebVTT short form `MM:SS.f`,
/// where the fraction has between one and three digits.
pub(crate) fn timestamp(input: &str) -> IResult<&str, u64, VerboseError<&str>> {
    let start = input;
    let (input, (hours, minutes, seconds)) = clock(input)?;
    let (input, _) = one_of(",.")(input)?;
    let (input, millis) = fraction(input)?;

    let total = hours
        .checked_mul(60 * 60 * 1000)
        .and_then(|h| h.checked_add(millis + seconds * 1000 + minutes * 60 * 1000));
    match total {
        Some(total) => Ok((input, total)),
        None => Err(Err::Error(error_position!(start, ErrorKind::TooLarge))),
    }
}

fn clock(input: &str) -> IResult<&str, (u64, u64, u64), VerboseError<&str>> {
    alt((
        tuple((
            terminated(hours, char(':')),
            terminated(sexagesimal, char(':')),
            sexagesimal,
        )),
        map(
            tuple((terminated(sexagesimal, char(':')), sexagesimal)),
            |(minutes, seconds)| (0, minutes, seconds),
        ),
    ))(input)
}

fn hours(input: &str) -> IResult<&str, u64, VerboseError<&str>> {
    map_res(digit1, |s: &str| s.parse())(input)
}

fn sexagesimal(input: &str) -> IResult<&str, u64, VerboseError<&str>> {
    // 1:1:1,200 is read as 01:01:01,200.
    let field = map_res(
        take_while_m_n(1, 2, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u64>(),
    );
    verify(field, |v: &u64| *v < 60)(input)
}

fn fraction(input: &str) -> IResult<&str, u64, VerboseError<&str>> {
    map_res(
        take_while_m_n(1, 3, |c: char| c.is_ascii_digit()),
        |s: &str| {
            // `,2` means 200 milliseconds, so pad on the right.
            format!("{:0<3}", s).parse::<u64>()
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_parse_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                let (_, millis) = timestamp(input).unwrap();

                assert_eq!(millis, expected);
            }
        )*
        }
    }

    test_parse_ts! {
        test_parse_ts_0: ("00:00:01,200", 1200),
        test_parse_ts_1: ("00:00:01,2", 1200),
        test_parse_ts_2: ("00:00:01,002", 1002),
        test_parse_ts_3: ("00:00:01,02", 1020),
        test_parse_ts_4: ("1:1:1,200", 3661200),
        test_parse_ts_5: ("01:01:01.200", 3661200),
        test_parse_ts_6: ("0:00:05.50", 5500),
        test_parse_ts_7: ("01:05.250", 65250),
        test_parse_ts_8: ("100:00:00,001", 360_000_001),
    }

    macro_rules! test_write_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (seconds, style, expected) = $value;

                assert_eq!(seconds_to_timestamp(seconds, style).unwrap(), expected);
            }
        )*
        }
    }

    test_write_ts! {
        test_write_ts_0: (0.0, FormatStyle::Srt, "00:00:00,000"),
        test_write_ts_1: (0.001, FormatStyle::Srt, "00:00:00,001"),
        test_write_ts_2: (0.9996, FormatStyle::Srt, "00:00:00,999"),
        test_write_ts_3: (1.001, FormatStyle::Srt, "00:00:01,001"),
        test_write_ts_4: (59.999, FormatStyle::Vtt, "00:00:59.999"),
        test_write_ts_5: (60.0, FormatStyle::Vtt, "00:01:00.000"),
        test_write_ts_6: (3600.0, FormatStyle::Ass, "1:00:00.000"),
        test_write_ts_7: (7326.159, FormatStyle::Ass, "2:02:06.159"),
        test_write_ts_8: (7326.159, FormatStyle::Srt, "02:02:06,159"),
        test_write_ts_9: (360_000.001, FormatStyle::Srt, "100:00:00,001"),
    }

    #[test]
    fn rejects_invalid_seconds() {
        for bad in [-0.5, f64::NAN, f64::INFINITY, 1e300] {
            match seconds_to_timestamp(bad, FormatStyle::Srt) {
                Err(SubtitleError::InvalidTime(_)) => (),
                other => panic!("expected InvalidTime for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn rejects_malformed_timestamps() {
        let inputs = [
            "",
            "00:00:01",
            "00:00:01000",
            "00:60:00,000",
            "00:00:75,000",
            "aa:00:00,000",
            "00:0x:00,000",
            "00:00:00,0000",
            "00:00:00,000 trailing",
            "99999999999999:00:00,000",
            "99999999999999999999999:00:00,000",
        ];
        for input in inputs {
            assert!(
                matches!(timestamp_to_seconds(input), Err(SubtitleError::ParseError(_))),
                "'{}' should not parse",
                input
            );
        }
    }

    #[test]
    fn round_trips_within_a_millisecond() {
        let styles = [FormatStyle::Srt, FormatStyle::Vtt, FormatStyle::Ass];
        let samples = [0.0, 0.0005, 0.9996, 1.001, 12.345_678, 59.9999, 3599.999, 86_399.5];
        for style in styles {
            for seconds in samples {
                let ts = seconds_to_timestamp(seconds, style).unwrap();
                let back = timestamp_to_seconds(&ts).unwrap();
                assert!(
                    (back - seconds).abs() < 0.001,
                    "{:?}: {} -> {} -> {}",
                    style,
                    seconds,
                    ts,
                    back
                );
            }
        }
    }
}
