//! Stats file rows.
//!
//! Writing is done by hand so each line matches the established layout byte
//! for byte: only the theme column is escaped, the percentage is rounded half
//! up and the timestamp drops trailing zeros from its fraction. Reading goes
//! through the `csv` crate, which handles quoted commas, quotes and line
//! breaks anywhere in the file.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Timelike};

use cquiz_core::summary::QuizSummary;

/// Quote a field if it contains a comma, a quote or a newline. Embedded
/// quotes are doubled.
pub fn escape_csv(input: &str) -> String {
    if input.contains([',', '"', '\n']) {
        format!("\"{}\"", input.replace('"', "\"\""))
    } else {
        input.to_string()
    }
}

/// Local ISO date-time. Seconds are always present; the fraction is omitted
/// when zero and otherwise printed without trailing zeros.
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    let mut out = timestamp.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = timestamp.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// Format with two decimals, rounding ties away from zero.
///
/// Rounding works on the shortest decimal form of the value, so `3.125`
/// becomes `3.13` and `0.285` becomes `0.29` where `{:.2}` gives `3.12` and
/// `0.28`.
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // f64 Display never switches to exponent notation
    let shortest = value.abs().to_string();
    let (int_part, frac) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac.bytes().chain(std::iter::repeat(b'0')).take(2))
        .collect();

    if frac.as_bytes().get(2).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - 2;
    let sign = if value < 0.0 { "-" } else { "" };
    format!(
        "{sign}{}.{}",
        String::from_utf8_lossy(&digits[..split]),
        String::from_utf8_lossy(&digits[split..])
    )
}

/// Render one stats line, without the line terminator.
pub fn format_row(summary: &QuizSummary, timestamp: NaiveDateTime) -> String {
    [
        format_timestamp(timestamp),
        escape_csv(&summary.theme),
        summary.correct.to_string(),
        summary.wrong.to_string(),
        format_percentage(summary.percentage),
        summary.hints_used.to_string(),
        summary.elapsed_secs.to_string(),
    ]
    .join(",")
}

/// Split CSV text into records of fields. Blank lines are skipped and rows
/// may have any number of fields.
pub fn parse_records(content: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    reader
        .records()
        .map(|record| {
            let record = record.context("malformed CSV record")?;
            Ok(record.iter().map(str::to_string).collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn summary(theme: &str) -> QuizSummary {
        QuizSummary {
            theme: theme.into(),
            correct: 9,
            wrong: 3,
            percentage: 75.0,
            hints_used: 2,
            elapsed_secs: 184,
        }
    }

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(15, 9, 26)
            .unwrap()
    }

    fn percentage(correct: u32, total: u32) -> f64 {
        100.0 * f64::from(correct) / f64::from(total)
    }

    #[test]
    fn escape_leaves_plain_text_alone() {
        assert_eq!(escape_csv("Pointers"), "Pointers");
        assert_eq!(escape_csv(""), "");
    }

    #[test]
    fn escape_quotes_special_characters() {
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn row_layout() {
        assert_eq!(
            format_row(&summary("Control Flow"), timestamp()),
            "2025-03-14T15:09:26,Control Flow,9,3,75.00,2,184"
        );
    }

    #[test]
    fn row_rounds_percentage_to_two_places() {
        let mut s = summary("Memory");
        s.percentage = 200.0 / 3.0;
        assert!(format_row(&s, timestamp()).contains(",66.67,"));
    }

    #[test]
    fn percentage_ties_round_up() {
        assert_eq!(format_percentage(percentage(1, 32)), "3.13");
        assert_eq!(format_percentage(percentage(1, 160)), "0.63");
        assert_eq!(format_percentage(percentage(3, 32)), "9.38");
        assert_eq!(format_percentage(percentage(1, 3)), "33.33");
        assert_eq!(format_percentage(0.285), "0.29");
        assert_eq!(format_percentage(99.995), "100.00");
    }

    #[test]
    fn percentage_plain_values() {
        assert_eq!(format_percentage(0.0), "0.00");
        assert_eq!(format_percentage(100.0), "100.00");
        assert_eq!(format_percentage(75.0), "75.00");
        assert_eq!(format_percentage(9.999), "10.00");
    }

    #[test]
    fn row_uses_half_up_percentage() {
        let mut s = summary("t");
        s.correct = 1;
        s.wrong = 31;
        s.percentage = percentage(1, 32);
        s.hints_used = 0;
        s.elapsed_secs = 1;
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_row(&s, ts), "2025-01-01T00:00:00,t,1,31,3.13,0,1");
    }

    #[test]
    fn timestamp_fraction_drops_trailing_zeros() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let ts = |nanos| day.and_hms_nano_opt(0, 0, 0, nanos).unwrap();
        assert_eq!(format_timestamp(ts(0)), "2025-01-01T00:00:00");
        assert_eq!(format_timestamp(ts(120_000_000)), "2025-01-01T00:00:00.12");
        assert_eq!(format_timestamp(ts(123_456_000)), "2025-01-01T00:00:00.123456");
        assert_eq!(format_timestamp(ts(5)), "2025-01-01T00:00:00.000000005");
    }

    #[test]
    fn row_escapes_theme() {
        let line = format_row(&summary("Strings, Arrays"), timestamp());
        assert_eq!(line, "2025-03-14T15:09:26,\"Strings, Arrays\",9,3,75.00,2,184");
    }

    #[test]
    fn parse_handles_quotes_and_blank_lines() {
        let content = "a,\"b, c\",d\r\n\n\"say \"\"hi\"\"\",x\n\"multi\nline\",y";
        let records = parse_records(content).unwrap();
        assert_eq!(
            records,
            vec![
                vec!["a", "b, c", "d"],
                vec!["say \"hi\"", "x"],
                vec!["multi\nline", "y"],
            ]
        );
    }

    #[test]
    fn parse_keeps_empty_fields() {
        assert_eq!(parse_records("a,,c\n").unwrap(), vec![vec!["a", "", "c"]]);
    }

    #[test]
    fn parse_inverts_format_row() {
        let line = format_row(&summary("odd \"theme\", really\nodd"), timestamp());
        let records = parse_records(&line).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][1], "odd \"theme\", really\nodd");
        assert_eq!(records[0].len(), 7);
    }
}
