//! InfluxDB line-protocol parser
//!
//! Grammar, per line: `measurement[,tag=value]+ field=value[,field=value]* [timestamp]`.
//! The only recognized escape sequences are `\ `, `\,`, `\=` and `\"`.
//! Timestamps are either literal nanosecond counts or a dash-separated UTC
//! calendar form `YYYY-MM-DD[-HH[-MM[-SS]]]`.

use std::collections::BTreeMap;

use chrono::{
    TimeZone,
    Utc,
};
use releasekit_step_api::{
    StepError,
    StepResult,
};

/// A single typed field value on a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// One parsed line: measurement, tags, fields and an optional timestamp.
///
/// Immutable after parsing; `fields` is never empty and `measurement` never
/// blank on a successfully parsed record.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    /// Nanoseconds since the epoch; `None` means "assign at publish time"
    pub timestamp: Option<i64>,
}

impl ContentRecord {
    /// Re-encodes the record into line-protocol form, the inverse of `parse`
    /// for every record `parse` can produce.
    ///
    /// Field pairs are split on the literal `=` character with no escape, so
    /// a field key or text value containing `=` has no representation in the
    /// grammar; encoding such a record is a `Serialization` error rather than
    /// a line the parser would reject.
    pub fn to_line(&self) -> StepResult<String> {
        let mut line = escape_segment(&self.measurement);
        for (key, value) in &self.tags {
            line.push(',');
            line.push_str(&escape_segment(key));
            line.push('=');
            line.push_str(&escape_segment(value));
        }
        line.push(' ');
        let mut first = true;
        for (key, value) in &self.fields {
            if key.contains('=') {
                return Err(StepError::Serialization(format!(
                    "field key {key} contains '=', which the line format cannot represent"
                )));
            }
            if !first {
                line.push(',');
            }
            first = false;
            line.push_str(&escape_segment(key));
            line.push('=');
            match value {
                FieldValue::Boolean(b) => line.push_str(if *b { "true" } else { "false" }),
                FieldValue::Integer(i) => {
                    line.push_str(&i.to_string());
                    line.push('i');
                }
                FieldValue::Float(f) => line.push_str(&f.to_string()),
                FieldValue::Text(s) => {
                    if s.contains('=') {
                        return Err(StepError::Serialization(format!(
                            "text value of field {key} contains '=', \
                             which the line format cannot represent"
                        )));
                    }
                    // Quotes do not shield commas from the field split, so
                    // commas need escaping alongside the quote character.
                    line.push('"');
                    line.push_str(&s.replace('"', "\\\"").replace(',', "\\,"));
                    line.push('"');
                }
            }
        }
        if let Some(ts) = self.timestamp {
            line.push(' ');
            line.push_str(&ts.to_string());
        }
        Ok(line)
    }
}

/// Parses a multi-line blob in line-protocol format.
///
/// Blank and whitespace-only lines are skipped. Any malformed line fails the
/// whole call; partial results are never returned.
pub fn parse(source: &str) -> StepResult<Vec<ContentRecord>> {
    let mut records = Vec::new();
    for raw_line in source.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        records.push(parse_line(line)?);
    }
    Ok(records)
}

fn parse_line(line: &str) -> StepResult<ContentRecord> {
    let segments = split_outside_quotes(line);
    if segments.len() > 3 {
        return Err(StepError::Parse(format!("invalid line: {line}")));
    }

    let mut record = ContentRecord {
        measurement: String::new(),
        tags: BTreeMap::new(),
        fields: BTreeMap::new(),
        timestamp: None,
    };

    for (index, segment) in segments.iter().enumerate() {
        match index {
            0 => parse_key(segment, &mut record)?,
            1 => parse_fields(segment, &mut record)?,
            2 => record.timestamp = Some(parse_timestamp(segment)?),
            _ => unreachable!(),
        }
    }

    if record.measurement.is_empty() {
        return Err(StepError::Parse(format!(
            "measurement name is missing: {line}"
        )));
    }
    if record.fields.is_empty() {
        return Err(StepError::Parse(format!("fields are missing: {line}")));
    }
    Ok(record)
}

/// Splits a line on spaces that are neither backslash-escaped nor inside a
/// double-quoted span. Empty segments (runs of spaces) are dropped.
///
/// The quote count is tracked across the whole line, not per segment, so a
/// quote character in the tag segment shifts the quoting state of everything
/// after it. Known quirk, kept as-is.
fn split_outside_quotes(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut prev_backslash = false;
    let mut quote_count: usize = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if b == b' ' && !prev_backslash && quote_count % 2 == 0 {
            if i > start {
                segments.push(&line[start..i]);
            }
            start = i + 1;
        }
        if b == b'"' && !prev_backslash {
            quote_count += 1;
        }
        prev_backslash = b == b'\\';
    }
    if start < line.len() {
        segments.push(&line[start..]);
    }
    segments
}

/// Splits on `delim` wherever it is not preceded by a backslash.
fn split_unescaped(input: &str, delim: u8) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    for i in 0..bytes.len() {
        if bytes[i] == delim && (i == 0 || bytes[i - 1] != b'\\') {
            parts.push(&input[start..i]);
            start = i + 1;
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Removes the backslash from the four recognized escape sequences.
fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next @ (' ' | ',' | '=' | '"')) => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn escape_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, ' ' | ',' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Key segment: measurement name followed by at least one `tag=value` pair.
/// The measurement is taken literally; tag keys and values are unescaped.
fn parse_key(segment: &str, record: &mut ContentRecord) -> StepResult<()> {
    let parts = split_unescaped(segment, b',');
    if parts.len() < 2 {
        return Err(StepError::Parse(format!("tags are missing: {segment}")));
    }
    record.measurement = parts[0].to_string();
    for part in &parts[1..] {
        let pair = split_unescaped(part, b'=');
        if pair.len() != 2 {
            return Err(StepError::Parse(format!("invalid key value pair: {part}")));
        }
        record.tags.insert(unescape(pair[0]), unescape(pair[1]));
    }
    Ok(())
}

/// Fields segment: comma-separated `key=value` pairs. The pair split is on
/// the literal `=` character, so exactly one `=` is allowed per pair.
fn parse_fields(segment: &str, record: &mut ContentRecord) -> StepResult<()> {
    for part in split_unescaped(segment, b',') {
        let pair: Vec<&str> = part.split('=').collect();
        if pair.len() != 2 {
            return Err(StepError::Parse(format!("invalid key value pair: {part}")));
        }
        record
            .fields
            .insert(pair[0].to_string(), parse_field_value(pair[1])?);
    }
    Ok(())
}

fn parse_field_value(token: &str) -> StepResult<FieldValue> {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return Ok(FieldValue::Text(unescape(&token[1..token.len() - 1])));
    }
    match token {
        "t" | "T" | "true" | "True" | "TRUE" => return Ok(FieldValue::Boolean(true)),
        "f" | "F" | "false" | "False" | "FALSE" => return Ok(FieldValue::Boolean(false)),
        _ => {}
    }
    if let Some(prefix) = token.strip_suffix('i') {
        let value = prefix
            .parse::<i64>()
            .map_err(|_| StepError::Parse(format!("invalid integer value: {token}")))?;
        return Ok(FieldValue::Integer(value));
    }
    let value = token
        .parse::<f64>()
        .map_err(|_| StepError::Parse(format!("invalid field value: {token}")))?;
    Ok(FieldValue::Float(value))
}

/// Timestamp segment: a dash means the calendar form, otherwise a literal
/// nanosecond count.
fn parse_timestamp(segment: &str) -> StepResult<i64> {
    if !segment.contains('-') {
        return segment
            .parse::<i64>()
            .map_err(|_| StepError::Parse(format!("invalid timestamp: {segment}")));
    }

    let parts: Vec<&str> = segment.split('-').collect();
    if parts.len() < 3 || parts.len() > 6 {
        return Err(StepError::Parse(format!("invalid timestamp: {segment}")));
    }
    let year = parts[0]
        .parse::<i32>()
        .map_err(|_| StepError::Parse(format!("invalid timestamp: {segment}")))?;
    let mut numbers = [0u32; 5];
    for (i, part) in parts[1..].iter().enumerate() {
        numbers[i] = part
            .parse::<u32>()
            .map_err(|_| StepError::Parse(format!("invalid timestamp: {segment}")))?;
    }

    let [month, day, hour, minute, second] = numbers;
    let instant = Utc
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .ok_or_else(|| StepError::Parse(format!("invalid timestamp: {segment}")))?;
    Ok(instant.timestamp_millis() * 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> ContentRecord {
        let mut records = parse(line).unwrap();
        assert_eq!(records.len(), 1);
        records.remove(0)
    }

    #[test]
    fn test_minimal_line() {
        let record = parse_one("m,tag=v f=1i");
        assert_eq!(record.measurement, "m");
        assert_eq!(record.tags.get("tag").unwrap(), "v");
        assert_eq!(record.fields.get("f").unwrap(), &FieldValue::Integer(1));
        assert_eq!(record.timestamp, None);
    }

    #[test]
    fn test_field_typing() {
        let record = parse_one("build,job=release ok=true,count=12i,ratio=2.5,msg=\"done\"");
        assert_eq!(record.fields.get("ok").unwrap(), &FieldValue::Boolean(true));
        assert_eq!(
            record.fields.get("count").unwrap(),
            &FieldValue::Integer(12)
        );
        assert_eq!(record.fields.get("ratio").unwrap(), &FieldValue::Float(2.5));
        assert_eq!(
            record.fields.get("msg").unwrap(),
            &FieldValue::Text("done".to_string())
        );
    }

    #[test]
    fn test_boolean_literals() {
        for (token, expected) in [
            ("t", true),
            ("T", true),
            ("true", true),
            ("True", true),
            ("TRUE", true),
            ("f", false),
            ("F", false),
            ("false", false),
            ("False", false),
            ("FALSE", false),
        ] {
            let record = parse_one(&format!("m,a=b v={token}"));
            assert_eq!(
                record.fields.get("v").unwrap(),
                &FieldValue::Boolean(expected),
                "literal {token}"
            );
        }
    }

    #[test]
    fn test_escaping() {
        let record = parse_one(r#"m,t=a\,b f="has space""#);
        assert_eq!(record.tags.get("t").unwrap(), "a,b");
        assert_eq!(
            record.fields.get("f").unwrap(),
            &FieldValue::Text("has space".to_string())
        );
    }

    #[test]
    fn test_escaped_space_in_tag() {
        let record = parse_one(r"m,host=build\ agent f=1i");
        assert_eq!(record.tags.get("host").unwrap(), "build agent");
    }

    #[test]
    fn test_nanosecond_timestamp() {
        let record = parse_one("m,tag=v f=1 1465839830100400200");
        assert_eq!(record.timestamp, Some(1465839830100400200));
    }

    #[test]
    fn test_calendar_timestamp() {
        let record = parse_one("m,tag=v f=1 2016-06-13-18-30-05");
        let expected = Utc
            .with_ymd_and_hms(2016, 6, 13, 18, 30, 5)
            .unwrap()
            .timestamp_millis()
            * 1_000_000;
        assert_eq!(record.timestamp, Some(expected));
    }

    #[test]
    fn test_calendar_timestamp_date_only() {
        let record = parse_one("m,tag=v f=1 2016-06-13");
        let expected = Utc
            .with_ymd_and_hms(2016, 6, 13, 0, 0, 0)
            .unwrap()
            .timestamp_millis()
            * 1_000_000;
        assert_eq!(record.timestamp, Some(expected));
    }

    #[test]
    fn test_missing_tags_is_an_error() {
        assert!(parse("m").is_err());
        assert!(parse("m f=1").is_err());
    }

    #[test]
    fn test_missing_fields_is_an_error() {
        assert!(parse("m,tag=v").is_err());
    }

    #[test]
    fn test_four_segments_is_an_error() {
        let err = parse("m,tag=v f=1 12345 extra").unwrap_err();
        assert!(err.to_string().contains("invalid line"));
    }

    #[test]
    fn test_malformed_pairs() {
        assert!(parse("m,tag f=1").is_err());
        assert!(parse("m,tag=v f").is_err());
        assert!(parse("m,tag=v f=1=2").is_err());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let records = parse("\n   \nm,tag=v f=1i\n\t\nm,tag=w f=2i\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_malformed_line_fails_whole_parse() {
        assert!(parse("m,tag=v f=1i\nbroken").is_err());
    }

    #[test]
    fn test_multiple_spaces_between_segments() {
        let record = parse_one("m,tag=v   f=1i   12345");
        assert_eq!(record.timestamp, Some(12345));
    }

    #[test]
    fn test_quote_count_spans_whole_line() {
        // The splitter counts quotes across the entire line, so the quoted
        // span in the tag segment swallows the space before the fields.
        let record = parse_one(r#"m,tag="x y" f=1i"#);
        assert_eq!(record.tags.get("tag").unwrap(), "\"x y\"");
        assert_eq!(record.fields.get("f").unwrap(), &FieldValue::Integer(1));
    }

    #[test]
    fn test_round_trip() {
        let record = parse_one(r#"m,tag=v a=true,b="x y",c=2.5,d=7i 1465839830100400200"#);
        let reparsed = parse_one(&record.to_line().unwrap());
        assert_eq!(record, reparsed);
    }

    #[test]
    fn test_round_trip_escapes() {
        let record = parse_one(r#"m,t=a\,b f="quoted \" inside""#);
        assert_eq!(
            record.fields.get("f").unwrap(),
            &FieldValue::Text("quoted \" inside".to_string())
        );
        let reparsed = parse_one(&record.to_line().unwrap());
        assert_eq!(record, reparsed);
    }

    #[test]
    fn test_round_trip_comma_in_text() {
        let record = parse_one(r#"m,tag=v note="a\,b""#);
        assert_eq!(
            record.fields.get("note").unwrap(),
            &FieldValue::Text("a,b".to_string())
        );
        let reparsed = parse_one(&record.to_line().unwrap());
        assert_eq!(record, reparsed);
    }

    #[test]
    fn test_equals_in_text_value_cannot_be_encoded() {
        // Field pairs split on the literal '=' with no escape, so a value
        // containing one has no valid encoding; emitting it anyway would
        // produce a line the parser rejects.
        let record = ContentRecord {
            measurement: "m".to_string(),
            tags: BTreeMap::from([("t".to_string(), "v".to_string())]),
            fields: BTreeMap::from([(
                "f".to_string(),
                FieldValue::Text("a=b".to_string()),
            )]),
            timestamp: None,
        };
        let err = record.to_line().unwrap_err();
        assert!(matches!(err, StepError::Serialization(_)));
        assert!(err.to_string().contains('='));
    }

    #[test]
    fn test_equals_in_field_key_cannot_be_encoded() {
        let record = ContentRecord {
            measurement: "m".to_string(),
            tags: BTreeMap::from([("t".to_string(), "v".to_string())]),
            fields: BTreeMap::from([("a=b".to_string(), FieldValue::Integer(1))]),
            timestamp: None,
        };
        assert!(matches!(
            record.to_line().unwrap_err(),
            StepError::Serialization(_)
        ));
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        assert!(parse("m,tag=v f=99999999999999999999i").is_err());
    }

    #[test]
    fn test_out_of_range_year_is_an_error() {
        // A year that overflows i32 must fail instead of wrapping into a
        // bogus but parseable timestamp
        assert!(parse("m,tag=v f=1 4294967295-01-01").is_err());
        assert!(parse("m,tag=v f=1 2016-13-01").is_err());
    }
}
