//! Timestamp parsing tests.

use framesift::{FramesiftError, format_time, parse_time};

// ── accepted notations ────────────────────────────────────────────

#[test]
fn plain_seconds() {
    assert_eq!(parse_time("90").unwrap(), 90.0);
    assert_eq!(parse_time("5.25").unwrap(), 5.25);
    assert_eq!(parse_time("0").unwrap(), 0.0);
}

#[test]
fn minutes_and_seconds() {
    assert_eq!(parse_time("01:30").unwrap(), 90.0);
    assert_eq!(parse_time("09:54").unwrap(), 594.0);
    assert_eq!(parse_time("1:05.5").unwrap(), 65.5);
}

#[test]
fn hours_minutes_seconds() {
    assert_eq!(parse_time("00:01:30").unwrap(), 90.0);
    assert_eq!(parse_time("1:02:03.5").unwrap(), 3723.5);
}

#[test]
fn surrounding_whitespace_is_ignored() {
    assert_eq!(parse_time("  01:30\n").unwrap(), 90.0);
}

#[test]
fn seconds_field_may_exceed_sixty() {
    assert_eq!(parse_time("01:75").unwrap(), 135.0);
}

// ── rejected input ────────────────────────────────────────────────

fn assert_malformed(input: &str) {
    match parse_time(input) {
        Err(FramesiftError::MalformedTimestamp { input: echoed, .. }) => {
            assert_eq!(echoed, input);
        }
        other => panic!("expected MalformedTimestamp for {input:?}, got {other:?}"),
    }
}

#[test]
fn non_numeric_components() {
    assert_malformed("a:b");
    assert_malformed("abc");
    assert_malformed("01:xx");
}

#[test]
fn too_many_components() {
    assert_malformed("1:2:3:4");
}

#[test]
fn negative_values() {
    assert_malformed("-5");
    assert_malformed("-1:30");
    assert_malformed("01:-30");
}

#[test]
fn negative_zero_is_rejected_in_every_field() {
    assert_malformed("-0");
    assert_malformed("-0.0");
    assert_malformed("01:-0");
    assert_malformed("-0:30");
}

#[test]
fn empty_components() {
    assert_malformed("");
    assert_malformed(":30");
    assert_malformed("01:");
}

#[test]
fn fractional_minutes_are_rejected() {
    assert_malformed("1.5:30");
}

#[test]
fn non_finite_seconds() {
    assert_malformed("inf");
    assert_malformed("NaN");
}

#[test]
fn malformed_timestamp_is_a_configuration_error() {
    let error = parse_time("a:b").unwrap_err();
    assert_eq!(error.stage(), framesift::Stage::Configure);
    assert!(!error.is_recoverable());
}

// ── formatting ────────────────────────────────────────────────────

#[test]
fn format_under_an_hour() {
    assert_eq!(format_time(5.0), "00:05.000");
    assert_eq!(format_time(594.5), "09:54.500");
}

#[test]
fn format_past_an_hour() {
    assert_eq!(format_time(3723.5), "1:02:03.500");
}

#[test]
fn format_then_parse_recovers_seconds() {
    for seconds in [0.0, 5.0, 90.25, 659.0, 3723.5] {
        assert_eq!(parse_time(&format_time(seconds)).unwrap(), seconds);
    }
}
