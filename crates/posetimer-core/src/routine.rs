//! Routine text parsing.
//!
//! A routine is plain text, one interval per line:
//!
//! ```text
//! <label>,<duration in seconds>
//! ```
//!
//! Durations may be integer or float literals. Empty lines are skipped; any
//! other line that does not match the format fails the whole parse.

use indoc::indoc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ParseError;

/// The stretching routine used when no routine text is supplied.
pub const DEFAULT_ROUTINE: &str = indoc! {"
    Left leg front,90
    Right leg front,90
    Split,90
    Pike,90
    Left leg front,90
    Right leg front,90
    Split,90
    Pike,90
    Kneel,60
    Camel,90
    Kneel,45
    Camel,90
    Kneel,30
    Get on stomach,5
    Boat,60
    Rest,30
    Boat,60
    Rest,30
    Sit up,5
    Twist left,90
    Twist right,90
    Get on stomach,5
    Plank,30
    Rest,30
    Plank,30
"};

const FIELD_SEPARATOR: char = ',';

/// One labeled hold with a fixed target duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    label: String,
    duration_secs: f64,
}

impl Interval {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Target duration in seconds. Always finite and > 0.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

/// Ordered sequence of intervals, in playback order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    intervals: Vec<Interval>,
}

impl Routine {
    /// The built-in default routine.
    pub fn default_routine() -> Self {
        // DEFAULT_ROUTINE is covered by tests; an empty routine is the safe fallback.
        parse(DEFAULT_ROUTINE).unwrap_or_default()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(index)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.intervals.iter().map(|i| i.duration_secs).sum()
    }

    /// Seconds elapsed before `index` starts (sum of earlier durations).
    pub fn cumulative_secs(&self, index: usize) -> f64 {
        self.intervals
            .iter()
            .take(index)
            .map(|i| i.duration_secs)
            .sum()
    }
}

impl<'a> IntoIterator for &'a Routine {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl FromStr for Routine {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse routine text into a [`Routine`].
///
/// Either every non-empty line parses or the first bad line is reported;
/// no partial routine is ever returned.
pub fn parse(text: &str) -> Result<Routine, ParseError> {
    let mut intervals = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        intervals.push(parse_line(index + 1, line)?);
    }

    Ok(Routine { intervals })
}

fn parse_line(line_no: usize, line: &str) -> Result<Interval, ParseError> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let [label, token] = fields.as_slice() else {
        return Err(ParseError::MalformedLine {
            line: line_no,
            fields: fields.len(),
        });
    };

    if label.is_empty() {
        return Err(ParseError::EmptyLabel { line: line_no });
    }

    let token = token.trim();
    let duration_secs: f64 = token.parse().map_err(|_| ParseError::InvalidDuration {
        line: line_no,
        token: token.to_string(),
    })?;

    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(ParseError::NonPositiveDuration {
            line: line_no,
            value: duration_secs,
        });
    }

    Ok(Interval {
        label: label.to_string(),
        duration_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_labels_and_durations_in_order() {
        let routine = parse("Stretch left,10\nStretch right,5.5\n").unwrap();
        assert_eq!(routine.len(), 2);
        assert_eq!(routine.intervals()[0].label(), "Stretch left");
        assert_eq!(routine.intervals()[0].duration_secs(), 10.0);
        assert_eq!(routine.intervals()[1].label(), "Stretch right");
        assert_eq!(routine.intervals()[1].duration_secs(), 5.5);
    }

    #[test]
    fn skips_empty_lines() {
        let routine = parse("\n\nA,1\n\n\nB,2\n\n").unwrap();
        assert_eq!(routine.len(), 2);
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let routine = parse("A,1\r\nB,2\r\n").unwrap();
        assert_eq!(routine.len(), 2);
        assert_eq!(routine.intervals()[1].duration_secs(), 2.0);
    }

    #[test]
    fn tolerates_whitespace_around_duration() {
        let routine = parse("Split, 90 ").unwrap();
        assert_eq!(routine.intervals()[0].duration_secs(), 90.0);
    }

    #[test]
    fn label_is_kept_verbatim() {
        let routine = parse("  Twist (left) ;-) ,3").unwrap();
        assert_eq!(routine.intervals()[0].label(), "  Twist (left) ;-) ");
    }

    #[test]
    fn empty_text_is_an_empty_routine() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n\n\n").unwrap().is_empty());
    }

    #[test]
    fn missing_comma_is_malformed() {
        let err = parse("A,1\nPlank 30\n").unwrap_err();
        assert_eq!(err, ParseError::MalformedLine { line: 2, fields: 1 });
    }

    #[test]
    fn extra_comma_is_malformed() {
        let err = parse("Left, right,30").unwrap_err();
        assert_eq!(err, ParseError::MalformedLine { line: 1, fields: 3 });
    }

    #[test]
    fn whitespace_only_line_is_malformed() {
        let err = parse("A,1\n   \nB,2").unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn non_numeric_duration_fails() {
        let err = parse("Plank,thirty").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidDuration {
                line: 1,
                token: "thirty".into()
            }
        );
    }

    #[test]
    fn zero_negative_and_infinite_durations_fail() {
        for text in ["A,0", "A,-5", "A,inf", "A,NaN"] {
            let err = parse(text).unwrap_err();
            assert!(
                matches!(err, ParseError::NonPositiveDuration { line: 1, .. }),
                "{text}: {err:?}"
            );
        }
    }

    #[test]
    fn empty_label_fails() {
        assert_eq!(parse(",5").unwrap_err(), ParseError::EmptyLabel { line: 1 });
    }

    #[test]
    fn from_str_delegates_to_parse() {
        let routine: Routine = "A,1\nB,2".parse().unwrap();
        assert_eq!(routine.len(), 2);
    }

    #[test]
    fn default_routine_has_25_poses() {
        let routine = Routine::default_routine();
        assert_eq!(routine.len(), 25);
        assert_eq!(routine.intervals()[0].label(), "Left leg front");
        assert_eq!(routine.intervals()[24].label(), "Plank");
    }

    #[test]
    fn total_and_cumulative_durations() {
        let routine = parse("A,10\nB,5\nC,2.5").unwrap();
        assert_eq!(routine.total_duration_secs(), 17.5);
        assert_eq!(routine.cumulative_secs(0), 0.0);
        assert_eq!(routine.cumulative_secs(2), 15.0);
        assert_eq!(routine.cumulative_secs(10), 17.5);
    }

    fn label_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ()]{0,20}"
    }

    proptest! {
        #[test]
        fn interval_count_matches_non_blank_lines(
            entries in prop::collection::vec((label_strategy(), 1u32..10_000, any::<bool>()), 0..40)
        ) {
            let mut text = String::new();
            for (label, tenths, blank_after) in &entries {
                text.push_str(&format!("{label},{}\n", *tenths as f64 / 10.0));
                if *blank_after {
                    text.push('\n');
                }
            }

            let routine = parse(&text).unwrap();
            prop_assert_eq!(routine.len(), entries.len());
            for (interval, (label, tenths, _)) in routine.iter().zip(&entries) {
                prop_assert_eq!(interval.label(), label.as_str());
                prop_assert!((interval.duration_secs() - *tenths as f64 / 10.0).abs() < 1e-9);
            }
        }

        #[test]
        fn a_bad_line_anywhere_fails_the_whole_parse(
            good in prop::collection::vec((label_strategy(), 1u32..600), 0..10),
            position in 0usize..10,
            bad in prop_oneof!["[A-Za-z ]{1,12}", "[A-Za-z]{1,8},[a-z]{1,6}"],
        ) {
            let mut lines: Vec<String> = good
                .iter()
                .map(|(label, secs)| format!("{label},{secs}"))
                .collect();
            let position = position.min(lines.len());
            lines.insert(position, bad);

            let err = parse(&lines.join("\n")).unwrap_err();
            prop_assert_eq!(err.line(), position + 1);
        }
    }
}
