//! Lecture et écriture des horaires `HHMM-HHMM` / `HH:MM-HH:MM`.
//!
//! Deux variantes de parsing :
//! - [`parse_time_string`] : permissive, les segments illisibles disparaissent ;
//! - [`parse_time_string_strict`] : échoue au premier segment invalide.

use crate::model::TimeRange;
use chrono::{NaiveTime, Timelike};
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty time specification")]
    Empty,
    #[error("invalid time segment: {0:?} (expected HHMM-HHMM or HH:MM-HH:MM)")]
    Malformed(String),
}

/// Découpe une spécification (segments séparés par des virgules) en plages.
///
/// Les segments qui ne correspondent à aucun format sont ignorés ; un résultat
/// vide doit être traité comme une entrée invalide par l'appelant.
pub fn parse_time_string(raw: &str) -> Vec<TimeRange> {
    raw.split(',')
        .filter_map(|segment| parse_segment(segment.trim()))
        .collect()
}

/// Variante stricte : toute entrée vide ou tout segment mal formé est une erreur.
pub fn parse_time_string_strict(raw: &str) -> Result<Vec<TimeRange>, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    raw.split(',')
        .map(|segment| {
            let segment = segment.trim();
            parse_segment(segment).ok_or_else(|| ParseError::Malformed(segment.to_string()))
        })
        .collect()
}

pub(crate) fn parse_segment(segment: &str) -> Option<TimeRange> {
    let (start, end) = segment.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());
    // pas de mélange `0500-13:00`
    if start.contains(':') != end.contains(':') {
        return None;
    }
    Some(TimeRange::new(parse_clock(start)?, parse_clock(end)?))
}

fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let digits = match raw.len() {
        4 => raw.to_string(),
        5 if raw.as_bytes()[2] == b':' => format!("{}{}", &raw[..2], &raw[3..]),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveTime::parse_from_str(&digits, "%H%M").ok()
}

/// `05:30` → `"0530"`.
pub fn format_hhmm(t: NaiveTime) -> String {
    t.format("%H%M").to_string()
}

/// Joint des plages sous la forme persistée `"0500-0900,1000-1200"`.
pub fn format_time_ranges(ranges: &[TimeRange]) -> String {
    ranges
        .iter()
        .map(TimeRange::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Minutes depuis minuit.
pub fn minutes_of(t: NaiveTime) -> u32 {
    t.num_seconds_from_midnight() / 60
}

/// Inverse de [`minutes_of`], modulo 24 h.
pub fn clock_from_minutes(minutes: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt((minutes % MINUTES_PER_DAY) * 60, 0)
        .unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn both_notations_parse() {
        let compact = parse_time_string("0500-1300");
        let colon = parse_time_string("05:00-13:00");
        assert_eq!(compact, colon);
        assert_eq!(compact, vec![TimeRange::new(t(5, 0), t(13, 0))]);
    }

    #[test]
    fn split_shift_keeps_input_order() {
        let ranges = parse_time_string("1000-1200, 0600-0800");
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].start, t(10, 0));
        assert_eq!(ranges[1].start, t(6, 0));
    }

    #[test]
    fn garbage_segments_are_dropped() {
        let ranges = parse_time_string("0600-0800,nope,9-10,0500-13:00,2500-2600");
        assert_eq!(ranges, vec![TimeRange::new(t(6, 0), t(8, 0))]);
        assert!(parse_time_string("").is_empty());
        assert!(parse_time_string("morning").is_empty());
    }

    #[test]
    fn inverted_ranges_are_structurally_accepted() {
        let ranges = parse_time_string("2200-0200");
        assert_eq!(ranges, vec![TimeRange::new(t(22, 0), t(2, 0))]);
    }

    #[test]
    fn strict_parser_reports_first_bad_segment() {
        assert_eq!(parse_time_string_strict("  "), Err(ParseError::Empty));
        assert_eq!(
            parse_time_string_strict("0600-0800,06-08"),
            Err(ParseError::Malformed("06-08".into()))
        );
        assert_eq!(parse_time_string_strict("0600-0800").unwrap().len(), 1);
    }

    #[test]
    fn minute_helpers() {
        assert_eq!(minutes_of(t(13, 30)), 810);
        assert_eq!(clock_from_minutes(810), t(13, 30));
        assert_eq!(clock_from_minutes(MINUTES_PER_DAY + 60), t(1, 0));
        assert_eq!(format_hhmm(t(5, 0)), "0500");
    }
}
