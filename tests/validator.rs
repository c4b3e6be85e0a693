#![forbid(unsafe_code)]
use chrono::NaiveTime;
use metroshift::scheduler::{can_add_officer_shift_with, hourly_availability_with};
use metroshift::{
    available_time_slots, can_add_officer_shift, hourly_availability, parse_time_string,
    CapacityOptions, ConflictKind, OfficerShift,
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn officer(name: &str, time: &str) -> OfficerShift {
    OfficerShift::new(name, parse_time_string(time))
}

#[test]
fn empty_window_accepts_first_officer() {
    let v = can_add_officer_shift(
        &[],
        "Ofc. Smith #123",
        &parse_time_string("0500-0900"),
        t(5, 0),
        t(13, 0),
    );
    assert!(v.valid);
    assert!(v.conflicts.is_empty());
}

#[test]
fn full_hours_reject_third_officer() {
    let existing = vec![
        officer("Ofc. Smith #123", "0500-1300"),
        officer("Sgt. Jones #456", "0500-1300"),
    ];
    let v = can_add_officer_shift(
        &existing,
        "Cpl. Lee #789",
        &parse_time_string("0600-0800"),
        t(5, 0),
        t(13, 0),
    );
    assert!(!v.valid);
    assert_eq!(v.conflicts.len(), 2);
    assert_eq!(v.conflicts[0].hour, Some(t(6, 0)));
    assert_eq!(v.conflicts[1].hour, Some(t(7, 0)));

    let messages = v.messages();
    assert_eq!(
        messages[0],
        "Hour 0600 would exceed capacity (3 officers: Ofc. Smith #123, Sgt. Jones #456, Cpl. Lee #789)."
    );
    assert!(messages[1].starts_with("Hour 0700"));
}

#[test]
fn two_hour_window_single_officer() {
    let hours = hourly_availability(&[officer("Ofc. Smith #123", "0500-0700")], t(5, 0), t(7, 0));
    assert_eq!(hours.len(), 2);
    for h in &hours {
        assert_eq!(h.officer_count, 1);
        assert!(h.available);
        assert_eq!(h.officers, vec!["Ofc. Smith #123".to_string()]);
    }
    assert_eq!(hours[0].hour, t(5, 0));
    assert_eq!(hours[1].hour, t(6, 0));
}

#[test]
fn short_block_rejected_before_anything_else() {
    // hors fenêtre ET trop court : la durée l'emporte
    let v = can_add_officer_shift(&[], "A", &parse_time_string("0400-0430"), t(5, 0), t(13, 0));
    assert!(!v.valid);
    assert_eq!(v.conflicts.len(), 1);
    assert_eq!(
        v.messages(),
        vec!["Shift block must be at least 1 hour long.".to_string()]
    );
}

#[test]
fn inverted_range_counts_as_too_short() {
    let v = can_add_officer_shift(&[], "A", &parse_time_string("1200-0600"), t(5, 0), t(13, 0));
    assert!(matches!(
        v.conflicts[0].kind,
        ConflictKind::BlockTooShort { min_minutes: 60 }
    ));
}

#[test]
fn empty_candidate_is_rejected() {
    let v = can_add_officer_shift(&[], "A", &[], t(5, 0), t(13, 0));
    assert!(!v.valid);
    assert!(matches!(v.conflicts[0].kind, ConflictKind::BlockTooShort { .. }));
}

#[test]
fn outside_window_names_the_window() {
    let v = can_add_officer_shift(&[], "A", &parse_time_string("1200-1400"), t(5, 0), t(13, 0));
    assert!(!v.valid);
    assert_eq!(
        v.messages(),
        vec!["Shift block must be within the allowed window 0500-1300.".to_string()]
    );
}

#[test]
fn window_bounds_are_inclusive() {
    let v = can_add_officer_shift(&[], "A", &parse_time_string("0500-1300"), t(5, 0), t(13, 0));
    assert!(v.valid);
}

#[test]
fn split_shift_fits_around_busy_hours() {
    let existing = vec![
        officer("A", "0500-1300"),
        officer("B", "0700-0900"),
    ];
    let slots = available_time_slots(&existing, t(5, 0), t(13, 0));
    assert_eq!(slots, vec!["0500-0700".to_string(), "0900-1300".to_string()]);

    let ok = can_add_officer_shift(
        &existing,
        "C",
        &parse_time_string("0500-0700,0900-1000"),
        t(5, 0),
        t(13, 0),
    );
    assert!(ok.valid);

    let clash = can_add_officer_shift(
        &existing,
        "C",
        &parse_time_string("0500-0700,0800-0900"),
        t(5, 0),
        t(13, 0),
    );
    assert_eq!(clash.conflicts.len(), 1);
    assert_eq!(clash.conflicts[0].hour, Some(t(8, 0)));
}

#[test]
fn fully_booked_window_has_no_slots() {
    let existing = vec![officer("A", "0500-1300"), officer("B", "0500-1300")];
    assert!(available_time_slots(&existing, t(5, 0), t(13, 0)).is_empty());
    assert_eq!(
        available_time_slots(&[], t(5, 0), t(13, 0)),
        vec!["0500-1300".to_string()]
    );
}

#[test]
fn trailing_partial_hour_gets_no_slot() {
    let hours = hourly_availability(&[], t(5, 0), t(7, 30));
    assert_eq!(hours.len(), 2);
    assert_eq!(hours.last().unwrap().hour, t(6, 0));
}

#[test]
fn half_hour_overlap_occupies_the_hour() {
    let hours = hourly_availability(&[officer("A", "0530-0630")], t(5, 0), t(8, 0));
    let counts: Vec<usize> = hours.iter().map(|h| h.officer_count).collect();
    assert_eq!(counts, vec![1, 1, 0]);
}

#[test]
fn capacity_can_be_tuned() {
    let opts = CapacityOptions {
        capacity: 1,
        min_block_minutes: 120,
    };
    let existing = vec![officer("A", "0500-0700")];
    let hours = hourly_availability_with(&existing, t(5, 0), t(9, 0), opts);
    assert!(!hours[0].available);
    assert!(hours[2].available);

    let short = can_add_officer_shift_with(
        &[],
        "B",
        &parse_time_string("0700-0800"),
        t(5, 0),
        t(9, 0),
        opts,
    );
    assert_eq!(
        short.messages(),
        vec!["Shift block must be at least 2 hours long.".to_string()]
    );

    let over = can_add_officer_shift_with(
        &existing,
        "B",
        &parse_time_string("0600-0800"),
        t(5, 0),
        t(9, 0),
        opts,
    );
    assert_eq!(over.conflicts.len(), 1);
    assert!(matches!(
        over.conflicts[0].kind,
        ConflictKind::OverCapacity { capacity: 1 }
    ));
}
