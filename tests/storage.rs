#![forbid(unsafe_code)]
use chrono::NaiveDate;
use metroshift::{
    book, parse_time_string, unbook, BookingError, BookingOptions, BookingRequest, JsonStorage,
    MonthKey, MonthSchedule, OfficerShift, ParseError, PolicyConfig, SchedError, ShiftPeriod,
    Storage, StoreError,
};
use std::cell::Cell;
use std::fs;
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn request(name: &str, time: &str) -> BookingRequest {
    BookingRequest {
        date: d(2025, 8, 12),
        period: ShiftPeriod::Morning,
        officer: name.to_string(),
        ranges: parse_time_string(time),
    }
}

#[test]
fn raw_time_input_is_parsed_strictly() {
    let date = d(2025, 8, 12);
    let req = BookingRequest::parse(date, ShiftPeriod::Morning, "A", "0600-0800, 10:00-12:00")
        .unwrap();
    assert_eq!(req, request("A", "0600-0800,1000-1200"));

    let err = BookingRequest::parse(date, ShiftPeriod::Morning, "A", "0600-0800,6-8").unwrap_err();
    assert!(matches!(
        &err,
        SchedError::InvalidTime(ParseError::Malformed(seg)) if seg == "6-8"
    ));
    assert_eq!(
        err.to_string(),
        "invalid time format: invalid time segment: \"6-8\" (expected HHMM-HHMM or HH:MM-HH:MM)"
    );
    assert!(matches!(
        BookingRequest::parse(date, ShiftPeriod::Morning, "A", " "),
        Err(SchedError::InvalidTime(ParseError::Empty))
    ));
}

#[test]
fn save_load_roundtrip_bumps_version() {
    let dir = tempdir().unwrap();
    let store = JsonStorage::open(dir.path()).unwrap();
    let key = MonthKey::new(2025, 8).unwrap();
    assert!(store.load(key).unwrap().is_none());

    let mut month = store.load_or_empty(key).unwrap();
    month
        .days
        .entry(d(2025, 8, 1))
        .or_default()
        .morning
        .push(OfficerShift::new("A", parse_time_string("0600-0800,1000-1100")));

    let saved = store.save_if_version(&month, 0).unwrap();
    assert_eq!(saved.version, 1);

    let loaded = store.load(key).unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(store.months().unwrap(), vec![key]);

    let raw = fs::read_to_string(store.path_for(key)).unwrap();
    assert!(raw.contains(r#""time": "0600-0800,1000-1100""#));
    assert!(raw.contains(r#""month": "2025-08""#));
}

#[test]
fn stale_version_is_refused_and_file_untouched() {
    let dir = tempdir().unwrap();
    let store = JsonStorage::open(dir.path()).unwrap();
    let key = MonthKey::new(2025, 8).unwrap();
    let month = MonthSchedule::new(key);

    store.save_if_version(&month, 0).unwrap();
    let before = fs::read(store.path_for(key)).unwrap();

    let err = store.save_if_version(&month, 0).unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionConflict {
            expected: 0,
            found: 1,
            ..
        }
    ));
    assert_eq!(fs::read(store.path_for(key)).unwrap(), before);
}

#[test]
fn corrupted_time_string_fails_to_load() {
    let dir = tempdir().unwrap();
    let store = JsonStorage::open(dir.path()).unwrap();
    let key = MonthKey::new(2025, 8).unwrap();
    fs::write(
        store.path_for(key),
        r#"{
            "month": "2025-08",
            "version": 3,
            "days": { "2025-08-01": { "morning": [ { "name": "A", "time": "6am-8am" } ] } }
        }"#,
    )
    .unwrap();
    assert!(matches!(store.load(key), Err(StoreError::Json { .. })));
}

#[test]
fn book_and_unbook_persist() {
    let dir = tempdir().unwrap();
    let store = JsonStorage::open(dir.path()).unwrap();
    let config = PolicyConfig::default();
    let opts = BookingOptions::default();

    let saved = book(&store, &config, &request("A", "0600-1000"), opts).unwrap();
    assert_eq!(saved.version, 1);
    let saved = book(&store, &config, &request("B", "0600-1000"), opts).unwrap();
    assert_eq!(saved.version, 2);

    let err = book(&store, &config, &request("C", "0900-1100"), opts).unwrap_err();
    assert!(matches!(err, BookingError::Sched(SchedError::Rejected(_))));

    let (saved, removed) = unbook(&store, d(2025, 8, 12), ShiftPeriod::Morning, "A", opts).unwrap();
    assert_eq!(removed.name, "A");
    assert_eq!(saved.version, 3);

    book(&store, &config, &request("C", "0900-1100"), opts).unwrap();
    let names: Vec<String> = store
        .load(MonthKey::new(2025, 8).unwrap())
        .unwrap()
        .unwrap()
        .officers(d(2025, 8, 12), ShiftPeriod::Morning)
        .iter()
        .map(|o| o.name.clone())
        .collect();
    assert_eq!(names, vec!["B", "C"]);
}

/// Simule un autre agent qui écrit juste avant notre première sauvegarde.
struct RacingStore {
    inner: JsonStorage,
    rival: Option<BookingRequest>,
    raced: Cell<bool>,
}

impl Storage for RacingStore {
    fn load(&self, month: MonthKey) -> Result<Option<MonthSchedule>, StoreError> {
        self.inner.load(month)
    }

    fn save_if_version(
        &self,
        schedule: &MonthSchedule,
        expected: u64,
    ) -> Result<MonthSchedule, StoreError> {
        if let Some(rival) = &self.rival {
            if !self.raced.replace(true) {
                book(&self.inner, &PolicyConfig::default(), rival, BookingOptions::default())
                    .unwrap();
            }
        }
        self.inner.save_if_version(schedule, expected)
    }
}

#[test]
fn concurrent_writer_is_revalidated_against_fresh_state() {
    let dir = tempdir().unwrap();
    let inner = JsonStorage::open(dir.path()).unwrap();
    let config = PolicyConfig::default();
    book(&inner, &config, &request("A", "0600-1000"), BookingOptions::default()).unwrap();

    let store = RacingStore {
        inner,
        rival: Some(request("B", "0600-1000")),
        raced: Cell::new(false),
    };

    // notre vue initiale n'a qu'un agent ; le rival remplit 0600-1000 entre-temps
    let err = book(&store, &config, &request("C", "0800-1000"), BookingOptions::default())
        .unwrap_err();
    match err {
        BookingError::Sched(SchedError::Rejected(conflicts)) => {
            assert_eq!(conflicts.len(), 2);
            assert_eq!(
                conflicts[0].officers,
                vec!["A".to_string(), "B".to_string(), "C".to_string()]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn contention_gives_up_after_max_attempts() {
    struct AlwaysStale(JsonStorage);

    impl Storage for AlwaysStale {
        fn load(&self, month: MonthKey) -> Result<Option<MonthSchedule>, StoreError> {
            self.0.load(month)
        }
        fn save_if_version(
            &self,
            schedule: &MonthSchedule,
            expected: u64,
        ) -> Result<MonthSchedule, StoreError> {
            Err(StoreError::VersionConflict {
                month: schedule.month,
                expected,
                found: expected + 1,
            })
        }
    }

    let dir = tempdir().unwrap();
    let store = AlwaysStale(JsonStorage::open(dir.path()).unwrap());
    let opts = BookingOptions {
        max_attempts: 2,
        ..BookingOptions::default()
    };
    let err = book(&store, &PolicyConfig::default(), &request("A", "0600-0800"), opts).unwrap_err();
    assert!(matches!(err, BookingError::Contention { attempts: 2, .. }));
}
