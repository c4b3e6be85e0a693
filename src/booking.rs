//! Inscriptions et retraits persistés.
//!
//! Chaque opération relit le mois, revalide contre l'état frais, puis
//! enregistre seulement si personne n'a écrit entre-temps. En cas de course,
//! on recommence (nombre d'essais borné).

use crate::model::{MonthKey, MonthSchedule, OfficerShift, ShiftPeriod, TimeRange};
use crate::policy::PolicyConfig;
use crate::scheduler::{CapacityOptions, SchedError, Scheduler};
use crate::storage::{Storage, StoreError};
use crate::timespec;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, Copy)]
pub struct BookingOptions {
    pub max_attempts: u32,
    pub capacity: CapacityOptions,
}

impl Default for BookingOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            capacity: CapacityOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub date: NaiveDate,
    pub period: ShiftPeriod,
    pub officer: String,
    pub ranges: Vec<TimeRange>,
}

impl BookingRequest {
    /// Construit une demande depuis une saisie brute (`"0600-0800,1000-1200"`).
    /// Tout segment illisible est refusé.
    pub fn parse(
        date: NaiveDate,
        period: ShiftPeriod,
        officer: &str,
        time: &str,
    ) -> Result<Self, SchedError> {
        Ok(Self {
            date,
            period,
            officer: officer.to_string(),
            ranges: timespec::parse_time_string_strict(time)?,
        })
    }
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error(transparent)]
    Sched(#[from] SchedError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("schedule {month} kept changing; gave up after {attempts} attempt(s)")]
    Contention { month: MonthKey, attempts: u32 },
}

/// Inscrit un agent ; retourne le mois tel qu'enregistré.
pub fn book<S: Storage + ?Sized>(
    store: &S,
    config: &PolicyConfig,
    request: &BookingRequest,
    opts: BookingOptions,
) -> Result<MonthSchedule, BookingError> {
    let policy = config.resolve(request.date);
    with_retry(store, MonthKey::of(request.date), opts, |scheduler| {
        scheduler.sign_up(
            &policy,
            request.period,
            &request.officer,
            &request.ranges,
            opts.capacity,
        )
    })
    .map(|(saved, ())| saved)
}

/// Retire un agent ; retourne le mois enregistré et l'entrée supprimée.
pub fn unbook<S: Storage + ?Sized>(
    store: &S,
    date: NaiveDate,
    period: ShiftPeriod,
    officer: &str,
    opts: BookingOptions,
) -> Result<(MonthSchedule, OfficerShift), BookingError> {
    with_retry(store, MonthKey::of(date), opts, |scheduler| {
        scheduler.remove(date, period, officer)
    })
}

fn with_retry<S, T, F>(
    store: &S,
    month: MonthKey,
    opts: BookingOptions,
    mut apply: F,
) -> Result<(MonthSchedule, T), BookingError>
where
    S: Storage + ?Sized,
    F: FnMut(&mut Scheduler) -> Result<T, SchedError>,
{
    let attempts = opts.max_attempts.max(1);
    for attempt in 1..=attempts {
        let fresh = store.load_or_empty(month)?;
        let expected = fresh.version;
        let mut scheduler = Scheduler::from_month(fresh);
        let out = apply(&mut scheduler)?;

        match store.save_if_version(scheduler.month(), expected) {
            Ok(saved) => return Ok((saved, out)),
            Err(StoreError::VersionConflict { .. }) => {
                log_event!(warn, %month, attempt, "concurrent write detected, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(BookingError::Contention { month, attempts })
}
