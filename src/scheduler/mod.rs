mod availability;
mod mutate;
mod types;
mod util;
mod validate;

pub use availability::{available_ranges, hourly_availability_with};
pub use types::{CapacityOptions, Conflict, ConflictKind, SchedError, Validation};
pub use validate::can_add_officer_shift_with;

use crate::model::{
    HourlyAvailability, MonthKey, MonthSchedule, OfficerShift, ShiftPeriod, TimeRange,
};
use crate::policy::ShiftPolicy;
use chrono::{NaiveDate, NaiveTime};

/// Occupation horaire avec la capacité par défaut (2 agents).
pub fn hourly_availability(
    officers: &[OfficerShift],
    shift_start: NaiveTime,
    shift_end: NaiveTime,
) -> Vec<HourlyAvailability> {
    hourly_availability_with(officers, shift_start, shift_end, CapacityOptions::default())
}

/// Plages `"HHMM-HHMM"` encore ouvertes à l'inscription.
pub fn available_time_slots(
    officers: &[OfficerShift],
    shift_start: NaiveTime,
    shift_end: NaiveTime,
) -> Vec<String> {
    available_ranges(&hourly_availability(officers, shift_start, shift_end))
        .iter()
        .map(TimeRange::to_string)
        .collect()
}

/// Décide si `name` peut prendre `ranges` dans la fenêtre sans dépasser la capacité.
/// Ne modifie rien : c'est à l'appelant de persister.
pub fn can_add_officer_shift(
    existing: &[OfficerShift],
    name: &str,
    ranges: &[TimeRange],
    shift_start: NaiveTime,
    shift_end: NaiveTime,
) -> Validation {
    can_add_officer_shift_with(
        existing,
        name,
        ranges,
        shift_start,
        shift_end,
        CapacityOptions::default(),
    )
}

/// Scheduler : encapsule le planning d'un mois en cours de modification
#[derive(Debug, Clone)]
pub struct Scheduler {
    month: MonthSchedule,
}

impl Scheduler {
    pub fn new(month: MonthKey) -> Self {
        Self {
            month: MonthSchedule::new(month),
        }
    }

    pub fn from_month(month: MonthSchedule) -> Self {
        Self { month }
    }

    pub fn month(&self) -> &MonthSchedule {
        &self.month
    }

    pub fn hourly_availability_for(
        &self,
        policy: &ShiftPolicy,
        period: ShiftPeriod,
        opts: CapacityOptions,
    ) -> Vec<HourlyAvailability> {
        let window = policy.window(period);
        hourly_availability_with(
            self.month.officers(policy.date, period),
            window.start(),
            window.end(),
            opts,
        )
    }

    pub fn available_slots_for(
        &self,
        policy: &ShiftPolicy,
        period: ShiftPeriod,
        opts: CapacityOptions,
    ) -> Vec<TimeRange> {
        available_ranges(&self.hourly_availability_for(policy, period, opts))
    }

    /// Valide une inscription sans l'appliquer.
    pub fn check_sign_up(
        &self,
        policy: &ShiftPolicy,
        period: ShiftPeriod,
        name: &str,
        ranges: &[TimeRange],
        opts: CapacityOptions,
    ) -> Result<Validation, SchedError> {
        mutate::check_sign_up(self, policy, period, name, ranges, opts)
    }

    /// Inscrit l'agent si la validation passe ; sinon `SchedError::Rejected`.
    pub fn sign_up(
        &mut self,
        policy: &ShiftPolicy,
        period: ShiftPeriod,
        name: &str,
        ranges: &[TimeRange],
        opts: CapacityOptions,
    ) -> Result<(), SchedError> {
        mutate::sign_up(self, policy, period, name, ranges, opts)
    }

    pub fn remove(
        &mut self,
        date: NaiveDate,
        period: ShiftPeriod,
        name: &str,
    ) -> Result<OfficerShift, SchedError> {
        mutate::remove(self, date, period, name)
    }
}
