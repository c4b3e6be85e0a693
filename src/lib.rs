#![forbid(unsafe_code)]
//! Metroshift — inscriptions aux heures supplémentaires (service métro).
//!
//! - Validation des chevauchements : 2 agents max par heure de fenêtre.
//! - Fenêtres matin / après-midi selon le régime en vigueur à la date.
//! - Un document JSON par mois, écrit de façon atomique et versionnée.
//! - Export paie CSV/JSON, avis texte aux agents.

/// Événement `tracing` si la feature `logging` est active, rien sinon.
macro_rules! log_event {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        {
            tracing::$level!($($arg)*);
        }
    }};
}

pub mod booking;
pub mod io;
pub mod model;
pub mod notification;
pub mod policy;
pub mod scheduler;
pub mod storage;
pub mod timespec;

pub use booking::{book, unbook, BookingError, BookingOptions, BookingRequest};
pub use model::{
    DaySchedule, HourlyAvailability, MonthKey, MonthSchedule, OfficerShift, ShiftPeriod,
    ShiftWindow, TimeRange,
};
pub use notification::{
    prepare_notice, prepare_removal_notice, Notice, NoticeKind, NoticeRenderer, Notifier,
    OutboxNotifier, TextNotice,
};
pub use policy::{PolicyConfig, Regime, RegimeWindows, ShiftPolicy};
pub use scheduler::{
    available_time_slots, can_add_officer_shift, hourly_availability, CapacityOptions, Conflict,
    ConflictKind, SchedError, Scheduler, Validation,
};
pub use storage::{JsonStorage, Storage, StoreError};
pub use timespec::{parse_time_string, parse_time_string_strict, ParseError};
