use crate::model::{MonthKey, TimeRange};
use crate::timespec::{self, ParseError};
use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use thiserror::Error;

/// Options de capacité
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityOptions {
    /// agents simultanés max par créneau horaire
    pub capacity: usize,
    pub min_block_minutes: u32,
}

impl Default for CapacityOptions {
    fn default() -> Self {
        Self {
            capacity: 2,
            min_block_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    BlockTooShort { min_minutes: u32 },
    OutsideWindow { window: TimeRange },
    ExceedsMaxBlock { max_minutes: u32 },
    OverCapacity { capacity: usize },
}

/// Motif de refus ; `Display` donne le message présenté à l'agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub hour: Option<NaiveTime>,
    pub officers: Vec<String>,
}

impl Conflict {
    pub fn new(kind: ConflictKind) -> Self {
        Self {
            kind,
            hour: None,
            officers: Vec::new(),
        }
    }

    pub fn over_capacity(hour: NaiveTime, officers: Vec<String>, capacity: usize) -> Self {
        Self {
            kind: ConflictKind::OverCapacity { capacity },
            hour: Some(hour),
            officers,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConflictKind::BlockTooShort { min_minutes } => write!(
                f,
                "Shift block must be at least {} long.",
                describe_minutes(*min_minutes)
            ),
            ConflictKind::OutsideWindow { window } => write!(
                f,
                "Shift block must be within the allowed window {window}."
            ),
            ConflictKind::ExceedsMaxBlock { max_minutes } => write!(
                f,
                "Shift block cannot exceed {} under the current policy.",
                describe_minutes(*max_minutes)
            ),
            ConflictKind::OverCapacity { .. } => {
                let hour = self.hour.map(timespec::format_hhmm).unwrap_or_default();
                write!(
                    f,
                    "Hour {hour} would exceed capacity ({} officers: {}).",
                    self.officers.len(),
                    self.officers.join(", ")
                )
            }
        }
    }
}

fn describe_minutes(minutes: u32) -> String {
    match minutes {
        60 => "1 hour".to_string(),
        m if m % 60 == 0 => format!("{} hours", m / 60),
        m => format!("{m} minutes"),
    }
}

/// Résultat d'une validation : `valid` ssi aucun conflit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub conflicts: Vec<Conflict>,
}

impl Validation {
    pub fn from_conflicts(conflicts: Vec<Conflict>) -> Self {
        Self {
            valid: conflicts.is_empty(),
            conflicts,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.conflicts.iter().map(Conflict::to_string).collect()
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid time format: {0}")]
    InvalidTime(#[from] ParseError),
    #[error("date {date} is outside schedule month {month}")]
    DateOutsideMonth { date: NaiveDate, month: MonthKey },
    #[error("{0} is already signed up for this shift")]
    AlreadySignedUp(String),
    #[error("unknown officer: {0}")]
    UnknownOfficer(String),
    #[error("shift rejected: {}", join_conflicts(.0))]
    Rejected(Vec<Conflict>),
}

fn join_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(Conflict::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
