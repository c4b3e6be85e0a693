use super::{availability, CapacityOptions, Conflict, ConflictKind, Validation};
use crate::model::{OfficerShift, TimeRange};
use crate::policy::ShiftPolicy;
use chrono::NaiveTime;

/// Contrôles structurels, au premier échec : durée minimale puis fenêtre.
pub(super) fn check_blocks(
    ranges: &[TimeRange],
    window: TimeRange,
    opts: CapacityOptions,
) -> Option<Conflict> {
    let min = i64::from(opts.min_block_minutes);
    if ranges.is_empty() || ranges.iter().any(|r| r.duration_minutes() < min) {
        return Some(Conflict::new(ConflictKind::BlockTooShort {
            min_minutes: opts.min_block_minutes,
        }));
    }
    if ranges.iter().any(|r| !window.contains(r)) {
        return Some(Conflict::new(ConflictKind::OutsideWindow { window }));
    }
    None
}

/// Simule l'ajout puis relève chaque heure au-delà de la capacité.
pub(super) fn check_capacity(
    existing: &[OfficerShift],
    name: &str,
    ranges: &[TimeRange],
    window: TimeRange,
    opts: CapacityOptions,
) -> Vec<Conflict> {
    let mut combined = existing.to_vec();
    combined.push(OfficerShift::new(name, ranges.to_vec()));

    availability::hourly_availability_with(&combined, window.start, window.end, opts)
        .into_iter()
        .filter(|h| h.officer_count > opts.capacity)
        .map(|h| Conflict::over_capacity(h.hour, h.officers, opts.capacity))
        .collect()
}

pub fn can_add_officer_shift_with(
    existing: &[OfficerShift],
    name: &str,
    ranges: &[TimeRange],
    shift_start: NaiveTime,
    shift_end: NaiveTime,
    opts: CapacityOptions,
) -> Validation {
    let window = TimeRange::new(shift_start, shift_end);
    if let Some(conflict) = check_blocks(ranges, window, opts) {
        return Validation::from_conflicts(vec![conflict]);
    }
    Validation::from_conflicts(check_capacity(existing, name, ranges, window, opts))
}

/// Variante tenant compte du plafond de bloc du régime en vigueur,
/// vérifié entre les contrôles structurels et la capacité.
pub(super) fn can_add_under_policy(
    existing: &[OfficerShift],
    name: &str,
    ranges: &[TimeRange],
    window: TimeRange,
    policy: &ShiftPolicy,
    opts: CapacityOptions,
) -> Validation {
    if let Some(conflict) = check_blocks(ranges, window, opts) {
        return Validation::from_conflicts(vec![conflict]);
    }
    if let Some(conflict) = policy.check_block_limit(ranges) {
        return Validation::from_conflicts(vec![conflict]);
    }
    Validation::from_conflicts(check_capacity(existing, name, ranges, window, opts))
}
