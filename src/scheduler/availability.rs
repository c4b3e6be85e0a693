use super::CapacityOptions;
use crate::model::{HourlyAvailability, OfficerShift, TimeRange};
use crate::timespec::{clock_from_minutes, minutes_of};
use chrono::NaiveTime;

const SLOT_MINUTES: u32 = 60;

/// Occupation heure par heure de `[start, end)`.
///
/// Un reliquat final de moins d'une heure ne produit pas de créneau.
pub fn hourly_availability_with(
    officers: &[OfficerShift],
    start: NaiveTime,
    end: NaiveTime,
    opts: CapacityOptions,
) -> Vec<HourlyAvailability> {
    let end_minutes = minutes_of(end);
    let mut out = Vec::new();
    let mut slot = minutes_of(start);

    while slot + SLOT_MINUTES <= end_minutes {
        let slot_end = slot + SLOT_MINUTES;
        let names: Vec<String> = officers
            .iter()
            .filter(|o| {
                o.time_ranges
                    .iter()
                    .any(|r| r.overlaps_minutes(slot, slot_end))
            })
            .map(|o| o.name.clone())
            .collect();

        out.push(HourlyAvailability {
            hour: clock_from_minutes(slot),
            officer_count: names.len(),
            available: names.len() < opts.capacity,
            officers: names,
        });
        slot = slot_end;
    }

    out
}

/// Regroupe les heures disponibles en plages contiguës maximales.
pub fn available_ranges(hours: &[HourlyAvailability]) -> Vec<TimeRange> {
    let mut out = Vec::new();
    let mut open: Option<NaiveTime> = None;

    for (idx, h) in hours.iter().enumerate() {
        match (h.available, open) {
            (true, None) => open = Some(h.hour),
            (false, Some(from)) => {
                out.push(TimeRange::new(from, h.hour));
                open = None;
            }
            _ => {}
        }
        if idx + 1 == hours.len() {
            if let Some(from) = open.take() {
                let close = clock_from_minutes(minutes_of(h.hour) + SLOT_MINUTES);
                out.push(TimeRange::new(from, close));
            }
        }
    }

    out
}
