use super::SchedError;
use crate::model::{MonthKey, OfficerShift};
use chrono::NaiveDate;

pub(super) fn ensure_in_month(month: MonthKey, date: NaiveDate) -> Result<(), SchedError> {
    if month.contains(date) {
        Ok(())
    } else {
        Err(SchedError::DateOutsideMonth { date, month })
    }
}

pub(super) fn find_officer_index(officers: &[OfficerShift], name: &str) -> Option<usize> {
    officers.iter().position(|o| o.name == name)
}
