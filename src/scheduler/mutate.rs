use super::{util, validate, CapacityOptions, SchedError, Scheduler, Validation};
use crate::model::{OfficerShift, ShiftPeriod, TimeRange};
use crate::policy::ShiftPolicy;

pub(super) fn check_sign_up(
    scheduler: &Scheduler,
    policy: &ShiftPolicy,
    period: ShiftPeriod,
    name: &str,
    ranges: &[TimeRange],
    opts: CapacityOptions,
) -> Result<Validation, SchedError> {
    util::ensure_in_month(scheduler.month.month, policy.date)?;

    let existing = scheduler.month.officers(policy.date, period);
    if util::find_officer_index(existing, name).is_some() {
        return Err(SchedError::AlreadySignedUp(name.to_string()));
    }

    let window = policy.window(period).range;
    Ok(validate::can_add_under_policy(
        existing, name, ranges, window, policy, opts,
    ))
}

pub(super) fn sign_up(
    scheduler: &mut Scheduler,
    policy: &ShiftPolicy,
    period: ShiftPeriod,
    name: &str,
    ranges: &[TimeRange],
    opts: CapacityOptions,
) -> Result<(), SchedError> {
    let validation = check_sign_up(scheduler, policy, period, name, ranges, opts)?;
    if !validation.valid {
        return Err(SchedError::Rejected(validation.conflicts));
    }

    scheduler
        .month
        .day_mut(policy.date)
        .officers_mut(period)
        .push(OfficerShift::new(name, ranges.to_vec()));

    log_event!(
        debug,
        officer = name,
        date = %policy.date,
        period = %period,
        "officer signed up"
    );
    Ok(())
}

pub(super) fn remove(
    scheduler: &mut Scheduler,
    date: chrono::NaiveDate,
    period: ShiftPeriod,
    name: &str,
) -> Result<OfficerShift, SchedError> {
    util::ensure_in_month(scheduler.month.month, date)?;

    let Some(day) = scheduler.month.days.get_mut(&date) else {
        return Err(SchedError::UnknownOfficer(name.to_string()));
    };
    let officers = day.officers_mut(period);
    let Some(pos) = util::find_officer_index(officers, name) else {
        return Err(SchedError::UnknownOfficer(name.to_string()));
    };
    let removed = officers.remove(pos);

    if day.is_empty() {
        scheduler.month.days.remove(&date);
    }

    log_event!(debug, officer = name, date = %date, period = %period, "officer removed");
    Ok(removed)
}
