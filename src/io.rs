use crate::booking::BookingRequest;
use crate::model::{MonthSchedule, ShiftPeriod, TimeRange};
use crate::timespec;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Import d'affectations (admin) depuis CSV: header `date,period,name,time`
///
/// `time` accepte plusieurs plages (`"0600-0800,1000-1200"`) ; toute ligne
/// illisible fait échouer l'import entier.
pub fn import_assignments_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<BookingRequest>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut out = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let line = idx + 2;
        let date = rec.get(0).context("missing date")?;
        let period = rec.get(1).context("missing period")?;
        let name = rec.get(2).context("missing name")?;
        let time = rec.get(3).context("missing time")?;
        if name.is_empty() {
            bail!("line {line}: officer name cannot be empty");
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("line {line}: invalid date {date}"))?;
        let period: ShiftPeriod = period
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("line {line}"))?;
        let request = BookingRequest::parse(date, period, name, time)
            .with_context(|| format!("line {line}: invalid time for {name}"))?;
        out.push(request);
    }
    Ok(out)
}

/// Ligne de paie : une plage effectuée par un agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollLine {
    pub date: NaiveDate,
    pub period: ShiftPeriod,
    pub officer: String,
    pub range: TimeRange,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollTotal {
    pub officer: String,
    pub shifts: usize,
    pub minutes: u32,
}

pub fn payroll_lines(month: &MonthSchedule) -> Vec<PayrollLine> {
    month
        .entries()
        .flat_map(|(date, period, officer)| {
            officer.time_ranges.iter().map(move |range| PayrollLine {
                date,
                period,
                officer: officer.name.clone(),
                range: *range,
                minutes: range.wrapped_minutes(),
            })
        })
        .collect()
}

/// Cumul par agent, trié par nom.
pub fn payroll_totals(month: &MonthSchedule) -> Vec<PayrollTotal> {
    let mut acc: BTreeMap<&str, (usize, u32)> = BTreeMap::new();
    for (_, _, officer) in month.entries() {
        let entry = acc.entry(officer.name.as_str()).or_default();
        entry.0 += 1;
        entry.1 += officer.total_minutes();
    }
    acc.into_iter()
        .map(|(officer, (shifts, minutes))| PayrollTotal {
            officer: officer.to_string(),
            shifts,
            minutes,
        })
        .collect()
}

pub fn format_hours(minutes: u32) -> String {
    format!("{:.2}", f64::from(minutes) / 60.0)
}

/// Export CSV pour la paie: header `date,period,officer,start,end,hours`
pub fn export_payroll_csv<P: AsRef<Path>>(path: P, month: &MonthSchedule) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "period", "officer", "start", "end", "hours"])?;
    for line in payroll_lines(month) {
        let date = line.date.to_string();
        let start = timespec::format_hhmm(line.range.start);
        let end = timespec::format_hhmm(line.range.end);
        let hours = format_hours(line.minutes);
        w.write_record([
            date.as_str(),
            line.period.as_str(),
            line.officer.as_str(),
            start.as_str(),
            end.as_str(),
            hours.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export JSON du mois (jolie mise en forme)
pub fn export_month_json<P: AsRef<Path>>(path: P, month: &MonthSchedule) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(month)?;
    fs::write(path, s)?;
    Ok(())
}
