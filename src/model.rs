use crate::timespec::{self, ParseError};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Plage horaire `[start, end)` dans une journée nominale.
///
/// `end <= start` reste représentable (plage de nuit) ; seul
/// [`TimeRange::on_date`] replie la fin sur le lendemain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn start_minutes(&self) -> u32 {
        timespec::minutes_of(self.start)
    }

    pub fn end_minutes(&self) -> u32 {
        timespec::minutes_of(self.end)
    }

    /// Durée brute, négative ou nulle si la plage est inversée.
    pub fn duration_minutes(&self) -> i64 {
        i64::from(self.end_minutes()) - i64::from(self.start_minutes())
    }

    /// Durée avec repli de minuit (`2200-0200` → 240).
    pub fn wrapped_minutes(&self) -> u32 {
        let start = self.start_minutes();
        let mut end = self.end_minutes();
        if end <= start {
            end += timespec::MINUTES_PER_DAY;
        }
        end - start
    }

    /// Chevauchement avec `[from, to)` exprimé en minutes.
    pub fn overlaps_minutes(&self, from: u32, to: u32) -> bool {
        self.start_minutes() < to && self.end_minutes() > from
    }

    /// `other` tient entièrement dans `self` (bornes incluses).
    pub fn contains(&self, other: &TimeRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Bornes datées ; une fin `<= start` passe au lendemain.
    pub fn on_date(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let start = date.and_time(self.start);
        let mut end = date.and_time(self.end);
        if self.end <= self.start {
            end += Duration::days(1);
        }
        (start, end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            timespec::format_hhmm(self.start),
            timespec::format_hhmm(self.end)
        )
    }
}

impl FromStr for TimeRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        timespec::parse_segment(s).ok_or_else(|| ParseError::Malformed(s.to_string()))
    }
}

impl TryFrom<String> for TimeRange {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> Self {
        range.to_string()
    }
}

/// Créneau tenu par un agent dans une fenêtre (matin ou après-midi).
///
/// Persisté sous la forme `{ "name": "...", "time": "0500-0900,1000-1200" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OfficerShiftRecord", into = "OfficerShiftRecord")]
pub struct OfficerShift {
    pub name: String,
    pub time_ranges: Vec<TimeRange>,
}

impl OfficerShift {
    pub fn new<N: Into<String>>(name: N, time_ranges: Vec<TimeRange>) -> Self {
        Self {
            name: name.into(),
            time_ranges,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.time_ranges.iter().map(TimeRange::wrapped_minutes).sum()
    }

    pub fn time_string(&self) -> String {
        timespec::format_time_ranges(&self.time_ranges)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OfficerShiftRecord {
    name: String,
    time: String,
}

impl TryFrom<OfficerShiftRecord> for OfficerShift {
    type Error = ParseError;

    fn try_from(rec: OfficerShiftRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            name: rec.name,
            time_ranges: timespec::parse_time_string_strict(&rec.time)?,
        })
    }
}

impl From<OfficerShift> for OfficerShiftRecord {
    fn from(shift: OfficerShift) -> Self {
        Self {
            time: shift.time_string(),
            name: shift.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftPeriod {
    Morning,
    Afternoon,
}

impl ShiftPeriod {
    pub const ALL: [ShiftPeriod; 2] = [ShiftPeriod::Morning, ShiftPeriod::Afternoon];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftPeriod::Morning => "morning",
            ShiftPeriod::Afternoon => "afternoon",
        }
    }
}

impl fmt::Display for ShiftPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" | "am" => Ok(ShiftPeriod::Morning),
            "afternoon" | "pm" => Ok(ShiftPeriod::Afternoon),
            other => Err(format!("unknown shift period: {other}")),
        }
    }
}

/// Fenêtre nominale d'une période pour une date donnée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftWindow {
    pub period: ShiftPeriod,
    pub range: TimeRange,
}

impl ShiftWindow {
    pub fn new(period: ShiftPeriod, range: TimeRange) -> Self {
        Self { period, range }
    }
    pub fn start(&self) -> NaiveTime {
        self.range.start
    }
    pub fn end(&self) -> NaiveTime {
        self.range.end
    }
}

/// Occupation d'un créneau horaire aligné sur la fenêtre. Jamais persisté.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyAvailability {
    #[serde(serialize_with = "serialize_hhmm")]
    pub hour: NaiveTime,
    pub officer_count: usize,
    pub officers: Vec<String>,
    pub available: bool,
}

fn serialize_hhmm<S: serde::Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&timespec::format_hhmm(*t))
}

/// Agents inscrits sur une journée.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub morning: Vec<OfficerShift>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub afternoon: Vec<OfficerShift>,
}

impl DaySchedule {
    pub fn officers(&self, period: ShiftPeriod) -> &[OfficerShift] {
        match period {
            ShiftPeriod::Morning => &self.morning,
            ShiftPeriod::Afternoon => &self.afternoon,
        }
    }

    pub fn officers_mut(&mut self, period: ShiftPeriod) -> &mut Vec<OfficerShift> {
        match period {
            ShiftPeriod::Morning => &mut self.morning,
            ShiftPeriod::Afternoon => &mut self.afternoon,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.morning.is_empty() && self.afternoon.is_empty()
    }
}

/// Mois calendaire `YYYY-MM`, clé d'un document de planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid month (expected YYYY-MM): {s}");
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = y.parse::<i32>().map_err(|_| invalid())?;
        let month = m.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Document persisté : tout le planning d'un mois.
///
/// `version` sert de jeton de concurrence optimiste côté stockage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSchedule {
    pub month: MonthKey,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub days: BTreeMap<NaiveDate, DaySchedule>,
}

impl MonthSchedule {
    pub fn new(month: MonthKey) -> Self {
        Self {
            month,
            version: 0,
            days: BTreeMap::new(),
        }
    }

    pub fn officers(&self, date: NaiveDate, period: ShiftPeriod) -> &[OfficerShift] {
        self.days
            .get(&date)
            .map(|day| day.officers(period))
            .unwrap_or(&[])
    }

    pub fn find_officer<'a>(
        &'a self,
        date: NaiveDate,
        period: ShiftPeriod,
        name: &str,
    ) -> Option<&'a OfficerShift> {
        self.officers(date, period).iter().find(|o| o.name == name)
    }

    pub(crate) fn day_mut(&mut self, date: NaiveDate) -> &mut DaySchedule {
        self.days.entry(date).or_default()
    }

    /// Parcourt toutes les inscriptions dans l'ordre (date, matin puis après-midi).
    pub fn entries(&self) -> impl Iterator<Item = (NaiveDate, ShiftPeriod, &OfficerShift)> + '_ {
        self.days.iter().flat_map(|(date, day)| {
            ShiftPeriod::ALL.into_iter().flat_map(move |period| {
                day.officers(period)
                    .iter()
                    .map(move |officer| (*date, period, officer))
            })
        })
    }
}
