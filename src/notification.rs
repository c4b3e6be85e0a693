use crate::model::{MonthSchedule, OfficerShift, ShiftPeriod};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Assigned,
    Removed,
}

/// Message prêt à l'envoi pour un agent.
#[derive(Debug, Clone)]
pub struct Notice {
    pub id: Uuid,
    pub officer: String,
    pub kind: NoticeKind,
    pub date: NaiveDate,
    pub period: ShiftPeriod,
    pub subject: String,
    pub body: String,
}

/// Permet de customiser le rendu du message (texte, mail HTML, etc.).
pub trait NoticeRenderer {
    fn subject(&self, kind: NoticeKind, date: NaiveDate, period: ShiftPeriod) -> String;
    fn render(
        &self,
        kind: NoticeKind,
        officer: &OfficerShift,
        date: NaiveDate,
        period: ShiftPeriod,
    ) -> String;
}

/// Gabarit texte simple destiné au mail de confirmation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNotice;

impl NoticeRenderer for TextNotice {
    fn subject(&self, kind: NoticeKind, date: NaiveDate, period: ShiftPeriod) -> String {
        let verb = match kind {
            NoticeKind::Assigned => "Assigned",
            NoticeKind::Removed => "Removed",
        };
        format!("{verb}: metro overtime {period} shift on {date}")
    }

    fn render(
        &self,
        kind: NoticeKind,
        officer: &OfficerShift,
        date: NaiveDate,
        period: ShiftPeriod,
    ) -> String {
        let what = match kind {
            NoticeKind::Assigned => "You are scheduled for",
            NoticeKind::Removed => "You have been removed from",
        };
        format!(
            "{name},\n\n{what} the {period} metro overtime shift on {day}.\nHours: {time}\n\nContact your shift supervisor with any questions.\n",
            name = officer.name,
            day = date.format("%A, %B %-d, %Y"),
            time = officer.time_string(),
        )
    }
}

/// Prépare la confirmation d'une inscription présente dans le mois.
pub fn prepare_notice(
    month: &MonthSchedule,
    date: NaiveDate,
    period: ShiftPeriod,
    officer: &str,
    renderer: &dyn NoticeRenderer,
) -> Result<Notice> {
    let shift = month
        .find_officer(date, period, officer)
        .with_context(|| format!("{officer} is not scheduled for {period} on {date}"))?;
    Ok(build(NoticeKind::Assigned, shift, date, period, renderer))
}

/// Prépare l'avis de retrait à partir de l'entrée supprimée.
pub fn prepare_removal_notice(
    removed: &OfficerShift,
    date: NaiveDate,
    period: ShiftPeriod,
    renderer: &dyn NoticeRenderer,
) -> Notice {
    build(NoticeKind::Removed, removed, date, period, renderer)
}

fn build(
    kind: NoticeKind,
    shift: &OfficerShift,
    date: NaiveDate,
    period: ShiftPeriod,
    renderer: &dyn NoticeRenderer,
) -> Notice {
    Notice {
        id: Uuid::new_v4(),
        officer: shift.name.clone(),
        kind,
        date,
        period,
        subject: renderer.subject(kind, date, period),
        body: renderer.render(kind, shift, date, period),
    }
}

/// Canal de livraison, injecté par l'appelant.
pub trait Notifier {
    fn deliver(&self, notice: &Notice) -> Result<()>;
}

/// Dépose chaque message dans `<dir>/<id>.txt` (boîte d'envoi locale).
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    dir: PathBuf,
}

impl OutboxNotifier {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, notice: &Notice) -> PathBuf {
        self.dir.join(format!("{}.txt", notice.id))
    }
}

impl Notifier for OutboxNotifier {
    fn deliver(&self, notice: &Notice) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating outbox {}", self.dir.display()))?;
        let path = self.path_for(notice);
        let content = format!(
            "To: {}\nSubject: {}\n\n{}",
            notice.officer, notice.subject, notice.body
        );
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        log_event!(info, id = %notice.id, officer = %notice.officer, "notice queued");
        Ok(())
    }
}
