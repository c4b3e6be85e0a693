//! Régimes de fenêtres horaires selon la date du service.
//!
//! Une date de bascule unique sépare l'ancien régime (fenêtres larges, sans
//! plafond de bloc) du nouveau (fenêtres resserrées, bloc continu plafonné).

use crate::model::{ShiftPeriod, ShiftWindow, TimeRange};
use crate::scheduler::{Conflict, ConflictKind};
use crate::timespec;
use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Legacy,
    Updated,
}

/// Fenêtres d'un régime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeWindows {
    pub morning: TimeRange,
    pub afternoon: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_block_minutes: Option<u32>,
}

impl RegimeWindows {
    fn validate(&self, label: &str) -> Result<()> {
        for (period, range) in [("morning", self.morning), ("afternoon", self.afternoon)] {
            if range.end <= range.start {
                bail!("{label} {period} window must end after it starts ({range})");
            }
        }
        if let Some(max) = self.max_block_minutes {
            if max < 60 {
                bail!("{label} max_block_minutes must be at least 60 (got {max})");
            }
        }
        Ok(())
    }
}

/// Configuration des régimes ; `Default` porte les valeurs en vigueur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub cutover: NaiveDate,
    pub legacy: RegimeWindows,
    pub updated: RegimeWindows,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            cutover: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or(NaiveDate::MIN),
            legacy: RegimeWindows {
                morning: range(5, 13),
                afternoon: range(13, 22),
                max_block_minutes: None,
            },
            updated: RegimeWindows {
                morning: range(6, 12),
                afternoon: range(14, 20),
                max_block_minutes: Some(240),
            },
        }
    }
}

fn range(start_h: u32, end_h: u32) -> TimeRange {
    let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
    TimeRange::new(at(start_h), at(end_h))
}

impl PolicyConfig {
    /// Charge un fichier JSON et valide les fenêtres.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading policy {}", path.display()))?;
        let config: PolicyConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing policy {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.legacy.validate("legacy")?;
        self.updated.validate("updated")?;
        Ok(())
    }

    pub fn regime_for(&self, date: NaiveDate) -> Regime {
        if date >= self.cutover {
            Regime::Updated
        } else {
            Regime::Legacy
        }
    }

    /// Total : toute date donne une politique définie.
    pub fn resolve(&self, date: NaiveDate) -> ShiftPolicy {
        let regime = self.regime_for(date);
        let windows = match regime {
            Regime::Legacy => &self.legacy,
            Regime::Updated => &self.updated,
        };
        ShiftPolicy {
            date,
            regime,
            morning: windows.morning,
            afternoon: windows.afternoon,
            max_block_minutes: windows.max_block_minutes,
        }
    }

    /// Même chose depuis un horodatage : seule la date compte (minuit).
    pub fn resolve_at(&self, at: NaiveDateTime) -> ShiftPolicy {
        self.resolve(at.date())
    }
}

/// Politique applicable à une date précise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftPolicy {
    pub date: NaiveDate,
    pub regime: Regime,
    pub morning: TimeRange,
    pub afternoon: TimeRange,
    pub max_block_minutes: Option<u32>,
}

impl ShiftPolicy {
    pub fn window(&self, period: ShiftPeriod) -> ShiftWindow {
        let range = match period {
            ShiftPeriod::Morning => self.morning,
            ShiftPeriod::Afternoon => self.afternoon,
        };
        ShiftWindow::new(period, range)
    }

    /// Chaîne horaire par défaut proposée pour la période (`"0600-1200"`).
    pub fn default_time_string(&self, period: ShiftPeriod) -> String {
        self.window(period).range.to_string()
    }

    /// Plage proposée quand l'agent ne précise rien : la fenêtre, ramenée au
    /// plafond de bloc depuis son début si le régime en impose un.
    pub fn default_block(&self, period: ShiftPeriod) -> TimeRange {
        let window = self.window(period).range;
        match self.max_block_minutes {
            Some(max) if window.duration_minutes() > i64::from(max) => TimeRange::new(
                window.start,
                timespec::clock_from_minutes(window.start_minutes() + max),
            ),
            _ => window,
        }
    }

    /// Plafond de bloc continu : ne s'applique qu'aux inscriptions d'une seule plage.
    pub fn check_block_limit(&self, ranges: &[TimeRange]) -> Option<Conflict> {
        let max = self.max_block_minutes?;
        match ranges {
            [single] if single.duration_minutes() > i64::from(max) => Some(Conflict::new(
                ConflictKind::ExceedsMaxBlock { max_minutes: max },
            )),
            _ => None,
        }
    }
}
