use crate::model::{MonthKey, MonthSchedule};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing schedule {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("schedule {month} changed concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        month: MonthKey,
        expected: u64,
        found: u64,
    },
}

pub trait Storage {
    /// Charge le document d'un mois ; `None` s'il n'existe pas encore.
    fn load(&self, month: MonthKey) -> Result<Option<MonthSchedule>, StoreError>;

    /// Sauvegarde de manière atomique si la version stockée vaut `expected`.
    /// Retourne le document enregistré, version incrémentée.
    fn save_if_version(
        &self,
        schedule: &MonthSchedule,
        expected: u64,
    ) -> Result<MonthSchedule, StoreError>;

    fn load_or_empty(&self, month: MonthKey) -> Result<MonthSchedule, StoreError> {
        Ok(self
            .load(month)?
            .unwrap_or_else(|| MonthSchedule::new(month)))
    }
}

/// Un fichier `YYYY-MM.json` par mois dans un répertoire.
#[derive(Debug)]
pub struct JsonStorage {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            context: "creating schedule directory",
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path_for(&self, month: MonthKey) -> PathBuf {
        self.dir.join(format!("{month}.json"))
    }

    /// Mois présents sur disque, triés.
    pub fn months(&self) -> Result<Vec<MonthKey>, StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            context: "listing",
            path: self.dir.clone(),
            source,
        };
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(key) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<MonthKey>().ok())
            {
                out.push(key);
            }
        }
        out.sort();
        Ok(out)
    }
}

impl Storage for JsonStorage {
    fn load(&self, month: MonthKey) -> Result<Option<MonthSchedule>, StoreError> {
        let path = self.path_for(month);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    context: "reading",
                    path,
                    source,
                })
            }
        };
        let schedule: MonthSchedule =
            serde_json::from_slice(&data).map_err(|source| StoreError::Json { path, source })?;
        Ok(Some(schedule))
    }

    fn save_if_version(
        &self,
        schedule: &MonthSchedule,
        expected: u64,
    ) -> Result<MonthSchedule, StoreError> {
        // sérialise le compare-and-swap dans le processus ; entre processus il reste optimiste
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let found = self.load(schedule.month)?.map_or(0, |s| s.version);
        if found != expected {
            log_event!(
                warn,
                month = %schedule.month,
                expected,
                found,
                "version conflict on save"
            );
            return Err(StoreError::VersionConflict {
                month: schedule.month,
                expected,
                found,
            });
        }

        let mut saved = schedule.clone();
        saved.version = expected + 1;

        let path = self.path_for(saved.month);
        let io_err = |context: &'static str| {
            let path = path.clone();
            move |source: io::Error| StoreError::Io {
                context,
                path,
                source,
            }
        };
        let json = serde_json::to_vec_pretty(&saved).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err("creating temp file"))?;
        tmp.write_all(&json).map_err(io_err("writing"))?;
        tmp.flush().map_err(io_err("flushing"))?;
        tmp.as_file().sync_all().map_err(io_err("syncing"))?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .map_err(io_err("atomic rename to"))?;

        log_event!(debug, month = %saved.month, version = saved.version, "schedule saved");
        Ok(saved)
    }
}
