#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use metroshift::{
    booking::{book, unbook, BookingError, BookingOptions, BookingRequest},
    io,
    model::{MonthKey, ShiftPeriod},
    notification::{prepare_notice, prepare_removal_notice, Notifier, OutboxNotifier, TextNotice},
    policy::PolicyConfig,
    scheduler::{SchedError, Scheduler},
    storage::{JsonStorage, Storage},
    timespec::{self, parse_time_string, parse_time_string_strict},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Inscriptions aux heures supplémentaires du service métro
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Répertoire des plannings mensuels (`YYYY-MM.json`)
    #[arg(long, global = true, default_value = "schedules")]
    data_dir: String,

    /// Fichier JSON de politique (date de bascule, fenêtres)
    #[arg(long, global = true)]
    policy: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyser une chaîne horaire
    Parse {
        #[arg(long)]
        time: String,
        /// Refuse les segments mal formés au lieu de les ignorer
        #[arg(long)]
        strict: bool,
    },

    /// Afficher les fenêtres applicables à une date
    Policy {
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
    },

    /// Occupation heure par heure d'une fenêtre
    Availability {
        #[arg(long)]
        date: String,
        /// morning | afternoon
        #[arg(long)]
        period: String,
    },

    /// Inscrire un agent
    SignUp {
        #[arg(long)]
        date: String,
        #[arg(long)]
        period: String,
        #[arg(long)]
        officer: String,
        /// "0600-0800" ou "0600-0800,1000-1200" ; défaut : début de fenêtre, plafonné
        #[arg(long)]
        time: Option<String>,
        /// Dépose un avis dans ce répertoire
        #[arg(long)]
        outbox: Option<String>,
    },

    /// Retirer un agent
    Remove {
        #[arg(long)]
        date: String,
        #[arg(long)]
        period: String,
        #[arg(long)]
        officer: String,
        #[arg(long)]
        outbox: Option<String>,
    },

    /// Lister un mois
    List {
        /// YYYY-MM
        #[arg(long)]
        month: String,
    },

    /// Importer des affectations depuis un CSV (`date,period,name,time`)
    Import {
        #[arg(long)]
        csv: String,
    },

    /// Exporter un mois pour la paie
    Export {
        #[arg(long)]
        month: String,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let config = match &cli.policy {
        Some(path) => PolicyConfig::load(path)?,
        None => PolicyConfig::default(),
    };
    let storage = JsonStorage::open(&cli.data_dir)?;
    let opts = BookingOptions::default();

    let code = match cli.cmd {
        Commands::Parse { time, strict } => {
            let ranges = if strict {
                parse_time_string_strict(&time)?
            } else {
                parse_time_string(&time)
            };
            if ranges.is_empty() {
                bail!("invalid time format: {time}");
            }
            for r in &ranges {
                println!("{r} ({} min)", r.duration_minutes());
            }
            0
        }
        Commands::Policy { date } => {
            let date = parse_date(&date)?;
            let policy = config.resolve(date);
            println!("{date}: {:?} regime", policy.regime);
            for period in ShiftPeriod::ALL {
                println!("  {period}: {}", policy.default_time_string(period));
            }
            match policy.max_block_minutes {
                Some(max) => println!("  max block: {max} min"),
                None => println!("  max block: none"),
            }
            0
        }
        Commands::Availability { date, period } => {
            let date = parse_date(&date)?;
            let period = parse_period(&period)?;
            let policy = config.resolve(date);
            let scheduler = Scheduler::from_month(storage.load_or_empty(MonthKey::of(date))?);
            let hours = scheduler.hourly_availability_for(&policy, period, opts.capacity);
            for h in &hours {
                println!(
                    "{} | {} | {} | {}",
                    timespec::format_hhmm(h.hour),
                    h.officer_count,
                    if h.available { "open" } else { "full" },
                    h.officers.join(", ")
                );
            }
            let slots = scheduler.available_slots_for(&policy, period, opts.capacity);
            if slots.is_empty() {
                println!("no open slots");
            } else {
                let slots: Vec<String> = slots.iter().map(ToString::to_string).collect();
                println!("open: {}", slots.join(", "));
            }
            0
        }
        Commands::SignUp {
            date,
            period,
            officer,
            time,
            outbox,
        } => {
            let date = parse_date(&date)?;
            let period = parse_period(&period)?;
            let request = match time {
                Some(raw) => BookingRequest::parse(date, period, &officer, &raw)?,
                None => BookingRequest {
                    date,
                    period,
                    officer,
                    ranges: vec![config.resolve(date).default_block(period)],
                },
            };
            match book(&storage, &config, &request, opts) {
                Ok(saved) => {
                    println!("{} signed up for {period} on {date}", request.officer);
                    if let Some(dir) = outbox {
                        let notice =
                            prepare_notice(&saved, date, period, &request.officer, &TextNotice)?;
                        OutboxNotifier::new(dir).deliver(&notice)?;
                    }
                    0
                }
                Err(BookingError::Sched(SchedError::Rejected(conflicts))) => {
                    eprintln!("Shift rejected:");
                    for c in &conflicts {
                        eprintln!("  {c}");
                    }
                    // Code 2 = refus de validation
                    2
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Remove {
            date,
            period,
            officer,
            outbox,
        } => {
            let date = parse_date(&date)?;
            let period = parse_period(&period)?;
            let (_, removed) = unbook(&storage, date, period, &officer, opts)?;
            println!("{} removed from {period} on {date}", removed.name);
            if let Some(dir) = outbox {
                let notice = prepare_removal_notice(&removed, date, period, &TextNotice);
                OutboxNotifier::new(dir).deliver(&notice)?;
            }
            0
        }
        Commands::List { month } => {
            let month = parse_month(&month)?;
            let schedule = storage.load_or_empty(month)?;
            // impression compacte
            for (date, period, officer) in schedule.entries() {
                println!(
                    "{date} | {period} | {} | {}",
                    officer.time_string(),
                    officer.name
                );
            }
            0
        }
        Commands::Import { csv } => {
            let requests = io::import_assignments_csv(csv)?;
            let mut rejected = 0usize;
            for request in &requests {
                match book(&storage, &config, request, opts) {
                    Ok(_) => {}
                    Err(BookingError::Sched(err)) => {
                        eprintln!(
                            "{} {} {}: {err}",
                            request.date, request.period, request.officer
                        );
                        rejected += 1;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            println!(
                "imported {} of {} assignment(s)",
                requests.len() - rejected,
                requests.len()
            );
            if rejected == 0 {
                0
            } else {
                2
            }
        }
        Commands::Export {
            month,
            out_csv,
            out_json,
        } => {
            let month = parse_month(&month)?;
            let schedule = storage.load_or_empty(month)?;
            if let Some(path) = out_csv {
                io::export_payroll_csv(path, &schedule)?;
            }
            if let Some(path) = out_json {
                io::export_month_json(path, &schedule)?;
            }
            for total in io::payroll_totals(&schedule) {
                println!(
                    "{} | {} shift(s) | {} h",
                    total.officer,
                    total.shifts,
                    io::format_hours(total.minutes)
                );
            }
            0
        }
    };

    std::process::exit(code);
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")?)
}

fn parse_period(raw: &str) -> Result<ShiftPeriod> {
    raw.parse().map_err(anyhow::Error::msg)
}

fn parse_month(raw: &str) -> Result<MonthKey> {
    raw.parse().map_err(anyhow::Error::msg)
}
