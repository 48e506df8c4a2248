//! `roster` reporting binary.
//!
//! Reads `roster.toml` (or the path given with `--config`), opens the SQLite
//! store and prints a read-only report as JSON on stdout. Logs go to stderr
//! and honour `RUST_LOG`.

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use roster_core::{
  analytics::Granularity,
  clock::SystemClock,
  schedule::DateRange,
  scheduler::Scheduler,
};
use roster_store_sqlite::SqliteStore;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::RosterConfig;

#[derive(Parser)]
#[command(author, version, about = "Roster schedule reports")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "roster.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

/// Inclusive date bounds shared by the ranged reports.
#[derive(clap::Args)]
struct Range {
  /// First date, `YYYY-MM-DD`.
  #[arg(long)]
  from: NaiveDate,
  /// Last date, `YYYY-MM-DD`.
  #[arg(long)]
  to:   NaiveDate,
}

impl Range {
  fn resolve(&self) -> anyhow::Result<DateRange> {
    anyhow::ensure!(
      self.from <= self.to,
      "--from {} is after --to {}",
      self.from,
      self.to
    );
    Ok(DateRange::new(self.from, self.to))
  }
}

#[derive(Subcommand)]
enum Command {
  /// List overlapping entries already in storage.
  Audit {
    #[command(flatten)]
    range: Range,
  },
  /// Total hours an employee is scheduled for.
  Hours {
    #[arg(long)]
    employee: i64,
    #[command(flatten)]
    range:    Range,
    /// Count only Monday to Friday entries.
    #[arg(long)]
    business_days: bool,
  },
  /// Hours, entry counts and head counts per day, week or month.
  Summary {
    #[command(flatten)]
    range:       Range,
    #[arg(long, default_value_t = Granularity::Day)]
    granularity: Granularity,
    #[arg(long)]
    employee:    Option<i64>,
  },
  /// Years, months and days since an employee's hire date.
  Tenure {
    #[arg(long)]
    employee: i64,
  },
  /// Hires in the range that landed on a business day.
  Hires {
    #[command(flatten)]
    range: Range,
  },
  /// Productivity score for an employee over the range.
  Productivity {
    #[arg(long)]
    employee: i64,
    #[command(flatten)]
    range:    Range,
  },
}

#[derive(Serialize)]
struct HoursReport {
  employee_id:   i64,
  from:          NaiveDate,
  to:            NaiveDate,
  business_days: bool,
  hours:         f64,
}

#[derive(Serialize)]
struct ProductivityReport {
  employee_id: i64,
  from:        NaiveDate,
  to:          NaiveDate,
  score:       f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = RosterConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  tracing::debug!(store = ?cfg.store_path, "store opened");

  let scheduler = Scheduler::with_policy(store.clone(), store, SystemClock, cfg.policy);

  match cli.command {
    Command::Audit { range } => {
      let found = scheduler
        .double_bookings(range.resolve()?)
        .await
        .context("audit failed")?;
      if !found.is_empty() {
        tracing::warn!(pairs = found.len(), "double bookings found");
      }
      print_json(&found)
    }
    Command::Hours { employee, range, business_days } => {
      let r = range.resolve()?;
      let hours = if business_days {
        scheduler.get_business_day_hours(employee, r).await
      } else {
        scheduler.get_employee_hours(employee, r).await
      };
      let hours = hours.context("hours report failed")?;
      print_json(&HoursReport {
        employee_id: employee,
        from: r.from,
        to: r.to,
        business_days,
        hours,
      })
    }
    Command::Summary { range, granularity, employee } => {
      let buckets = scheduler
        .get_period_summary(range.resolve()?, granularity, employee)
        .await
        .context("summary failed")?;
      print_json(&buckets)
    }
    Command::Tenure { employee } => {
      let fact = scheduler
        .get_tenure(employee)
        .await
        .with_context(|| format!("no tenure for employee {employee}"))?;
      print_json(&fact)
    }
    Command::Hires { range } => {
      let report = scheduler
        .business_day_hires(range.resolve()?)
        .await
        .context("hire report failed")?;
      print_json(&report)
    }
    Command::Productivity { employee, range } => {
      let r = range.resolve()?;
      let score = scheduler
        .get_productivity(employee, r)
        .await
        .context("productivity report failed")?;
      print_json(&ProductivityReport { employee_id: employee, from: r.from, to: r.to, score })
    }
  }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  let out = serde_json::to_string_pretty(value).context("failed to serialise report")?;
  println!("{out}");
  Ok(())
}
