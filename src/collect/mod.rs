// Copyright 2025 Rhythm Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Aggregation of raw measurement files into flat CSV tables.
//!
//! Each format has its own [`Aggregator`]. [`aggregate`] walks the runs an
//! aggregator selects, reads the run's measurement file if there is one, and
//! prefixes every parsed row with the run's identifying fields:
//! `benchmark,input-set,thread-count,run-type,run-id`.
//!
//! Problems with single rows never abort an aggregation. A row is either
//! skipped with a [`SkipReason`] or, when only a number fails to parse,
//! kept with a zero in place of the bad value.

pub mod event_count;
pub mod gnutime;
pub mod rhythm;
pub mod vtune;

use crate::config::Settings;
use crate::database::Database;
use crate::error::CollectError;
use crate::record::RunConfig;
use flate2::read::GzDecoder;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

/// Columns every aggregated table starts with.
pub const ID_COLUMNS: [&str; 5] = ["benchmark", "input-set", "thread-count", "run-type", "run-id"];

/// The measurement formats that can be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CollectKind {
  /// Wall and CPU time of every run (`time.csv`).
  GnuTime,
  /// Per-thread effective and wait time of VTune threading runs.
  VtuneThreadTime,
  /// Per-thread status timelines of Rhythm runs.
  RhythmThreadTime,
  /// Per-thread synchronization event counts of `pthread-count.so` runs.
  EventCount,
}

impl CollectKind {
  /// Runs the matching aggregator over `database`.
  pub fn aggregate(self, database: &Database, settings: &Settings) -> Result<Aggregation, CollectError> {
    match self {
      CollectKind::GnuTime => aggregate(&gnutime::GnuTime, database),
      CollectKind::VtuneThreadTime => aggregate(
        &vtune::VtuneThreadTime::new(&settings.threading_analysis, settings.thread_filter()),
        database,
      ),
      CollectKind::RhythmThreadTime => aggregate(&rhythm::RhythmThreadTime, database),
      CollectKind::EventCount => aggregate(&event_count::EventCount::new(&settings.count_tool), database),
    }
  }
}

impl fmt::Display for CollectKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      CollectKind::GnuTime => "gnu-time",
      CollectKind::VtuneThreadTime => "vtune-thread-time",
      CollectKind::RhythmThreadTime => "rhythm-thread-time",
      CollectKind::EventCount => "event-count",
    })
  }
}

/// Why a measurement row was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  TooFewColumns { expected: usize, found: usize },
  FilteredThread(String),
  Malformed(String),
}

impl fmt::Display for SkipReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SkipReason::TooFewColumns { expected, found } => {
        write!(f, "expected at least {} columns, found {}", expected, found)
      }
      SkipReason::FilteredThread(name) => write!(f, "thread '{}' is not part of the benchmark", name),
      SkipReason::Malformed(message) => write!(f, "malformed row: {}", message),
    }
  }
}

/// Result of parsing one measurement row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<T> {
  Row(T),
  Skip(SkipReason),
}

/// A parsed measurement row, rendered as the format-specific output columns.
pub trait MeasurementRow {
  fn fields(&self) -> Vec<String>;
}

/// One measurement format.
pub trait Aggregator {
  type Row: MeasurementRow;

  /// Format-specific column names, appended after [`ID_COLUMNS`].
  fn columns(&self) -> &'static [&'static str];

  /// The runs that may carry this format, in database order.
  fn select<'a>(&self, database: &'a Database) -> Vec<&'a RunConfig>;

  /// The measurement file inside a run directory, if present.
  fn artifact(&self, dir: &Path) -> Option<PathBuf>;

  /// Parses a measurement file into numbered row outcomes.
  fn read_rows(&self, artifact: &Path) -> Result<Vec<(usize, RowOutcome<Self::Row>)>, CollectError>;

  /// Value of the `run-type` output column.
  fn label<'a>(&self, run: &'a RunConfig) -> &'a str {
    run.run_type.as_str()
  }
}

/// One output row: a run's identifying fields followed by the measurement fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRow {
  pub benchmark: String,
  pub input_set: String,
  pub thread_count: u32,
  pub run_type: String,
  pub run_id: String,
  pub fields: Vec<String>,
}

impl AggregatedRow {
  pub fn record(&self) -> Vec<String> {
    let mut record = vec![
      self.benchmark.clone(),
      self.input_set.clone(),
      self.thread_count.to_string(),
      self.run_type.clone(),
      self.run_id.clone(),
    ];
    record.extend(self.fields.iter().cloned());
    record
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
  pub artifact: PathBuf,
  pub line: usize,
  pub reason: SkipReason,
}

/// Outcome of one aggregation.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
  pub header: Vec<String>,
  pub rows: Vec<AggregatedRow>,
  pub skipped: Vec<SkippedRow>,
  /// Runs that had no measurement file of this format.
  pub missing: usize,
  /// Runs whose measurement file could not be opened or read at all.
  pub unreadable: usize,
}

impl Aggregation {
  pub fn write_csv(&self, path: &Path) -> Result<(), CollectError> {
    self.write_records(path).map_err(|source| CollectError::WriteOutput {
      path: path.to_path_buf(),
      source,
    })
  }

  fn write_records(&self, path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&self.header)?;
    for row in &self.rows {
      writer.write_record(row.record())?;
    }
    writer.flush()?;
    Ok(())
  }
}

/// Runs `aggregator` over every run it selects.
pub fn aggregate<A: Aggregator>(aggregator: &A, database: &Database) -> Result<Aggregation, CollectError> {
  let mut aggregation = Aggregation {
    header: ID_COLUMNS
      .iter()
      .chain(aggregator.columns())
      .map(|column| column.to_string())
      .collect(),
    ..Aggregation::default()
  };

  for run in aggregator.select(database) {
    let Some(artifact) = run.artifact_dir().and_then(|dir| aggregator.artifact(dir)) else {
      tracing::warn!(run_id = %run.run_id, benchmark = %run.benchmark, "No measurement file found. Skipping run.");
      aggregation.missing += 1;
      continue;
    };

    tracing::debug!("Reading {}", artifact.display());
    let outcomes = match aggregator.read_rows(&artifact) {
      Ok(outcomes) => outcomes,
      Err(e) => {
        tracing::warn!(run_id = %run.run_id, error = %e, "Unreadable measurement file. Skipping run.");
        aggregation.unreadable += 1;
        continue;
      }
    };

    for (line, outcome) in outcomes {
      match outcome {
        RowOutcome::Row(row) => aggregation.rows.push(AggregatedRow {
          benchmark: run.benchmark.clone(),
          input_set: run.input_set.clone(),
          thread_count: run.thread_count,
          run_type: aggregator.label(run).to_string(),
          run_id: run.run_id.clone(),
          fields: row.fields(),
        }),
        RowOutcome::Skip(reason) => {
          tracing::warn!(file = %artifact.display(), line, %reason, "Skipping row.");
          aggregation.skipped.push(SkippedRow {
            artifact: artifact.clone(),
            line,
            reason,
          });
        }
      }
    }
  }

  tracing::info!(
    rows = aggregation.rows.len(),
    skipped = aggregation.skipped.len(),
    missing = aggregation.missing,
    unreadable = aggregation.unreadable,
    "Aggregation complete"
  );

  Ok(aggregation)
}

/// Opens a measurement file, transparently decompressing `.gz` files.
pub(crate) fn open_artifact(path: &Path) -> Result<Box<dyn Read>, CollectError> {
  let file = File::open(path).map_err(|source| CollectError::OpenArtifact {
    path: path.to_path_buf(),
    source,
  })?;

  if path.extension().is_some_and(|ext| ext == "gz") {
    Ok(Box::new(GzDecoder::new(BufReader::new(file))))
  } else {
    Ok(Box::new(BufReader::new(file)))
  }
}

/// Parses every data row of a CSV measurement file with `parse`. The header line is skipped.
///
/// Records that fail to decode are skipped as [`SkipReason::Malformed`]. An I/O
/// error (e.g. a truncated `.gz` file) ends the file: the rows read so far are
/// kept and the failure is recorded at the line where reading stopped.
pub(crate) fn read_csv_rows<T>(
  path: &Path,
  mut parse: impl FnMut(&csv::StringRecord) -> RowOutcome<T>,
) -> Result<Vec<(usize, RowOutcome<T>)>, CollectError> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(open_artifact(path)?);

  let mut rows = Vec::new();
  if let Err(e) = reader.headers() {
    let stop = e.is_io_error();
    rows.push((1, RowOutcome::Skip(SkipReason::Malformed(e.to_string()))));
    if stop {
      return Ok(rows);
    }
  }

  let mut record = csv::StringRecord::new();
  loop {
    // The reader sits at the start of the next record.
    let line = reader.position().line() as usize;
    match reader.read_record(&mut record) {
      Ok(true) => rows.push((line, parse(&record))),
      Ok(false) => break,
      Err(e) if e.is_io_error() => {
        rows.push((line, RowOutcome::Skip(SkipReason::Malformed(e.to_string()))));
        break;
      }
      Err(e) => rows.push((line, RowOutcome::Skip(SkipReason::Malformed(e.to_string())))),
    }
  }

  Ok(rows)
}

/// Returns `SkipReason::TooFewColumns` unless `record` has at least `expected` fields.
pub(crate) fn require_columns(record: &csv::StringRecord, expected: usize) -> Result<(), SkipReason> {
  if record.len() < expected {
    return Err(SkipReason::TooFewColumns {
      expected,
      found: record.len(),
    });
  }
  Ok(())
}

/// Parses a numeric field, logging and substituting zero when it is not a number.
pub(crate) fn coerce<T: FromStr + Default>(value: &str, column: &str) -> T {
  match value.trim().parse() {
    Ok(parsed) => parsed,
    Err(_) => {
      tracing::warn!(column, value, "Could not convert value. Using zero.");
      T::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn coerce_substitutes_zero() {
    assert_eq!(coerce::<f64>(" 1.5 ", "time"), 1.5);
    assert_eq!(coerce::<f64>("n/a", "time"), 0.0);
    assert_eq!(coerce::<u64>("12", "count"), 12);
    assert_eq!(coerce::<u64>("", "count"), 0);
  }

  #[test]
  fn short_records_are_rejected() {
    let record = csv::StringRecord::from(vec!["1", "running"]);
    assert_eq!(
      require_columns(&record, 3),
      Err(SkipReason::TooFewColumns {
        expected: 3,
        found: 2
      })
    );
    assert!(require_columns(&record, 2).is_ok());
  }
}
