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
use super::Aggregator;
use super::MeasurementRow;
use super::RowOutcome;
use super::coerce;
use super::read_csv_rows;
use super::require_columns;
use crate::database::Database;
use crate::error::CollectError;
use crate::record::RunConfig;
use crate::record::RunType;
use std::path::Path;
use std::path::PathBuf;

/// Time each simulated thread spent in each status.
pub const TIME_STACKS_FILE: &str = "rhythm-time-stacks.csv";

const COLUMNS: &[&str] = &["thread-id", "status", "time"];

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadStatusRow {
  pub tid: u64,
  pub status: String,
  pub time: f64,
}

impl MeasurementRow for ThreadStatusRow {
  fn fields(&self) -> Vec<String> {
    vec![self.tid.to_string(), self.status.clone(), self.time.to_string()]
  }
}

/// Thread-status timelines of Rhythm simulator runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RhythmThreadTime;

impl RhythmThreadTime {
  pub fn parse_record(record: &csv::StringRecord) -> RowOutcome<ThreadStatusRow> {
    if let Err(reason) = require_columns(record, COLUMNS.len()) {
      return RowOutcome::Skip(reason);
    }

    RowOutcome::Row(ThreadStatusRow {
      tid: coerce(&record[0], "thread-id"),
      status: record[1].trim().to_string(),
      time: coerce(&record[2], "time"),
    })
  }
}

impl Aggregator for RhythmThreadTime {
  type Row = ThreadStatusRow;

  fn columns(&self) -> &'static [&'static str] {
    COLUMNS
  }

  fn select<'a>(&self, database: &'a Database) -> Vec<&'a RunConfig> {
    database.group(&RunType::Rhythm).iter().collect()
  }

  fn artifact(&self, dir: &Path) -> Option<PathBuf> {
    Some(dir.join(TIME_STACKS_FILE)).filter(|path| path.is_file())
  }

  fn read_rows(&self, artifact: &Path) -> Result<Vec<(usize, RowOutcome<ThreadStatusRow>)>, CollectError> {
    read_csv_rows(artifact, RhythmThreadTime::parse_record)
  }
}
