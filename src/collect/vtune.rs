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
use super::SkipReason;
use super::coerce;
use super::read_csv_rows;
use super::require_columns;
use crate::architecture::HOTSPOTS_FILE;
use crate::database::Database;
use crate::error::CollectError;
use crate::matcher::filter_by_subtype;
use crate::record::RunConfig;
use crate::record::RunType;
use crate::threads::ThreadFilter;
use std::path::Path;
use std::path::PathBuf;

const COLUMNS: &[&str] = &["thread-id", "effective-time", "wait-time", "wait-count"];

// Positions in the thread-grouped hotspots report of a threading analysis.
const THREAD_NAME: usize = 0;
const EFFECTIVE_TIME: usize = 1;
const WAIT_TIME: usize = 10;
const WAIT_COUNT: usize = 16;
const TID: usize = 18;

/// Effective and wait time of one thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadTimeRow {
  pub tid: u64,
  pub effective_time: f64,
  pub wait_time: f64,
  pub wait_count: u64,
}

impl MeasurementRow for ThreadTimeRow {
  fn fields(&self) -> Vec<String> {
    vec![
      self.tid.to_string(),
      self.effective_time.to_string(),
      self.wait_time.to_string(),
      self.wait_count.to_string(),
    ]
  }
}

/// Per-thread timing of VTune runs of one analysis type (normally `threading`).
#[derive(Debug, Clone)]
pub struct VtuneThreadTime {
  analysis: String,
  filter: ThreadFilter,
}

impl VtuneThreadTime {
  pub fn new(analysis: &str, filter: ThreadFilter) -> Self {
    VtuneThreadTime {
      analysis: analysis.to_string(),
      filter,
    }
  }

  pub fn parse_record(&self, record: &csv::StringRecord) -> RowOutcome<ThreadTimeRow> {
    if let Err(reason) = require_columns(record, TID + 1) {
      return RowOutcome::Skip(reason);
    }

    let thread_name = &record[THREAD_NAME];
    if !self.filter.is_valid(thread_name) {
      return RowOutcome::Skip(SkipReason::FilteredThread(thread_name.to_string()));
    }

    RowOutcome::Row(ThreadTimeRow {
      tid: coerce(&record[TID], "thread-id"),
      effective_time: coerce(&record[EFFECTIVE_TIME], "effective-time"),
      wait_time: coerce(&record[WAIT_TIME], "wait-time"),
      wait_count: coerce(&record[WAIT_COUNT], "wait-count"),
    })
  }
}

impl Aggregator for VtuneThreadTime {
  type Row = ThreadTimeRow;

  fn columns(&self) -> &'static [&'static str] {
    COLUMNS
  }

  fn select<'a>(&self, database: &'a Database) -> Vec<&'a RunConfig> {
    filter_by_subtype(database, &RunType::Vtune, &self.analysis)
  }

  fn artifact(&self, dir: &Path) -> Option<PathBuf> {
    Some(dir.join(HOTSPOTS_FILE)).filter(|path| path.is_file())
  }

  fn read_rows(&self, artifact: &Path) -> Result<Vec<(usize, RowOutcome<ThreadTimeRow>)>, CollectError> {
    read_csv_rows(artifact, |record| self.parse_record(record))
  }
}
