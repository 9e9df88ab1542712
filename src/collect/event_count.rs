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
use crate::matcher::filter_by_subtype;
use crate::record::RunConfig;
use crate::record::RunType;
use std::path::Path;
use std::path::PathBuf;

/// Candidate names of the event-count output, compressed first.
pub const COUNT_FILES: [&str; 2] = ["pthread-count.csv.gz", "pthread-count.csv"];

const COLUMNS: &[&str] = &["thread-id", "event", "count"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCountRow {
  pub tid: u64,
  pub event: String,
  pub count: u64,
}

impl MeasurementRow for EventCountRow {
  fn fields(&self) -> Vec<String> {
    vec![self.tid.to_string(), self.event.clone(), self.count.to_string()]
  }
}

/// Synchronization event counts recorded by a Pin tool.
#[derive(Debug, Clone)]
pub struct EventCount {
  tool: String,
}

impl EventCount {
  pub fn new(tool: &str) -> Self {
    EventCount {
      tool: tool.to_string(),
    }
  }

  pub fn parse_record(record: &csv::StringRecord) -> RowOutcome<EventCountRow> {
    if let Err(reason) = require_columns(record, COLUMNS.len()) {
      return RowOutcome::Skip(reason);
    }

    RowOutcome::Row(EventCountRow {
      tid: coerce(&record[0], "thread-id"),
      event: record[1].trim().to_string(),
      count: coerce(&record[2], "count"),
    })
  }
}

impl Aggregator for EventCount {
  type Row = EventCountRow;

  fn columns(&self) -> &'static [&'static str] {
    COLUMNS
  }

  fn select<'a>(&self, database: &'a Database) -> Vec<&'a RunConfig> {
    filter_by_subtype(database, &RunType::Pin, &self.tool)
  }

  fn artifact(&self, dir: &Path) -> Option<PathBuf> {
    COUNT_FILES
      .iter()
      .map(|name| dir.join(name))
      .find(|path| path.is_file())
  }

  fn read_rows(&self, artifact: &Path) -> Result<Vec<(usize, RowOutcome<EventCountRow>)>, CollectError> {
    read_csv_rows(artifact, EventCount::parse_record)
  }
}
