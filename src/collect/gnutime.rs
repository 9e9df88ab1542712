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
use super::open_artifact;
use crate::database::Database;
use crate::error::CollectError;
use crate::record::RunConfig;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

/// Record written by `/usr/bin/time -f "%e,%U,%S,..."`.
pub const TIME_FILE: &str = "time.csv";

const COLUMNS: &[&str] = &["gnutime", "user-time", "system-time"];

/// Elapsed, user and system seconds of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRow {
  pub elapsed: f64,
  pub user: f64,
  pub system: f64,
}

impl MeasurementRow for TimeRow {
  fn fields(&self) -> Vec<String> {
    vec![
      self.elapsed.to_string(),
      self.user.to_string(),
      self.system.to_string(),
    ]
  }
}

/// Timing of every run in the database. Pin runs are labelled with their tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct GnuTime;

impl GnuTime {
  /// Parses the timing line. Surrounding quotes left by the shell are ignored.
  pub fn parse_line(line: &str) -> RowOutcome<TimeRow> {
    let line = line.trim().replace('"', "");
    let fields: Vec<&str> = line.split(',').collect();

    if fields.len() < COLUMNS.len() {
      return RowOutcome::Skip(SkipReason::TooFewColumns {
        expected: COLUMNS.len(),
        found: fields.len(),
      });
    }

    RowOutcome::Row(TimeRow {
      elapsed: coerce(fields[0], "gnutime"),
      user: coerce(fields[1], "user-time"),
      system: coerce(fields[2], "system-time"),
    })
  }
}

impl Aggregator for GnuTime {
  type Row = TimeRow;

  fn columns(&self) -> &'static [&'static str] {
    COLUMNS
  }

  fn select<'a>(&self, database: &'a Database) -> Vec<&'a RunConfig> {
    database.runs().collect()
  }

  fn artifact(&self, dir: &Path) -> Option<PathBuf> {
    Some(dir.join(TIME_FILE)).filter(|path| path.is_file())
  }

  /// `time` prefixes its record with a status line when the command fails, so
  /// the record is the last non-empty line.
  fn read_rows(&self, artifact: &Path) -> Result<Vec<(usize, RowOutcome<TimeRow>)>, CollectError> {
    let mut content = String::new();
    open_artifact(artifact)?
      .read_to_string(&mut content)
      .map_err(|source| CollectError::ReadArtifact {
        path: artifact.to_path_buf(),
        source,
      })?;

    let last = content
      .lines()
      .enumerate()
      .filter(|(_, line)| !line.trim().is_empty())
      .last();

    Ok(match last {
      Some((index, line)) => vec![(index + 1, GnuTime::parse_line(line))],
      None => vec![(
        1,
        RowOutcome::Skip(SkipReason::Malformed("empty timing record".to_string())),
      )],
    })
  }

  fn label<'a>(&self, run: &'a RunConfig) -> &'a str {
    run.label()
  }
}
