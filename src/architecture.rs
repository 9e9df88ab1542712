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

//! Synthesizes a simulator architecture description from a VTune
//! `uarch-exploration` profile.
//!
//! The profile is the thread-grouped hotspots report of the run. Every
//! benchmark thread becomes one entry of a single `default` core type with
//! its measured CPI rate, and the core type gets one frequency level: the
//! mean of the per-thread average frequencies.

use crate::error::DeriveError;
use crate::record::RunConfig;
use crate::threads::ThreadFilter;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Thread-grouped hotspots report written by the profiling run.
pub const HOTSPOTS_FILE: &str = "vtune-hotspots.csv";

pub const DEFAULT_CORE_TYPE: &str = "default";

const THREAD_COLUMN: &str = "Thread";
const TID_COLUMN: &str = "TID";
const CPI_COLUMN: &str = "CPI Rate";
const FREQUENCY_COLUMN: &str = "Average CPU Frequency";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
  /// The profiling run this configuration was derived from.
  pub source: RunConfig,
  pub architecture: Architecture,
  pub system: System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
  #[serde(rename = "core.types")]
  pub core_types: Vec<CoreType>,

  /// One entry per software thread, each naming a core type.
  pub cores: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreType {
  pub id: String,

  #[serde(rename = "frequency.levels")]
  pub frequency_levels: Vec<FrequencyLevel>,

  pub threads: Vec<ThreadCpi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyLevel {
  pub id: u32,
  pub frequency: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadCpi {
  pub tid: usize,

  #[serde(rename = "cpi.rate")]
  pub cpi_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
  #[serde(rename = "static.frequencies")]
  pub static_frequencies: Vec<StaticFrequency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticFrequency {
  pub tid: usize,
  pub level: u32,
}

impl ArchitectureConfig {
  pub fn write(&self, path: &Path) -> Result<(), DeriveError> {
    let json = serde_json::to_string_pretty(self)?;
    fs::write(path, json).map_err(|source| DeriveError::Write {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Derives the architecture configuration of a profiling run from its hotspots report.
pub fn derive(run: &RunConfig, filter: &ThreadFilter) -> Result<ArchitectureConfig, DeriveError> {
  let dir = run.artifact_dir().ok_or_else(|| DeriveError::NoPath {
    run_id: run.run_id.clone(),
  })?;

  let data_file = dir.join(HOTSPOTS_FILE);
  if !data_file.is_file() {
    return Err(DeriveError::DataNotFound(data_file));
  }

  let file = fs::File::open(&data_file).map_err(|source| DeriveError::ReadData {
    path: data_file.clone(),
    source: source.into(),
  })?;

  derive_from_reader(run, file, &data_file, filter)
}

/// Same as [`derive`], reading the report from `reader`. `origin` is only used in diagnostics.
pub fn derive_from_reader<R: Read>(
  run: &RunConfig,
  reader: R,
  origin: &Path,
  filter: &ThreadFilter,
) -> Result<ArchitectureConfig, DeriveError> {
  let read_error = |source: csv::Error| DeriveError::ReadData {
    path: origin.to_path_buf(),
    source,
  };

  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(reader);

  let headers = reader.headers().map_err(read_error)?.clone();
  let column = |name: &'static str| {
    headers
      .iter()
      .position(|header| header == name)
      .ok_or_else(|| DeriveError::MissingColumn {
        path: origin.to_path_buf(),
        column: name,
      })
  };
  let thread_col = column(THREAD_COLUMN)?;
  let tid_col = column(TID_COLUMN)?;
  let cpi_col = column(CPI_COLUMN)?;
  let frequency_col = column(FREQUENCY_COLUMN)?;

  // Keyed by the profiler's thread id; the last row for an id wins.
  let mut cpi_rates: BTreeMap<u64, f64> = BTreeMap::new();
  let mut frequencies: Vec<u64> = Vec::new();

  for (index, record) in reader.records().enumerate() {
    let record = record.map_err(read_error)?;
    let line = index + 2;

    let thread = record.get(thread_col).unwrap_or_default();
    if !filter.is_valid(thread) {
      tracing::debug!(line, thread, "Skipping harness thread");
      continue;
    }

    let parsed = (
      record.get(tid_col).and_then(|v| v.parse::<u64>().ok()),
      record.get(cpi_col).and_then(|v| v.parse::<f64>().ok()),
      record.get(frequency_col).and_then(|v| v.parse::<f64>().ok()),
    );
    let (Some(tid), Some(cpi_rate), Some(frequency)) = parsed else {
      tracing::warn!(line, thread, file = %origin.display(), "Unparsable profiler row. Skipping row.");
      continue;
    };

    cpi_rates.insert(tid, cpi_rate);
    frequencies.push(frequency as u64);
  }

  if cpi_rates.is_empty() {
    return Err(DeriveError::NoThreads(origin.to_path_buf()));
  }

  let frequency = average_frequency(&frequencies);
  tracing::info!(
    run_id = %run.run_id,
    threads = cpi_rates.len(),
    frequency,
    "Derived architecture configuration"
  );

  Ok(build_config(run, &cpi_rates, frequency))
}

/// Integer mean of already-truncated samples. Zero for no samples.
fn average_frequency(samples: &[u64]) -> u64 {
  match samples.len() as u64 {
    0 => 0,
    count => samples.iter().sum::<u64>() / count,
  }
}

/// Fills the single-core-type skeleton. Thread ids are renumbered densely in
/// ascending order of the profiler's ids.
fn build_config(run: &RunConfig, cpi_rates: &BTreeMap<u64, f64>, frequency: u64) -> ArchitectureConfig {
  let threads: Vec<ThreadCpi> = cpi_rates
    .values()
    .enumerate()
    .map(|(tid, &cpi_rate)| ThreadCpi { tid, cpi_rate })
    .collect();

  let static_frequencies = threads
    .iter()
    .map(|thread| StaticFrequency {
      tid: thread.tid,
      level: 0,
    })
    .collect();

  ArchitectureConfig {
    source: run.clone(),
    architecture: Architecture {
      core_types: vec![CoreType {
        id: DEFAULT_CORE_TYPE.to_string(),
        frequency_levels: vec![FrequencyLevel { id: 0, frequency }],
        threads,
      }],
      cores: vec![DEFAULT_CORE_TYPE.to_string(); run.thread_count as usize],
    },
    system: System { static_frequencies },
  }
}
