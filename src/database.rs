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

//! The experiment database: every run found under a directory tree, grouped by run type.

use crate::error::DatabaseError;
use crate::record::RunConfig;
use crate::record::RunType;
use crate::scanner::find_config_files;
use chrono::Local;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Format version written into every database file.
pub const DATABASE_VERSION: f64 = 1.0;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Runs grouped by run type. Within a group, records keep scan order.
pub type Experiments = BTreeMap<RunType, Vec<RunConfig>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
  pub version: f64,
  pub path: PathBuf,
  pub timestamp: String,
  pub experiments: Experiments,
}

impl Database {
  /// An empty database stamped with the current local time.
  pub fn new(path: PathBuf) -> Self {
    Database {
      version: DATABASE_VERSION,
      path,
      timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
      experiments: Experiments::new(),
    }
  }

  /// Appends a run to its run-type group, creating the group on first sight.
  pub fn insert(&mut self, config: RunConfig) {
    self
      .experiments
      .entry(config.run_type.clone())
      .or_default()
      .push(config);
  }

  /// All runs of one kind, or an empty slice if the kind never occurred.
  pub fn group(&self, run_type: &RunType) -> &[RunConfig] {
    self
      .experiments
      .get(run_type)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  pub fn runs(&self) -> impl Iterator<Item = &RunConfig> {
    self.experiments.values().flatten()
  }

  pub fn len(&self) -> usize {
    self.experiments.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Loads a database previously written by [`Database::write`].
  pub fn read(path: &Path) -> Result<Self, DatabaseError> {
    let content = fs::read_to_string(path).map_err(|source| DatabaseError::ReadDatabase {
      path: path.to_path_buf(),
      source,
    })?;

    serde_json::from_str(&content).map_err(|source| DatabaseError::ParseDatabase {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn write(&self, path: &Path) -> Result<(), DatabaseError> {
    let json = serde_json::to_string_pretty(self)?;
    fs::write(path, json).map_err(|source| DatabaseError::WriteDatabase {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Builds a database from every `config_file_name` found under `root`.
///
/// A configuration that cannot be read or parsed aborts the whole build: a
/// broken run must never silently disappear from the database.
pub fn build_database(root: &Path, config_file_name: &str) -> Result<Database, DatabaseError> {
  tracing::info!("Scanning for run configurations in {}", root.display());

  if !root.is_dir() {
    return Err(DatabaseError::InputDirNotFound(root.to_path_buf()));
  }

  let mut database = Database::new(root.to_path_buf());

  for config_path in find_config_files(root, config_file_name) {
    let config = read_run_config(&config_path)?;
    tracing::debug!(
      run_type = %config.run_type,
      run_id = %config.run_id,
      "Indexed {}",
      config_path.display()
    );
    database.insert(config);
  }

  for (run_type, runs) in &database.experiments {
    tracing::info!(%run_type, runs = runs.len(), "Indexed run group");
  }

  Ok(database)
}

/// Reads and validates a single run configuration, injecting its artifact directory.
pub fn read_run_config(config_path: &Path) -> Result<RunConfig, DatabaseError> {
  let content = fs::read_to_string(config_path).map_err(|source| DatabaseError::ReadConfig {
    path: config_path.to_path_buf(),
    source,
  })?;

  let mut config: RunConfig =
    serde_json::from_str(&content).map_err(|source| DatabaseError::ParseConfig {
      path: config_path.to_path_buf(),
      source,
    })?;

  if let Err(field) = config.validate() {
    return Err(DatabaseError::MissingField {
      path: config_path.to_path_buf(),
      run_type: config.run_type,
      field,
    });
  }

  let parent = config_path
    .parent()
    .ok_or_else(|| DatabaseError::NoParentDir(config_path.to_path_buf()))?;
  config.path = Some(parent.to_path_buf());

  Ok(config)
}
