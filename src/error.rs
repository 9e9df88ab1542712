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
use crate::record::MatchKey;
use crate::record::RunType;
use std::path::PathBuf;
use thiserror::Error;

/// Errors related to settings resolution (src/config.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Settings file not found: {0}")]
  SettingsFileNotFound(PathBuf),

  #[error("Failed to resolve settings")]
  Extract(#[from] Box<figment::Error>),
}

/// Errors raised while building or loading the experiment database (src/database.rs).
#[derive(Error, Debug)]
pub enum DatabaseError {
  #[error("Input directory not found: {0}")]
  InputDirNotFound(PathBuf),

  #[error("Failed to read run configuration: {path}")]
  ReadConfig {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Malformed run configuration: {path}")]
  ParseConfig {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Run configuration {path} has run-type '{run_type}' but no '{field}' field")]
  MissingField {
    path: PathBuf,
    run_type: RunType,
    field: &'static str,
  },

  #[error("Run configuration has no parent directory: {0}")]
  NoParentDir(PathBuf),

  #[error("Failed to read database file: {path}")]
  ReadDatabase {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Malformed database file: {path}")]
  ParseDatabase {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to write database file: {path}")]
  WriteDatabase {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to serialize database")]
  SerializeDatabase(#[from] serde_json::Error),
}

/// Errors raised while linking runs of different kinds (src/matcher.rs).
#[derive(Error, Debug)]
pub enum MatchError {
  #[error("Database has no '{0}' runs")]
  NoSuchKind(RunType),

  #[error("No '{kind}' run matches {key}")]
  NoMatch { kind: RunType, key: MatchKey },

  #[error("Run '{run_id}' has no artifact path")]
  NoPath { run_id: String },

  #[error("Trace manifest not found: {0}")]
  ManifestNotFound(PathBuf),

  #[error("Failed to read trace manifest: {path}")]
  ReadManifest {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Errors raised while deriving an architecture configuration (src/architecture.rs).
#[derive(Error, Debug)]
pub enum DeriveError {
  #[error("Run '{run_id}' has no artifact path")]
  NoPath { run_id: String },

  #[error("Profiler data not found: {0}")]
  DataNotFound(PathBuf),

  #[error("Failed to read profiler data: {path}")]
  ReadData {
    path: PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("Profiler data {path} is missing the '{column}' column")]
  MissingColumn { path: PathBuf, column: &'static str },

  #[error("No benchmark threads found in {0}")]
  NoThreads(PathBuf),

  #[error("Failed to write architecture configuration: {path}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to serialize architecture configuration")]
  Serialize(#[from] serde_json::Error),
}

/// Errors raised while aggregating measurement files (src/collect).
#[derive(Error, Debug)]
pub enum CollectError {
  #[error("Failed to open measurement file: {path}")]
  OpenArtifact {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to read measurement file: {path}")]
  ReadArtifact {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to write aggregated output: {path}")]
  WriteOutput {
    path: PathBuf,
    #[source]
    source: csv::Error,
  },
}

/// Errors raised while planning simulator estimations (src/estimate.rs).
#[derive(Error, Debug)]
pub enum EstimateError {
  #[error("Failed to find a trace")]
  Match(#[from] MatchError),

  #[error("Failed to derive an architecture configuration")]
  Derive(#[from] DeriveError),
}
