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

//! Linking runs of different kinds through their match key.

use crate::database::Database;
use crate::error::MatchError;
use crate::record::RunConfig;
use crate::record::RunType;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Name of the file listing a traced run's output files.
pub const TRACE_MANIFEST_FILE: &str = "output-manifest.txt";

/// All runs of `run_type` whose secondary discriminant equals `subtype`, in group order.
pub fn filter_by_subtype<'a>(
  database: &'a Database,
  run_type: &RunType,
  subtype: &str,
) -> Vec<&'a RunConfig> {
  database
    .group(run_type)
    .iter()
    .filter(|run| run.subtype() == Some(subtype))
    .collect()
}

/// Finds the first run of `run_type` (optionally restricted to one subtype)
/// whose match key equals `source`'s.
///
/// Fails if the kind is absent or nothing matches. When several runs match,
/// the first in scan order wins and the ambiguity is logged.
pub fn find_matching<'a>(
  database: &'a Database,
  run_type: &RunType,
  subtype: Option<&str>,
  source: &RunConfig,
) -> Result<&'a RunConfig, MatchError> {
  let group = database
    .experiments
    .get(run_type)
    .ok_or_else(|| MatchError::NoSuchKind(run_type.clone()))?;

  let mut candidates = group
    .iter()
    .filter(|run| subtype.is_none() || run.subtype() == subtype)
    .filter(|run| run.matches(source));

  let first = candidates.next().ok_or_else(|| MatchError::NoMatch {
    kind: run_type.clone(),
    key: source.match_key(),
  })?;

  let duplicates: Vec<&str> = candidates.map(|run| run.run_id.as_str()).collect();
  if !duplicates.is_empty() {
    tracing::warn!(
      kind = %run_type,
      key = %source.match_key(),
      chosen = %first.run_id,
      ignored = ?duplicates,
      "Several runs share a match key; using the first one"
    );
  }

  Ok(first)
}

/// Finds the trace manifest of the `trace_tool` pin run matching `source`.
pub fn find_matching_trace(
  database: &Database,
  source: &RunConfig,
  trace_tool: &str,
) -> Result<PathBuf, MatchError> {
  let run = find_matching(database, &RunType::Pin, Some(trace_tool), source)?;
  let dir = run.artifact_dir().ok_or_else(|| MatchError::NoPath {
    run_id: run.run_id.clone(),
  })?;

  let manifest = dir.join(TRACE_MANIFEST_FILE);
  if !manifest.is_file() {
    return Err(MatchError::ManifestNotFound(manifest));
  }

  Ok(manifest)
}

/// Reads the newline-separated trace paths listed in a manifest.
pub fn read_trace_manifest(manifest: &Path) -> Result<Vec<PathBuf>, MatchError> {
  let content = fs::read_to_string(manifest).map_err(|source| MatchError::ReadManifest {
    path: manifest.to_path_buf(),
    source,
  })?;

  Ok(
    content
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(PathBuf::from)
      .collect(),
  )
}
