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

//! Per-run configuration records, as written next to every run's artifacts.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

/// Field holding the instrumentation tool of a `pin` run.
pub const PIN_TOOL_FIELD: &str = "pin-tool";

/// Field holding the analysis type of a `vtune` run.
pub const VTUNE_ANALYSIS_FIELD: &str = "vtune-analysis";

/// Measurement methodology of a run. The set is open: unknown kinds are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunType {
  /// Plain wall/CPU timing under GNU time.
  GnuTime,
  /// Instrumentation with a Pin tool.
  Pin,
  /// Hardware-counter profiling with VTune.
  Vtune,
  /// Replay in the Rhythm simulator.
  Rhythm,
  Other(String),
}

impl RunType {
  pub fn as_str(&self) -> &str {
    match self {
      RunType::GnuTime => "gnutime",
      RunType::Pin => "pin",
      RunType::Vtune => "vtune",
      RunType::Rhythm => "rhythm",
      RunType::Other(name) => name.as_str(),
    }
  }

  /// Name of the secondary discriminant field for this kind, if it has one.
  pub fn subtype_field(&self) -> Option<&'static str> {
    match self {
      RunType::Pin => Some(PIN_TOOL_FIELD),
      RunType::Vtune => Some(VTUNE_ANALYSIS_FIELD),
      _ => None,
    }
  }
}

impl From<String> for RunType {
  fn from(name: String) -> Self {
    match name.as_str() {
      "gnutime" => RunType::GnuTime,
      "pin" => RunType::Pin,
      "vtune" => RunType::Vtune,
      "rhythm" => RunType::Rhythm,
      _ => RunType::Other(name),
    }
  }
}

impl From<RunType> for String {
  fn from(run_type: RunType) -> Self {
    match run_type {
      RunType::Other(name) => name,
      known => known.as_str().to_string(),
    }
  }
}

impl FromStr for RunType {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(RunType::from(s.to_string()))
  }
}

impl fmt::Display for RunType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The (benchmark, input-set, thread-count) triple that links runs of different kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
  pub benchmark: String,
  pub input_set: String,
  pub thread_count: u32,
}

impl fmt::Display for MatchKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "benchmark={}, input-set={}, thread-count={}",
      self.benchmark, self.input_set, self.thread_count
    )
  }
}

/// One run's `config.json`.
///
/// The common fields are required. Kind-specific fields such as `pin-tool`
/// land in `extra` and are checked by [`RunConfig::validate`]. `path` is never
/// on disk: it is injected when the database is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
  #[serde(rename = "run-type")]
  pub run_type: RunType,

  #[serde(rename = "run-id")]
  pub run_id: String,

  pub benchmark: String,

  #[serde(rename = "input-set")]
  pub input_set: String,

  #[serde(rename = "thread-count", deserialize_with = "thread_count_from_any")]
  pub thread_count: u32,

  #[serde(default)]
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<PathBuf>,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl RunConfig {
  pub fn match_key(&self) -> MatchKey {
    MatchKey {
      benchmark: self.benchmark.clone(),
      input_set: self.input_set.clone(),
      thread_count: self.thread_count,
    }
  }

  /// Two runs match iff benchmark, input set and thread count are equal.
  pub fn matches(&self, other: &RunConfig) -> bool {
    self.benchmark == other.benchmark
      && self.input_set == other.input_set
      && self.thread_count == other.thread_count
  }

  /// Looks up a kind-specific string field.
  pub fn field(&self, name: &str) -> Option<&str> {
    self.extra.get(name).and_then(Value::as_str)
  }

  /// Value of this run's secondary discriminant (`pin-tool`, `vtune-analysis`).
  pub fn subtype(&self) -> Option<&str> {
    self.run_type.subtype_field().and_then(|field| self.field(field))
  }

  pub fn pin_tool(&self) -> Option<&str> {
    self.field(PIN_TOOL_FIELD)
  }

  pub fn artifact_dir(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  /// Label used in the `run-type` column of aggregated output.
  /// Pin runs are labelled with their tool so that tools stay distinguishable.
  pub fn label(&self) -> &str {
    match (&self.run_type, self.pin_tool()) {
      (RunType::Pin, Some(tool)) => tool,
      (run_type, _) => run_type.as_str(),
    }
  }

  /// Returns the name of the first required kind-specific field that is absent.
  pub fn validate(&self) -> Result<(), &'static str> {
    match self.run_type.subtype_field() {
      Some(field) if self.field(field).is_none() => Err(field),
      _ => Ok(()),
    }
  }
}

/// The harness writes `thread-count` as a number, a whole float or a numeric string.
fn thread_count_from_any<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  let count = match &value {
    Value::Number(n) => n
      .as_u64()
      .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
    Value::String(text) => text.trim().parse().ok(),
    _ => None,
  };

  count
    .and_then(|n| u32::try_from(n).ok())
    .ok_or_else(|| serde::de::Error::custom(format!("invalid thread-count {}", value)))
}
