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
use crate::architecture::derive;
use crate::config::Settings;
use crate::database::Database;
use crate::error::EstimateError;
use crate::matcher::filter_by_subtype;
use crate::matcher::find_matching_trace;
use crate::matcher::read_trace_manifest;
use crate::record::RunConfig;
use crate::record::RunType;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Restricts which profiles are turned into estimations.
#[derive(Debug, Clone, Default)]
pub struct Selection {
  pub benchmark: Option<String>,
  pub thread_count: Option<u32>,
}

impl Selection {
  pub fn accepts(&self, run: &RunConfig) -> bool {
    self.benchmark.as_ref().is_none_or(|b| *b == run.benchmark)
      && self.thread_count.is_none_or(|n| n == run.thread_count)
  }
}

/// Everything the simulator needs for one estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EstimatePlan {
  pub run_id: String,
  pub benchmark: String,
  pub input_set: String,
  pub thread_count: u32,
  pub arch_config: PathBuf,
  pub trace_manifest: PathBuf,
  pub trace_files: Vec<PathBuf>,
}

/// Pairs every selected architecture profile with its thread trace and
/// writes the derived architecture configuration into `output_dir`.
///
/// A profile without a matching trace aborts planning.
pub fn plan_estimates(
  database: &Database,
  settings: &Settings,
  selection: &Selection,
  output_dir: &Path,
) -> Result<Vec<EstimatePlan>, EstimateError> {
  let filter = settings.thread_filter();
  let mut plans = Vec::new();

  for config in filter_by_subtype(database, &RunType::Vtune, &settings.uarch_analysis) {
    if !selection.accepts(config) {
      continue;
    }

    tracing::info!(
      "Estimating {} with {} threads",
      config.benchmark,
      config.thread_count
    );

    let trace_manifest = find_matching_trace(database, config, &settings.trace_tool)?;
    tracing::info!("Using trace: {}", trace_manifest.display());
    let trace_files = read_trace_manifest(&trace_manifest)?;

    let arch = derive(config, &filter)?;
    let arch_config = output_dir.join(format!("arch-config-{}.json", config.run_id));
    arch.write(&arch_config)?;

    plans.push(EstimatePlan {
      run_id: config.run_id.clone(),
      benchmark: config.benchmark.clone(),
      input_set: config.input_set.clone(),
      thread_count: config.thread_count,
      arch_config,
      trace_manifest,
      trace_files,
    });
  }

  Ok(plans)
}
