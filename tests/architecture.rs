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
mod common;

use common::fixture_tree;
use common::write_run;
use rhythm_lab::architecture::ArchitectureConfig;
use rhythm_lab::architecture::DEFAULT_CORE_TYPE;
use rhythm_lab::architecture::HOTSPOTS_FILE;
use rhythm_lab::architecture::derive;
use rhythm_lab::architecture::derive_from_reader;
use rhythm_lab::database::build_database;
use rhythm_lab::error::DeriveError;
use rhythm_lab::matcher::filter_by_subtype;
use rhythm_lab::record::RunConfig;
use rhythm_lab::record::RunType;
use rhythm_lab::scanner::CONFIG_FILE_NAME;
use rhythm_lab::threads::ThreadFilter;
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;

fn profile(thread_count: u32) -> RunConfig {
  serde_json::from_value(json!({
    "run-type": "vtune",
    "run-id": "2020-01-01-00-03-00",
    "vtune-analysis": "uarch-exploration",
    "benchmark": "blackscholes",
    "input-set": "test",
    "thread-count": thread_count
  }))
  .unwrap()
}

fn derive_str(run: &RunConfig, csv: &str) -> Result<ArchitectureConfig, DeriveError> {
  derive_from_reader(run, csv.as_bytes(), Path::new("inline.csv"), &ThreadFilter::default())
}

#[test]
fn fixture_profile_is_derived() {
  let (_temp, root) = fixture_tree();
  let database = build_database(&root, CONFIG_FILE_NAME).unwrap();
  let source = filter_by_subtype(&database, &RunType::Vtune, "uarch-exploration")[0];

  let arch = derive(source, &ThreadFilter::default()).unwrap();

  let core_type = &arch.architecture.core_types[0];
  assert_eq!(arch.architecture.core_types.len(), 1);
  assert_eq!(core_type.id, DEFAULT_CORE_TYPE);
  assert_eq!(core_type.frequency_levels.len(), 1);
  assert_eq!(core_type.frequency_levels[0].id, 0);
  assert_eq!(core_type.frequency_levels[0].frequency, 2000);

  let renumbered: Vec<(usize, f64)> = core_type.threads.iter().map(|t| (t.tid, t.cpi_rate)).collect();
  assert_eq!(renumbered, vec![(0, 0.8), (1, 0.85), (2, 0.75)]);

  assert_eq!(arch.architecture.cores, vec![DEFAULT_CORE_TYPE; 4]);
  assert_eq!(&arch.source, source);
}

#[test]
fn static_frequencies_follow_threads() {
  let csv = "Thread,TID,CPI Rate,Average CPU Frequency\n\
             worker (30),30,1.0,1000\n\
             worker (10),10,2.0,1000\n";

  let arch = derive_str(&profile(2), csv).unwrap();

  let tids: Vec<usize> = arch.system.static_frequencies.iter().map(|f| f.tid).collect();
  assert_eq!(tids, vec![0, 1]);
  assert!(arch.system.static_frequencies.iter().all(|f| f.level == 0));
  assert_eq!(arch.architecture.core_types[0].threads[0].cpi_rate, 2.0);
}

#[test]
fn harness_threads_never_reach_the_configuration() {
  let csv = "Thread,TID,CPI Rate,Average CPU Frequency\n\
             sh (1),1,9.0,100\n\
             dash (2),2,9.0,100\n\
             mkdir (3),3,9.0,100\n\
             app (4),4,1.5,3000\n";

  let arch = derive_str(&profile(1), csv).unwrap();

  let threads = &arch.architecture.core_types[0].threads;
  assert_eq!(threads.len(), 1);
  assert_eq!(threads[0].cpi_rate, 1.5);
  assert_eq!(arch.architecture.core_types[0].frequency_levels[0].frequency, 3000);
}

#[test]
fn frequency_is_the_truncated_mean() {
  let csv = "Thread,TID,CPI Rate,Average CPU Frequency\n\
             a (1),1,1.0,2000.6\n\
             a (2),2,1.0,2001.4\n\
             a (3),3,1.0,1999.0\n";

  let arch = derive_str(&profile(3), csv).unwrap();

  assert_eq!(arch.architecture.core_types[0].frequency_levels[0].frequency, 2000);
}

#[test]
fn duplicate_thread_ids_keep_the_last_row() {
  let csv = "Thread,TID,CPI Rate,Average CPU Frequency\n\
             a (7),7,1.0,1000\n\
             a (7),7,3.0,1000\n";

  let arch = derive_str(&profile(1), csv).unwrap();

  let threads = &arch.architecture.core_types[0].threads;
  assert_eq!(threads.len(), 1);
  assert_eq!(threads[0].cpi_rate, 3.0);
}

#[test]
fn cores_follow_thread_count_not_profiled_threads() {
  let csv = "Thread,TID,CPI Rate,Average CPU Frequency\n\
             a (1),1,1.0,1000\n";

  let arch = derive_str(&profile(8), csv).unwrap();

  assert_eq!(arch.architecture.cores.len(), 8);
  assert_eq!(arch.architecture.core_types[0].threads.len(), 1);
}

#[test]
fn unparsable_rows_are_not_samples() {
  let csv = "Thread,TID,CPI Rate,Average CPU Frequency\n\
             a (1),1,1.0,1000\n\
             a (2),2,[Unknown],5000\n";

  let arch = derive_str(&profile(2), csv).unwrap();

  assert_eq!(arch.architecture.core_types[0].threads.len(), 1);
  assert_eq!(arch.architecture.core_types[0].frequency_levels[0].frequency, 1000);
}

#[test]
fn missing_column_is_an_error() {
  let csv = "Thread,TID,CPI Rate\na (1),1,1.0\n";

  assert!(matches!(
    derive_str(&profile(1), csv),
    Err(DeriveError::MissingColumn { column: "Average CPU Frequency", .. })
  ));
}

#[test]
fn profile_without_benchmark_threads_is_an_error() {
  let csv = "Thread,TID,CPI Rate,Average CPU Frequency\nsh (1),1,1.0,1000\n";

  assert!(matches!(derive_str(&profile(1), csv), Err(DeriveError::NoThreads(_))));
}

#[test]
fn missing_hotspots_report_is_an_error() {
  let temp = tempdir().unwrap();
  let dir = write_run(temp.path(), "vtune", json!({}), &[]);
  let mut run = profile(4);
  run.path = Some(dir.clone());

  match derive(&run, &ThreadFilter::default()) {
    Err(DeriveError::DataNotFound(path)) => assert_eq!(path, dir.join(HOTSPOTS_FILE)),
    other => panic!("expected missing data, got {:?}", other),
  }
}

#[test]
fn written_configuration_uses_simulator_keys() {
  let temp = tempdir().unwrap();
  let csv = "Thread,TID,CPI Rate,Average CPU Frequency\na (1),1,1.25,2400\n";
  let arch = derive_str(&profile(2), csv).unwrap();
  let out = temp.path().join("arch-config.json");

  arch.write(&out).unwrap();
  let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();

  assert_eq!(json["source"]["run-id"], "2020-01-01-00-03-00");
  assert_eq!(json["architecture"]["core.types"][0]["id"], "default");
  assert_eq!(json["architecture"]["core.types"][0]["frequency.levels"][0]["frequency"], 2400);
  assert_eq!(json["architecture"]["core.types"][0]["threads"][0]["cpi.rate"], 1.25);
  assert_eq!(json["architecture"]["cores"], json!(["default", "default"]));
  assert_eq!(json["system"]["static.frequencies"][0], json!({"tid": 0, "level": 0}));
}
