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

use assert_cmd::cargo;
use assert_cmd::prelude::*;
use common::fixture_tree;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn rlab() -> Command {
  let mut cmd = Command::new(cargo::cargo_bin!("rlab"));
  cmd.env("CLICOLOR", "0").env_remove("RLAB_LOG_FILE");
  cmd
}

#[test]
fn test_build_requires_input_dir() {
  rlab()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("--input-dir"));
}

#[test]
fn test_collect_missing_database() {
  rlab()
    .arg("collect")
    .arg("--database-file")
    .arg("non_existent_database.json")
    .arg("--type")
    .arg("gnu-time")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Database file does not exist"));
}

#[test]
fn test_build_rejects_malformed_config() {
  let temp = tempdir().unwrap();
  let run = temp.path().join("run");
  fs::create_dir_all(&run).unwrap();
  fs::write(run.join("config.json"), "not json").unwrap();

  rlab()
    .arg("build")
    .arg("--input-dir")
    .arg(temp.path())
    .arg("--output-file")
    .arg(temp.path().join("database.json"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Malformed run configuration"));

  assert!(!temp.path().join("database.json").exists());
}

#[test]
fn test_build_collect_and_arch_config_e2e() {
  let (temp, root) = fixture_tree();
  let database_path = temp.path().join("database.json");

  // --- `rlab build` ---
  rlab()
    .arg("build")
    .arg("--input-dir")
    .arg(&root)
    .arg("--output-file")
    .arg(&database_path)
    .assert()
    .success()
    .stderr(predicate::str::contains("Database written"));

  let database: Value = serde_json::from_str(&fs::read_to_string(&database_path).unwrap()).unwrap();
  assert_eq!(database["experiments"]["vtune"].as_array().unwrap().len(), 2);

  // --- `rlab collect` ---
  let stats = temp.path().join("rhythm.csv");
  rlab()
    .arg("collect")
    .arg("-d")
    .arg(&database_path)
    .arg("-t")
    .arg("rhythm-thread-time")
    .arg("-o")
    .arg(&stats)
    .assert()
    .success();

  let table = fs::read_to_string(&stats).unwrap();
  assert_eq!(table.lines().count(), 7);
  assert!(table.starts_with("benchmark,input-set,thread-count,run-type,run-id,thread-id,status,time\n"));
  assert!(table.contains("canneal,simsmall,2,rhythm,2020-01-01-00-06-00,1,blocked,3.5\n"));

  // --- `rlab arch-config` ---
  let arch_dir = temp.path().join("arch");
  rlab()
    .arg("arch-config")
    .arg("--database-file")
    .arg(&database_path)
    .arg("--output-dir")
    .arg(&arch_dir)
    .arg("--benchmark")
    .arg("blackscholes")
    .assert()
    .success()
    .stdout(predicate::str::contains(r#""run-id":"2020-01-01-00-03-00""#))
    .stdout(predicate::str::contains("output-manifest.txt"))
    .stderr(predicate::str::contains("Using trace"));

  let arch: Value = serde_json::from_str(
    &fs::read_to_string(arch_dir.join("arch-config-2020-01-01-00-03-00.json")).unwrap(),
  )
  .unwrap();
  assert_eq!(arch["architecture"]["cores"].as_array().unwrap().len(), 4);
  assert_eq!(arch["architecture"]["core.types"][0]["frequency.levels"][0]["frequency"], 2000);
}

#[test]
fn test_arch_config_without_trace_fails() {
  let (temp, root) = fixture_tree();
  fs::remove_dir_all(root.join("pin")).unwrap();
  let database_path = temp.path().join("database.json");

  rlab()
    .arg("build")
    .arg("-i")
    .arg(&root)
    .arg("-o")
    .arg(&database_path)
    .assert()
    .success();

  rlab()
    .arg("arch-config")
    .arg("-d")
    .arg(&database_path)
    .arg("-o")
    .arg(temp.path().join("arch"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Database has no 'pin' runs"));
}

#[test]
fn test_settings_file_overrides_tool_names() {
  let (temp, root) = fixture_tree();
  let database_path = temp.path().join("database.json");
  let settings = temp.path().join("rlab.json");
  fs::write(&settings, r#"{ "count_tool": "pthread-trace.so" }"#).unwrap();

  rlab()
    .arg("build")
    .arg("-i")
    .arg(&root)
    .arg("-o")
    .arg(&database_path)
    .assert()
    .success();

  let stats = temp.path().join("counts.csv");
  rlab()
    .arg("--config")
    .arg(&settings)
    .arg("collect")
    .arg("-d")
    .arg(&database_path)
    .arg("-t")
    .arg("event-count")
    .arg("-o")
    .arg(&stats)
    .assert()
    .success();

  // The trace run has no count file, so only the header is written.
  assert_eq!(fs::read_to_string(&stats).unwrap().lines().count(), 1);
}
