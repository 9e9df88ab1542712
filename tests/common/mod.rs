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
#![allow(dead_code)]

use fs_extra::dir::CopyOptions;
use fs_extra::dir::copy;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use tempfile::tempdir;

/// Copies `tests/fixtures/experiments` into a fresh temp dir and returns (guard, tree root).
pub fn fixture_tree() -> (TempDir, PathBuf) {
  let temp = tempdir().unwrap();
  copy("tests/fixtures/experiments", temp.path(), &CopyOptions::new()).unwrap();
  let root = temp.path().join("experiments");
  (temp, root)
}

/// Creates `root/relative` holding a `config.json` with `config` and the given artifacts.
pub fn write_run(root: &Path, relative: &str, config: Value, artifacts: &[(&str, &str)]) -> PathBuf {
  let dir = root.join(relative);
  fs::create_dir_all(&dir).unwrap();
  fs::write(dir.join("config.json"), serde_json::to_string_pretty(&config).unwrap()).unwrap();
  for (name, content) in artifacts {
    fs::write(dir.join(name), content).unwrap();
  }
  dir
}
