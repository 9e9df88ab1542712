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
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Default name of the per-run configuration file.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Recursively collects every file under `root` whose name is exactly `file_name`.
///
/// Files are not opened. Unreadable subtrees are logged and skipped. Entries
/// are visited in file-name order so repeated scans of the same tree agree.
/// A symlink named `file_name` counts when it points at a file; symlinked
/// directories are not descended into.
pub fn find_config_files(root: &Path, file_name: &str) -> Vec<PathBuf> {
  WalkDir::new(root)
    .sort_by_file_name()
    .into_iter()
    .filter_map(|entry| match entry {
      Ok(entry) => Some(entry),
      Err(e) => {
        tracing::warn!(error = %e, "Skipping unreadable directory entry");
        None
      }
    })
    .filter(|entry| entry.file_name() == file_name && entry.path().is_file())
    .map(|entry| entry.into_path())
    .collect()
}
