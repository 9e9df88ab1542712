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

/// Thread-name fragments of harness processes (shells, `mkdir`) that show up in profiles.
pub const DEFAULT_DENY_LIST: [&str; 3] = ["mkdir (", "dash (", "sh ("];

/// Drops profiler rows that belong to the run harness rather than the benchmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadFilter {
  patterns: Vec<String>,
}

impl ThreadFilter {
  pub fn new<I, S>(patterns: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    ThreadFilter {
      patterns: patterns.into_iter().map(Into::into).collect(),
    }
  }

  /// A thread is valid unless its name contains one of the deny-list fragments.
  pub fn is_valid(&self, thread_name: &str) -> bool {
    !self
      .patterns
      .iter()
      .any(|pattern| thread_name.contains(pattern.as_str()))
  }
}

impl Default for ThreadFilter {
  fn default() -> Self {
    ThreadFilter::new(DEFAULT_DENY_LIST)
  }
}
