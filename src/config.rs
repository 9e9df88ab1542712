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
use crate::error::ConfigError;
use crate::scanner::CONFIG_FILE_NAME;
use crate::threads::DEFAULT_DENY_LIST;
use crate::threads::ThreadFilter;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Json;
use figment::providers::Serialized;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;

/// Prefix of environment variables overriding settings (e.g. `RLAB_TRACE_TOOL`).
pub const ENV_PREFIX: &str = "RLAB_";

/// Naming conventions of the experiment tree and its tools.
///
/// Resolved once by the binary from defaults, an optional JSON file and the
/// environment, then passed down. Library code never reads the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
  /// Name of the per-run configuration file.
  pub config_file_name: String,

  /// Thread-name fragments of harness threads to ignore in profiles.
  pub thread_deny_list: Vec<String>,

  /// Pin tool whose runs hold the thread traces.
  pub trace_tool: String,

  /// Pin tool whose runs hold the event counts.
  pub count_tool: String,

  /// VTune analysis collected as per-thread time.
  pub threading_analysis: String,

  /// VTune analysis architecture configurations are derived from.
  pub uarch_analysis: String,
}

impl Default for Settings {
  fn default() -> Self {
    Settings {
      config_file_name: CONFIG_FILE_NAME.to_string(),
      thread_deny_list: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
      trace_tool: "pthread-trace.so".to_string(),
      count_tool: "pthread-count.so".to_string(),
      threading_analysis: "threading".to_string(),
      uarch_analysis: "uarch-exploration".to_string(),
    }
  }
}

impl Settings {
  /// Layers defaults, the optional settings file and `RLAB_*` variables, in that order.
  pub fn figment(settings_file: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));
    if let Some(path) = settings_file {
      figment = figment.merge(Json::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX))
  }

  pub fn load(settings_file: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = settings_file {
      if !path.is_file() {
        return Err(ConfigError::SettingsFileNotFound(path.to_path_buf()));
      }
    }

    let settings: Settings = Settings::figment(settings_file)
      .extract()
      .map_err(Box::new)?;
    tracing::debug!(?settings, "Resolved settings");

    Ok(settings)
  }

  pub fn thread_filter(&self) -> ThreadFilter {
    ThreadFilter::new(self.thread_deny_list.iter().cloned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use figment::Jail;

  #[test]
  fn defaults_apply_without_overrides() {
    Jail::expect_with(|_jail| {
      assert_eq!(Settings::load(None).unwrap(), Settings::default());
      Ok(())
    });
  }

  #[test]
  fn file_and_environment_override_defaults() {
    Jail::expect_with(|jail| {
      jail.create_file("rlab.json", r#"{ "trace_tool": "trace.so", "count_tool": "count.so" }"#)?;
      jail.set_env("RLAB_COUNT_TOOL", "env-count.so");

      let settings = Settings::load(Some(Path::new("rlab.json"))).unwrap();

      assert_eq!(settings.trace_tool, "trace.so");
      assert_eq!(settings.count_tool, "env-count.so");
      assert_eq!(settings.uarch_analysis, "uarch-exploration");
      Ok(())
    });
  }

  #[test]
  fn missing_settings_file_is_an_error() {
    let result = Settings::load(Some(Path::new("/nonexistent/rlab.json")));
    assert!(matches!(result, Err(ConfigError::SettingsFileNotFound(_))));
  }
}
