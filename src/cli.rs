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
use crate::collect::CollectKind;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Experiment database and data collection for Rhythm benchmark runs")]
pub struct Cli {
  /// JSON settings file overriding the default naming conventions.
  #[arg(long, global = true, env = "RLAB_CONFIG")]
  pub config: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Create a database of all experiments found in a directory.
  Build {
    /// Directory tree holding the run directories.
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Where to write the database.
    #[arg(short, long, default_value = "database.json")]
    output_file: PathBuf,
  },

  /// Aggregate one kind of measurement of every run into a CSV table.
  Collect {
    /// Database written by `build`.
    #[arg(short, long)]
    database_file: PathBuf,

    /// Measurement format to collect.
    #[arg(short = 't', long = "type", value_enum)]
    kind: CollectKind,

    /// Where to write the CSV table.
    #[arg(short, long, default_value = "stats.csv")]
    output_file: PathBuf,
  },

  /// Derive architecture configurations from VTune profiles and pair them with traces.
  ArchConfig {
    /// Database written by `build`.
    #[arg(short, long)]
    database_file: PathBuf,

    /// Directory receiving the architecture configurations.
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Only this benchmark.
    #[arg(short, long)]
    benchmark: Option<String>,

    /// Only runs with this many threads.
    #[arg(short, long)]
    thread_count: Option<u32>,
  },
}
