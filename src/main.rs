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
use Commands::ArchConfig;
use Commands::Build;
use Commands::Collect;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use rhythm_lab::cli::Cli;
use rhythm_lab::cli::Commands;
use rhythm_lab::config::Settings;
use rhythm_lab::database::Database;
use rhythm_lab::database::build_database;
use rhythm_lab::estimate::Selection;
use rhythm_lab::estimate::plan_estimates;
use rhythm_lab::logging::setup_tracing;
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
  let _guard = setup_tracing()?;

  let Cli { config, command } = Cli::parse();
  let settings = Settings::load(config.as_deref()).context("Failed to load settings")?;

  let main_span = tracing::info_span!("rlab");
  let _enter = main_span.enter();

  match command {
    Build {
      input_dir,
      output_file,
    } => {
      tracing::info!("Building experiment database...");

      let database = build_database(&input_dir, &settings.config_file_name)?;
      database.write(&output_file)?;

      tracing::info!(
        runs = database.len(),
        "Database written to {}",
        output_file.display()
      );
    }
    Collect {
      database_file,
      kind,
      output_file,
    } => {
      let database = load_database(&database_file)?;

      tracing::info!("Collecting {} data.", kind);
      let aggregation = kind.aggregate(&database, &settings)?;
      aggregation.write_csv(&output_file)?;

      tracing::info!(
        rows = aggregation.rows.len(),
        "Collected data written to {}",
        output_file.display()
      );
    }
    ArchConfig {
      database_file,
      output_dir,
      benchmark,
      thread_count,
    } => {
      let database = load_database(&database_file)?;
      fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

      let selection = Selection {
        benchmark,
        thread_count,
      };
      let plans = plan_estimates(&database, &settings, &selection, &output_dir)?;

      for plan in &plans {
        println!("{}", serde_json::to_string(plan)?);
      }
      tracing::info!(count = plans.len(), "Architecture configurations written.");
    }
  }

  Ok(())
}

fn load_database(path: &Path) -> Result<Database> {
  if !path.exists() {
    anyhow::bail!("Database file does not exist: {}", path.display());
  }

  tracing::info!("Reading database {}.", path.display());
  Ok(Database::read(path)?)
}
