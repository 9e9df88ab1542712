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

//! # Rhythm Lab
//!
//! `rhythm-lab` indexes the output directories of benchmark runs (GNU time,
//! Pin instrumentation, VTune profiles, Rhythm simulations) and turns them
//! into inputs for analysis and for the Rhythm simulator.
//!
//! This crate contains the library logic for the `rlab` CLI. Its core modules
//! can be used independently of the command line.
//!
//! ## Core Modules
//!
//! * [`database`]: Builds the experiment database from every `config.json`
//!   found by the [`scanner`], grouped by run type, and persists it as JSON.
//! * [`record`]: The per-run configuration record and its match key.
//! * [`matcher`]: Links runs of different kinds, e.g. a VTune profile to the
//!   Pin trace of the same benchmark, input set and thread count.
//! * [`architecture`]: Derives a simulator architecture configuration from a
//!   VTune hotspots report.
//! * [`collect`]: Aggregates the four raw measurement formats into CSV tables.
//! * [`estimate`]: Plans simulator runs by pairing profiles with traces.
//! * [`config`]: Layered settings (defaults, JSON file, environment).
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod architecture;
pub mod cli;
pub mod collect;
pub mod config;
pub mod database;
pub mod error;
pub mod estimate;
pub mod logging;
pub mod matcher;
pub mod record;
pub mod scanner;
pub mod threads;
