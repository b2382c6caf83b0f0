// NetGraph: Scenario-Driven Network Modeling and Capacity Analysis
// Copyright (C) 2026  NetGraph Developers
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use netgraph::types::{AttrValue, Attrs};
use netgraph::{inspect_scenario, run_scenario, RunOptions};

use clap::{Parser, Subcommand};
use log::*;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[clap(name = "netgraph", about = "Scenario-driven network modeling and capacity analysis")]
struct CommandLineArguments {
    #[clap(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand)]
enum MainCommand {
    /// Validate a scenario file and print a summary
    Inspect {
        /// The scenario file (YAML)
        scenario: PathBuf,
    },
    /// Execute a scenario's workflow and emit the results document
    Run {
        /// The scenario file (YAML)
        scenario: PathBuf,
        /// Write the results document to this path
        #[clap(long)]
        results: Option<PathBuf>,
        /// Print the results document to stdout
        #[clap(long)]
        stdout: bool,
        /// Emit only the named workflow steps
        #[clap(long, multiple_values = true)]
        keys: Vec<String>,
        /// Print per-step durations to stderr
        #[clap(long)]
        profile: bool,
        /// Override the Monte Carlo worker count
        #[clap(long)]
        parallelism: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let args = CommandLineArguments::parse();

    match args.cmd {
        MainCommand::Inspect { scenario } => {
            let doc = load_scenario(&scenario)?;
            let summary = inspect_scenario(&doc)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        MainCommand::Run { scenario, results, stdout, keys, profile, parallelism } => {
            let doc = load_scenario(&scenario)?;
            let started = Instant::now();
            let mut document =
                run_scenario(&doc, RunOptions { parallelism, stopper: None })?;
            info!("workflow finished in {:.3}s", started.elapsed().as_secs_f64());
            if profile {
                for step in &document.steps {
                    eprintln!(
                        "{:<32} {:<24} {:.3}s",
                        step.metadata.step_name,
                        step.metadata.step_type,
                        step.metadata.duration_sec
                    );
                }
            }
            if !keys.is_empty() {
                document.filter_keys(&keys);
            }
            let rendered = document.to_json_pretty();
            if let Some(path) = results {
                fs::write(&path, &rendered)?;
                info!("results written to {}", path.display());
            }
            if stdout {
                println!("{}", rendered);
            }
        }
    }
    Ok(())
}

fn load_scenario(path: &PathBuf) -> Result<AttrValue, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let value: serde_yaml::Value = serde_yaml::from_str(&text)?;
    Ok(convert(&value)?)
}

#[derive(Debug)]
struct YamlShapeError(String);

impl fmt::Display for YamlShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported scenario value: {}", self.0)
    }
}

impl Error for YamlShapeError {}

/// Lower the parsed YAML into the plain value tree the core consumes. Mapping keys must be
/// scalars; they are rendered to strings.
fn convert(value: &serde_yaml::Value) -> Result<AttrValue, YamlShapeError> {
    Ok(match value {
        serde_yaml::Value::Null => AttrValue::Null,
        serde_yaml::Value::Bool(b) => AttrValue::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttrValue::Int(i)
            } else {
                AttrValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_yaml::Value::String(s) => AttrValue::Str(s.clone()),
        serde_yaml::Value::Sequence(items) => {
            AttrValue::List(items.iter().map(convert).collect::<Result<_, _>>()?)
        }
        serde_yaml::Value::Mapping(map) => {
            let mut out = Attrs::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(YamlShapeError(format!("{:?} used as a key", other))),
                };
                out.insert(key, convert(v)?);
            }
            AttrValue::Map(out)
        }
        serde_yaml::Value::Tagged(tagged) => convert(&tagged.value)?,
    })
}
