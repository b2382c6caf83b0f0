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

//! # Workflow Driver
//!
//! A workflow is a linear list of steps from a fixed catalog. The driver evaluates steps in
//! order, stores each result keyed by step name, and threads earlier outputs into later steps
//! (`alpha_from_step`/`alpha_from_field`). A failing analysis step aborts that step but earlier
//! results are preserved in the document.

pub mod msd;
mod results;
mod steps;

pub use msd::MsdOutcome;
pub use results::{ResultsDocument, StepMetadata, StepResult};

use crate::error::{AnalysisError, Error, SchemaError};
use crate::scenario::{
    as_bool, as_f64, as_list, as_map, as_str, as_usize, check_keys, parse_selector, Scenario,
};
use crate::flow::FlowPolicyConfig;
use crate::selectors::Selector;
use crate::topology::Network;
use crate::types::AttrValue;
use crate::Stopper;
use log::*;
use std::collections::BTreeSet;
use std::time::Instant;

/// The `MaxFlow` step: Monte-Carlo max-flow between two selector sets.
#[derive(Debug, Clone)]
pub struct MaxFlowStep {
    /// Step name
    pub name: String,
    /// Source selector
    pub source: Selector,
    /// Sink selector
    pub sink: Selector,
    /// Routing preset; default is unrestricted proportional placement (true max-flow)
    pub policy: Option<FlowPolicyConfig>,
    /// Failure policy name (`failures` section); absent means no failures
    pub failure_policy: Option<String>,
    /// Monte Carlo iterations
    pub iterations: usize,
    /// Worker threads; default is the number of hardware threads
    pub parallelism: Option<usize>,
    /// Per-step seed override
    pub seed: Option<u64>,
    /// Record failure traces
    pub include_failure_trace: bool,
    /// Record min-cut edges in the iteration summaries
    pub include_min_cut: bool,
}

/// The `TrafficMatrixPlacement` step: Monte-Carlo demand placement for a named matrix.
#[derive(Debug, Clone)]
pub struct TrafficMatrixStep {
    /// Step name
    pub name: String,
    /// Matrix name (`demands` section)
    pub matrix: String,
    /// Failure policy name
    pub failure_policy: Option<String>,
    /// Monte Carlo iterations
    pub iterations: usize,
    /// Worker threads
    pub parallelism: Option<usize>,
    /// Per-step seed override
    pub seed: Option<u64>,
    /// Record failure traces
    pub include_failure_trace: bool,
    /// Scale factor applied to every demand volume
    pub alpha: f64,
    /// Take `alpha` from an earlier step's result instead
    pub alpha_from_step: Option<String>,
    /// Dotted field path into the referenced step result
    pub alpha_from_field: String,
}

/// The `MaximumSupportedDemand` step: bisection on the matrix scale factor.
#[derive(Debug, Clone)]
pub struct MsdStep {
    /// Step name
    pub name: String,
    /// Matrix name
    pub matrix: String,
    /// First probed scale factor
    pub alpha_start: f64,
    /// Bracket growth factor
    pub growth_factor: f64,
    /// Bisection stops when the bracket is this tight
    pub resolution: f64,
    /// Lower search bound
    pub alpha_min: f64,
    /// Upper search bound
    pub alpha_max: f64,
    /// Bracket probe budget
    pub max_bracket_iters: usize,
    /// Bisection probe budget
    pub max_bisect_iters: usize,
    /// Probes per alpha; a strict majority accepts
    pub seeds_per_alpha: usize,
}

/// One step of the fixed catalog.
#[derive(Debug, Clone)]
pub enum WorkflowStep {
    /// Serialize the materialized graph for external export
    BuildGraph {
        /// Step name
        name: String,
    },
    /// Counts, degrees and per-node in/out capacity
    NetworkStats {
        /// Step name
        name: String,
    },
    /// Monte-Carlo max-flow between two selector sets
    MaxFlow(MaxFlowStep),
    /// Monte-Carlo demand placement for a named matrix
    TrafficMatrixPlacement(TrafficMatrixStep),
    /// Bisect the matrix scale factor to the acceptance boundary
    MaximumSupportedDemand(MsdStep),
    /// Component cost/power aggregation; executed by external tooling, recorded empty here
    CostPower {
        /// Step name
        name: String,
    },
}

impl WorkflowStep {
    /// The step's unique name
    pub fn name(&self) -> &str {
        match self {
            WorkflowStep::BuildGraph { name }
            | WorkflowStep::NetworkStats { name }
            | WorkflowStep::CostPower { name } => name,
            WorkflowStep::MaxFlow(s) => &s.name,
            WorkflowStep::TrafficMatrixPlacement(s) => &s.name,
            WorkflowStep::MaximumSupportedDemand(s) => &s.name,
        }
    }

    /// The catalog name of the step
    pub fn step_type(&self) -> &'static str {
        match self {
            WorkflowStep::BuildGraph { .. } => "BuildGraph",
            WorkflowStep::NetworkStats { .. } => "NetworkStats",
            WorkflowStep::MaxFlow(_) => "MaxFlow",
            WorkflowStep::TrafficMatrixPlacement(_) => "TrafficMatrixPlacement",
            WorkflowStep::MaximumSupportedDemand(_) => "MaximumSupportedDemand",
            WorkflowStep::CostPower { .. } => "CostPower",
        }
    }
}

/// Parse the `workflow` section into the step catalog.
pub fn parse_workflow(v: &AttrValue) -> Result<Vec<WorkflowStep>, Error> {
    let mut steps = Vec::new();
    let mut names = BTreeSet::new();
    for (i, item) in as_list(v, "workflow")?.iter().enumerate() {
        let context = format!("workflow[{}]", i);
        let map = as_map(item, &context)?;
        let step_type = match map
            .get("step_type")
            .or_else(|| map.get("step"))
            .or_else(|| map.get("type"))
        {
            Some(t) => as_str(t, "step_type")?,
            None => {
                return Err(SchemaError::MissingKey {
                    key: "step_type".to_string(),
                    context,
                }
                .into())
            }
        };
        let name = match map.get("name") {
            Some(n) => as_str(n, "name")?,
            None => format!("{}_{}", step_type, i),
        };
        if !names.insert(name.clone()) {
            return Err(AnalysisError::DuplicateStepName(name).into());
        }
        let step = match step_type.as_str() {
            "BuildGraph" => {
                check_keys(map, &["step_type", "step", "type", "name"], &context)?;
                WorkflowStep::BuildGraph { name }
            }
            "NetworkStats" => {
                check_keys(map, &["step_type", "step", "type", "name"], &context)?;
                WorkflowStep::NetworkStats { name }
            }
            "CostPower" => {
                check_keys(map, &["step_type", "step", "type", "name"], &context)?;
                WorkflowStep::CostPower { name }
            }
            "MaxFlow" => {
                check_keys(
                    map,
                    &[
                        "step_type", "step", "type", "name", "source", "sink", "policy",
                        "flow_policy", "failure_policy", "iterations", "parallelism", "seed",
                        "include_failure_trace", "include_min_cut",
                    ],
                    &context,
                )?;
                WorkflowStep::MaxFlow(MaxFlowStep {
                    name,
                    source: parse_selector(
                        map.get("source").ok_or_else(|| SchemaError::MissingKey {
                            key: "source".to_string(),
                            context: context.clone(),
                        })?,
                        "source",
                    )?,
                    sink: parse_selector(
                        map.get("sink").ok_or_else(|| SchemaError::MissingKey {
                            key: "sink".to_string(),
                            context: context.clone(),
                        })?,
                        "sink",
                    )?,
                    policy: match map.get("policy").or_else(|| map.get("flow_policy")) {
                        Some(p) => Some(FlowPolicyConfig::parse(&as_str(p, "policy")?)?),
                        None => None,
                    },
                    failure_policy: opt_str(map, "failure_policy")?,
                    iterations: opt_usize(map, "iterations")?.unwrap_or(1),
                    parallelism: opt_usize(map, "parallelism")?,
                    seed: opt_u64(map, "seed")?,
                    include_failure_trace: opt_bool(map, "include_failure_trace")?
                        .unwrap_or(false),
                    include_min_cut: opt_bool(map, "include_min_cut")?.unwrap_or(false),
                })
            }
            "TrafficMatrixPlacement" => {
                check_keys(
                    map,
                    &[
                        "step_type", "step", "type", "name", "matrix", "failure_policy",
                        "iterations", "parallelism", "seed", "include_failure_trace", "alpha",
                        "alpha_from_step", "alpha_from_field",
                    ],
                    &context,
                )?;
                WorkflowStep::TrafficMatrixPlacement(TrafficMatrixStep {
                    name,
                    matrix: req_str(map, "matrix", &context)?,
                    failure_policy: opt_str(map, "failure_policy")?,
                    iterations: opt_usize(map, "iterations")?.unwrap_or(1),
                    parallelism: opt_usize(map, "parallelism")?,
                    seed: opt_u64(map, "seed")?,
                    include_failure_trace: opt_bool(map, "include_failure_trace")?
                        .unwrap_or(false),
                    alpha: opt_f64(map, "alpha")?.unwrap_or(1.0),
                    alpha_from_step: opt_str(map, "alpha_from_step")?,
                    alpha_from_field: opt_str(map, "alpha_from_field")?
                        .unwrap_or_else(|| String::from("data.alpha_star")),
                })
            }
            "MaximumSupportedDemand" => {
                check_keys(
                    map,
                    &[
                        "step_type", "step", "type", "name", "matrix", "alpha_start",
                        "growth_factor", "resolution", "alpha_min", "alpha_max",
                        "max_bracket_iters", "max_bisect_iters", "seeds_per_alpha",
                    ],
                    &context,
                )?;
                WorkflowStep::MaximumSupportedDemand(MsdStep {
                    name,
                    matrix: req_str(map, "matrix", &context)?,
                    alpha_start: opt_f64(map, "alpha_start")?.unwrap_or(1.0),
                    growth_factor: opt_f64(map, "growth_factor")?.unwrap_or(2.0),
                    resolution: opt_f64(map, "resolution")?.unwrap_or(0.01),
                    alpha_min: opt_f64(map, "alpha_min")?.unwrap_or(1e-6),
                    alpha_max: opt_f64(map, "alpha_max")?.unwrap_or(1e6),
                    max_bracket_iters: opt_usize(map, "max_bracket_iters")?.unwrap_or(32),
                    max_bisect_iters: opt_usize(map, "max_bisect_iters")?.unwrap_or(32),
                    seeds_per_alpha: opt_usize(map, "seeds_per_alpha")?.unwrap_or(1),
                })
            }
            other => {
                return Err(SchemaError::UnknownKeyword {
                    key: "step_type".to_string(),
                    allowed: "BuildGraph, NetworkStats, MaxFlow, TrafficMatrixPlacement, \
                              MaximumSupportedDemand, CostPower",
                    found: other.to_string(),
                }
                .into())
            }
        };
        steps.push(step);
    }
    Ok(steps)
}

fn req_str(
    map: &crate::types::Attrs,
    key: &str,
    context: &str,
) -> Result<String, Error> {
    match map.get(key) {
        Some(v) => Ok(as_str(v, key)?),
        None => Err(SchemaError::MissingKey {
            key: key.to_string(),
            context: context.to_string(),
        }
        .into()),
    }
}

fn opt_str(map: &crate::types::Attrs, key: &str) -> Result<Option<String>, Error> {
    match map.get(key) {
        Some(v) => Ok(Some(as_str(v, key)?)),
        None => Ok(None),
    }
}

fn opt_f64(map: &crate::types::Attrs, key: &str) -> Result<Option<f64>, Error> {
    match map.get(key) {
        Some(v) => Ok(Some(as_f64(v, key)?)),
        None => Ok(None),
    }
}

fn opt_usize(map: &crate::types::Attrs, key: &str) -> Result<Option<usize>, Error> {
    match map.get(key) {
        Some(v) => Ok(Some(as_usize(v, key)?)),
        None => Ok(None),
    }
}

fn opt_u64(map: &crate::types::Attrs, key: &str) -> Result<Option<u64>, Error> {
    match map.get(key) {
        Some(v) => Ok(Some(as_f64(v, key)? as u64)),
        None => Ok(None),
    }
}

fn opt_bool(map: &crate::types::Attrs, key: &str) -> Result<Option<bool>, Error> {
    match map.get(key) {
        Some(v) => Ok(Some(as_bool(v, key)?)),
        None => Ok(None),
    }
}

/// Execute the scenario's workflow against the materialized network.
///
/// Each step records `{ metadata, data }`. A step failing with an analysis error is logged and
/// recorded as an error payload; earlier results stay intact and later steps still run (a later
/// step referencing the failed one fails in turn). An abort via the stop flag ends the run.
pub fn run_workflow(
    scenario: &Scenario,
    net: &Network,
    parallelism_override: Option<usize>,
    stopper: Stopper,
) -> Result<ResultsDocument, Error> {
    let mut doc = ResultsDocument::default();
    for step in &scenario.workflow {
        if stopper.is_stop() {
            return Err(Error::Abort);
        }
        info!("running workflow step `{}` ({})", step.name(), step.step_type());
        let started = Instant::now();
        let data = steps::execute(step, scenario, net, &doc, parallelism_override, &stopper);
        let duration_sec = started.elapsed().as_secs_f64();
        let data = match data {
            Ok(data) => data,
            Err(Error::Abort) => return Err(Error::Abort),
            Err(e) => {
                error!("workflow step `{}` failed: {}", step.name(), e);
                serde_json::json!({ "error": e.to_string() })
            }
        };
        doc.steps.push(StepResult {
            metadata: StepMetadata {
                duration_sec,
                step_type: step.step_type().to_string(),
                step_name: step.name().to_string(),
            },
            data,
        });
    }
    Ok(doc)
}
