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

//! Execution of the individual workflow steps.

use crate::demands::{place_demands, Demand};
use crate::error::{AnalysisError, Error};
use crate::failures::FailurePolicy;
use crate::flow::{max_flow, FlowRequest};
use crate::montecarlo::{
    run_monte_carlo, FlowSummary, IterationData, MonteCarloConfig,
};
use crate::scenario::Scenario;
use crate::selectors::{select_nodes, SelectorCtx};
use crate::topology::{Network, NetworkView};
use crate::types::{Cost, EdgeId, NodeId};
use crate::workflow::{
    msd, MaxFlowStep, MsdStep, ResultsDocument, TrafficMatrixStep, WorkflowStep,
};
use crate::Stopper;
use log::*;
use serde_json::json;
use std::collections::BTreeMap;

pub(crate) fn execute(
    step: &WorkflowStep,
    scenario: &Scenario,
    net: &Network,
    doc: &ResultsDocument,
    parallelism_override: Option<usize>,
    stopper: &Stopper,
) -> Result<serde_json::Value, Error> {
    match step {
        WorkflowStep::BuildGraph { .. } => Ok(build_graph(net)),
        WorkflowStep::NetworkStats { .. } => Ok(network_stats(net)),
        WorkflowStep::CostPower { .. } => {
            warn!("CostPower aggregation runs in external tooling; recording empty data");
            Ok(json!({}))
        }
        WorkflowStep::MaxFlow(s) => {
            max_flow_step(s, scenario, net, parallelism_override, stopper)
        }
        WorkflowStep::TrafficMatrixPlacement(s) => {
            traffic_matrix_step(s, scenario, net, doc, parallelism_override, stopper)
        }
        WorkflowStep::MaximumSupportedDemand(s) => msd_step(s, scenario, net),
    }
}

// ---------------------------------------------------------------------------
// BuildGraph / NetworkStats
// ---------------------------------------------------------------------------

fn build_graph(net: &Network) -> serde_json::Value {
    let mut nodes = serde_json::Map::new();
    for (_, node) in net.nodes() {
        nodes.insert(
            node.name.clone(),
            json!({
                "attrs": node.attrs,
                "disabled": node.disabled,
                "risk_groups": node.risk_groups,
            }),
        );
    }
    let mut links = serde_json::Map::new();
    for (_, link) in net.links() {
        links.insert(
            link.id.clone(),
            json!({
                "source": link.source,
                "target": link.target,
                "capacity": link.capacity,
                "cost": link.cost,
                "disabled": link.disabled,
                "risk_groups": link.risk_groups,
                "attrs": link.attrs,
            }),
        );
    }
    let risk_groups: Vec<serde_json::Value> = net
        .risk_groups()
        .map(|g| {
            json!({
                "name": g.name,
                "parent": g.parent,
                "children": g.children,
                "attrs": g.attrs,
            })
        })
        .collect();
    json!({ "graph": { "nodes": nodes, "links": links, "risk_groups": risk_groups } })
}

fn network_stats(net: &Network) -> serde_json::Value {
    #[derive(Default)]
    struct NodeStats {
        in_degree: usize,
        out_degree: usize,
        in_capacity: f64,
        out_capacity: f64,
    }
    let mut stats: BTreeMap<String, NodeStats> =
        net.nodes().map(|(_, n)| (n.name.clone(), NodeStats::default())).collect();
    let mut total_capacity = 0.0;
    for (_, link) in net.links() {
        total_capacity += link.capacity;
        if let Some(s) = stats.get_mut(&link.source) {
            s.out_degree += 1;
            s.out_capacity += link.capacity;
        }
        if let Some(s) = stats.get_mut(&link.target) {
            s.in_degree += 1;
            s.in_capacity += link.capacity;
        }
    }
    let nodes: serde_json::Map<String, serde_json::Value> = stats
        .into_iter()
        .map(|(name, s)| {
            (
                name,
                json!({
                    "in_degree": s.in_degree,
                    "out_degree": s.out_degree,
                    "in_capacity": s.in_capacity,
                    "out_capacity": s.out_capacity,
                }),
            )
        })
        .collect();
    json!({
        "node_count": net.num_nodes(),
        "link_count": net.num_links(),
        "total_capacity": total_capacity,
        "nodes": nodes,
    })
}

// ---------------------------------------------------------------------------
// Monte Carlo steps
// ---------------------------------------------------------------------------

fn resolve_failure_policy(
    scenario: &Scenario,
    name: &Option<String>,
) -> Result<Option<FailurePolicy>, Error> {
    match name {
        None => Ok(None),
        Some(name) => scenario
            .failures
            .get(name)
            .cloned()
            .map(Some)
            .ok_or_else(|| AnalysisError::UnknownFailurePolicy(name.clone()).into()),
    }
}

fn mc_config(
    scenario: &Scenario,
    iterations: usize,
    parallelism: Option<usize>,
    seed: Option<u64>,
    collect_trace: bool,
    parallelism_override: Option<usize>,
) -> MonteCarloConfig {
    MonteCarloConfig {
        iterations,
        parallelism: parallelism_override
            .or(parallelism)
            .unwrap_or_else(num_cpus::get),
        seed: seed.or(scenario.seed).unwrap_or(0),
        collect_trace,
        iteration_timeout: None,
    }
}

fn flatten_selection(
    net: &Network,
    selector: &crate::selectors::Selector,
    what: &str,
) -> Result<Vec<NodeId>, Error> {
    let groups = select_nodes(net, selector, SelectorCtx::Workflow)?;
    let mut out: Vec<NodeId> = groups.into_iter().flat_map(|(_, v)| v).collect();
    out.sort_by(|a, b| net.node(*a).name.cmp(&net.node(*b).name));
    out.dedup();
    if out.is_empty() {
        warn!("{} selector matched no nodes", what);
    }
    Ok(out)
}

fn cost_pairs(dist: &BTreeMap<Cost, f64>) -> Vec<(f64, f64)> {
    dist.iter().map(|(c, f)| (c.0, *f)).collect()
}

fn edge_names(net: &Network, edges: &[EdgeId]) -> Vec<String> {
    edges
        .iter()
        .map(|e| {
            let id = &net.link(e.link).id;
            if e.reversed {
                format!("{}:rev", id)
            } else {
                id.clone()
            }
        })
        .collect()
}

fn max_flow_step(
    step: &MaxFlowStep,
    scenario: &Scenario,
    net: &Network,
    parallelism_override: Option<usize>,
    stopper: &Stopper,
) -> Result<serde_json::Value, Error> {
    let sources = flatten_selection(net, &step.source, "source")?;
    let sinks = flatten_selection(net, &step.sink, "sink")?;
    let policy = step.policy.map(|p| p.policy()).unwrap_or_default();
    let failure_policy = resolve_failure_policy(scenario, &step.failure_policy)?;
    let cfg = mc_config(
        scenario,
        step.iterations,
        step.parallelism,
        step.seed,
        step.include_failure_trace,
        parallelism_override,
    );
    let include_min_cut = step.include_min_cut;

    let analysis = move |view: &NetworkView<'_>| -> IterationData {
        let req = FlowRequest {
            sources: &sources,
            sinks: &sinks,
            policy,
            limit: None,
            spf: None,
        };
        let result = max_flow(view, &req, None);
        IterationData {
            total_flow: Some(result.total_flow),
            flow_results: None,
            summary: FlowSummary {
                placed: result.total_flow,
                dropped: 0.0,
                cost_distribution: Some(cost_pairs(&result.cost_distribution)),
                min_cut: if include_min_cut {
                    Some(edge_names(view.network(), &result.min_cut))
                } else {
                    None
                },
            },
        }
    };

    let mc = run_monte_carlo(net, failure_policy.as_ref(), analysis, &cfg, stopper.clone())?;
    Ok(serde_json::to_value(&mc).unwrap_or_default())
}

fn resolve_alpha(
    step: &TrafficMatrixStep,
    doc: &ResultsDocument,
) -> Result<f64, Error> {
    let from = match &step.alpha_from_step {
        None => return Ok(step.alpha),
        Some(from) => from,
    };
    let referenced = doc
        .get(from)
        .ok_or_else(|| AnalysisError::UnknownStepReference(step.name.clone(), from.clone()))?;
    let value = referenced
        .lookup(&step.alpha_from_field)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| {
            AnalysisError::UnknownStepField(from.clone(), step.alpha_from_field.clone())
        })?;
    Ok(value)
}

fn traffic_matrix_step(
    step: &TrafficMatrixStep,
    scenario: &Scenario,
    net: &Network,
    doc: &ResultsDocument,
    parallelism_override: Option<usize>,
    stopper: &Stopper,
) -> Result<serde_json::Value, Error> {
    let demands = scenario
        .demands
        .get(&step.matrix)
        .ok_or_else(|| AnalysisError::UnknownMatrix(step.matrix.clone()))?;
    let alpha = resolve_alpha(step, doc)?;
    let scaled: Vec<Demand> = demands
        .iter()
        .map(|d| Demand { volume: d.volume * alpha, ..d.clone() })
        .collect();
    let failure_policy = resolve_failure_policy(scenario, &step.failure_policy)?;
    let cfg = mc_config(
        scenario,
        step.iterations,
        step.parallelism,
        step.seed,
        step.include_failure_trace,
        parallelism_override,
    );

    let analysis = move |view: &NetworkView<'_>| -> IterationData {
        match place_demands(view, &scaled) {
            Ok(placement) => IterationData {
                total_flow: None,
                flow_results: Some(placement.records),
                summary: FlowSummary {
                    placed: placement.total_placed,
                    dropped: placement.total_unplaced,
                    cost_distribution: None,
                    min_cut: None,
                },
            },
            Err(e) => {
                error!("demand placement failed in iteration: {}", e);
                IterationData::default()
            }
        }
    };

    let mc = run_monte_carlo(net, failure_policy.as_ref(), analysis, &cfg, stopper.clone())?;
    let mut value = serde_json::to_value(&mc).unwrap_or_default();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("alpha".to_string(), json!(alpha));
    }
    Ok(value)
}

fn msd_step(
    step: &MsdStep,
    scenario: &Scenario,
    net: &Network,
) -> Result<serde_json::Value, Error> {
    let demands = scenario
        .demands
        .get(&step.matrix)
        .ok_or_else(|| AnalysisError::UnknownMatrix(step.matrix.clone()))?;
    let outcome = msd::maximum_supported_demand(net, demands, step)?;
    Ok(serde_json::to_value(&outcome).unwrap_or_default())
}
