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

//! # NetGraph
//! Wrapper functions to validate and execute whole scenarios.

use crate::error::Error;
use crate::expand::expand;
use crate::scenario::Scenario;
use crate::workflow::{run_workflow, ResultsDocument};
use crate::types::AttrValue;
use crate::Stopper;
use log::*;
use serde::Serialize;

/// Options for [`run_scenario`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Override the worker-thread count of every Monte Carlo step
    pub parallelism: Option<usize>,
    /// External stop flag; a fresh one is created when absent
    pub stopper: Option<Stopper>,
}

/// Validation summary produced by [`inspect_scenario`].
#[derive(Debug, Clone, Serialize)]
pub struct InspectSummary {
    /// Network name, if declared
    pub name: Option<String>,
    /// Number of materialized nodes
    pub node_count: usize,
    /// Number of materialized links
    pub link_count: usize,
    /// Number of declared risk groups
    pub risk_group_count: usize,
    /// Declared traffic matrices
    pub matrices: Vec<String>,
    /// Declared failure policies
    pub failure_policies: Vec<String>,
    /// Workflow steps as `name (type)`
    pub workflow: Vec<String>,
}

/// Validate a parsed scenario tree and materialize its topology, without running any analysis.
///
/// This is the core of the CLI `inspect` verb: it exercises the full semantic validation and
/// the expander, so every materialization-time error surfaces here.
pub fn inspect_scenario(doc: &AttrValue) -> Result<InspectSummary, Error> {
    let scenario = Scenario::from_value(doc)?;
    let net = expand(&scenario)?;
    Ok(InspectSummary {
        name: scenario.network.name.clone(),
        node_count: net.num_nodes(),
        link_count: net.num_links(),
        risk_group_count: net.risk_groups().count(),
        matrices: scenario.demands.keys().cloned().collect(),
        failure_policies: scenario.failures.keys().cloned().collect(),
        workflow: scenario
            .workflow
            .iter()
            .map(|s| format!("{} ({})", s.name(), s.step_type()))
            .collect(),
    })
}

/// Validate, materialize and execute a scenario: the core of the CLI `run` verb.
///
/// Execution is a pure function of the inputs; given identical documents and seeds the
/// resulting document is identical, including iteration ordering.
pub fn run_scenario(doc: &AttrValue, options: RunOptions) -> Result<ResultsDocument, Error> {
    let scenario = Scenario::from_value(doc)?;
    let net = expand(&scenario)?;
    info!(
        "materialized `{}`: {} nodes, {} links",
        scenario.network.name.as_deref().unwrap_or("unnamed"),
        net.num_nodes(),
        net.num_links()
    );
    let stopper = options.stopper.unwrap_or_default();
    run_workflow(&scenario, &net, options.parallelism, stopper)
}
