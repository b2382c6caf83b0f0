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

//! # Blueprint Expander
//!
//! The small compiler turning a validated [`Scenario`] into a materialized
//! [`Network`]. Processing order is strict:
//!
//! 1. bracket patterns and variable bindings in declaration keys,
//! 2. group materialization (recursive; blueprints instantiate at their path with parameter
//!    overrides applied before recursion),
//! 3. node post-build rules,
//! 4. direct links, then blueprint-level adjacency, then top-level adjacency,
//! 5. link post-build rules,
//! 6. risk-group resolution and validation.
//!
//! Failures during expansion are fatal (undefined blueprint, unknown direct-link endpoint,
//! `one_to_one` size mismatch, expansion cap); unmatched selectors only warn and produce no
//! edges.

mod adjacency;
mod blueprint;
mod overrides;
pub mod pattern;
mod riskres;
pub mod vars;

use crate::error::Error;
use crate::scenario::Scenario;
use crate::topology::{Network, Node};
use log::*;

/// Materialize the scenario's network declaration into a graph store.
pub fn expand(scenario: &Scenario) -> Result<Network, Error> {
    let mut net = Network::new();

    // direct nodes
    for (name, decl) in &scenario.network.nodes {
        let mut node = Node::new(name.clone());
        node.attrs = decl.attrs.clone();
        node.disabled = decl.disabled;
        node.risk_groups = riskres::expand_membership(&decl.risk_groups)?;
        net.add_node(node)?;
    }

    // groups and blueprints
    let mut deferred_adjacency = Vec::new();
    blueprint::materialize_groups(
        &mut net,
        &scenario.network.groups,
        "",
        &scenario.blueprints,
        &blueprint::Inherited::default(),
        &mut deferred_adjacency,
        0,
    )?;

    // node post-build rules
    overrides::apply_node_overrides(&mut net, &scenario.network.node_overrides)?;

    // direct links
    for link in &scenario.network.links {
        adjacency::create_direct_links(&mut net, link)?;
    }

    // blueprint-level adjacency first, then top-level adjacency
    for adj in &deferred_adjacency {
        adjacency::apply_adjacency(&mut net, adj, &scenario.vars)?;
    }
    for adj in &scenario.network.adjacency {
        adjacency::apply_adjacency(&mut net, adj, &scenario.vars)?;
    }

    // link post-build rules
    overrides::apply_link_overrides(&mut net, &scenario.network.link_overrides)?;

    // risk groups: definitions, membership rules, generate blocks, validation
    riskres::resolve_risk_groups(&mut net, &scenario.risk_groups)?;

    net.finish()?;
    debug!(
        "materialized {} nodes, {} links, {} risk groups",
        net.num_nodes(),
        net.num_links(),
        net.risk_groups().count()
    );
    Ok(net)
}
