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

//! Tests for the max-flow engine: totals, invariants, min cuts, edge cases and sensitivity.

use crate::example_networks::{parallel_paths, square_mesh};
use crate::flow::{max_flow, sensitivity, FlowPolicy, FlowPolicyConfig, FlowRequest, MaxFlowResult};
use crate::topology::{Link, Network, NetworkView, Node};
use crate::types::{EdgeId, NodeId};
use assert_approx_eq::assert_approx_eq;
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref SQUARE: Network = square_mesh();
    static ref PARALLEL: Network = parallel_paths();
}

fn solve(net: &Network, src: &str, dst: &str, policy: FlowPolicy) -> MaxFlowResult {
    let view = NetworkView::new(net);
    let sources = vec![net.node_id(src).unwrap()];
    let sinks = vec![net.node_id(dst).unwrap()];
    let req = FlowRequest { sources: &sources, sinks: &sinks, policy, limit: None, spf: None };
    max_flow(&view, &req, None)
}

/// Net in/out flow per node, from the per-edge flows
fn node_balance(net: &Network, result: &MaxFlowResult) -> HashMap<NodeId, f64> {
    let mut balance: HashMap<NodeId, f64> = HashMap::new();
    for (edge, flow) in &result.edge_flows {
        let (from, to) = net.edge_endpoints(*edge);
        *balance.entry(from).or_insert(0.0) -= flow;
        *balance.entry(to).or_insert(0.0) += flow;
    }
    balance
}

#[test]
fn square_mesh_unrestricted_flow_is_5() {
    let net = &*SQUARE;
    let result = solve(net, "N1", "N3", FlowPolicy::default());
    assert_approx_eq!(result.total_flow, 5.0);

    // flow conservation at transit nodes
    let balance = node_balance(net, &result);
    for name in &["N2", "N4"] {
        let id = net.node_id(name).unwrap();
        assert_approx_eq!(balance.get(&id).copied().unwrap_or(0.0), 0.0, 1e-9);
    }

    // capacities respected
    for (edge, flow) in &result.edge_flows {
        assert!(*flow <= net.link(edge.link).capacity + 1e-9);
    }
}

#[test]
fn square_mesh_min_cut_matches_flow() {
    let net = &*SQUARE;
    let result = solve(net, "N1", "N3", FlowPolicy::default());
    let cut_capacity: f64 =
        result.min_cut.iter().map(|e| net.link(e.link).capacity).sum();
    assert_approx_eq!(cut_capacity, result.total_flow);
    assert!(result.reachable_from_source.contains("N1"));
    assert!(!result.reachable_from_source.contains("N3"));
}

#[test]
fn parallel_paths_policy_family() {
    let net = &*PARALLEL;

    let unrestricted = solve(net, "A", "C", FlowPolicy::default());
    assert_approx_eq!(unrestricted.total_flow, 6.0);

    let wcmp = solve(net, "A", "C", FlowPolicyConfig::ShortestPathsWcmp.policy());
    assert_approx_eq!(wcmp.total_flow, 3.0);

    let ecmp = solve(net, "A", "C", FlowPolicyConfig::ShortestPathsEcmp.policy());
    assert_approx_eq!(ecmp.total_flow, 2.0);

    // the ECMP bound: equal split never beats proportional split
    assert!(ecmp.total_flow <= wcmp.total_flow + 1e-9);
}

#[test]
fn ecmp_equals_wcmp_on_symmetric_capacities() {
    let mut net = Network::new();
    for n in &["S", "M1", "M2", "T"] {
        net.add_node(Node::new(*n)).unwrap();
    }
    for &(s, t) in &[("S", "M1"), ("S", "M2"), ("M1", "T"), ("M2", "T")] {
        net.add_link(Link::new(s, t, 5.0, 1.0)).unwrap();
    }
    net.finish().unwrap();

    let wcmp = solve(&net, "S", "T", FlowPolicyConfig::ShortestPathsWcmp.policy());
    let ecmp = solve(&net, "S", "T", FlowPolicyConfig::ShortestPathsEcmp.policy());
    assert_approx_eq!(wcmp.total_flow, 10.0);
    assert_approx_eq!(ecmp.total_flow, 10.0);
}

#[test]
fn unrestricted_cost_distribution_by_path_cost() {
    let net = &*PARALLEL;
    let result = solve(net, "A", "C", FlowPolicy::default());
    let dist: Vec<(f64, f64)> =
        result.cost_distribution.iter().map(|(c, f)| (c.0, *f)).collect();
    assert_eq!(dist.len(), 2);
    assert_approx_eq!(dist[0].0, 2.0);
    assert_approx_eq!(dist[0].1, 3.0);
    assert_approx_eq!(dist[1].0, 4.0);
    assert_approx_eq!(dist[1].1, 3.0);
}

#[test]
fn volume_limit_caps_the_flow() {
    let net = &*PARALLEL;
    let view = NetworkView::new(net);
    let sources = vec![net.node_id("A").unwrap()];
    let sinks = vec![net.node_id("C").unwrap()];
    let req = FlowRequest {
        sources: &sources,
        sinks: &sinks,
        policy: FlowPolicy::default(),
        limit: Some(2.5),
        spf: None,
    };
    let result = max_flow(&view, &req, None);
    assert_approx_eq!(result.total_flow, 2.5);
}

#[test]
fn overlapping_endpoints_yield_zero() {
    let net = &*SQUARE;
    let view = NetworkView::new(net);
    let n1 = net.node_id("N1").unwrap();
    let sources = vec![n1];
    let sinks = vec![n1, net.node_id("N3").unwrap()];
    let req = FlowRequest {
        sources: &sources,
        sinks: &sinks,
        policy: FlowPolicy::default(),
        limit: None,
        spf: None,
    };
    let result = max_flow(&view, &req, None);
    assert_approx_eq!(result.total_flow, 0.0);
    assert!(result.min_cut.is_empty());
}

#[test]
fn disconnected_endpoints_yield_zero() {
    let mut net = Network::new();
    net.add_node(Node::new("X")).unwrap();
    net.add_node(Node::new("Y")).unwrap();
    net.add_node(Node::new("Z")).unwrap();
    net.add_link(Link::new("X", "Y", 1.0, 1.0)).unwrap();
    net.finish().unwrap();

    let result = solve(&net, "X", "Z", FlowPolicy::default());
    assert_approx_eq!(result.total_flow, 0.0);
    assert!(result.min_cut.is_empty());
    assert!(result.reachable_from_source.contains("X"));
    assert!(result.reachable_from_source.contains("Y"));
}

#[test]
fn zero_capacity_links_carry_no_flow() {
    let mut net = Network::new();
    net.add_node(Node::new("X")).unwrap();
    net.add_node(Node::new("Y")).unwrap();
    net.add_link(Link::new("X", "Y", 0.0, 1.0)).unwrap();
    net.finish().unwrap();

    let result = solve(&net, "X", "Y", FlowPolicy::default());
    assert_approx_eq!(result.total_flow, 0.0);
    assert!(result.edge_flows.is_empty());
}

#[test]
fn occupied_capacity_reduces_the_flow() {
    let net = &*PARALLEL;
    let view = NetworkView::new(net);
    let sources = vec![net.node_id("A").unwrap()];
    let sinks = vec![net.node_id("C").unwrap()];

    // saturate the expensive detour up front
    let mut occupied = std::collections::BTreeMap::new();
    occupied.insert(EdgeId::forward(net.link_id("A|D|0").unwrap()), 3.0);
    occupied.insert(EdgeId::forward(net.link_id("D|C|0").unwrap()), 3.0);

    let req = FlowRequest {
        sources: &sources,
        sinks: &sinks,
        policy: FlowPolicy::default(),
        limit: None,
        spf: None,
    };
    let result = max_flow(&view, &req, Some(&occupied));
    assert_approx_eq!(result.total_flow, 3.0);
}

#[test]
fn residuals_never_increase_past_capacity() {
    let net = &*SQUARE;
    let result = solve(net, "N1", "N3", FlowPolicy::default());
    for (edge, residual) in &result.residuals {
        let cap = net.link(edge.link).capacity;
        assert!(*residual >= -1e-9 && *residual <= cap + 1e-9);
    }
}

#[test]
fn sensitivity_reports_the_gain_of_a_capacity_bump() {
    let mut net = Network::new();
    net.add_node(Node::new("X")).unwrap();
    net.add_node(Node::new("Y")).unwrap();
    net.add_link(Link::new("X", "Y", 1.0, 1.0)).unwrap();
    net.finish().unwrap();

    let view = NetworkView::new(&net);
    let sources = vec![net.node_id("X").unwrap()];
    let sinks = vec![net.node_id("Y").unwrap()];
    let req = FlowRequest {
        sources: &sources,
        sinks: &sinks,
        policy: FlowPolicy::default(),
        limit: None,
        spf: None,
    };
    let deltas = sensitivity(&view, &req, None, 1.0);
    let forward = EdgeId::forward(net.link_id("X|Y|0").unwrap());
    assert_approx_eq!(deltas[&forward], 1.0);

    // a negative bump clamps at zero capacity
    let deltas = sensitivity(&view, &req, None, -5.0);
    assert_approx_eq!(deltas[&forward], -1.0);
}

#[test]
fn te_lsp_bound_limits_augmentations() {
    let net = &*PARALLEL;
    // a single augmentation bundle cannot reach the full max-flow here
    let one_lsp = FlowPolicy {
        shortest_path: false,
        placement: crate::flow::FlowPlacement::Proportional,
        max_flow_count: Some(1),
    };
    let result = solve(net, "A", "C", one_lsp);
    assert!(result.total_flow < 6.0);
    assert!(result.total_flow > 0.0);

    let sixteen = solve(net, "A", "C", FlowPolicyConfig::TeEcmp16Lsp.policy());
    assert_approx_eq!(sixteen.total_flow, 6.0);
}
