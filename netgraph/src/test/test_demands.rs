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

//! Tests for demand expansion and placement.

use crate::demands::{expand_demands, place_demands, Demand, DemandMode, GroupMode};
use crate::example_networks::square_mesh;
use crate::flow::FlowPolicyConfig;
use crate::selectors::Selector;
use crate::topology::{Link, Network, NetworkView, Node};
use assert_approx_eq::assert_approx_eq;

fn line_net(capacity: f64) -> Network {
    let mut net = Network::new();
    net.add_node(Node::new("A")).unwrap();
    net.add_node(Node::new("B")).unwrap();
    net.add_link(Link::new("A", "B", capacity, 1.0)).unwrap();
    net.finish().unwrap();
    net
}

fn demand(source: &str, sink: &str, volume: f64) -> Demand {
    Demand {
        source: Selector::path(source),
        sink: Selector::path(sink),
        volume,
        ..Default::default()
    }
}

#[test]
fn pairwise_divides_volume_evenly() {
    let net = square_mesh();
    let d = Demand {
        mode: DemandMode::Pairwise,
        ..demand("N[12]$", "N[34]$", 4.0)
    };
    let subs = expand_demands(&net, &[d]).unwrap();
    assert_eq!(subs.len(), 4);
    for sub in &subs {
        assert_approx_eq!(sub.volume, 1.0);
        assert_eq!(sub.sources.len(), 1);
        assert_eq!(sub.sinks.len(), 1);
    }
}

#[test]
fn combine_keeps_one_aggregate_sub_demand() {
    let net = square_mesh();
    let d = Demand {
        mode: DemandMode::Combine,
        ..demand("N[12]$", "N[34]$", 4.0)
    };
    let subs = expand_demands(&net, &[d]).unwrap();
    assert_eq!(subs.len(), 1);
    assert_approx_eq!(subs[0].volume, 4.0);
    assert_eq!(subs[0].sources.len(), 2);
    assert_eq!(subs[0].sinks.len(), 2);
}

#[test]
fn group_pairwise_crosses_selector_groups() {
    let net = square_mesh();
    let d = Demand {
        source: Selector::path("(N1)$|(N2)$"),
        sink: Selector::path("(N3)$|(N4)$"),
        volume: 8.0,
        mode: DemandMode::Combine,
        group_mode: GroupMode::GroupPairwise,
        ..Default::default()
    };
    let subs = expand_demands(&net, &[d]).unwrap();
    // 2 source groups x 2 sink groups
    assert_eq!(subs.len(), 4);
    for sub in &subs {
        assert_approx_eq!(sub.volume, 2.0);
    }
}

#[test]
fn empty_selector_match_expands_to_nothing() {
    let net = square_mesh();
    let subs = expand_demands(&net, &[demand("ghost", "N3$", 1.0)]).unwrap();
    assert!(subs.is_empty());
}

#[test]
fn priority_order_and_shared_residuals() {
    let net = line_net(10.0);
    let view = NetworkView::new(&net);
    let mut important = demand("A$", "B$", 6.0);
    important.priority = 0;
    let mut background = demand("A$", "B$", 8.0);
    background.priority = 1;

    // declared out of order; placement is by ascending priority
    let result = place_demands(&view, &[background.clone(), important.clone()]).unwrap();
    assert_eq!(result.records.len(), 2);
    assert_approx_eq!(result.records[0].placed, 6.0);
    assert_approx_eq!(result.records[1].placed, 4.0);
    assert_approx_eq!(result.records[1].unplaced, 4.0);
    assert_approx_eq!(result.total_placed, 10.0);
    assert_approx_eq!(result.total_unplaced, 4.0);
}

#[test]
fn insertion_order_breaks_priority_ties() {
    let net = line_net(5.0);
    let view = NetworkView::new(&net);
    let first = demand("A$", "B$", 4.0);
    let second = demand("A$", "B$", 4.0);
    let result = place_demands(&view, &[first, second]).unwrap();
    assert_approx_eq!(result.records[0].placed, 4.0);
    assert!(result.records[0].demand.starts_with("0|"));
    assert_approx_eq!(result.records[1].placed, 1.0);
}

#[test]
fn committed_flow_accumulates_on_edges() {
    let net = line_net(10.0);
    let view = NetworkView::new(&net);
    let result =
        place_demands(&view, &[demand("A$", "B$", 3.0), demand("A$", "B$", 4.0)]).unwrap();
    let committed: f64 = result.occupied.values().sum();
    assert_approx_eq!(committed, 7.0);
}

#[test]
fn te_demands_route_around_congestion() {
    // A -> B via a direct cheap link (cap 2) and a detour (cap 3, higher cost)
    let mut net = Network::new();
    for n in &["A", "B", "V"] {
        net.add_node(Node::new(*n)).unwrap();
    }
    net.add_link(Link::new("A", "B", 2.0, 1.0)).unwrap();
    net.add_link(Link::new("A", "V", 3.0, 2.0)).unwrap();
    net.add_link(Link::new("V", "B", 3.0, 2.0)).unwrap();
    net.finish().unwrap();
    let view = NetworkView::new(&net);

    let igp = Demand { policy: FlowPolicyConfig::ShortestPathsEcmp, ..demand("A$", "B$", 5.0) };
    let result = place_demands(&view, &[igp]).unwrap();
    // shortest-path routing cannot use the detour
    assert_approx_eq!(result.total_placed, 2.0);

    let te = Demand { policy: FlowPolicyConfig::TeWcmpUnlim, ..demand("A$", "B$", 5.0) };
    let result = place_demands(&view, &[te]).unwrap();
    assert_approx_eq!(result.total_placed, 5.0);
}
