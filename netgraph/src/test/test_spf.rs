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

//! Tests for the shortest-path DAG kernel.

use crate::example_networks::{parallel_paths, square_mesh};
use crate::flow::spf;
use crate::topology::{Link, Network, NetworkView, Node};
use assert_approx_eq::assert_approx_eq;

#[test]
fn square_mesh_distances() {
    let net = square_mesh();
    let view = NetworkView::new(&net);
    let n1 = net.node_id("N1").unwrap();
    let result = spf(&view, n1);
    for other in &["N2", "N3", "N4"] {
        let id = net.node_id(other).unwrap();
        assert_approx_eq!(result.cost_to(id).unwrap(), 1.0);
    }
    assert_approx_eq!(result.cost_to(n1).unwrap(), 0.0);
}

#[test]
fn equal_cost_predecessors_are_kept() {
    let net = parallel_paths();
    let view = NetworkView::new(&net);
    let a = net.node_id("A").unwrap();
    let result = spf(&view, a);

    let b = net.node_id("B").unwrap();
    let c = net.node_id("C").unwrap();
    let d = net.node_id("D").unwrap();

    assert_approx_eq!(result.cost_to(b).unwrap(), 1.0);
    assert_approx_eq!(result.cost_to(c).unwrap(), 2.0);
    assert_approx_eq!(result.cost_to(d).unwrap(), 2.0);

    // both parallel links of each cheap hop participate in a shortest path
    assert_eq!(result.pred[&b].len(), 2);
    assert_eq!(result.pred[&c].len(), 2);
    // the expensive detour via D does not reach C at cost 2
    assert!(result.pred[&c].iter().all(|(_, tail)| *tail == b));
}

#[test]
fn pred_lists_are_sorted_by_edge_id() {
    let net = parallel_paths();
    let view = NetworkView::new(&net);
    let a = net.node_id("A").unwrap();
    let result = spf(&view, a);
    for edges in result.pred.values() {
        let mut sorted = edges.clone();
        sorted.sort_by_key(|(e, _)| *e);
        assert_eq!(*edges, sorted);
    }
}

#[test]
fn masked_entities_are_skipped() {
    let net = square_mesh();
    let n1 = net.node_id("N1").unwrap();
    let n2 = net.node_id("N2").unwrap();
    let n3 = net.node_id("N3").unwrap();
    let direct = net.link_id("N1|N3|0").unwrap();

    let view = NetworkView::with_masks(&net, vec![n2], vec![direct]);
    let result = spf(&view, n1);
    // N3 is now only reachable via N4
    assert_approx_eq!(result.cost_to(n3).unwrap(), 2.0);
}

#[test]
fn unreachable_nodes_are_absent() {
    let mut net = Network::new();
    net.add_node(Node::new("X")).unwrap();
    net.add_node(Node::new("Y")).unwrap();
    net.add_node(Node::new("Z")).unwrap();
    net.add_link(Link::new("X", "Y", 1.0, 1.0)).unwrap();
    net.finish().unwrap();

    let view = NetworkView::new(&net);
    let x = net.node_id("X").unwrap();
    let result = spf(&view, x);
    assert!(result.cost_to(net.node_id("Z").unwrap()).is_none());
    // links are traversable in both directions
    assert!(result.cost_to(net.node_id("Y").unwrap()).is_some());
}
