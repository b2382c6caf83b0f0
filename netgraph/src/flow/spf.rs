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

//! # SPF Kernel
//!
//! Dijkstra over the non-negative cost metric, producing for each reached node the scalar
//! shortest cost and the set of *all* incoming edges that participate in some shortest path —
//! the shortest-path DAG. Equal-cost alternatives are preserved, which is what enables
//! multi-path splitting downstream.
//!
//! The kernel is a pure function of (view, source): disabled and masked entities are skipped,
//! and results are safe to memoize per source as long as the view identity is unchanged.

use crate::flow::EPS;
use crate::topology::NetworkView;
use crate::types::{EdgeId, NodeId};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// The shortest-path DAG rooted at a source node.
#[derive(Debug, Clone)]
pub struct Spf {
    /// The source the DAG is rooted at
    pub source: NodeId,
    /// Shortest cost per reached node
    pub dist: HashMap<NodeId, f64>,
    /// For each reached node, every incoming directed edge `(edge, tail)` with
    /// `dist[tail] + cost == dist[node]`, sorted by edge id
    pub pred: HashMap<NodeId, Vec<(EdgeId, NodeId)>>,
}

impl Spf {
    /// Shortest cost to `node`, if reached
    pub fn cost_to(&self, node: NodeId) -> Option<f64> {
        self.dist.get(&node).copied()
    }
}

/// Heap entry; inverted ordering turns the std max-heap into a min-heap. Ties break on the node
/// index so the pop order is deterministic.
struct HeapEntry {
    dist: f64,
    node: NodeId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.index().cmp(&self.node.index()))
    }
}

/// Single-source shortest paths over the view, keeping all equal-cost predecessor edges.
pub fn spf(view: &NetworkView, source: NodeId) -> Spf {
    let net = view.network();
    let mut dist: HashMap<NodeId, f64> = HashMap::new();
    let mut pred: HashMap<NodeId, Vec<(EdgeId, NodeId)>> = HashMap::new();
    let mut done: HashSet<NodeId> = HashSet::new();
    let mut heap = BinaryHeap::new();

    if !view.is_node_active(source) {
        return Spf { source, dist, pred };
    }

    dist.insert(source, 0.0);
    heap.push(HeapEntry { dist: 0.0, node: source });

    while let Some(HeapEntry { dist: d, node: u }) = heap.pop() {
        if !done.insert(u) {
            continue;
        }
        for (edge, v) in view.out_edges(u) {
            let cost = net.link(edge.link).cost;
            let nd = d + cost;
            match dist.entry(v) {
                Entry::Vacant(e) => {
                    e.insert(nd);
                    pred.insert(v, vec![(edge, u)]);
                    heap.push(HeapEntry { dist: nd, node: v });
                }
                Entry::Occupied(mut e) => {
                    let best = *e.get();
                    if nd < best - EPS {
                        e.insert(nd);
                        pred.insert(v, vec![(edge, u)]);
                        heap.push(HeapEntry { dist: nd, node: v });
                    } else if (nd - best).abs() <= EPS && !done.contains(&v) {
                        pred.entry(v).or_default().push((edge, u));
                    }
                }
            }
        }
    }

    for edges in pred.values_mut() {
        edges.sort_unstable_by_key(|(e, _)| *e);
        edges.dedup();
    }

    Spf { source, dist, pred }
}
