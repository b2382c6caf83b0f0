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

//! # Max-Flow Engine
//!
//! Iterative augmenting-path flow over an internal residual network. Source and sink *sets* are
//! aggregated behind a super-source and super-sink with infinite-capacity augmentation arcs;
//! the pseudo-nodes are local to the engine and never touch the underlying graph.
//!
//! Depending on the policy, augmentation is either restricted to the shortest-path DAG of the
//! (unloaded) cost metric, or free to use any feasible augmenting path of the residual network.
//! The unrestricted mode is exact, so the returned min-cut capacity equals the total flow; the
//! shortest-path proportional mode is exact on the DAG subnetwork and its min-cut lists the
//! saturated DAG edges. Equal-balanced placement stops at the fan-out bound, where no saturated
//! cut exists, and therefore reports an empty min-cut.

use crate::flow::placement::{FlowPlacement, FlowPolicy};
use crate::flow::spf::Spf;
use crate::flow::EPS;
use crate::topology::NetworkView;
use crate::types::{Cost, EdgeId, NodeId};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Flow already committed on directed edges by earlier placements. Capacities seen by the
/// engine are reduced by these amounts.
pub type EdgeLoad = BTreeMap<EdgeId, f64>;

/// Parameters of one max-flow computation.
#[derive(Debug, Clone)]
pub struct FlowRequest<'a> {
    /// Source node set (aggregated behind a super-source when more than one)
    pub sources: &'a [NodeId],
    /// Sink node set
    pub sinks: &'a [NodeId],
    /// Routing mode
    pub policy: FlowPolicy,
    /// Optional cap on the total placed flow (a demand's volume)
    pub limit: Option<f64>,
    /// Cached SPF result for the (single) source, reusable for the cost-only policy family.
    /// Ignored unless `policy.shortest_path` is set and the source set has exactly one member,
    /// which must be the root of the cached DAG.
    pub spf: Option<&'a Spf>,
}

/// Outcome of a max-flow computation.
#[derive(Debug, Clone)]
pub struct MaxFlowResult {
    /// Total flow placed from the source set to the sink set
    pub total_flow: f64,
    /// Flow per directed edge; zero-flow edges are omitted
    pub edge_flows: BTreeMap<EdgeId, f64>,
    /// Remaining capacity per active directed edge after this flow
    pub residuals: BTreeMap<EdgeId, f64>,
    /// Names of nodes residual-reachable from the source side
    pub reachable_from_source: BTreeSet<String>,
    /// Directed edges crossing the cut (reachable, complement); see the module docs for when
    /// this is exact
    pub min_cut: Vec<EdgeId>,
    /// Flow per distinct path cost, for latency/span analysis
    pub cost_distribution: BTreeMap<Cost, f64>,
}

impl MaxFlowResult {
    fn zero(view: &NetworkView, sources: &[NodeId]) -> Self {
        let net = view.network();
        let reachable = sources
            .iter()
            .filter(|s| view.is_node_active(**s))
            .map(|s| net.node(*s).name.clone())
            .collect();
        MaxFlowResult {
            total_flow: 0.0,
            edge_flows: BTreeMap::new(),
            residuals: BTreeMap::new(),
            reachable_from_source: reachable,
            min_cut: Vec::new(),
            cost_distribution: BTreeMap::new(),
        }
    }
}

const SRC: usize = 0;
const SNK: usize = 1;

/// One directed arc of the residual network. Arcs are stored in pairs: the arc at an even index
/// is real, the one at the following odd index is its zero-capacity residual partner.
struct Arc {
    from: usize,
    to: usize,
    cap: f64,
    flow: f64,
    cost: f64,
    edge: Option<EdgeId>,
}

impl Arc {
    fn residual(&self) -> f64 {
        self.cap - self.flow
    }
}

struct FlowNet {
    node_ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    arcs: Vec<Arc>,
    adj: Vec<Vec<usize>>,
}

impl FlowNet {
    fn push_arc(&mut self, from: usize, to: usize, cap: f64, cost: f64, edge: Option<EdgeId>) {
        let i = self.arcs.len();
        self.arcs.push(Arc { from, to, cap, flow: 0.0, cost, edge });
        self.arcs.push(Arc { from: to, to: from, cap: 0.0, flow: 0.0, cost, edge: None });
        self.adj[from].push(i);
        self.adj[to].push(i + 1);
    }

    /// Traversal cost of arc `i`: partners subtract what the real arc added
    fn arc_cost(&self, i: usize) -> f64 {
        if i % 2 == 0 {
            self.arcs[i].cost
        } else {
            -self.arcs[i].cost
        }
    }
}

fn build_net(
    view: &NetworkView,
    sources: &BTreeSet<NodeId>,
    sinks: &BTreeSet<NodeId>,
    occupied: Option<&EdgeLoad>,
    cap_bump: Option<(EdgeId, f64)>,
) -> FlowNet {
    let net = view.network();
    let node_ids: Vec<NodeId> = view.active_nodes().collect();
    let index: HashMap<NodeId, usize> =
        node_ids.iter().enumerate().map(|(i, id)| (*id, i + 2)).collect();
    let mut fnet = FlowNet {
        adj: vec![Vec::new(); node_ids.len() + 2],
        node_ids,
        index,
        arcs: Vec::new(),
    };
    let links: Vec<_> = view.active_links().collect();
    for link_id in links {
        let link = net.link(link_id);
        for &reversed in &[false, true] {
            let edge = EdgeId { link: link_id, reversed };
            let (from, to) = net.edge_endpoints(edge);
            let mut cap = link.capacity;
            if let Some((bumped, delta)) = cap_bump {
                if bumped == edge {
                    cap = (cap + delta).max(0.0);
                }
            }
            if let Some(load) = occupied {
                cap -= load.get(&edge).copied().unwrap_or(0.0);
            }
            let (fi, ti) = (fnet.index[&from], fnet.index[&to]);
            fnet.push_arc(fi, ti, cap.max(0.0), link.cost, Some(edge));
        }
    }
    for s in sources {
        if let Some(&i) = fnet.index.get(s) {
            fnet.push_arc(SRC, i, f64::INFINITY, 0.0, None);
        }
    }
    for t in sinks {
        if let Some(&i) = fnet.index.get(t) {
            fnet.push_arc(i, SNK, f64::INFINITY, 0.0, None);
        }
    }
    fnet
}

/// Distances reconstructed from a cached per-source SPF result instead of re-running Dijkstra.
fn dist_from_spf(fnet: &FlowNet, spf: &Spf, sinks: &BTreeSet<NodeId>) -> Vec<f64> {
    let mut dist = vec![f64::INFINITY; fnet.adj.len()];
    dist[SRC] = 0.0;
    for (node, d) in &spf.dist {
        if let Some(&i) = fnet.index.get(node) {
            dist[i] = *d;
        }
    }
    for t in sinks {
        if let Some(d) = spf.dist.get(t) {
            if *d < dist[SNK] {
                dist[SNK] = *d;
            }
        }
    }
    dist
}

/// Dijkstra over the real arcs, from the super-source. Deterministic: the heap breaks distance
/// ties by node index.
fn dijkstra(fnet: &FlowNet) -> Vec<f64> {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    let n = fnet.adj.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut done = vec![false; n];
    let mut heap: BinaryHeap<Reverse<(OrdF64, usize)>> = BinaryHeap::new();
    dist[SRC] = 0.0;
    heap.push(Reverse((OrdF64(0.0), SRC)));
    while let Some(Reverse((OrdF64(d), u))) = heap.pop() {
        if done[u] {
            continue;
        }
        done[u] = true;
        for &i in &fnet.adj[u] {
            if i % 2 != 0 {
                continue;
            }
            let arc = &fnet.arcs[i];
            let nd = d + arc.cost;
            if nd < dist[arc.to] - EPS {
                dist[arc.to] = nd;
                heap.push(Reverse((OrdF64(nd), arc.to)));
            }
        }
    }
    dist
}

#[derive(PartialEq)]
struct OrdF64(f64);

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Real arcs on some shortest path from the super-source that can still reach the super-sink
/// within the DAG.
fn shortest_path_dag(fnet: &FlowNet, dist: &[f64]) -> Vec<bool> {
    let m = fnet.arcs.len();
    let mut in_dag = vec![false; m];
    for i in (0..m).step_by(2) {
        let arc = &fnet.arcs[i];
        if dist[arc.from].is_finite()
            && dist[arc.to].is_finite()
            && (dist[arc.from] + arc.cost - dist[arc.to]).abs() <= EPS
        {
            in_dag[i] = true;
        }
    }
    // prune arcs whose head cannot reach the sink inside the DAG
    let mut reaches = vec![false; fnet.adj.len()];
    reaches[SNK] = true;
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); fnet.adj.len()];
    for i in (0..m).step_by(2) {
        if in_dag[i] {
            incoming[fnet.arcs[i].to].push(i);
        }
    }
    let mut queue = VecDeque::new();
    queue.push_back(SNK);
    while let Some(u) = queue.pop_front() {
        for &i in &incoming[u] {
            let tail = fnet.arcs[i].from;
            if !reaches[tail] {
                reaches[tail] = true;
                queue.push_back(tail);
            }
        }
    }
    for i in (0..m).step_by(2) {
        if in_dag[i] && !reaches[fnet.arcs[i].to] {
            in_dag[i] = false;
        }
    }
    in_dag
}

fn arc_allowed(restrict: Option<&[bool]>, i: usize) -> bool {
    match restrict {
        None => true,
        Some(dag) => dag[i & !1],
    }
}

/// Fewest-hops augmenting path over arcs with positive residual, ties broken by arc index.
fn bfs_path(fnet: &FlowNet, restrict: Option<&[bool]>) -> Option<Vec<usize>> {
    let mut prev: Vec<Option<usize>> = vec![None; fnet.adj.len()];
    let mut seen = vec![false; fnet.adj.len()];
    let mut queue = VecDeque::new();
    seen[SRC] = true;
    queue.push_back(SRC);
    while let Some(u) = queue.pop_front() {
        if u == SNK {
            break;
        }
        for &i in &fnet.adj[u] {
            let arc = &fnet.arcs[i];
            if seen[arc.to] || arc.residual() <= EPS || !arc_allowed(restrict, i) {
                continue;
            }
            seen[arc.to] = true;
            prev[arc.to] = Some(i);
            queue.push_back(arc.to);
        }
    }
    if !seen[SNK] {
        return None;
    }
    let mut path = Vec::new();
    let mut u = SNK;
    while u != SRC {
        let i = prev[u].unwrap_or_else(|| unreachable!());
        path.push(i);
        u = fnet.arcs[i].from;
    }
    path.reverse();
    Some(path)
}

fn cost_key(c: f64) -> Cost {
    Cost((c * 1e9).round() / 1e9)
}

/// Repeated augmentation until no path is feasible, the volume limit is reached, or the bundle
/// bound is exhausted.
fn augment_loop(
    fnet: &mut FlowNet,
    restrict: Option<&[bool]>,
    limit: Option<f64>,
    max_rounds: Option<usize>,
) -> (f64, BTreeMap<Cost, f64>) {
    let mut total = 0.0;
    let mut rounds = 0;
    let mut cost_distribution = BTreeMap::new();
    loop {
        if let Some(max) = max_rounds {
            if rounds >= max {
                break;
            }
        }
        let remaining = limit.map(|l| l - total).unwrap_or(f64::INFINITY);
        if remaining <= EPS {
            break;
        }
        let path = match bfs_path(fnet, restrict) {
            Some(p) => p,
            None => break,
        };
        let mut bottleneck = remaining;
        let mut path_cost = 0.0;
        for &i in &path {
            bottleneck = bottleneck.min(fnet.arcs[i].residual());
            path_cost += fnet.arc_cost(i);
        }
        if bottleneck <= EPS {
            break;
        }
        for &i in &path {
            fnet.arcs[i].flow += bottleneck;
            fnet.arcs[i ^ 1].flow -= bottleneck;
        }
        *cost_distribution.entry(cost_key(path_cost)).or_insert(0.0) += bottleneck;
        total += bottleneck;
        rounds += 1;
    }
    (total, cost_distribution)
}

/// Equal-balanced placement on the pruned shortest-path DAG: every node splits its share
/// equally over its DAG out-arcs; the largest admissible total is the minimum over arcs of
/// capacity divided by carried fraction.
fn equal_balanced(
    fnet: &mut FlowNet,
    dist: &[f64],
    in_dag: &[bool],
    limit: Option<f64>,
) -> (f64, BTreeMap<Cost, f64>) {
    let n = fnet.adj.len();
    let mut order: Vec<usize> = (0..n).filter(|u| dist[*u].is_finite()).collect();
    order.sort_by(|a, b| dist[*a].total_cmp(&dist[*b]).then(a.cmp(b)));

    let mut frac = vec![0.0f64; n];
    let mut arc_frac: HashMap<usize, f64> = HashMap::new();
    frac[SRC] = 1.0;
    for &u in &order {
        if u == SNK || frac[u] <= 0.0 {
            continue;
        }
        let dag_out: Vec<usize> =
            fnet.adj[u].iter().copied().filter(|i| i % 2 == 0 && in_dag[*i]).collect();
        if dag_out.is_empty() {
            continue;
        }
        let share = frac[u] / dag_out.len() as f64;
        for i in dag_out {
            *arc_frac.entry(i).or_insert(0.0) += share;
            frac[fnet.arcs[i].to] += share;
        }
    }

    if frac[SNK] <= EPS {
        return (0.0, BTreeMap::new());
    }
    let mut t = limit.unwrap_or(f64::INFINITY);
    for (&i, &f) in &arc_frac {
        if f > 0.0 {
            t = t.min(fnet.arcs[i].cap / f);
        }
    }
    if !t.is_finite() || t <= EPS {
        return (0.0, BTreeMap::new());
    }
    for (&i, &f) in &arc_frac {
        fnet.arcs[i].flow = t * f;
        fnet.arcs[i ^ 1].flow = -t * f;
    }
    let mut cost_distribution = BTreeMap::new();
    cost_distribution.insert(cost_key(dist[SNK]), t);
    (t, cost_distribution)
}

/// Residual-reachability from the super-source, and the real arcs crossing the cut.
fn reachable_and_cut(
    fnet: &FlowNet,
    view: &NetworkView,
    restrict: Option<&[bool]>,
) -> (BTreeSet<String>, Vec<EdgeId>) {
    let mut seen = vec![false; fnet.adj.len()];
    let mut queue = VecDeque::new();
    seen[SRC] = true;
    queue.push_back(SRC);
    while let Some(u) = queue.pop_front() {
        for &i in &fnet.adj[u] {
            let arc = &fnet.arcs[i];
            if seen[arc.to] || arc.residual() <= EPS || !arc_allowed(restrict, i) {
                continue;
            }
            seen[arc.to] = true;
            queue.push_back(arc.to);
        }
    }
    let net = view.network();
    let mut reachable = BTreeSet::new();
    for (idx, id) in fnet.node_ids.iter().enumerate() {
        if seen[idx + 2] {
            reachable.insert(net.node(*id).name.clone());
        }
    }
    let mut cut = Vec::new();
    for i in (0..fnet.arcs.len()).step_by(2) {
        let arc = &fnet.arcs[i];
        if arc.edge.is_some() && arc_allowed(restrict, i) && seen[arc.from] && !seen[arc.to] {
            cut.push(arc.edge.unwrap_or_else(|| unreachable!()));
        }
    }
    cut.sort_unstable();
    (reachable, cut)
}

fn collect_result(
    fnet: &FlowNet,
    view: &NetworkView,
    total: f64,
    cost_distribution: BTreeMap<Cost, f64>,
    restrict: Option<&[bool]>,
    min_cut_valid: bool,
) -> MaxFlowResult {
    let mut edge_flows = BTreeMap::new();
    let mut residuals = BTreeMap::new();
    for i in (0..fnet.arcs.len()).step_by(2) {
        let arc = &fnet.arcs[i];
        let edge = match arc.edge {
            Some(e) => e,
            None => continue,
        };
        let flow = arc.flow.max(0.0);
        if flow > EPS {
            edge_flows.insert(edge, flow);
        }
        residuals.insert(edge, (arc.cap - flow).max(0.0));
    }
    let (reachable_from_source, cut) = reachable_and_cut(fnet, view, restrict);
    MaxFlowResult {
        total_flow: total,
        edge_flows,
        residuals,
        reachable_from_source,
        min_cut: if min_cut_valid { cut } else { Vec::new() },
        cost_distribution,
    }
}

/// Compute a (policy-restricted) max-flow between the source set and the sink set of the view.
///
/// `occupied` carries flow already committed by earlier placements; the engine sees the reduced
/// capacities and never pushes residuals below zero.
pub fn max_flow(
    view: &NetworkView,
    req: &FlowRequest<'_>,
    occupied: Option<&EdgeLoad>,
) -> MaxFlowResult {
    max_flow_inner(view, req, occupied, None)
}

fn max_flow_inner(
    view: &NetworkView,
    req: &FlowRequest<'_>,
    occupied: Option<&EdgeLoad>,
    cap_bump: Option<(EdgeId, f64)>,
) -> MaxFlowResult {
    let sources: BTreeSet<NodeId> = req.sources.iter().copied().collect();
    let sinks: BTreeSet<NodeId> = req.sinks.iter().copied().collect();
    if sources.is_empty() || sinks.is_empty() || !sources.is_disjoint(&sinks) {
        return MaxFlowResult::zero(view, req.sources);
    }

    let mut fnet = build_net(view, &sources, &sinks, occupied, cap_bump);

    if req.policy.shortest_path {
        let dist = match req.spf {
            Some(spf) if req.sources.len() == 1 && req.sources[0] == spf.source => {
                dist_from_spf(&fnet, spf, &sinks)
            }
            _ => dijkstra(&fnet),
        };
        let in_dag = shortest_path_dag(&fnet, &dist);
        match req.policy.placement {
            FlowPlacement::EqualBalanced => {
                let (total, cost_distribution) =
                    equal_balanced(&mut fnet, &dist, &in_dag, req.limit);
                collect_result(&fnet, view, total, cost_distribution, Some(in_dag.as_slice()), false)
            }
            FlowPlacement::Proportional => {
                let (total, cost_distribution) = augment_loop(
                    &mut fnet,
                    Some(in_dag.as_slice()),
                    req.limit,
                    req.policy.max_flow_count,
                );
                collect_result(&fnet, view, total, cost_distribution, Some(in_dag.as_slice()), true)
            }
        }
    } else {
        let (total, cost_distribution) =
            augment_loop(&mut fnet, None, req.limit, req.policy.max_flow_count);
        collect_result(&fnet, view, total, cost_distribution, None, true)
    }
}

/// For every saturated directed edge of the base solution, the change in total flow when that
/// edge's capacity is bumped by `delta` (a negative delta clamps the capacity at zero).
pub fn sensitivity(
    view: &NetworkView,
    req: &FlowRequest<'_>,
    occupied: Option<&EdgeLoad>,
    delta: f64,
) -> BTreeMap<EdgeId, f64> {
    let base = max_flow(view, req, occupied);
    let mut out = BTreeMap::new();
    for (&edge, &residual) in &base.residuals {
        let carried = base.edge_flows.get(&edge).copied().unwrap_or(0.0);
        if residual > EPS || carried <= EPS {
            continue;
        }
        let bumped = max_flow_inner(view, req, occupied, Some((edge, delta)));
        out.insert(edge, bumped.total_flow - base.total_flow);
    }
    out
}
