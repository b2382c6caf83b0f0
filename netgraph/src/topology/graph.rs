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

//! The graph store: nodes, links and risk groups, backed by a stable multi-digraph.

use crate::error::ValidationError;
use crate::topology::risk::RiskGroup;
use crate::types::{Attrs, EdgeId, LinkId, NodeId};
use petgraph::prelude::*;
use petgraph::stable_graph::StableGraph;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// A node of the materialized topology. Names are hierarchical dotted-slash paths
/// (`pod1/leaf/leaf-3`) and unique across the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Full hierarchical name
    pub name: String,
    /// Free-form attributes, addressable by dotted path
    pub attrs: Attrs,
    /// Disabled nodes are masked in every view
    pub disabled: bool,
    /// Names of risk groups this node belongs to
    pub risk_groups: BTreeSet<String>,
}

impl Node {
    /// Create a node with the given name and no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
            disabled: false,
            risk_groups: BTreeSet::new(),
        }
    }
}

/// A link of the materialized topology: a physical circuit between two nodes, traversable in
/// both directions with the full `capacity` per direction. Parallel links between the same
/// endpoint pair are distinguished by their stable identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// Stable unique identifier, `<source>|<target>|<seq>`
    pub id: String,
    /// Name of the source node
    pub source: String,
    /// Name of the target node
    pub target: String,
    /// Per-direction capacity, non-negative
    pub capacity: f64,
    /// Routing metric, non-negative
    pub cost: f64,
    /// Disabled links are masked in every view
    pub disabled: bool,
    /// Names of risk groups this link belongs to
    pub risk_groups: BTreeSet<String>,
    /// Free-form attributes, addressable by dotted path
    pub attrs: Attrs,
}

impl Link {
    /// Create a link between the named endpoints. The identifier is assigned by
    /// [`Network::add_link`].
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        capacity: f64,
        cost: f64,
    ) -> Self {
        Self {
            id: String::new(),
            source: source.into(),
            target: target.into(),
            capacity,
            cost,
            disabled: false,
            risk_groups: BTreeSet::new(),
            attrs: Attrs::new(),
        }
    }
}

/// Entities belonging to one risk group, indexed when the network is finished.
#[derive(Debug, Clone, Default)]
pub(crate) struct RiskMembers {
    pub(crate) nodes: BTreeSet<NodeId>,
    pub(crate) links: BTreeSet<LinkId>,
}

/// # Network
///
/// The materialized graph store. Built once by the expander (or programmatically), then treated
/// as read-only: all analyses operate on [`NetworkView`](crate::topology::NetworkView)s that
/// share a single reference.
#[derive(Debug, Clone, Default)]
pub struct Network {
    graph: StableGraph<Node, Link, Directed, u32>,
    names: BTreeMap<String, NodeId>,
    link_names: BTreeMap<String, LinkId>,
    link_order: Vec<LinkId>,
    parallel_count: BTreeMap<(String, String), usize>,
    risk_groups: BTreeMap<String, RiskGroup>,
    risk_members: BTreeMap<String, RiskMembers>,
}

impl Network {
    /// Create an empty network
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Fails on a duplicate name.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, ValidationError> {
        if self.names.contains_key(&node.name) {
            return Err(ValidationError::DuplicateNode(node.name));
        }
        let name = node.name.clone();
        let id = self.graph.add_node(node);
        self.names.insert(name, id);
        Ok(id)
    }

    /// Add a link. Fails when an endpoint is unknown or capacity/cost is negative. The link's
    /// stable identifier is assigned here: `<source>|<target>|<seq>` with `seq` counting
    /// parallel links between the same endpoint pair.
    pub fn add_link(&mut self, mut link: Link) -> Result<LinkId, ValidationError> {
        let src = *self
            .names
            .get(&link.source)
            .ok_or_else(|| ValidationError::UnknownLinkEndpoint(link.source.clone()))?;
        let dst = *self
            .names
            .get(&link.target)
            .ok_or_else(|| ValidationError::UnknownLinkEndpoint(link.target.clone()))?;
        let seq = self
            .parallel_count
            .entry((link.source.clone(), link.target.clone()))
            .or_insert(0);
        link.id = format!("{}|{}|{}", link.source, link.target, seq);
        *seq += 1;
        if link.capacity < 0.0 {
            return Err(ValidationError::NegativeCapacity(link.id, link.capacity));
        }
        if link.cost < 0.0 {
            return Err(ValidationError::NegativeCost(link.id, link.cost));
        }
        let name = link.id.clone();
        let id = self.graph.add_edge(src, dst, link);
        self.link_names.insert(name, id);
        self.link_order.push(id);
        Ok(id)
    }

    /// Declare a risk group. Fails on a duplicate name.
    pub fn add_risk_group(&mut self, group: RiskGroup) -> Result<(), ValidationError> {
        if self.risk_groups.contains_key(&group.name) {
            return Err(ValidationError::DuplicateRiskGroup(group.name));
        }
        self.risk_groups.insert(group.name.clone(), group);
        Ok(())
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of links
    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node ids, ordered by node name
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.names.values().copied()
    }

    /// Nodes, ordered by name
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.names.values().map(move |id| (*id, &self.graph[*id]))
    }

    /// Links, ordered by identifier assignment
    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> + '_ {
        self.link_order.iter().map(move |id| (*id, &self.graph[*id]))
    }

    /// Risk groups, ordered by name
    pub fn risk_groups(&self) -> impl Iterator<Item = &RiskGroup> + '_ {
        self.risk_groups.values()
    }

    /// Look up a risk group by name
    pub fn risk_group(&self, name: &str) -> Option<&RiskGroup> {
        self.risk_groups.get(name)
    }

    /// Look up a node id by name
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Node record for an id. Panics on a stale id, which cannot occur since the store never
    /// removes entities.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.graph[id]
    }

    /// Link record for an id
    pub fn link(&self, id: LinkId) -> &Link {
        &self.graph[id]
    }

    /// Look up a link id by its stable string identifier
    pub fn link_id(&self, name: &str) -> Option<LinkId> {
        self.link_names.get(name).copied()
    }

    /// Source and target node ids of a link (declared orientation)
    pub fn endpoints(&self, id: LinkId) -> (NodeId, NodeId) {
        self.graph.edge_endpoints(id).unwrap_or_else(|| unreachable!())
    }

    /// Endpoints of a directed traversal: `(from, to)`
    pub fn edge_endpoints(&self, edge: EdgeId) -> (NodeId, NodeId) {
        let (s, t) = self.endpoints(edge.link);
        if edge.reversed {
            (t, s)
        } else {
            (s, t)
        }
    }

    /// All directed traversals leaving `node`: forward over links sourced here, reverse over
    /// links targeted here. Sorted by edge id. O(degree).
    pub fn out_edges(&self, node: NodeId) -> Vec<(EdgeId, NodeId)> {
        let mut out: Vec<(EdgeId, NodeId)> = self
            .graph
            .edges_directed(node, Outgoing)
            .map(|e| (EdgeId::forward(e.id()), e.target()))
            .chain(
                self.graph
                    .edges_directed(node, Incoming)
                    .map(|e| (EdgeId::reverse(e.id()), e.source())),
            )
            .collect();
        out.sort_unstable_by_key(|(e, _)| *e);
        out
    }

    /// Neighbors of `node` as `(link id, other endpoint)` pairs, both orientations, sorted by
    /// link id.
    pub fn neighbors(&self, node: NodeId) -> Vec<(LinkId, NodeId)> {
        let mut out: Vec<(LinkId, NodeId)> = self
            .graph
            .edges_directed(node, Outgoing)
            .map(|e| (e.id(), e.target()))
            .chain(self.graph.edges_directed(node, Incoming).map(|e| (e.id(), e.source())))
            .collect();
        out.sort_unstable();
        out
    }

    /// Links whose source matches `src_regex` and target matches `dst_regex` (anchored at the
    /// start of the name). With `bidirectional`, a link also matches with the roles of its
    /// endpoints swapped. Returns links in identifier order.
    pub fn find_links(
        &self,
        src_regex: &Regex,
        dst_regex: &Regex,
        bidirectional: bool,
    ) -> Vec<LinkId> {
        self.links()
            .filter(|(_, l)| {
                let fwd = src_regex.is_match(&l.source) && dst_regex.is_match(&l.target);
                let rev = bidirectional
                    && src_regex.is_match(&l.target)
                    && dst_regex.is_match(&l.source);
                fwd || rev
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Mutable node access for post-build rules. Crate-internal: the store is immutable once
    /// the expander returns it.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.graph[id]
    }

    /// Mutable link access for post-build rules (same restriction as [`Self::node_mut`]).
    pub(crate) fn link_mut(&mut self, id: LinkId) -> &mut Link {
        &mut self.graph[id]
    }

    /// Validate risk-group invariants and build the member index. Called once at the end of
    /// materialization; programmatic builders must call it before running analyses that touch
    /// risk groups.
    pub fn finish(&mut self) -> Result<(), ValidationError> {
        // every reference resolves
        for id in self.names.values() {
            let node = &self.graph[*id];
            for rg in &node.risk_groups {
                if !self.risk_groups.contains_key(rg) {
                    return Err(ValidationError::UndefinedRiskGroup(node.name.clone(), rg.clone()));
                }
            }
        }
        for id in &self.link_order {
            let link = &self.graph[*id];
            for rg in &link.risk_groups {
                if !self.risk_groups.contains_key(rg) {
                    return Err(ValidationError::UndefinedRiskGroup(link.id.clone(), rg.clone()));
                }
            }
        }
        for group in self.risk_groups.values() {
            for child in &group.children {
                if !self.risk_groups.contains_key(child) {
                    return Err(ValidationError::UndefinedRiskGroup(
                        group.name.clone(),
                        child.clone(),
                    ));
                }
            }
        }

        // the parent/child relation is a forest
        self.check_risk_cycles()?;

        // member index
        let mut members: BTreeMap<String, RiskMembers> = self
            .risk_groups
            .keys()
            .map(|name| (name.clone(), RiskMembers::default()))
            .collect();
        for id in self.names.values() {
            for rg in &self.graph[*id].risk_groups {
                members.get_mut(rg).unwrap_or_else(|| unreachable!()).nodes.insert(*id);
            }
        }
        for id in &self.link_order {
            for rg in &self.graph[*id].risk_groups {
                members.get_mut(rg).unwrap_or_else(|| unreachable!()).links.insert(*id);
            }
        }
        self.risk_members = members;
        Ok(())
    }

    fn check_risk_cycles(&self) -> Result<(), ValidationError> {
        // 0 = white, 1 = on stack, 2 = done
        let mut color: BTreeMap<&str, u8> = BTreeMap::new();
        for start in self.risk_groups.keys() {
            if color.get(start.as_str()).copied().unwrap_or(0) != 0 {
                continue;
            }
            let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];
            color.insert(start.as_str(), 1);
            while let Some((name, next)) = stack.pop() {
                let group = &self.risk_groups[name];
                if next < group.children.len() {
                    stack.push((name, next + 1));
                    let child = group.children[next].as_str();
                    match color.get(child).copied().unwrap_or(0) {
                        0 => {
                            color.insert(child, 1);
                            stack.push((child, 0));
                        }
                        1 => return Err(ValidationError::RiskGroupCycle(child.to_string())),
                        _ => {}
                    }
                } else {
                    color.insert(name, 2);
                }
            }
        }
        Ok(())
    }

    /// Node members of a risk group (valid after [`Self::finish`])
    pub fn risk_group_nodes(&self, name: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.risk_members
            .get(name)
            .into_iter()
            .flat_map(|m| m.nodes.iter().copied())
    }

    /// Link members of a risk group (valid after [`Self::finish`])
    pub fn risk_group_links(&self, name: &str) -> impl Iterator<Item = LinkId> + '_ {
        self.risk_members
            .get(name)
            .into_iter()
            .flat_map(|m| m.links.iter().copied())
    }

    /// All descendants of a risk group (children, grandchildren, ...), excluding the group
    /// itself. The hierarchy is acyclic after [`Self::finish`].
    pub fn risk_group_descendants(&self, name: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut queue: Vec<&str> = match self.risk_groups.get(name) {
            Some(g) => g.children.iter().map(|c| c.as_str()).collect(),
            None => return out,
        };
        while let Some(next) = queue.pop() {
            if let Some(g) = self.risk_groups.get(next) {
                queue.extend(g.children.iter().map(|c| c.as_str()));
            }
            out.push(next.to_string());
        }
        out.sort();
        out.dedup();
        out
    }
}
