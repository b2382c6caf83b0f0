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

//! Read-only overlays masking a subset of the graph store.

use crate::topology::Network;
use crate::types::{EdgeId, LinkId, NodeId};
use std::collections::HashSet;

/// # Network View
///
/// A zero-copy overlay on a [`Network`]: a shared reference plus a masked node set and a masked
/// link set. Exclusion is the union of scenario-level `disabled` flags and analysis-time masks
/// (simulated failures). A link is implicitly masked when either endpoint is masked. Views are
/// cheap to clone and never mutate the underlying store, so many of them can coexist across
/// worker threads.
#[derive(Debug, Clone)]
pub struct NetworkView<'a> {
    net: &'a Network,
    masked_nodes: HashSet<NodeId>,
    masked_links: HashSet<LinkId>,
}

impl<'a> NetworkView<'a> {
    /// View masking only the entities disabled in the scenario itself
    pub fn new(net: &'a Network) -> Self {
        Self::with_masks(net, std::iter::empty(), std::iter::empty())
    }

    /// View masking disabled entities plus the given analysis-time exclusions
    pub fn with_masks(
        net: &'a Network,
        failed_nodes: impl IntoIterator<Item = NodeId>,
        failed_links: impl IntoIterator<Item = LinkId>,
    ) -> Self {
        let mut masked_nodes: HashSet<NodeId> = failed_nodes.into_iter().collect();
        let mut masked_links: HashSet<LinkId> = failed_links.into_iter().collect();
        for (id, node) in net.nodes() {
            if node.disabled {
                masked_nodes.insert(id);
            }
        }
        for (id, link) in net.links() {
            if link.disabled {
                masked_links.insert(id);
            }
        }
        Self { net, masked_nodes, masked_links }
    }

    /// The underlying graph store
    pub fn network(&self) -> &'a Network {
        self.net
    }

    /// True when the node is visible in this view
    pub fn is_node_active(&self, id: NodeId) -> bool {
        !self.masked_nodes.contains(&id)
    }

    /// True when the link is visible: neither masked itself nor an endpoint masked
    pub fn is_link_active(&self, id: LinkId) -> bool {
        if self.masked_links.contains(&id) {
            return false;
        }
        let (s, t) = self.net.endpoints(id);
        self.is_node_active(s) && self.is_node_active(t)
    }

    /// Visible nodes, ordered by name
    pub fn active_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.net.node_ids().filter(move |id| self.is_node_active(*id))
    }

    /// Visible links, in identifier order
    pub fn active_links(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.net.links().map(|(id, _)| id).filter(move |id| self.is_link_active(*id))
    }

    /// Visible directed traversals leaving `node`, sorted by edge id
    pub fn out_edges(&self, node: NodeId) -> Vec<(EdgeId, NodeId)> {
        if !self.is_node_active(node) {
            return Vec::new();
        }
        self.net
            .out_edges(node)
            .into_iter()
            .filter(|(e, other)| self.is_link_active(e.link) && self.is_node_active(*other))
            .collect()
    }

    /// Number of masked nodes (analysis-time and disabled)
    pub fn num_masked_nodes(&self) -> usize {
        self.masked_nodes.len()
    }

    /// Number of masked links (not counting implicit endpoint masking)
    pub fn num_masked_links(&self) -> usize {
        self.masked_links.len()
    }
}
