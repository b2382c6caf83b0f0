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

//! # Demands
//!
//! A demand pairs a source selector with a sink selector and a traffic volume. Before placement
//! it expands into concrete sub-demands: `pairwise` splits the volume evenly over every
//! (source, sink) node pair, `combine` keeps one aggregate sub-demand placed through the flow
//! engine's pseudo source/sink mechanism. A `group_mode` governs how selector groups pair up
//! first.

mod placer;

pub use placer::{place_demands, FlowRecord, PlacementResult};

use crate::error::Error;
use crate::flow::FlowPolicyConfig;
use crate::selectors::{select_nodes, Selector, SelectorCtx};
use crate::topology::Network;
use crate::types::{Attrs, NodeId};
use log::*;
use std::collections::BTreeSet;

/// How a demand turns its endpoint sets into sub-demands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandMode {
    /// One sub-demand per (source, sink) node pair, volume divided evenly
    Pairwise,
    /// A single aggregate sub-demand over the whole endpoint sets
    Combine,
}

/// How selector groups pair up before sub-demand expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    /// Merge all groups on each side into one set
    Flatten,
    /// Pair source and sink groups that share the same group key
    PerGroup,
    /// Pair every source group with every sink group
    GroupPairwise,
}

/// A declared traffic demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Demand {
    /// Source endpoint selector
    pub source: Selector,
    /// Sink endpoint selector
    pub sink: Selector,
    /// Total traffic volume
    pub volume: f64,
    /// Priority class; lower numbers place first
    pub priority: i64,
    /// Expansion mode
    pub mode: DemandMode,
    /// Group pairing mode
    pub group_mode: GroupMode,
    /// Routing preset used to place this demand
    pub policy: FlowPolicyConfig,
    /// Free-form attributes
    pub attrs: Attrs,
}

impl Default for Demand {
    fn default() -> Self {
        Demand {
            source: Selector::default(),
            sink: Selector::default(),
            volume: 0.0,
            priority: 0,
            mode: DemandMode::Combine,
            group_mode: GroupMode::Flatten,
            policy: FlowPolicyConfig::ShortestPathsEcmp,
            attrs: Attrs::new(),
        }
    }
}

/// A concrete sub-demand with resolved endpoint sets, ready for placement.
#[derive(Debug, Clone, PartialEq)]
pub struct SubDemand {
    /// Stable identifier: demand index, group keys and endpoints
    pub id: String,
    /// Concrete source nodes
    pub sources: Vec<NodeId>,
    /// Concrete sink nodes
    pub sinks: Vec<NodeId>,
    /// Volume share of this sub-demand
    pub volume: f64,
    /// Inherited priority
    pub priority: i64,
    /// Inherited routing preset
    pub policy: FlowPolicyConfig,
    /// Index of the declaring demand (insertion order; breaks priority ties)
    pub demand_index: usize,
}

/// Expand a demand matrix into concrete sub-demands, in declaration order. Demands whose
/// selectors match nothing expand to nothing, with a warning.
pub fn expand_demands(net: &Network, demands: &[Demand]) -> Result<Vec<SubDemand>, Error> {
    let mut out = Vec::new();
    for (index, demand) in demands.iter().enumerate() {
        let src_groups = select_nodes(net, &demand.source, SelectorCtx::Demand)?;
        let dst_groups = select_nodes(net, &demand.sink, SelectorCtx::Demand)?;
        if src_groups.values().all(|g| g.is_empty()) || dst_groups.values().all(|g| g.is_empty())
        {
            warn!("demand #{} matched no endpoints, skipping", index);
            continue;
        }

        // pair up the groups
        let pairs: Vec<(String, Vec<NodeId>, Vec<NodeId>)> = match demand.group_mode {
            GroupMode::Flatten => {
                let srcs = flatten(&src_groups);
                let dsts = flatten(&dst_groups);
                vec![(String::new(), srcs, dsts)]
            }
            GroupMode::PerGroup => src_groups
                .iter()
                .filter_map(|(key, srcs)| {
                    dst_groups.get(key).map(|dsts| (key.clone(), srcs.clone(), dsts.clone()))
                })
                .collect(),
            GroupMode::GroupPairwise => src_groups
                .iter()
                .flat_map(|(sk, srcs)| {
                    dst_groups.iter().map(move |(dk, dsts)| {
                        (format!("{}->{}", sk, dk), srcs.clone(), dsts.clone())
                    })
                })
                .collect(),
        };

        // count the sub-demands first so the volume divides evenly across all of them
        let mut expanded: Vec<(String, Vec<NodeId>, Vec<NodeId>)> = Vec::new();
        for (key, srcs, dsts) in pairs {
            match demand.mode {
                DemandMode::Combine => {
                    if !srcs.is_empty() && !dsts.is_empty() {
                        expanded.push((format!("{}|{}|combine", index, key), srcs, dsts));
                    }
                }
                DemandMode::Pairwise => {
                    for s in &srcs {
                        for t in &dsts {
                            if s == t {
                                continue;
                            }
                            let id = format!(
                                "{}|{}|{}->{}",
                                index,
                                key,
                                net.node(*s).name,
                                net.node(*t).name
                            );
                            expanded.push((id, vec![*s], vec![*t]));
                        }
                    }
                }
            }
        }
        if expanded.is_empty() {
            warn!("demand #{} expanded to no sub-demands", index);
            continue;
        }
        let share = demand.volume / expanded.len() as f64;
        for (id, sources, sinks) in expanded {
            out.push(SubDemand {
                id,
                sources,
                sinks,
                volume: share,
                priority: demand.priority,
                policy: demand.policy,
                demand_index: index,
            });
        }
    }
    Ok(out)
}

fn flatten(groups: &std::collections::BTreeMap<String, Vec<NodeId>>) -> Vec<NodeId> {
    let set: BTreeSet<NodeId> = groups.values().flatten().copied().collect();
    set.into_iter().collect()
}
