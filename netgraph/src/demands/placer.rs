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

//! # Demand Placer
//!
//! Places each sub-demand onto a shared working graph in priority order. The working graph
//! accumulates committed per-edge flow, so residuals decrease monotonically over one placement
//! pass. Per-source SPF results are cached for the cost-only policy family; TE presets search
//! the residual graph and are recomputed every time.

use crate::demands::{expand_demands, Demand};
use crate::error::Error;
use crate::flow::{max_flow, spf, EdgeLoad, FlowRequest, Spf};
use crate::topology::NetworkView;
use crate::types::{Cost, EdgeId, NodeId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Per-sub-demand placement accounting.
#[derive(Debug, Clone, Serialize)]
pub struct FlowRecord {
    /// Stable sub-demand identifier
    pub demand: String,
    /// Volume successfully placed
    pub placed: f64,
    /// Volume that did not fit
    pub unplaced: f64,
    /// Flow this sub-demand contributed per directed edge (serialized via the results layer)
    #[serde(skip)]
    pub edge_flows: BTreeMap<EdgeId, f64>,
    /// Placed volume per distinct path cost
    #[serde(skip)]
    pub cost_distribution: BTreeMap<Cost, f64>,
}

/// Outcome of placing a whole traffic matrix.
#[derive(Debug, Clone)]
pub struct PlacementResult {
    /// Records in placement order (priority ascending, then insertion order)
    pub records: Vec<FlowRecord>,
    /// Sum of placed volumes
    pub total_placed: f64,
    /// Sum of unplaced volumes
    pub total_unplaced: f64,
    /// Final committed flow per directed edge
    pub occupied: EdgeLoad,
}

/// Expand and place a traffic matrix on the view. Pure up to the view: the working residuals
/// live here and never escape.
pub fn place_demands(view: &NetworkView<'_>, demands: &[Demand]) -> Result<PlacementResult, Error> {
    let net = view.network();
    let mut subs = expand_demands(net, demands)?;
    // stable sort keeps insertion order within one priority class
    subs.sort_by_key(|s| s.priority);

    let mut occupied = EdgeLoad::new();
    let mut spf_cache: HashMap<NodeId, Spf> = HashMap::new();
    let mut records = Vec::with_capacity(subs.len());
    let mut total_placed = 0.0;
    let mut total_unplaced = 0.0;

    for sub in &subs {
        let policy = sub.policy.policy();
        let cached: Option<&Spf> = if sub.policy.spf_cacheable() && sub.sources.len() == 1 {
            let source = sub.sources[0];
            if !spf_cache.contains_key(&source) {
                spf_cache.insert(source, spf(view, source));
            }
            spf_cache.get(&source)
        } else {
            None
        };
        let req = FlowRequest {
            sources: &sub.sources,
            sinks: &sub.sinks,
            policy,
            limit: Some(sub.volume),
            spf: cached,
        };
        let result = max_flow(view, &req, Some(&occupied));
        let placed = result.total_flow.min(sub.volume);
        for (edge, flow) in &result.edge_flows {
            *occupied.entry(*edge).or_insert(0.0) += *flow;
        }
        total_placed += placed;
        total_unplaced += sub.volume - placed;
        records.push(FlowRecord {
            demand: sub.id.clone(),
            placed,
            unplaced: sub.volume - placed,
            edge_flows: result.edge_flows,
            cost_distribution: result.cost_distribution,
        });
    }

    Ok(PlacementResult { records, total_placed, total_unplaced, occupied })
}
