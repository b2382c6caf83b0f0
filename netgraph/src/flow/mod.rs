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

//! # Flow Engine
//!
//! Shortest-path computation over a [`NetworkView`](crate::topology::NetworkView), flow
//! placement policies emulating ECMP/WCMP/TE splitting behavior, and the capacity-constrained
//! max-flow engine consuming both.
//!
//! Determinism is a hard requirement here: when both the placement and the path algorithm have
//! ties, they break by (cost ascending, edge id ascending), so two runs over the same view and
//! parameters produce identical flow distributions.

mod maxflow;
mod placement;
pub mod spf;

pub use maxflow::{max_flow, sensitivity, EdgeLoad, FlowRequest, MaxFlowResult};
pub use placement::{FlowPlacement, FlowPolicy, FlowPolicyConfig};
pub use spf::{spf, Spf};

/// Tolerance used for capacity, flow and cost comparisons throughout the engine.
pub const EPS: f64 = 1e-9;
