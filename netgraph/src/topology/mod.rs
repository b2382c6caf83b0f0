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

//! # Topology
//!
//! The graph store ([`Network`]) and the read-only overlay ([`NetworkView`]) that all analyses
//! operate on. The store is a strict multi-digraph: parallel links between the same endpoint
//! pair are distinguished by identifier and every operation that references a link references it
//! by identifier, never by endpoint pair. After materialization the store is treated as
//! immutable; failures and disabled entities are expressed as view masks, never as mutation.

mod graph;
mod risk;
mod view;

pub use graph::{Link, Network, Node};
pub use risk::RiskGroup;
pub use view::NetworkView;
