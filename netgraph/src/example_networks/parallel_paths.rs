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

//! # Parallel paths
//!
//! Two parallel links on each hop of A→B→C (capacities 1 and 2, cost 1 per hop), plus a more
//! expensive alternative A→D→C (capacity 3, cost 2 per hop):
//!
//! ```text
//!     ==== B ====
//!   A            C
//!     ---- D ----
//! ```
//!
//! The true max-flow A→C is 6, the shortest-path max-flow is 3, and equal-balanced placement
//! on the shortest paths yields 2 (the thinnest parallel link times the fan-out).

use super::{empty_map, link_decl, map, seq};
use crate::topology::{Link, Network, Node};
use crate::types::AttrValue;

/// The materialized parallel-paths network
pub fn parallel_paths() -> Network {
    let mut net = Network::new();
    for name in &["A", "B", "C", "D"] {
        net.add_node(Node::new(*name)).unwrap();
    }
    for &(s, t, cap, cost) in &[
        ("A", "B", 1.0, 1.0),
        ("A", "B", 2.0, 1.0),
        ("B", "C", 1.0, 1.0),
        ("B", "C", 2.0, 1.0),
        ("A", "D", 3.0, 2.0),
        ("D", "C", 3.0, 2.0),
    ] {
        net.add_link(Link::new(s, t, cap, cost)).unwrap();
    }
    net.finish().unwrap();
    net
}

/// The same topology as a scenario document
pub fn parallel_paths_scenario() -> AttrValue {
    map(vec![(
        "network",
        map(vec![
            ("name", "parallel_paths".into()),
            (
                "nodes",
                map(vec![
                    ("A", empty_map()),
                    ("B", empty_map()),
                    ("C", empty_map()),
                    ("D", empty_map()),
                ]),
            ),
            (
                "links",
                seq(vec![
                    link_decl("A", "B", 1.0, 1.0),
                    link_decl("A", "B", 2.0, 1.0),
                    link_decl("B", "C", 1.0, 1.0),
                    link_decl("B", "C", 2.0, 1.0),
                    link_decl("A", "D", 3.0, 2.0),
                    link_decl("D", "C", 3.0, 2.0),
                ]),
            ),
        ]),
    )])
}
