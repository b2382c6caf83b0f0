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

//! # Square mesh
//!
//! Four nodes, fully meshed:
//!
//! ```text
//! N1 ---- N2
//! | \    / |
//! |  \  /  |
//! |   \/   |
//! |   /\   |
//! N4 ---- N3
//! ```
//!
//! All costs are 1. The diagonal N1-N3 has capacity 1, N2-N4 has capacity 1, all square sides
//! have capacity 2. The unrestricted max-flow from N1 to N3 is 5 (1 direct, 2 via N2, 2 via
//! N4).

use super::{empty_map, link_decl, map, seq};
use crate::topology::{Link, Network, Node};
use crate::types::AttrValue;

/// The materialized square mesh
pub fn square_mesh() -> Network {
    let mut net = Network::new();
    for name in &["N1", "N2", "N3", "N4"] {
        net.add_node(Node::new(*name)).unwrap();
    }
    for &(s, t, cap) in &[
        ("N1", "N2", 2.0),
        ("N1", "N3", 1.0),
        ("N1", "N4", 2.0),
        ("N2", "N3", 2.0),
        ("N2", "N4", 1.0),
        ("N3", "N4", 2.0),
    ] {
        net.add_link(Link::new(s, t, cap, 1.0)).unwrap();
    }
    net.finish().unwrap();
    net
}

/// The same topology as a scenario document, with a single-link failure policy and a
/// Monte-Carlo max-flow workflow from N1 to N3.
pub fn square_mesh_scenario() -> AttrValue {
    map(vec![
        ("seed", 42.into()),
        (
            "network",
            map(vec![
                ("name", "square_mesh".into()),
                (
                    "nodes",
                    map(vec![
                        ("N1", empty_map()),
                        ("N2", empty_map()),
                        ("N3", empty_map()),
                        ("N4", empty_map()),
                    ]),
                ),
                (
                    "links",
                    seq(vec![
                        link_decl("N1", "N2", 2.0, 1.0),
                        link_decl("N1", "N3", 1.0, 1.0),
                        link_decl("N1", "N4", 2.0, 1.0),
                        link_decl("N2", "N3", 2.0, 1.0),
                        link_decl("N2", "N4", 1.0, 1.0),
                        link_decl("N3", "N4", 2.0, 1.0),
                    ]),
                ),
            ]),
        ),
        (
            "failures",
            map(vec![(
                "single_link",
                map(vec![(
                    "modes",
                    seq(vec![map(vec![
                        ("weight", 1.0.into()),
                        (
                            "rules",
                            seq(vec![map(vec![
                                ("scope", "link".into()),
                                ("mode", "choice".into()),
                                ("count", 1.into()),
                            ])]),
                        ),
                    ])]),
                )]),
            )]),
        ),
        (
            "workflow",
            seq(vec![map(vec![
                ("step_type", "MaxFlow".into()),
                ("name", "mf".into()),
                ("source", "N1$".into()),
                ("sink", "N3$".into()),
                ("failure_policy", "single_link".into()),
                ("iterations", 8.into()),
                ("parallelism", 2.into()),
                ("include_min_cut", true.into()),
            ])]),
        ),
    ])
}
