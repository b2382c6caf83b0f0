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

//! # Two-tier Clos
//!
//! A `pod` blueprint with 4 leaves and 2 spines in a mesh (capacity 100), instantiated twice
//! via the bracket pattern `pod[1-2]`. Without an inter-pod adjacency the pods are isolated;
//! with the one-to-one inter-spine adjacency (capacity 400) the leaf-to-leaf max-flow across
//! pods is 800.

use super::{map, seq};
use crate::types::AttrValue;

/// The Clos scenario document. `interconnect` adds the one-to-one inter-spine adjacency.
pub fn clos_scenario(interconnect: bool) -> AttrValue {
    let pod = map(vec![
        (
            "groups",
            map(vec![
                ("leaf", map(vec![("node_count", 4.into())])),
                ("spine", map(vec![("node_count", 2.into())])),
            ]),
        ),
        (
            "adjacency",
            seq(vec![map(vec![
                ("source", "/leaf".into()),
                ("target", "/spine".into()),
                ("pattern", "mesh".into()),
                (
                    "link_params",
                    map(vec![("capacity", 100.0.into()), ("cost", 1.0.into())]),
                ),
            ])]),
        ),
    ]);

    let mut adjacency = Vec::new();
    if interconnect {
        adjacency.push(map(vec![
            ("source", "pod1/spine".into()),
            ("target", "pod2/spine".into()),
            ("pattern", "one_to_one".into()),
            (
                "link_params",
                map(vec![("capacity", 400.0.into()), ("cost", 1.0.into())]),
            ),
        ]));
    }

    map(vec![
        ("blueprints", map(vec![("pod", pod)])),
        (
            "network",
            map(vec![
                ("name", "clos".into()),
                (
                    "groups",
                    map(vec![(
                        "pod[1-2]",
                        map(vec![("use_blueprint", "pod".into())]),
                    )]),
                ),
                ("adjacency", seq(adjacency)),
            ]),
        ),
    ])
}
