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

//! # MSD bisection scenario
//!
//! A single A→B link of capacity 10 and a matrix demanding exactly 10: the matrix places fully
//! at scale 1.0 and only partially at 2.0, so the maximum-supported-demand search brackets
//! (1, 2) and bisects towards 1.0. The workflow threads the resulting `alpha_star` into a
//! placement step.

use super::{empty_map, link_decl, map, seq};
use crate::types::AttrValue;

/// The MSD scenario document
pub fn msd_scenario() -> AttrValue {
    map(vec![
        ("seed", 7.into()),
        (
            "network",
            map(vec![
                ("name", "msd_line".into()),
                ("nodes", map(vec![("A", empty_map()), ("B", empty_map())])),
                ("links", seq(vec![link_decl("A", "B", 10.0, 1.0)])),
            ]),
        ),
        (
            "demands",
            map(vec![(
                "default",
                seq(vec![map(vec![
                    ("source", "A$".into()),
                    ("sink", "B$".into()),
                    ("volume", 10.0.into()),
                    ("mode", "combine".into()),
                    ("policy", "SHORTEST_PATHS_ECMP".into()),
                ])]),
            )]),
        ),
        (
            "workflow",
            seq(vec![
                map(vec![
                    ("step_type", "MaximumSupportedDemand".into()),
                    ("name", "msd".into()),
                    ("matrix", "default".into()),
                    ("alpha_start", 1.0.into()),
                    ("growth_factor", 2.0.into()),
                    ("resolution", 0.01.into()),
                ]),
                map(vec![
                    ("step_type", "TrafficMatrixPlacement".into()),
                    ("name", "tm".into()),
                    ("matrix", "default".into()),
                    ("alpha_from_step", "msd".into()),
                ]),
            ]),
        ),
    ])
}
