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

//! Networks and scenario documents for testing and documentation examples.

mod clos;
mod msd_net;
mod parallel_paths;
mod square_mesh;

pub use clos::clos_scenario;
pub use msd_net::msd_scenario;
pub use parallel_paths::{parallel_paths, parallel_paths_scenario};
pub use square_mesh::{square_mesh, square_mesh_scenario};

use crate::types::{AttrValue, Attrs};

/// Build a mapping value from string keys
pub(crate) fn map(entries: Vec<(&str, AttrValue)>) -> AttrValue {
    AttrValue::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

/// Build a sequence value
pub(crate) fn seq(items: Vec<AttrValue>) -> AttrValue {
    AttrValue::List(items)
}

/// A direct link declaration with capacity and cost
pub(crate) fn link_decl(source: &str, target: &str, capacity: f64, cost: f64) -> AttrValue {
    map(vec![
        ("source", source.into()),
        ("target", target.into()),
        (
            "link_params",
            map(vec![("capacity", capacity.into()), ("cost", cost.into())]),
        ),
    ])
}

/// An empty mapping, for nodes declared without parameters
pub(crate) fn empty_map() -> AttrValue {
    AttrValue::Map(Attrs::new())
}
