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

//! Shared-risk groups.

use crate::types::Attrs;

/// A named set of entities that fail together. Groups form a forest: a group may declare child
/// groups, and failing a group with `expand_children` recursively fails all descendants.
/// Entities join a group by explicit membership, by membership-rule matching, or through
/// auto-generation (one group per unique attribute value).
#[derive(Debug, Clone, PartialEq)]
pub struct RiskGroup {
    /// Unique name across the whole hierarchy
    pub name: String,
    /// Parent group, if this group was declared nested
    pub parent: Option<String>,
    /// Names of directly nested child groups
    pub children: Vec<String>,
    /// Free-form attributes
    pub attrs: Attrs,
}

impl RiskGroup {
    /// Create a top-level risk group
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), parent: None, children: Vec::new(), attrs: Attrs::new() }
    }
}
