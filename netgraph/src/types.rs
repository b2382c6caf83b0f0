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

//! Module containing all shared type definitions

use petgraph::prelude::*;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

type IndexType = u32;
/// Node identification (and index into the graph)
pub type NodeId = NodeIndex<IndexType>;
/// Link identification (and index into the graph). A link is a full-duplex physical circuit;
/// analyses traverse it in both directions (see [`EdgeId`]).
pub type LinkId = EdgeIndex<IndexType>;

/// Free-form attribute bag attached to nodes, links, risk groups and demands. Kept ordered so
/// that iteration (and everything derived from it) is deterministic.
pub type Attrs = BTreeMap<String, AttrValue>;

/// One directed traversal of a link. The graph store keeps one record per physical circuit; the
/// flow engine addresses the two directions separately, and all per-edge flow accounting is keyed
/// by this type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EdgeId {
    /// The underlying link
    pub link: LinkId,
    /// True for the target-to-source direction
    pub reversed: bool,
}

impl EdgeId {
    /// Forward traversal of `link`
    pub fn forward(link: LinkId) -> Self {
        Self { link, reversed: false }
    }

    /// Reverse traversal of `link`
    pub fn reverse(link: LinkId) -> Self {
        Self { link, reversed: true }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reversed {
            write!(f, "{}:rev", self.link.index())
        } else {
            write!(f, "{}", self.link.index())
        }
    }
}

/// Routing cost with a total order, usable as a map key (e.g. in cost distributions).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cost(pub f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Serialize for Cost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// # Attribute Value
///
/// Recursive tagged value, the common currency between the scenario document, entity attribute
/// bags and selector conditions. Nested maps are addressable with dotted paths (`x.y.z`), which
/// is what `attr` fields in match conditions use.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// Absent / null
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    Str(String),
    /// Sequence
    List(Vec<AttrValue>),
    /// Ordered mapping
    Map(Attrs),
}

impl AttrValue {
    /// Name of the contained type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "a boolean",
            AttrValue::Int(_) => "an integer",
            AttrValue::Float(_) => "a number",
            AttrValue::Str(_) => "a string",
            AttrValue::List(_) => "a sequence",
            AttrValue::Map(_) => "a mapping",
        }
    }

    /// Returns the contained string, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained boolean, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view: integers coerce to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Non-negative integer view (floats accepted when integral)
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            AttrValue::Int(i) if *i >= 0 => Some(*i as usize),
            AttrValue::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as usize),
            _ => None,
        }
    }

    /// Returns the contained sequence, if any
    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the contained mapping, if any
    pub fn as_map(&self) -> Option<&Attrs> {
        match self {
            AttrValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// True if the value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Look up a nested value by dotted path. A plain key is a path of length one. Returns
    /// `None` if any intermediate segment is missing or not a mapping.
    pub fn get_path(&self, path: &str) -> Option<&AttrValue> {
        let mut current = self;
        for segment in path.split('.') {
            match current {
                AttrValue::Map(m) => current = m.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Set a nested value by dotted path, creating intermediate mappings as needed. Existing
    /// non-map intermediates are replaced. Only valid on `Map` values.
    pub fn set_path(&mut self, path: &str, value: AttrValue) {
        let mut current = self;
        let segments: Vec<&str> = path.split('.').collect();
        for (i, segment) in segments.iter().enumerate() {
            if !matches!(current, AttrValue::Map(_)) {
                *current = AttrValue::Map(Attrs::new());
            }
            let map = match current {
                AttrValue::Map(m) => m,
                _ => unreachable!(),
            };
            if i + 1 == segments.len() {
                map.insert((*segment).to_string(), value);
                return;
            }
            current = map
                .entry((*segment).to_string())
                .or_insert_with(|| AttrValue::Map(Attrs::new()));
        }
    }

    /// Canonical string form used as a grouping key (`group_by`, risk-group generation).
    pub fn to_key_string(&self) -> String {
        match self {
            AttrValue::Null => String::from("null"),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{}", *f as i64)
                } else {
                    f.to_string()
                }
            }
            AttrValue::Str(s) => s.clone(),
            AttrValue::List(l) => {
                let items: Vec<String> = l.iter().map(|v| v.to_key_string()).collect();
                format!("[{}]", items.join(","))
            }
            AttrValue::Map(_) => String::from("{..}"),
        }
    }
}

/// Ordering used by the comparison operators `<`, `<=`, `>`, `>=` and for equality checks that
/// must not distinguish `Int(2)` from `Float(2.0)`. Values of incomparable kinds return `None`,
/// which makes the condition evaluate to false.
pub fn compare_values(a: &AttrValue, b: &AttrValue) -> Option<Ordering> {
    match (a, b) {
        (AttrValue::Str(x), AttrValue::Str(y)) => Some(x.cmp(y)),
        (AttrValue::Bool(x), AttrValue::Bool(y)) => Some(x.cmp(y)),
        _ => {
            let (x, y) = (a.as_f64()?, b.as_f64()?);
            x.partial_cmp(&y)
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Null => serializer.serialize_unit(),
            AttrValue::Bool(b) => serializer.serialize_bool(*b),
            AttrValue::Int(i) => serializer.serialize_i64(*i),
            AttrValue::Float(f) => serializer.serialize_f64(*f),
            AttrValue::Str(s) => serializer.serialize_str(s),
            AttrValue::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for item in l {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            AttrValue::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(v: Vec<AttrValue>) -> Self {
        AttrValue::List(v)
    }
}

impl From<Attrs> for AttrValue {
    fn from(v: Attrs) -> Self {
        AttrValue::Map(v)
    }
}
