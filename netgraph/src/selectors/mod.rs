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

//! # Selector Engine
//!
//! Selectors resolve to ordered groups of entities (nodes, links or risk groups). Two selection
//! models share the machinery: path-based selection (adjacency, demands, post-build overrides)
//! supports grouping by regex capture groups or by attribute value; condition-based selection
//! (failure rules, membership rules, generate blocks) uses the path regex only as a pre-filter.
//!
//! Resolution is a pure function of (graph store, selector): groups come back in lexicographic
//! key order with entities ordered by name. An empty match is never an error; callers emit a
//! warning where appropriate.

mod condition;

pub use condition::{CondOp, Condition, Logic, MatchSpec};

use crate::error::SelectorError;
use crate::topology::Network;
use crate::types::{AttrValue, LinkId, NodeId};
use regex::Regex;
use std::collections::BTreeMap;

/// Ordered groups of selected entities, keyed by group key
pub type Groups<T> = BTreeMap<String, Vec<T>>;

/// A selector over the entity universe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    /// Regex over the full hierarchical name, anchored at the start. A leading `/` is cosmetic
    /// and stripped.
    pub path: Option<String>,
    /// Attribute predicate
    pub match_spec: Option<MatchSpec>,
    /// Group the selection by distinct value of this dotted attribute path instead of by regex
    /// capture groups
    pub group_by: Option<String>,
    /// Filter out disabled entities; the default depends on the context
    pub active_only: Option<bool>,
}

impl Selector {
    /// Selector matching names against a path regex
    pub fn path(path: impl Into<String>) -> Self {
        Selector { path: Some(path.into()), ..Default::default() }
    }
}

/// Where a selector appears. The context supplies the documented defaults: `match.logic`
/// defaults to `or` for adjacency/demands/failure and to `and` for membership rules;
/// `active_only` defaults to true for demand/workflow selectors and false for adjacency and
/// rules. Failure rules and generate blocks may omit every field, which selects the whole
/// universe of their scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorCtx {
    /// Adjacency source/target selection
    Adjacency,
    /// Demand endpoint selection
    Demand,
    /// Failure rule selection
    FailureRule,
    /// Risk-group membership rule
    MembershipRule,
    /// Risk-group generate block
    Generate,
    /// Node/link post-build override
    Override,
    /// Workflow step endpoint selection
    Workflow,
}

impl SelectorCtx {
    fn default_logic(self) -> Logic {
        match self {
            SelectorCtx::MembershipRule => Logic::And,
            _ => Logic::Or,
        }
    }

    fn default_active_only(self) -> bool {
        matches!(self, SelectorCtx::Demand | SelectorCtx::Workflow)
    }

    fn allows_empty(self) -> bool {
        matches!(
            self,
            SelectorCtx::FailureRule | SelectorCtx::Generate | SelectorCtx::MembershipRule
        )
    }
}

fn compile_path(path: &str) -> Result<Regex, SelectorError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    Regex::new(&format!("^(?:{})", trimmed))
        .map_err(|e| SelectorError::InvalidRegex(path.to_string(), e.to_string()))
}

fn validate(sel: &Selector, ctx: SelectorCtx) -> Result<(), SelectorError> {
    if sel.path.is_none() && sel.match_spec.is_none() && sel.group_by.is_none() && !ctx.allows_empty()
    {
        return Err(SelectorError::Empty);
    }
    if let Some(m) = &sel.match_spec {
        for c in &m.conditions {
            c.validate()?;
        }
    }
    Ok(())
}

/// Group key from regex capture groups: all participating groups joined with `|`. No capture
/// groups, or none participating, yields the empty key.
fn capture_key(re: &Regex, name: &str) -> String {
    if re.captures_len() <= 1 {
        return String::new();
    }
    match re.captures(name) {
        Some(caps) => {
            let parts: Vec<&str> =
                (1..caps.len()).filter_map(|i| caps.get(i).map(|m| m.as_str())).collect();
            parts.join("|")
        }
        None => String::new(),
    }
}

fn resolve<T: Copy>(
    sel: &Selector,
    ctx: SelectorCtx,
    entities: impl Iterator<Item = (T, String, bool)>,
    attr_of: impl Fn(T, &str) -> Option<AttrValue>,
) -> Result<Groups<T>, SelectorError> {
    validate(sel, ctx)?;
    let re = match &sel.path {
        Some(p) => Some(compile_path(p)?),
        None => None,
    };
    let logic = sel
        .match_spec
        .as_ref()
        .and_then(|m| m.logic)
        .unwrap_or_else(|| ctx.default_logic());
    let active_only = sel.active_only.unwrap_or_else(|| ctx.default_active_only());

    let mut groups: Groups<T> = BTreeMap::new();
    for (id, name, disabled) in entities {
        if active_only && disabled {
            continue;
        }
        if let Some(re) = &re {
            if !re.is_match(&name) {
                continue;
            }
        }
        if let Some(spec) = &sel.match_spec {
            if !condition::evaluate(spec, logic, |attr| attr_of(id, attr)) {
                continue;
            }
        }
        let key = match &sel.group_by {
            Some(attr) => attr_of(id, attr).map(|v| v.to_key_string()).unwrap_or_default(),
            None => re.as_ref().map(|re| capture_key(re, &name)).unwrap_or_default(),
        };
        groups.entry(key).or_default().push(id);
    }
    Ok(groups)
}

/// Resolve a selector over the node universe. Entities in each group are ordered by name.
pub fn select_nodes(
    net: &Network,
    sel: &Selector,
    ctx: SelectorCtx,
) -> Result<Groups<NodeId>, SelectorError> {
    resolve(
        sel,
        ctx,
        net.nodes().map(|(id, n)| (id, n.name.clone(), n.disabled)),
        |id, attr| node_attr(net, id, attr),
    )
}

/// Resolve a selector over the link universe. The name a link's path regex matches against is
/// its stable identifier `<source>|<target>|<seq>`; groups are ordered by that identifier.
pub fn select_links(
    net: &Network,
    sel: &Selector,
    ctx: SelectorCtx,
) -> Result<Groups<LinkId>, SelectorError> {
    let mut groups = resolve(
        sel,
        ctx,
        net.links().map(|(id, l)| (id, l.id.clone(), l.disabled)),
        |id, attr| link_attr(net, id, attr),
    )?;
    for members in groups.values_mut() {
        members.sort_by(|a, b| net.link(*a).id.cmp(&net.link(*b).id));
    }
    Ok(groups)
}

/// Resolve a selector over the risk-group universe (condition-based contexts only).
pub fn select_risk_groups(
    net: &Network,
    sel: &Selector,
    ctx: SelectorCtx,
) -> Result<Vec<String>, SelectorError> {
    validate(sel, ctx)?;
    let re = match &sel.path {
        Some(p) => Some(compile_path(p)?),
        None => None,
    };
    let logic = sel
        .match_spec
        .as_ref()
        .and_then(|m| m.logic)
        .unwrap_or_else(|| ctx.default_logic());
    let mut out = Vec::new();
    for group in net.risk_groups() {
        if let Some(re) = &re {
            if !re.is_match(&group.name) {
                continue;
            }
        }
        if let Some(spec) = &sel.match_spec {
            let ok = condition::evaluate(spec, logic, |attr| match attr {
                "name" => Some(AttrValue::Str(group.name.clone())),
                _ => group_attr(&group.attrs, attr),
            });
            if !ok {
                continue;
            }
        }
        out.push(group.name.clone());
    }
    Ok(out)
}

fn group_attr(attrs: &crate::types::Attrs, path: &str) -> Option<AttrValue> {
    AttrValue::Map(attrs.clone()).get_path(path).cloned()
}

/// Attribute accessor for nodes: built-ins (`name`, `disabled`, `risk_groups`) shadow nothing;
/// everything else resolves into the attribute bag by dotted path.
pub fn node_attr(net: &Network, id: NodeId, path: &str) -> Option<AttrValue> {
    let node = net.node(id);
    match path {
        "name" => Some(AttrValue::Str(node.name.clone())),
        "disabled" => Some(AttrValue::Bool(node.disabled)),
        "risk_groups" => Some(AttrValue::List(
            node.risk_groups.iter().map(|g| AttrValue::Str(g.clone())).collect(),
        )),
        _ => AttrValue::Map(node.attrs.clone()).get_path(path).cloned(),
    }
}

/// Attribute accessor for links: built-ins are `source`, `target`, `capacity`, `cost`,
/// `disabled` and `risk_groups`.
pub fn link_attr(net: &Network, id: LinkId, path: &str) -> Option<AttrValue> {
    let link = net.link(id);
    match path {
        "source" => Some(AttrValue::Str(link.source.clone())),
        "target" => Some(AttrValue::Str(link.target.clone())),
        "capacity" => Some(AttrValue::Float(link.capacity)),
        "cost" => Some(AttrValue::Float(link.cost)),
        "disabled" => Some(AttrValue::Bool(link.disabled)),
        "risk_groups" => Some(AttrValue::List(
            link.risk_groups.iter().map(|g| AttrValue::Str(g.clone())).collect(),
        )),
        _ => AttrValue::Map(link.attrs.clone()).get_path(path).cloned(),
    }
}
