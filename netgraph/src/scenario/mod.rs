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

//! # Scenario Document Model
//!
//! The scenario arrives as an already-parsed tree of plain values (strings, numbers, booleans,
//! ordered mappings, sequences) — the external parser owns the surface syntax. This module
//! validates the tree's *semantics* and produces the typed declarations the expander and the
//! workflow driver consume.
//!
//! Two historical spellings are accepted at the boundary and canonicalized here:
//! `traffic_matrix_set`/`failure_policy_set` for `demands`/`failures`, and `rule_type` for a
//! failure rule's `mode`.

use crate::demands::{Demand, DemandMode, GroupMode};
use crate::error::{Error, SchemaError};
use crate::expand::vars::ExpandMode;
use crate::failures::{FailureMode, FailurePolicy, FailureRule, RuleMode, RuleScope};
use crate::flow::FlowPolicyConfig;
use crate::selectors::{CondOp, Condition, Logic, MatchSpec, Selector};
use crate::workflow::WorkflowStep;
use crate::types::{AttrValue, Attrs};
use std::collections::BTreeMap;

/// A fully validated scenario document.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    /// Scenario seed; workflow steps may override per step
    pub seed: Option<u64>,
    /// Named variable lists available to `expand` blocks
    pub vars: BTreeMap<String, Vec<AttrValue>>,
    /// The topology declaration
    pub network: NetworkDecl,
    /// Reusable sub-topologies
    pub blueprints: BTreeMap<String, BlueprintDecl>,
    /// Opaque component library (consumed by the external cost/power tooling)
    pub components: Attrs,
    /// Risk-group declarations
    pub risk_groups: Vec<RiskGroupDecl>,
    /// Named traffic matrices
    pub demands: BTreeMap<String, Vec<Demand>>,
    /// Named failure policies
    pub failures: BTreeMap<String, FailurePolicy>,
    /// The analysis workflow
    pub workflow: Vec<WorkflowStep>,
}

/// The `network` section.
#[derive(Debug, Clone, Default)]
pub struct NetworkDecl {
    /// Network name
    pub name: Option<String>,
    /// Direct node declarations, in document order
    pub nodes: Vec<(String, NodeDecl)>,
    /// Group declarations, in document order (keys may carry bracket patterns)
    pub groups: Vec<(String, GroupDecl)>,
    /// Direct link declarations
    pub links: Vec<LinkDecl>,
    /// Adjacency rules
    pub adjacency: Vec<AdjacencyDecl>,
    /// Node post-build rules
    pub node_overrides: Vec<NodeOverride>,
    /// Link post-build rules
    pub link_overrides: Vec<LinkOverride>,
}

/// A direct node declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDecl {
    /// Attribute bag
    pub attrs: Attrs,
    /// Disabled flag
    pub disabled: bool,
    /// Risk-group memberships (bracket-expandable)
    pub risk_groups: Vec<String>,
}

/// What a group materializes into.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKind {
    /// `node_count` leaf nodes named by `name_template`
    Leaf {
        /// Number of nodes to create
        node_count: usize,
        /// Template with `{n}`/`{node_num}`/`{group}` placeholders
        name_template: Option<String>,
    },
    /// A blueprint instantiated at this path
    Blueprint {
        /// Name of the blueprint
        blueprint: String,
        /// Dot-path parameter overrides applied to the blueprint's configuration
        params: BTreeMap<String, AttrValue>,
    },
    /// A pure hierarchy level containing nested groups
    Nested {
        /// Child groups, in document order
        groups: Vec<(String, GroupDecl)>,
    },
}

/// A group declaration (inside `network.groups` or a blueprint).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDecl {
    /// What the group materializes into
    pub kind: GroupKind,
    /// Attributes flowing down to children (child values win)
    pub attrs: Attrs,
    /// Disabled flag flowing down to children
    pub disabled: bool,
    /// Risk-group memberships flowing down to children (bracket-expandable)
    pub risk_groups: Vec<String>,
}

/// A reusable sub-topology.
#[derive(Debug, Clone, Default)]
pub struct BlueprintDecl {
    /// Groups of the blueprint
    pub groups: Vec<(String, GroupDecl)>,
    /// Blueprint-level adjacency, expanded relative to the instantiation path
    pub adjacency: Vec<AdjacencyDecl>,
}

/// Parameters shared by direct links and adjacency-created links.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkParams {
    /// Per-direction capacity
    pub capacity: f64,
    /// Routing metric
    pub cost: f64,
    /// Disabled flag
    pub disabled: bool,
    /// Risk-group memberships (bracket-expandable)
    pub risk_groups: Vec<String>,
    /// Attribute bag
    pub attrs: Attrs,
}

impl Default for LinkParams {
    fn default() -> Self {
        LinkParams {
            capacity: 1.0,
            cost: 1.0,
            disabled: false,
            risk_groups: Vec::new(),
            attrs: Attrs::new(),
        }
    }
}

/// A direct link declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkDecl {
    /// Source node name
    pub source: String,
    /// Target node name
    pub target: String,
    /// Link parameters
    pub params: LinkParams,
    /// Number of parallel links to create
    pub count: usize,
}

/// Adjacency patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjPattern {
    /// Every (source, target) node pair of every group pair
    Mesh,
    /// Pair by index modulo the smaller group; sizes must divide
    OneToOne,
}

/// An adjacency rule.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyDecl {
    /// Source node selector
    pub source: Selector,
    /// Target node selector
    pub target: Selector,
    /// Pattern
    pub pattern: AdjPattern,
    /// Parallel links per produced pair
    pub count: usize,
    /// Parameters of the produced links
    pub params: LinkParams,
    /// Optional variable multiplication applied to this record before selection
    pub expand: Option<ExpandBlock>,
}

/// The `expand` block of an adjacency rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandBlock {
    /// Variable lists; names referenced as `$name`/`${name}` in the record
    pub vars: BTreeMap<String, Vec<AttrValue>>,
    /// Binding mode
    pub mode: ExpandMode,
}

/// A node post-build rule.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOverride {
    /// Which nodes the rule applies to
    pub selector: Selector,
    /// Attribute edits (dot-path merge)
    pub attrs: Attrs,
    /// Disabled override
    pub disabled: Option<bool>,
    /// Risk groups to add
    pub risk_groups: Vec<String>,
}

/// A link post-build rule.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOverride {
    /// Source endpoint regex
    pub source: Option<String>,
    /// Target endpoint regex
    pub target: Option<String>,
    /// Attribute predicate
    pub match_spec: Option<MatchSpec>,
    /// Also match links with swapped endpoint roles
    pub any_direction: bool,
    /// Capacity override
    pub capacity: Option<f64>,
    /// Cost override
    pub cost: Option<f64>,
    /// Disabled override
    pub disabled: Option<bool>,
    /// Risk groups to add
    pub risk_groups: Vec<String>,
    /// Attribute edits (dot-path merge)
    pub attrs: Attrs,
}

/// One `risk_groups` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskGroupDecl {
    /// A direct definition (possibly nested)
    Direct(RiskGroupDef),
    /// An auto-generation block: one group per unique attribute value
    Generate(GenerateBlock),
}

/// A direct risk-group definition. Names are bracket-expandable; children follow the same
/// shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskGroupDef {
    /// Group name pattern
    pub name: String,
    /// Nested child definitions
    pub children: Vec<RiskGroupDef>,
    /// Attribute bag
    pub attrs: Attrs,
    /// Membership rules adding matching entities to the group
    pub membership: Vec<MembershipRule>,
}

/// A condition-based membership rule.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRule {
    /// Entity universe the rule scans
    pub scope: RuleScope,
    /// Optional path pre-filter
    pub path: Option<String>,
    /// Attribute predicate (conditions default to `and` logic here)
    pub match_spec: Option<MatchSpec>,
}

/// A risk-group generate block.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateBlock {
    /// Entity universe scanned for attribute values
    pub scope: RuleScope,
    /// Attribute whose distinct values produce groups
    pub attr: String,
    /// Optional path pre-filter
    pub path: Option<String>,
    /// Group name template; `{attr}` and `{value}` placeholders. Default `{attr}-{value}`.
    pub template: Option<String>,
}

// ---------------------------------------------------------------------------
// value helpers
// ---------------------------------------------------------------------------

pub(crate) fn as_map<'a>(v: &'a AttrValue, key: &str) -> Result<&'a Attrs, SchemaError> {
    v.as_map().ok_or_else(|| SchemaError::WrongType {
        key: key.to_string(),
        expected: "a mapping",
        found: v.type_name(),
    })
}

pub(crate) fn as_list<'a>(v: &'a AttrValue, key: &str) -> Result<&'a [AttrValue], SchemaError> {
    v.as_list().ok_or_else(|| SchemaError::WrongType {
        key: key.to_string(),
        expected: "a sequence",
        found: v.type_name(),
    })
}

pub(crate) fn as_str(v: &AttrValue, key: &str) -> Result<String, SchemaError> {
    v.as_str().map(|s| s.to_string()).ok_or_else(|| SchemaError::WrongType {
        key: key.to_string(),
        expected: "a string",
        found: v.type_name(),
    })
}

pub(crate) fn as_f64(v: &AttrValue, key: &str) -> Result<f64, SchemaError> {
    v.as_f64().ok_or_else(|| SchemaError::WrongType {
        key: key.to_string(),
        expected: "a number",
        found: v.type_name(),
    })
}

pub(crate) fn as_usize(v: &AttrValue, key: &str) -> Result<usize, SchemaError> {
    v.as_usize().ok_or_else(|| SchemaError::WrongType {
        key: key.to_string(),
        expected: "a non-negative integer",
        found: v.type_name(),
    })
}

pub(crate) fn as_bool(v: &AttrValue, key: &str) -> Result<bool, SchemaError> {
    v.as_bool().ok_or_else(|| SchemaError::WrongType {
        key: key.to_string(),
        expected: "a boolean",
        found: v.type_name(),
    })
}

pub(crate) fn check_keys(map: &Attrs, allowed: &[&str], context: &str) -> Result<(), SchemaError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(SchemaError::UnknownKey {
                key: key.clone(),
                context: context.to_string(),
            });
        }
    }
    Ok(())
}

fn string_list(v: &AttrValue, key: &str) -> Result<Vec<String>, SchemaError> {
    match v {
        AttrValue::Str(s) => Ok(vec![s.clone()]),
        AttrValue::List(items) => items.iter().map(|i| as_str(i, key)).collect(),
        other => Err(SchemaError::WrongType {
            key: key.to_string(),
            expected: "a string or sequence of strings",
            found: other.type_name(),
        }),
    }
}

fn attrs_of(map: &Attrs, key: &str) -> Result<Attrs, SchemaError> {
    match map.get(key) {
        Some(v) => Ok(as_map(v, key)?.clone()),
        None => Ok(Attrs::new()),
    }
}

// ---------------------------------------------------------------------------
// selectors, demands, failures
// ---------------------------------------------------------------------------

/// Parse a selector: a bare string is a path regex, a mapping may carry `path`, `match`,
/// `group_by` and `active_only`.
pub fn parse_selector(v: &AttrValue, context: &str) -> Result<Selector, Error> {
    match v {
        AttrValue::Str(path) => Ok(Selector::path(path.clone())),
        AttrValue::Map(map) => {
            check_keys(map, &["path", "match", "group_by", "active_only"], context)?;
            let mut sel = Selector::default();
            if let Some(p) = map.get("path") {
                sel.path = Some(as_str(p, "path")?);
            }
            if let Some(m) = map.get("match") {
                sel.match_spec = Some(parse_match(m, context)?);
            }
            if let Some(g) = map.get("group_by") {
                sel.group_by = Some(as_str(g, "group_by")?);
            }
            if let Some(a) = map.get("active_only") {
                sel.active_only = Some(as_bool(a, "active_only")?);
            }
            Ok(sel)
        }
        other => Err(SchemaError::WrongType {
            key: context.to_string(),
            expected: "a selector (string or mapping)",
            found: other.type_name(),
        }
        .into()),
    }
}

/// Parse a `match` block: `{ logic?: and|or, conditions: [{attr, op, value?}] }`.
pub fn parse_match(v: &AttrValue, context: &str) -> Result<MatchSpec, Error> {
    let map = as_map(v, "match")?;
    check_keys(map, &["logic", "conditions"], context)?;
    let logic = match map.get("logic") {
        Some(l) => Some(match as_str(l, "logic")?.as_str() {
            "and" => Logic::And,
            "or" => Logic::Or,
            other => {
                return Err(SchemaError::UnknownKeyword {
                    key: "logic".to_string(),
                    allowed: "and, or",
                    found: other.to_string(),
                }
                .into())
            }
        }),
        None => None,
    };
    let mut conditions = Vec::new();
    if let Some(list) = map.get("conditions") {
        for item in as_list(list, "conditions")? {
            let cmap = as_map(item, "conditions[]")?;
            check_keys(cmap, &["attr", "op", "value"], context)?;
            let attr = as_str(
                cmap.get("attr").ok_or_else(|| SchemaError::MissingKey {
                    key: "attr".to_string(),
                    context: context.to_string(),
                })?,
                "attr",
            )?;
            let op = CondOp::parse(&as_str(
                cmap.get("op").ok_or_else(|| SchemaError::MissingKey {
                    key: "op".to_string(),
                    context: context.to_string(),
                })?,
                "op",
            )?)?;
            conditions.push(Condition { attr, op, value: cmap.get("value").cloned() });
        }
    }
    Ok(MatchSpec { logic, conditions })
}

fn parse_demand(v: &AttrValue, context: &str) -> Result<Demand, Error> {
    let map = as_map(v, context)?;
    check_keys(
        map,
        &[
            "source", "sink", "volume", "demand", "priority", "mode", "group_mode", "policy",
            "flow_policy", "attrs",
        ],
        context,
    )?;
    let source = parse_selector(
        map.get("source").ok_or_else(|| SchemaError::MissingKey {
            key: "source".to_string(),
            context: context.to_string(),
        })?,
        "source",
    )?;
    let sink = parse_selector(
        map.get("sink").ok_or_else(|| SchemaError::MissingKey {
            key: "sink".to_string(),
            context: context.to_string(),
        })?,
        "sink",
    )?;
    let volume = match map.get("volume").or_else(|| map.get("demand")) {
        Some(v) => as_f64(v, "volume")?,
        None => {
            return Err(SchemaError::MissingKey {
                key: "volume".to_string(),
                context: context.to_string(),
            }
            .into())
        }
    };
    let mut demand = Demand { source, sink, volume, ..Default::default() };
    if let Some(p) = map.get("priority") {
        demand.priority = as_f64(p, "priority")? as i64;
    }
    if let Some(m) = map.get("mode") {
        demand.mode = match as_str(m, "mode")?.as_str() {
            "pairwise" => DemandMode::Pairwise,
            "combine" => DemandMode::Combine,
            other => {
                return Err(SchemaError::UnknownKeyword {
                    key: "mode".to_string(),
                    allowed: "pairwise, combine",
                    found: other.to_string(),
                }
                .into())
            }
        };
    }
    if let Some(g) = map.get("group_mode") {
        demand.group_mode = match as_str(g, "group_mode")?.as_str() {
            "flatten" => GroupMode::Flatten,
            "per_group" => GroupMode::PerGroup,
            "group_pairwise" => GroupMode::GroupPairwise,
            other => {
                return Err(SchemaError::UnknownKeyword {
                    key: "group_mode".to_string(),
                    allowed: "flatten, per_group, group_pairwise",
                    found: other.to_string(),
                }
                .into())
            }
        };
    }
    if let Some(p) = map.get("policy").or_else(|| map.get("flow_policy")) {
        demand.policy = FlowPolicyConfig::parse(&as_str(p, "policy")?)?;
    }
    demand.attrs = attrs_of(map, "attrs")?;
    Ok(demand)
}

fn parse_failure_policy(v: &AttrValue, context: &str) -> Result<FailurePolicy, Error> {
    let map = as_map(v, context)?;
    check_keys(map, &["attrs", "expand_groups", "expand_children", "modes"], context)?;
    let mut policy = FailurePolicy {
        attrs: attrs_of(map, "attrs")?,
        ..Default::default()
    };
    if let Some(b) = map.get("expand_groups") {
        policy.expand_groups = as_bool(b, "expand_groups")?;
    }
    if let Some(b) = map.get("expand_children") {
        policy.expand_children = as_bool(b, "expand_children")?;
    }
    if let Some(modes) = map.get("modes") {
        for (i, item) in as_list(modes, "modes")?.iter().enumerate() {
            let mctx = format!("{}.modes[{}]", context, i);
            let mmap = as_map(item, &mctx)?;
            check_keys(mmap, &["weight", "attrs", "rules"], &mctx)?;
            let weight = match mmap.get("weight") {
                Some(w) => as_f64(w, "weight")?,
                None => 1.0,
            };
            let mut rules = Vec::new();
            if let Some(rlist) = mmap.get("rules") {
                for (j, rule) in as_list(rlist, "rules")?.iter().enumerate() {
                    rules.push(parse_failure_rule(rule, &format!("{}.rules[{}]", mctx, j))?);
                }
            }
            policy.modes.push(FailureMode {
                weight,
                attrs: attrs_of(mmap, "attrs")?,
                rules,
            });
        }
    }
    policy.validate()?;
    Ok(policy)
}

fn parse_failure_rule(v: &AttrValue, context: &str) -> Result<FailureRule, Error> {
    let map = as_map(v, context)?;
    check_keys(
        map,
        &["scope", "entity_scope", "path", "match", "mode", "rule_type", "probability", "count",
          "weight_by"],
        context,
    )?;
    let scope_str = match map.get("scope").or_else(|| map.get("entity_scope")) {
        Some(s) => as_str(s, "scope")?,
        None => {
            return Err(SchemaError::MissingKey {
                key: "scope".to_string(),
                context: context.to_string(),
            }
            .into())
        }
    };
    let scope = match scope_str.as_str() {
        "node" => RuleScope::Node,
        "link" => RuleScope::Link,
        "risk_group" => RuleScope::RiskGroup,
        other => {
            return Err(SchemaError::UnknownKeyword {
                key: "scope".to_string(),
                allowed: "node, link, risk_group",
                found: other.to_string(),
            }
            .into())
        }
    };
    let mode_str = match map.get("mode").or_else(|| map.get("rule_type")) {
        Some(m) => as_str(m, "mode")?,
        None => "all".to_string(),
    };
    let weight_by = match map.get("weight_by") {
        Some(w) => Some(as_str(w, "weight_by")?),
        None => None,
    };
    let mode = match mode_str.as_str() {
        "all" => RuleMode::All,
        "choice" => RuleMode::Choice {
            count: match map.get("count") {
                Some(c) => as_usize(c, "count")?,
                None => 1,
            },
            weight_by: weight_by.clone(),
        },
        "random" => {
            if weight_by.is_some() {
                return Err(crate::error::ConfigurationError::WeightByOnRandom.into());
            }
            RuleMode::Random {
                probability: match map.get("probability") {
                    Some(p) => as_f64(p, "probability")?,
                    None => {
                        return Err(
                            crate::error::ConfigurationError::RandomWithoutProbability.into()
                        )
                    }
                },
            }
        }
        other => {
            return Err(SchemaError::UnknownKeyword {
                key: "mode".to_string(),
                allowed: "all, choice, random",
                found: other.to_string(),
            }
            .into())
        }
    };
    let match_spec = match map.get("match") {
        Some(m) => Some(parse_match(m, context)?),
        None => None,
    };
    let path = match map.get("path") {
        Some(p) => Some(as_str(p, "path")?),
        None => None,
    };
    Ok(FailureRule { scope, path, match_spec, mode })
}

// ---------------------------------------------------------------------------
// network section
// ---------------------------------------------------------------------------

fn parse_link_params(map: &Attrs, context: &str) -> Result<LinkParams, Error> {
    let mut params = LinkParams::default();
    check_keys(map, &["capacity", "cost", "disabled", "risk_groups", "attrs"], context)?;
    if let Some(c) = map.get("capacity") {
        params.capacity = as_f64(c, "capacity")?;
    }
    if let Some(c) = map.get("cost") {
        params.cost = as_f64(c, "cost")?;
    }
    if let Some(d) = map.get("disabled") {
        params.disabled = as_bool(d, "disabled")?;
    }
    if let Some(r) = map.get("risk_groups") {
        params.risk_groups = string_list(r, "risk_groups")?;
    }
    params.attrs = attrs_of(map, "attrs")?;
    Ok(params)
}

fn parse_node_decl(v: &AttrValue, context: &str) -> Result<NodeDecl, Error> {
    let map = as_map(v, context)?;
    check_keys(map, &["attrs", "disabled", "risk_groups"], context)?;
    let mut decl = NodeDecl {
        attrs: attrs_of(map, "attrs")?,
        ..Default::default()
    };
    if let Some(d) = map.get("disabled") {
        decl.disabled = as_bool(d, "disabled")?;
    }
    if let Some(r) = map.get("risk_groups") {
        decl.risk_groups = string_list(r, "risk_groups")?;
    }
    Ok(decl)
}

fn parse_group_decl(v: &AttrValue, context: &str) -> Result<GroupDecl, Error> {
    let map = as_map(v, context)?;
    check_keys(
        map,
        &[
            "node_count", "name_template", "use_blueprint", "params", "groups", "attrs",
            "disabled", "risk_groups",
        ],
        context,
    )?;
    let kind = if let Some(bp) = map.get("use_blueprint") {
        let mut params = BTreeMap::new();
        if let Some(p) = map.get("params") {
            for (k, v) in as_map(p, "params")? {
                params.insert(k.clone(), v.clone());
            }
        }
        GroupKind::Blueprint { blueprint: as_str(bp, "use_blueprint")?, params }
    } else if let Some(n) = map.get("node_count") {
        GroupKind::Leaf {
            node_count: as_usize(n, "node_count")?,
            name_template: match map.get("name_template") {
                Some(t) => Some(as_str(t, "name_template")?),
                None => None,
            },
        }
    } else if let Some(groups) = map.get("groups") {
        GroupKind::Nested { groups: parse_groups(groups, context)? }
    } else {
        return Err(SchemaError::MissingKey {
            key: "node_count | use_blueprint | groups".to_string(),
            context: context.to_string(),
        }
        .into());
    };
    let mut decl = GroupDecl {
        kind,
        attrs: attrs_of(map, "attrs")?,
        disabled: false,
        risk_groups: Vec::new(),
    };
    if let Some(d) = map.get("disabled") {
        decl.disabled = as_bool(d, "disabled")?;
    }
    if let Some(r) = map.get("risk_groups") {
        decl.risk_groups = string_list(r, "risk_groups")?;
    }
    Ok(decl)
}

fn parse_groups(v: &AttrValue, context: &str) -> Result<Vec<(String, GroupDecl)>, Error> {
    let map = as_map(v, "groups")?;
    let mut out = Vec::new();
    for (name, decl) in map {
        out.push((name.clone(), parse_group_decl(decl, &format!("{}.{}", context, name))?));
    }
    Ok(out)
}

fn parse_adjacency(v: &AttrValue, context: &str) -> Result<AdjacencyDecl, Error> {
    let map = as_map(v, context)?;
    check_keys(
        map,
        &["source", "target", "pattern", "count", "link_params", "expand"],
        context,
    )?;
    let source = parse_selector(
        map.get("source").ok_or_else(|| SchemaError::MissingKey {
            key: "source".to_string(),
            context: context.to_string(),
        })?,
        "source",
    )?;
    let target = parse_selector(
        map.get("target").ok_or_else(|| SchemaError::MissingKey {
            key: "target".to_string(),
            context: context.to_string(),
        })?,
        "target",
    )?;
    let pattern = match map.get("pattern") {
        Some(p) => match as_str(p, "pattern")?.as_str() {
            "mesh" => AdjPattern::Mesh,
            "one_to_one" => AdjPattern::OneToOne,
            other => {
                return Err(SchemaError::UnknownKeyword {
                    key: "pattern".to_string(),
                    allowed: "mesh, one_to_one",
                    found: other.to_string(),
                }
                .into())
            }
        },
        None => AdjPattern::Mesh,
    };
    let count = match map.get("count") {
        Some(c) => as_usize(c, "count")?,
        None => 1,
    };
    let params = match map.get("link_params") {
        Some(p) => parse_link_params(as_map(p, "link_params")?, context)?,
        None => LinkParams::default(),
    };
    let expand = match map.get("expand") {
        Some(e) => Some(parse_expand_block(e, context)?),
        None => None,
    };
    Ok(AdjacencyDecl { source, target, pattern, count, params, expand })
}

fn parse_expand_block(v: &AttrValue, context: &str) -> Result<ExpandBlock, Error> {
    let map = as_map(v, "expand")?;
    check_keys(map, &["vars", "mode"], context)?;
    let mut vars = BTreeMap::new();
    if let Some(vmap) = map.get("vars") {
        for (name, list) in as_map(vmap, "vars")? {
            vars.insert(name.clone(), var_list(list));
        }
    }
    let mode = match map.get("mode") {
        Some(m) => match as_str(m, "mode")?.as_str() {
            "cartesian" => ExpandMode::Cartesian,
            "zip" => ExpandMode::Zip,
            other => {
                return Err(SchemaError::UnknownKeyword {
                    key: "mode".to_string(),
                    allowed: "cartesian, zip",
                    found: other.to_string(),
                }
                .into())
            }
        },
        None => ExpandMode::Cartesian,
    };
    Ok(ExpandBlock { vars, mode })
}

fn var_list(v: &AttrValue) -> Vec<AttrValue> {
    match v {
        AttrValue::List(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn parse_link_decl(v: &AttrValue, context: &str) -> Result<LinkDecl, Error> {
    let map = as_map(v, context)?;
    check_keys(map, &["source", "target", "link_params", "count"], context)?;
    let source = as_str(
        map.get("source").ok_or_else(|| SchemaError::MissingKey {
            key: "source".to_string(),
            context: context.to_string(),
        })?,
        "source",
    )?;
    let target = as_str(
        map.get("target").ok_or_else(|| SchemaError::MissingKey {
            key: "target".to_string(),
            context: context.to_string(),
        })?,
        "target",
    )?;
    let params = match map.get("link_params") {
        Some(p) => parse_link_params(as_map(p, "link_params")?, context)?,
        None => LinkParams::default(),
    };
    let count = match map.get("count") {
        Some(c) => as_usize(c, "count")?,
        None => 1,
    };
    Ok(LinkDecl { source, target, params, count })
}

fn parse_node_override(v: &AttrValue, context: &str) -> Result<NodeOverride, Error> {
    let map = as_map(v, context)?;
    check_keys(
        map,
        &["path", "match", "group_by", "active_only", "attrs", "disabled", "risk_groups"],
        context,
    )?;
    let selector_value = AttrValue::Map(
        map.iter()
            .filter(|(k, _)| matches!(k.as_str(), "path" | "match" | "group_by" | "active_only"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    );
    let selector = parse_selector(&selector_value, context)?;
    let mut over = NodeOverride {
        selector,
        attrs: attrs_of(map, "attrs")?,
        disabled: None,
        risk_groups: Vec::new(),
    };
    if let Some(d) = map.get("disabled") {
        over.disabled = Some(as_bool(d, "disabled")?);
    }
    if let Some(r) = map.get("risk_groups") {
        over.risk_groups = string_list(r, "risk_groups")?;
    }
    Ok(over)
}

fn parse_link_override(v: &AttrValue, context: &str) -> Result<LinkOverride, Error> {
    let map = as_map(v, context)?;
    check_keys(
        map,
        &[
            "source", "target", "match", "any_direction", "capacity", "cost", "disabled",
            "risk_groups", "attrs",
        ],
        context,
    )?;
    let mut over = LinkOverride {
        source: None,
        target: None,
        match_spec: None,
        any_direction: false,
        capacity: None,
        cost: None,
        disabled: None,
        risk_groups: Vec::new(),
        attrs: attrs_of(map, "attrs")?,
    };
    if let Some(s) = map.get("source") {
        over.source = Some(as_str(s, "source")?);
    }
    if let Some(t) = map.get("target") {
        over.target = Some(as_str(t, "target")?);
    }
    if let Some(m) = map.get("match") {
        over.match_spec = Some(parse_match(m, context)?);
    }
    if let Some(a) = map.get("any_direction") {
        over.any_direction = as_bool(a, "any_direction")?;
    }
    if let Some(c) = map.get("capacity") {
        over.capacity = Some(as_f64(c, "capacity")?);
    }
    if let Some(c) = map.get("cost") {
        over.cost = Some(as_f64(c, "cost")?);
    }
    if let Some(d) = map.get("disabled") {
        over.disabled = Some(as_bool(d, "disabled")?);
    }
    if let Some(r) = map.get("risk_groups") {
        over.risk_groups = string_list(r, "risk_groups")?;
    }
    Ok(over)
}

fn parse_network(v: &AttrValue) -> Result<NetworkDecl, Error> {
    let map = as_map(v, "network")?;
    check_keys(
        map,
        &[
            "name", "version", "nodes", "groups", "links", "adjacency", "node_overrides",
            "link_overrides",
        ],
        "network",
    )?;
    let mut decl = NetworkDecl::default();
    if let Some(n) = map.get("name") {
        decl.name = Some(as_str(n, "name")?);
    }
    if let Some(nodes) = map.get("nodes") {
        for (name, node) in as_map(nodes, "nodes")? {
            decl.nodes.push((
                name.clone(),
                if node.is_null() {
                    NodeDecl::default()
                } else {
                    parse_node_decl(node, &format!("network.nodes.{}", name))?
                },
            ));
        }
    }
    if let Some(groups) = map.get("groups") {
        decl.groups = parse_groups(groups, "network.groups")?;
    }
    if let Some(links) = map.get("links") {
        for (i, link) in as_list(links, "links")?.iter().enumerate() {
            decl.links.push(parse_link_decl(link, &format!("network.links[{}]", i))?);
        }
    }
    if let Some(adj) = map.get("adjacency") {
        for (i, a) in as_list(adj, "adjacency")?.iter().enumerate() {
            decl.adjacency.push(parse_adjacency(a, &format!("network.adjacency[{}]", i))?);
        }
    }
    if let Some(overrides) = map.get("node_overrides") {
        for (i, o) in as_list(overrides, "node_overrides")?.iter().enumerate() {
            decl.node_overrides
                .push(parse_node_override(o, &format!("network.node_overrides[{}]", i))?);
        }
    }
    if let Some(overrides) = map.get("link_overrides") {
        for (i, o) in as_list(overrides, "link_overrides")?.iter().enumerate() {
            decl.link_overrides
                .push(parse_link_override(o, &format!("network.link_overrides[{}]", i))?);
        }
    }
    Ok(decl)
}

fn parse_risk_groups(v: &AttrValue) -> Result<Vec<RiskGroupDecl>, Error> {
    let mut out = Vec::new();
    for (i, item) in as_list(v, "risk_groups")?.iter().enumerate() {
        let context = format!("risk_groups[{}]", i);
        let map = as_map(item, &context)?;
        if map.contains_key("generate") {
            check_keys(map, &["generate"], &context)?;
            let gmap = as_map(&map["generate"], "generate")?;
            check_keys(gmap, &["scope", "attr", "path", "template"], &context)?;
            let scope = match gmap.get("scope") {
                Some(s) => match as_str(s, "scope")?.as_str() {
                    "node" => RuleScope::Node,
                    "link" => RuleScope::Link,
                    other => {
                        return Err(SchemaError::UnknownKeyword {
                            key: "scope".to_string(),
                            allowed: "node, link",
                            found: other.to_string(),
                        }
                        .into())
                    }
                },
                None => RuleScope::Link,
            };
            out.push(RiskGroupDecl::Generate(GenerateBlock {
                scope,
                attr: as_str(
                    gmap.get("attr").ok_or_else(|| SchemaError::MissingKey {
                        key: "attr".to_string(),
                        context: context.clone(),
                    })?,
                    "attr",
                )?,
                path: match gmap.get("path") {
                    Some(p) => Some(as_str(p, "path")?),
                    None => None,
                },
                template: match gmap.get("template") {
                    Some(t) => Some(as_str(t, "template")?),
                    None => None,
                },
            }));
        } else {
            out.push(RiskGroupDecl::Direct(parse_risk_group_def(item, &context)?));
        }
    }
    Ok(out)
}

fn parse_risk_group_def(v: &AttrValue, context: &str) -> Result<RiskGroupDef, Error> {
    let map = as_map(v, context)?;
    check_keys(map, &["name", "children", "attrs", "membership"], context)?;
    let name = as_str(
        map.get("name").ok_or_else(|| SchemaError::MissingKey {
            key: "name".to_string(),
            context: context.to_string(),
        })?,
        "name",
    )?;
    let mut def = RiskGroupDef {
        name,
        children: Vec::new(),
        attrs: attrs_of(map, "attrs")?,
        membership: Vec::new(),
    };
    if let Some(children) = map.get("children") {
        for (i, child) in as_list(children, "children")?.iter().enumerate() {
            def.children
                .push(parse_risk_group_def(child, &format!("{}.children[{}]", context, i))?);
        }
    }
    if let Some(rules) = map.get("membership") {
        for (i, rule) in as_list(rules, "membership")?.iter().enumerate() {
            let rctx = format!("{}.membership[{}]", context, i);
            let rmap = as_map(rule, &rctx)?;
            check_keys(rmap, &["scope", "path", "match"], &rctx)?;
            let scope = match rmap.get("scope") {
                Some(s) => match as_str(s, "scope")?.as_str() {
                    "node" => RuleScope::Node,
                    "link" => RuleScope::Link,
                    other => {
                        return Err(SchemaError::UnknownKeyword {
                            key: "scope".to_string(),
                            allowed: "node, link",
                            found: other.to_string(),
                        }
                        .into())
                    }
                },
                None => RuleScope::Link,
            };
            def.membership.push(MembershipRule {
                scope,
                path: match rmap.get("path") {
                    Some(p) => Some(as_str(p, "path")?),
                    None => None,
                },
                match_spec: match rmap.get("match") {
                    Some(m) => Some(parse_match(m, &rctx)?),
                    None => None,
                },
            });
        }
    }
    Ok(def)
}

impl Scenario {
    /// Validate a parsed scenario tree and produce the typed declarations.
    pub fn from_value(doc: &AttrValue) -> Result<Scenario, Error> {
        let map = as_map(doc, "document")?;
        check_keys(
            map,
            &[
                "network", "blueprints", "components", "risk_groups", "vars", "demands",
                "traffic_matrix_set", "failures", "failure_policy_set", "workflow", "seed",
            ],
            "document",
        )?;
        let mut scenario = Scenario::default();

        if let Some(seed) = map.get("seed") {
            scenario.seed = Some(as_f64(seed, "seed")? as u64);
        }
        if let Some(vars) = map.get("vars") {
            for (name, list) in as_map(vars, "vars")? {
                scenario.vars.insert(name.clone(), var_list(list));
            }
        }
        if let Some(network) = map.get("network") {
            scenario.network = parse_network(network)?;
        }
        if let Some(blueprints) = map.get("blueprints") {
            for (name, bp) in as_map(blueprints, "blueprints")? {
                let context = format!("blueprints.{}", name);
                let bmap = as_map(bp, &context)?;
                check_keys(bmap, &["groups", "adjacency"], &context)?;
                let mut decl = BlueprintDecl::default();
                if let Some(groups) = bmap.get("groups") {
                    decl.groups = parse_groups(groups, &context)?;
                }
                if let Some(adj) = bmap.get("adjacency") {
                    for (i, a) in as_list(adj, "adjacency")?.iter().enumerate() {
                        decl.adjacency
                            .push(parse_adjacency(a, &format!("{}.adjacency[{}]", context, i))?);
                    }
                }
                scenario.blueprints.insert(name.clone(), decl);
            }
        }
        if let Some(components) = map.get("components") {
            scenario.components = as_map(components, "components")?.clone();
        }
        if let Some(risk_groups) = map.get("risk_groups") {
            scenario.risk_groups = parse_risk_groups(risk_groups)?;
        }
        let demands = map.get("demands").or_else(|| map.get("traffic_matrix_set"));
        if let Some(demands) = demands {
            for (matrix, list) in as_map(demands, "demands")? {
                let mut parsed = Vec::new();
                for (i, d) in as_list(list, matrix)?.iter().enumerate() {
                    parsed.push(parse_demand(d, &format!("demands.{}[{}]", matrix, i))?);
                }
                scenario.demands.insert(matrix.clone(), parsed);
            }
        }
        let failures = map.get("failures").or_else(|| map.get("failure_policy_set"));
        if let Some(failures) = failures {
            for (name, policy) in as_map(failures, "failures")? {
                scenario
                    .failures
                    .insert(name.clone(), parse_failure_policy(policy, &format!("failures.{}", name))?);
            }
        }
        if let Some(workflow) = map.get("workflow") {
            scenario.workflow = crate::workflow::parse_workflow(workflow)?;
        }
        Ok(scenario)
    }
}
