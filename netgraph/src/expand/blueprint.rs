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

//! Recursive group materialization: leaf groups produce nodes, blueprint references instantiate
//! a sub-topology at their path (with dot-path parameter overrides applied first), nested
//! groups just extend the path.

use crate::error::{Error, SchemaError, ValidationError};
use crate::expand::pattern::{expand_brackets, render_name_template, DEFAULT_NAME_TEMPLATE};
use crate::expand::riskres;
use crate::scenario::{AdjacencyDecl, BlueprintDecl, GroupDecl, GroupKind};
use crate::topology::{Network, Node};
use crate::types::{Attrs, AttrValue};
use regex::escape;
use std::collections::BTreeMap;

/// Guard against blueprint reference cycles
const MAX_BLUEPRINT_DEPTH: usize = 16;

/// Values flowing from parent groups into children. Child-specific values override per key;
/// risk groups accumulate; a disabled parent disables the whole subtree.
#[derive(Debug, Clone, Default)]
pub(crate) struct Inherited {
    pub(crate) attrs: Attrs,
    pub(crate) disabled: bool,
    pub(crate) risk_groups: Vec<String>,
}

impl Inherited {
    fn merge(&self, decl: &GroupDecl) -> Inherited {
        let mut attrs = self.attrs.clone();
        for (k, v) in &decl.attrs {
            attrs.insert(k.clone(), v.clone());
        }
        let mut risk_groups = self.risk_groups.clone();
        risk_groups.extend(decl.risk_groups.iter().cloned());
        Inherited { attrs, disabled: self.disabled || decl.disabled, risk_groups }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn materialize_groups(
    net: &mut Network,
    groups: &[(String, GroupDecl)],
    base_path: &str,
    blueprints: &BTreeMap<String, BlueprintDecl>,
    inherited: &Inherited,
    adjacency_out: &mut Vec<AdjacencyDecl>,
    depth: usize,
) -> Result<(), Error> {
    if depth > MAX_BLUEPRINT_DEPTH {
        return Err(ValidationError::UndefinedBlueprint(format!(
            "blueprint nesting deeper than {} at {}",
            MAX_BLUEPRINT_DEPTH, base_path
        ))
        .into());
    }
    for (pattern, decl) in groups {
        for group_name in expand_brackets(pattern)? {
            let path = if base_path.is_empty() {
                group_name.clone()
            } else {
                format!("{}/{}", base_path, group_name)
            };
            let scope = inherited.merge(decl);
            match &decl.kind {
                GroupKind::Leaf { node_count, name_template } => {
                    let template =
                        name_template.as_deref().unwrap_or(DEFAULT_NAME_TEMPLATE);
                    // an expanded pattern may contain path separators; nodes are named after
                    // the innermost segment
                    let leaf_group =
                        group_name.rsplit('/').next().unwrap_or(group_name.as_str());
                    for n in 1..=*node_count {
                        let leaf = render_name_template(template, leaf_group, n);
                        let mut node = Node::new(format!("{}/{}", path, leaf));
                        node.attrs = scope.attrs.clone();
                        node.disabled = scope.disabled;
                        node.risk_groups = riskres::expand_membership(&scope.risk_groups)?;
                        net.add_node(node)?;
                    }
                }
                GroupKind::Blueprint { blueprint, params } => {
                    let bp = blueprints
                        .get(blueprint)
                        .ok_or_else(|| ValidationError::UndefinedBlueprint(blueprint.clone()))?;
                    let bp = apply_params(bp, params)?;
                    materialize_groups(
                        net,
                        &bp.groups,
                        &path,
                        blueprints,
                        &scope,
                        adjacency_out,
                        depth + 1,
                    )?;
                    for adj in &bp.adjacency {
                        adjacency_out.push(prefix_adjacency(adj, &path));
                    }
                }
                GroupKind::Nested { groups } => {
                    materialize_groups(
                        net,
                        groups,
                        &path,
                        blueprints,
                        &scope,
                        adjacency_out,
                        depth + 1,
                    )?;
                }
            }
        }
    }
    Ok(())
}

/// Apply dot-path parameter overrides to a blueprint's configuration before recursion. The
/// first path segment names a group of the blueprint; the rest addresses a field of that group
/// (`node_count`, `name_template`, `disabled`, `risk_groups`, or `attrs.<path>`), descends into
/// a nested group, or lands in the params of a nested blueprint reference.
pub(crate) fn apply_params(
    bp: &BlueprintDecl,
    params: &BTreeMap<String, AttrValue>,
) -> Result<BlueprintDecl, Error> {
    let mut bp = bp.clone();
    for (path, value) in params {
        let (group, rest) = match path.split_once('.') {
            Some((g, r)) => (g, r),
            None => {
                return Err(SchemaError::UnknownKey {
                    key: path.clone(),
                    context: "params".to_string(),
                }
                .into())
            }
        };
        let decl = bp
            .groups
            .iter_mut()
            .find(|(name, _)| name == group)
            .map(|(_, d)| d)
            .ok_or_else(|| SchemaError::UnknownKey {
                key: group.to_string(),
                context: "params".to_string(),
            })?;
        apply_group_param(decl, rest, value)?;
    }
    Ok(bp)
}

fn apply_group_param(decl: &mut GroupDecl, path: &str, value: &AttrValue) -> Result<(), Error> {
    match path {
        "node_count" => {
            if let GroupKind::Leaf { node_count, .. } = &mut decl.kind {
                *node_count = value.as_usize().ok_or_else(|| SchemaError::WrongType {
                    key: "node_count".to_string(),
                    expected: "a non-negative integer",
                    found: value.type_name(),
                })?;
                return Ok(());
            }
        }
        "name_template" => {
            if let GroupKind::Leaf { name_template, .. } = &mut decl.kind {
                *name_template = Some(value.as_str().map(|s| s.to_string()).ok_or_else(|| {
                    SchemaError::WrongType {
                        key: "name_template".to_string(),
                        expected: "a string",
                        found: value.type_name(),
                    }
                })?);
                return Ok(());
            }
        }
        "disabled" => {
            decl.disabled = value.as_bool().ok_or_else(|| SchemaError::WrongType {
                key: "disabled".to_string(),
                expected: "a boolean",
                found: value.type_name(),
            })?;
            return Ok(());
        }
        _ => {}
    }
    if let Some(rest) = path.strip_prefix("attrs.") {
        let mut bag = AttrValue::Map(std::mem::take(&mut decl.attrs));
        bag.set_path(rest, value.clone());
        if let AttrValue::Map(m) = bag {
            decl.attrs = m;
        }
        return Ok(());
    }
    // descend into nested structure
    if let Some((head, rest)) = path.split_once('.') {
        match &mut decl.kind {
            GroupKind::Nested { groups } => {
                if let Some((_, child)) = groups.iter_mut().find(|(name, _)| name == head) {
                    return apply_group_param(child, rest, value);
                }
            }
            GroupKind::Blueprint { params, .. } => {
                params.insert(format!("{}.{}", head, rest), value.clone());
                return Ok(());
            }
            GroupKind::Leaf { .. } => {}
        }
    } else if let GroupKind::Blueprint { params, .. } = &mut decl.kind {
        params.insert(path.to_string(), value.clone());
        return Ok(());
    }
    Err(SchemaError::UnknownKey { key: path.to_string(), context: "params".to_string() }.into())
}

/// Rebase a blueprint-level adjacency onto the instantiation path: selector paths become
/// anchored under the instance, with regex metacharacters of the path escaped.
pub(crate) fn prefix_adjacency(adj: &AdjacencyDecl, path: &str) -> AdjacencyDecl {
    let mut out = adj.clone();
    out.source.path = out.source.path.map(|p| rebase_path(&p, path));
    out.target.path = out.target.path.map(|p| rebase_path(&p, path));
    out
}

fn rebase_path(relative: &str, base: &str) -> String {
    let rel = relative.strip_prefix('/').unwrap_or(relative);
    format!("{}/{}", escape(base), rel)
}
