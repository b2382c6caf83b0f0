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

//! Risk-group resolution: direct definitions (bracket-expanded, nested), condition-based
//! membership rules, and auto-generation of one group per unique attribute value.

use crate::error::{Error, ExpansionError};
use crate::expand::pattern::expand_brackets;
use crate::failures::RuleScope;
use crate::scenario::{GenerateBlock, MembershipRule, RiskGroupDecl, RiskGroupDef};
use crate::selectors::{
    link_attr, node_attr, select_links, select_nodes, Selector, SelectorCtx,
};
use crate::topology::{Network, RiskGroup};
use crate::types::{AttrValue, LinkId, NodeId};
use log::*;
use std::collections::BTreeSet;

/// Bracket-expand a risk-group membership array into the set of referenced group names.
pub(crate) fn expand_membership(
    patterns: &[String],
) -> Result<BTreeSet<String>, ExpansionError> {
    let mut out = BTreeSet::new();
    for pattern in patterns {
        out.extend(expand_brackets(pattern)?);
    }
    Ok(out)
}

pub(crate) fn resolve_risk_groups(
    net: &mut Network,
    decls: &[RiskGroupDecl],
) -> Result<(), Error> {
    // direct definitions first, so membership rules and references can resolve
    for decl in decls {
        if let RiskGroupDecl::Direct(def) = decl {
            declare_group(net, def, None)?;
        }
    }
    for decl in decls {
        match decl {
            RiskGroupDecl::Direct(def) => apply_membership(net, def)?,
            RiskGroupDecl::Generate(block) => generate_groups(net, block)?,
        }
    }
    Ok(())
}

/// Declare a definition (and its children) under every bracket-expanded name.
fn declare_group(
    net: &mut Network,
    def: &RiskGroupDef,
    parent: Option<&str>,
) -> Result<(), Error> {
    for name in expand_brackets(&def.name)? {
        let mut children = Vec::new();
        for child in &def.children {
            children.extend(expand_brackets(&child.name)?);
        }
        net.add_risk_group(RiskGroup {
            name: name.clone(),
            parent: parent.map(|p| p.to_string()),
            children,
            attrs: def.attrs.clone(),
        })?;
        for child in &def.children {
            declare_group(net, child, Some(&name))?;
        }
    }
    Ok(())
}

fn rule_selector(rule: &MembershipRule) -> Selector {
    Selector {
        path: rule.path.clone(),
        match_spec: rule.match_spec.clone(),
        group_by: None,
        active_only: None,
    }
}

/// Apply the membership rules of a definition to every group it expanded into.
fn apply_membership(net: &mut Network, def: &RiskGroupDef) -> Result<(), Error> {
    let names = expand_brackets(&def.name)?;
    for rule in &def.membership {
        let selector = rule_selector(rule);
        match rule.scope {
            RuleScope::Node => {
                let groups = select_nodes(net, &selector, SelectorCtx::MembershipRule)?;
                let ids: Vec<NodeId> = groups.into_iter().flat_map(|(_, v)| v).collect();
                if ids.is_empty() {
                    warn!("membership rule for `{}` matched no nodes", def.name);
                }
                for id in ids {
                    for name in &names {
                        net.node_mut(id).risk_groups.insert(name.clone());
                    }
                }
            }
            RuleScope::Link | RuleScope::RiskGroup => {
                let groups = select_links(net, &selector, SelectorCtx::MembershipRule)?;
                let ids: Vec<LinkId> = groups.into_iter().flat_map(|(_, v)| v).collect();
                if ids.is_empty() {
                    warn!("membership rule for `{}` matched no links", def.name);
                }
                for id in ids {
                    for name in &names {
                        net.link_mut(id).risk_groups.insert(name.clone());
                    }
                }
            }
        }
    }
    for child in &def.children {
        apply_membership(net, child)?;
    }
    Ok(())
}

/// One group per unique attribute value among the entities matching the optional path filter.
fn generate_groups(net: &mut Network, block: &GenerateBlock) -> Result<(), Error> {
    let template = block.template.as_deref().unwrap_or("{attr}-{value}");
    let selector = Selector {
        path: block.path.clone(),
        match_spec: None,
        group_by: None,
        active_only: None,
    };
    let mut assignments: Vec<(String, Vec<NodeId>, Vec<LinkId>)> = Vec::new();
    match block.scope {
        RuleScope::Node => {
            let groups = select_nodes(net, &selector, SelectorCtx::Generate)?;
            let ids: Vec<NodeId> = groups.into_iter().flat_map(|(_, v)| v).collect();
            let mut by_value: std::collections::BTreeMap<String, Vec<NodeId>> =
                Default::default();
            for id in ids {
                if let Some(value) = node_attr(net, id, &block.attr) {
                    by_value.entry(group_name(template, &block.attr, &value)).or_default().push(id);
                }
            }
            for (name, ids) in by_value {
                assignments.push((name, ids, Vec::new()));
            }
        }
        RuleScope::Link | RuleScope::RiskGroup => {
            let groups = select_links(net, &selector, SelectorCtx::Generate)?;
            let ids: Vec<LinkId> = groups.into_iter().flat_map(|(_, v)| v).collect();
            let mut by_value: std::collections::BTreeMap<String, Vec<LinkId>> =
                Default::default();
            for id in ids {
                if let Some(value) = link_attr(net, id, &block.attr) {
                    by_value.entry(group_name(template, &block.attr, &value)).or_default().push(id);
                }
            }
            for (name, ids) in by_value {
                assignments.push((name, Vec::new(), ids));
            }
        }
    }
    if assignments.is_empty() {
        warn!("risk-group generate block on `{}` matched nothing", block.attr);
    }
    for (name, node_ids, link_ids) in assignments {
        if net.risk_group(&name).is_none() {
            net.add_risk_group(RiskGroup::new(name.clone()))?;
        }
        for id in node_ids {
            net.node_mut(id).risk_groups.insert(name.clone());
        }
        for id in link_ids {
            net.link_mut(id).risk_groups.insert(name.clone());
        }
    }
    Ok(())
}

fn group_name(template: &str, attr: &str, value: &AttrValue) -> String {
    template
        .replace("{attr}", attr)
        .replace("{value}", &value.to_key_string())
}
