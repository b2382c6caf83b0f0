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

//! Adjacency expansion: `mesh` and `one_to_one` link creation between selector groups, with
//! optional variable multiplication of the adjacency record itself.

use crate::error::{Error, ValidationError};
use crate::expand::riskres;
use crate::expand::vars::{expand_bindings, substitute, substitute_value, Bindings};
use crate::scenario::{AdjPattern, AdjacencyDecl, LinkDecl, LinkParams};
use crate::selectors::{select_nodes, SelectorCtx};
use crate::topology::{Link, Network};
use crate::types::{AttrValue, NodeId};
use itertools::iproduct;
use log::*;
use std::collections::BTreeMap;

/// Create the parallel copies of one direct link declaration.
pub(crate) fn create_direct_links(net: &mut Network, decl: &LinkDecl) -> Result<(), Error> {
    if net.node_id(&decl.source).is_none() {
        return Err(ValidationError::UnknownLinkEndpoint(decl.source.clone()).into());
    }
    if net.node_id(&decl.target).is_none() {
        return Err(ValidationError::UnknownLinkEndpoint(decl.target.clone()).into());
    }
    for _ in 0..decl.count.max(1) {
        add_link(net, &decl.source, &decl.target, &decl.params)?;
    }
    Ok(())
}

fn add_link(
    net: &mut Network,
    source: &str,
    target: &str,
    params: &LinkParams,
) -> Result<(), Error> {
    let mut link = Link::new(source, target, params.capacity, params.cost);
    link.disabled = params.disabled;
    link.risk_groups = riskres::expand_membership(&params.risk_groups)?;
    link.attrs = params.attrs.clone();
    net.add_link(link)?;
    Ok(())
}

/// Apply one adjacency rule. When an `expand` block is present the record is first multiplied
/// over the variable bindings (scenario-level `vars` provide defaults for names the block does
/// not bind); each resulting record then selects its groups and creates links.
pub(crate) fn apply_adjacency(
    net: &mut Network,
    adj: &AdjacencyDecl,
    scenario_vars: &BTreeMap<String, Vec<AttrValue>>,
) -> Result<(), Error> {
    let bindings: Vec<Bindings> = match &adj.expand {
        Some(block) => {
            let mut vars = scenario_vars.clone();
            for (k, v) in &block.vars {
                vars.insert(k.clone(), v.clone());
            }
            expand_bindings(&vars, block.mode)?
        }
        None => vec![Bindings::new()],
    };
    for binding in &bindings {
        let record = bind_record(adj, binding)?;
        apply_single(net, &record)?;
    }
    Ok(())
}

fn bind_record(adj: &AdjacencyDecl, binding: &Bindings) -> Result<AdjacencyDecl, Error> {
    if binding.is_empty() {
        return Ok(adj.clone());
    }
    let mut out = adj.clone();
    if let Some(p) = &out.source.path {
        out.source.path = Some(substitute(p, binding)?);
    }
    if let Some(p) = &out.target.path {
        out.target.path = Some(substitute(p, binding)?);
    }
    let attrs = AttrValue::Map(out.params.attrs.clone());
    if let AttrValue::Map(m) = substitute_value(&attrs, binding)? {
        out.params.attrs = m;
    }
    out.params.risk_groups = out
        .params
        .risk_groups
        .iter()
        .map(|r| substitute(r, binding))
        .collect::<Result<_, _>>()?;
    Ok(out)
}

fn apply_single(net: &mut Network, adj: &AdjacencyDecl) -> Result<(), Error> {
    let src_groups = select_nodes(net, &adj.source, SelectorCtx::Adjacency)?;
    let dst_groups = select_nodes(net, &adj.target, SelectorCtx::Adjacency)?;
    if src_groups.values().all(|g| g.is_empty()) || dst_groups.values().all(|g| g.is_empty()) {
        warn!("adjacency selectors matched no nodes, producing no links");
        return Ok(());
    }
    for srcs in src_groups.values() {
        for dsts in dst_groups.values() {
            if srcs.is_empty() || dsts.is_empty() {
                continue;
            }
            match adj.pattern {
                AdjPattern::Mesh => {
                    for (s, t) in iproduct!(srcs.iter(), dsts.iter()) {
                        if s == t {
                            continue;
                        }
                        create_pair(net, *s, *t, adj)?;
                    }
                }
                AdjPattern::OneToOne => {
                    let (m, n) = (srcs.len(), dsts.len());
                    let (lo, hi) = if m < n { (m, n) } else { (n, m) };
                    if lo == 0 || hi % lo != 0 {
                        return Err(ValidationError::OneToOneSizeMismatch(m, n).into());
                    }
                    for i in 0..hi {
                        let s = srcs[i % m];
                        let t = dsts[i % n];
                        if s == t {
                            continue;
                        }
                        create_pair(net, s, t, adj)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn create_pair(net: &mut Network, s: NodeId, t: NodeId, adj: &AdjacencyDecl) -> Result<(), Error> {
    let source = net.node(s).name.clone();
    let target = net.node(t).name.clone();
    for _ in 0..adj.count.max(1) {
        add_link(net, &source, &target, &adj.params)?;
    }
    Ok(())
}
