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

//! Post-build rules rewriting attributes, disabled flags and risk-group membership of already
//! materialized entities.

use crate::error::{Error, SelectorError};
use crate::expand::riskres;
use crate::scenario::{LinkOverride, NodeOverride};
use crate::selectors::{select_nodes, SelectorCtx};
use crate::topology::Network;
use crate::types::LinkId;
use log::*;
use regex::Regex;

pub(crate) fn apply_node_overrides(
    net: &mut Network,
    overrides: &[NodeOverride],
) -> Result<(), Error> {
    for over in overrides {
        let groups = select_nodes(net, &over.selector, SelectorCtx::Override)?;
        let targets: Vec<_> = groups.into_iter().flat_map(|(_, v)| v).collect();
        if targets.is_empty() {
            warn!("node override matched no nodes");
            continue;
        }
        let extra = riskres::expand_membership(&over.risk_groups)?;
        for id in targets {
            let node = net.node_mut(id);
            for (k, v) in &over.attrs {
                node.attrs.insert(k.clone(), v.clone());
            }
            if let Some(disabled) = over.disabled {
                node.disabled = disabled;
            }
            node.risk_groups.extend(extra.iter().cloned());
        }
    }
    Ok(())
}

fn anchored(path: &str) -> Result<Regex, SelectorError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    Regex::new(&format!("^(?:{})", trimmed))
        .map_err(|e| SelectorError::InvalidRegex(path.to_string(), e.to_string()))
}

pub(crate) fn apply_link_overrides(
    net: &mut Network,
    overrides: &[LinkOverride],
) -> Result<(), Error> {
    for over in overrides {
        let match_all = Regex::new("^").unwrap_or_else(|_| unreachable!());
        let src_re = match &over.source {
            Some(p) => anchored(p)?,
            None => match_all.clone(),
        };
        let dst_re = match &over.target {
            Some(p) => anchored(p)?,
            None => match_all,
        };
        let mut targets: Vec<LinkId> = net.find_links(&src_re, &dst_re, over.any_direction);
        if let Some(spec) = &over.match_spec {
            // same default as node overrides: rule contexts combine with `or`
            let logic = spec.logic.unwrap_or(crate::selectors::Logic::Or);
            targets.retain(|id| {
                spec.conditions.is_empty()
                    || match logic {
                        crate::selectors::Logic::And => spec.conditions.iter().all(|c| {
                            c.eval(crate::selectors::link_attr(net, *id, &c.attr).as_ref())
                        }),
                        crate::selectors::Logic::Or => spec.conditions.iter().any(|c| {
                            c.eval(crate::selectors::link_attr(net, *id, &c.attr).as_ref())
                        }),
                    }
            });
        }
        if targets.is_empty() {
            warn!("link override matched no links");
            continue;
        }
        let extra = riskres::expand_membership(&over.risk_groups)?;
        for id in targets {
            let link = net.link_mut(id);
            if let Some(capacity) = over.capacity {
                link.capacity = capacity;
            }
            if let Some(cost) = over.cost {
                link.cost = cost;
            }
            if let Some(disabled) = over.disabled {
                link.disabled = disabled;
            }
            for (k, v) in &over.attrs {
                link.attrs.insert(k.clone(), v.clone());
            }
            link.risk_groups.extend(extra.iter().cloned());
        }
    }
    Ok(())
}
