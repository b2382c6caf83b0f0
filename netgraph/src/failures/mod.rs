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

//! # Failure Policy Engine
//!
//! A failure policy holds a weighted set of *modes*; each iteration samples exactly one mode and
//! applies its rules, producing the set of failed entities. Selection is a pure function of
//! (policy, graph, PRNG state) — seeding is external, which is what makes Monte Carlo runs
//! reproducible.

use crate::error::ConfigurationError;
use crate::selectors::{select_links, select_nodes, select_risk_groups, MatchSpec, Selector, SelectorCtx};
use crate::topology::Network;
use crate::types::{AttrValue, Attrs, LinkId, NodeId};
use log::*;
use rand::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

/// Entity universe a rule draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Fail nodes
    Node,
    /// Fail links
    Link,
    /// Fail whole risk groups (their members, and with `expand_children` their descendants)
    RiskGroup,
}

/// How a rule turns its matches into failures
#[derive(Debug, Clone, PartialEq)]
pub enum RuleMode {
    /// Include every match
    All,
    /// Sample `count` matches without replacement. With `weight_by`, weighted sampling
    /// (Efraimidis–Spirakis) over the named attribute; entities with non-positive or missing
    /// weight are drawn uniformly after the positively weighted ones.
    Choice {
        /// Number of entities to fail
        count: usize,
        /// Attribute supplying the sampling weight
        weight_by: Option<String>,
    },
    /// Select each match independently with the given probability
    Random {
        /// Bernoulli probability, in [0, 1]
        probability: f64,
    },
}

/// One failure rule: a scoped entity selection plus a sampling mode.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRule {
    /// Entity universe
    pub scope: RuleScope,
    /// Optional path regex pre-filter
    pub path: Option<String>,
    /// Optional attribute predicate
    pub match_spec: Option<MatchSpec>,
    /// Sampling mode
    pub mode: RuleMode,
}

/// One weighted failure mode. Weights need not be normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureMode {
    /// Relative selection weight; non-positive modes are never chosen
    pub weight: f64,
    /// Free-form attributes (carried through to traces)
    pub attrs: Attrs,
    /// Rules applied when this mode is selected
    pub rules: Vec<FailureRule>,
}

/// A complete failure policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailurePolicy {
    /// Free-form attributes
    pub attrs: Attrs,
    /// Close the failed set over shared risk-group membership
    pub expand_groups: bool,
    /// Failing a risk group recursively fails its descendants
    pub expand_children: bool,
    /// The weighted failure modes
    pub modes: Vec<FailureMode>,
}

/// Entities failed in one iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureSet {
    /// Failed nodes
    pub nodes: BTreeSet<NodeId>,
    /// Failed links
    pub links: BTreeSet<LinkId>,
}

impl FailureSet {
    /// True when nothing failed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Canonical representation of the failure pattern, used for deduplicating Monte Carlo
    /// iterations. Sorted node names, then sorted link identifiers.
    pub fn canonical_key(&self, net: &Network) -> String {
        let nodes: Vec<String> =
            self.nodes.iter().map(|n| net.node(*n).name.clone()).collect();
        let links: Vec<String> = self.links.iter().map(|l| net.link(*l).id.clone()).collect();
        // BTreeSet iterates in id order; names follow id order for nodes but not for links,
        // so sort both by name for a stable key.
        let mut nodes = nodes;
        let mut links = links;
        nodes.sort();
        links.sort();
        format!("nodes[{}]|links[{}]", nodes.join(","), links.join(","))
    }
}

/// Which mode and rules produced a failure pattern.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailureTrace {
    /// Index of the sampled mode
    pub mode: usize,
    /// Attributes of the sampled mode
    pub mode_attrs: Attrs,
    /// Entities selected per rule, in rule order
    pub rules: Vec<RuleTrace>,
}

/// Entities one rule selected.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RuleTrace {
    /// Rule index within the mode
    pub rule: usize,
    /// Names (nodes, risk groups) or identifiers (links) of the selected entities
    pub selected: Vec<String>,
}

impl FailurePolicy {
    /// Check policy consistency: probabilities in range, finite weights, and no `weight_by` on
    /// `random` rules.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for mode in &self.modes {
            if !mode.weight.is_finite() {
                return Err(ConfigurationError::InvalidModeWeight(mode.weight));
            }
            for rule in &mode.rules {
                if let RuleMode::Random { probability } = rule.mode {
                    if !(0.0..=1.0).contains(&probability) {
                        return Err(ConfigurationError::InvalidProbability(probability));
                    }
                }
            }
        }
        Ok(())
    }

    /// Run one iteration of the policy: sample a mode, apply its rules, expand risk groups.
    pub fn apply(
        &self,
        net: &Network,
        rng: &mut StdRng,
    ) -> (FailureSet, Option<FailureTrace>) {
        let mode_idx = match self.sample_mode(rng) {
            Some(i) => i,
            None => return (FailureSet::default(), None),
        };
        let mode = &self.modes[mode_idx];
        let mut failed = FailureSet::default();
        let mut failed_groups: BTreeSet<String> = BTreeSet::new();
        let mut traces = Vec::with_capacity(mode.rules.len());

        for (rule_idx, rule) in mode.rules.iter().enumerate() {
            let selected = apply_rule(net, rule, rng);
            match &selected {
                Selected::Nodes(nodes) => failed.nodes.extend(nodes.iter().copied()),
                Selected::Links(links) => failed.links.extend(links.iter().copied()),
                Selected::Groups(groups) => failed_groups.extend(groups.iter().cloned()),
            }
            traces.push(RuleTrace { rule: rule_idx, selected: selected.names(net) });
        }

        // risk-group failures fail their members
        if self.expand_children {
            for group in failed_groups.clone() {
                failed_groups.extend(net.risk_group_descendants(&group));
            }
        }
        for group in &failed_groups {
            failed.nodes.extend(net.risk_group_nodes(group));
            failed.links.extend(net.risk_group_links(group));
        }

        if self.expand_groups {
            expand_shared_risk(net, &mut failed);
        }

        let trace = FailureTrace { mode: mode_idx, mode_attrs: mode.attrs.clone(), rules: traces };
        (failed, Some(trace))
    }

    /// Weighted mode choice with normalized weights. Modes with non-positive weight are never
    /// chosen; when every weight is non-positive the first mode is used.
    fn sample_mode(&self, rng: &mut StdRng) -> Option<usize> {
        if self.modes.is_empty() {
            return None;
        }
        let total: f64 = self.modes.iter().map(|m| m.weight.max(0.0)).sum();
        if total <= 0.0 {
            return Some(0);
        }
        let mut r = rng.gen::<f64>() * total;
        for (i, mode) in self.modes.iter().enumerate() {
            let w = mode.weight.max(0.0);
            if w <= 0.0 {
                continue;
            }
            if r < w {
                return Some(i);
            }
            r -= w;
        }
        // floating point slack lands on the last positively weighted mode
        self.modes
            .iter()
            .rposition(|m| m.weight > 0.0)
            .or(Some(0))
    }
}

enum Selected {
    Nodes(Vec<NodeId>),
    Links(Vec<LinkId>),
    Groups(Vec<String>),
}

impl Selected {
    fn names(&self, net: &Network) -> Vec<String> {
        match self {
            Selected::Nodes(nodes) => nodes.iter().map(|n| net.node(*n).name.clone()).collect(),
            Selected::Links(links) => links.iter().map(|l| net.link(*l).id.clone()).collect(),
            Selected::Groups(groups) => groups.clone(),
        }
    }
}

fn rule_selector(rule: &FailureRule) -> Selector {
    Selector {
        path: rule.path.clone(),
        match_spec: rule.match_spec.clone(),
        group_by: None,
        active_only: None,
    }
}

fn apply_rule(net: &Network, rule: &FailureRule, rng: &mut StdRng) -> Selected {
    let selector = rule_selector(rule);
    match rule.scope {
        RuleScope::Node => {
            let groups = match select_nodes(net, &selector, SelectorCtx::FailureRule) {
                Ok(g) => g,
                Err(e) => {
                    warn!("failure rule node selection failed: {}", e);
                    return Selected::Nodes(Vec::new());
                }
            };
            let mut matches: Vec<NodeId> = groups.into_iter().flat_map(|(_, v)| v).collect();
            matches.sort_by(|a, b| net.node(*a).name.cmp(&net.node(*b).name));
            matches.dedup();
            Selected::Nodes(sample(matches, &rule.mode, rng, |id| {
                weight_of(rule, |attr| crate::selectors::node_attr(net, *id, attr))
            }))
        }
        RuleScope::Link => {
            let groups = match select_links(net, &selector, SelectorCtx::FailureRule) {
                Ok(g) => g,
                Err(e) => {
                    warn!("failure rule link selection failed: {}", e);
                    return Selected::Links(Vec::new());
                }
            };
            let mut matches: Vec<LinkId> = groups.into_iter().flat_map(|(_, v)| v).collect();
            matches.sort_by(|a, b| net.link(*a).id.cmp(&net.link(*b).id));
            matches.dedup();
            Selected::Links(sample(matches, &rule.mode, rng, |id| {
                weight_of(rule, |attr| crate::selectors::link_attr(net, *id, attr))
            }))
        }
        RuleScope::RiskGroup => {
            let matches = match select_risk_groups(net, &selector, SelectorCtx::FailureRule) {
                Ok(g) => g,
                Err(e) => {
                    warn!("failure rule risk-group selection failed: {}", e);
                    return Selected::Groups(Vec::new());
                }
            };
            Selected::Groups(sample(matches, &rule.mode, rng, |name| {
                weight_of(rule, |attr| {
                    net.risk_group(name)
                        .and_then(|g| AttrValue::Map(g.attrs.clone()).get_path(attr).cloned())
                })
            }))
        }
    }
}

fn weight_of(
    rule: &FailureRule,
    attr_of: impl Fn(&str) -> Option<AttrValue>,
) -> Option<f64> {
    match &rule.mode {
        RuleMode::Choice { weight_by: Some(attr), .. } => {
            attr_of(attr).and_then(|v| v.as_f64())
        }
        _ => None,
    }
}

/// Apply the rule's sampling mode to the ordered match list.
fn sample<T: Clone>(
    matches: Vec<T>,
    mode: &RuleMode,
    rng: &mut StdRng,
    weight: impl Fn(&T) -> Option<f64>,
) -> Vec<T> {
    match mode {
        RuleMode::All => matches,
        RuleMode::Random { probability } => matches
            .into_iter()
            .filter(|_| rng.gen::<f64>() < *probability)
            .collect(),
        RuleMode::Choice { count, weight_by } => {
            let count = (*count).min(matches.len());
            if weight_by.is_none() {
                let picked = rand::seq::index::sample(rng, matches.len(), count);
                let mut indices: Vec<usize> = picked.into_iter().collect();
                indices.sort_unstable();
                return indices.into_iter().map(|i| matches[i].clone()).collect();
            }
            // Efraimidis-Spirakis: rank positively weighted entities by u^(1/w); everything
            // else comes after, in a uniformly random order.
            let mut positive: Vec<(f64, usize)> = Vec::new();
            let mut rest: Vec<(f64, usize)> = Vec::new();
            for (i, item) in matches.iter().enumerate() {
                let u: f64 = rng.gen();
                match weight(item) {
                    Some(w) if w > 0.0 => positive.push((u.powf(1.0 / w), i)),
                    _ => rest.push((u, i)),
                }
            }
            positive.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
            rest.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
            let mut indices: Vec<usize> = positive
                .into_iter()
                .chain(rest.into_iter())
                .take(count)
                .map(|(_, i)| i)
                .collect();
            indices.sort_unstable();
            indices.into_iter().map(|i| matches[i].clone()).collect()
        }
    }
}

/// BFS closure over shared risk-group membership: any entity sharing a group with a failed
/// entity fails too.
fn expand_shared_risk(net: &Network, failed: &mut FailureSet) {
    let mut processed: BTreeSet<String> = BTreeSet::new();
    loop {
        let mut groups: BTreeSet<String> = BTreeSet::new();
        for n in &failed.nodes {
            groups.extend(net.node(*n).risk_groups.iter().cloned());
        }
        for l in &failed.links {
            groups.extend(net.link(*l).risk_groups.iter().cloned());
        }
        let fresh: Vec<String> = groups.difference(&processed).cloned().collect();
        if fresh.is_empty() {
            return;
        }
        for group in fresh {
            failed.nodes.extend(net.risk_group_nodes(&group));
            failed.links.extend(net.risk_group_links(&group));
            processed.insert(group);
        }
    }
}
