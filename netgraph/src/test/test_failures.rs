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

//! Tests for the failure policy engine: mode weighting, rule sampling and risk-group
//! expansion.

use crate::error::ConfigurationError;
use crate::failures::{
    FailureMode, FailurePolicy, FailureRule, RuleMode, RuleScope,
};
use crate::topology::{Link, Network, Node, RiskGroup};
use crate::types::AttrValue;
use rand::prelude::*;
use std::collections::BTreeSet;

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn rule(scope: RuleScope, mode: RuleMode) -> FailureRule {
    FailureRule { scope, path: None, match_spec: None, mode }
}

fn single_mode(rules: Vec<FailureRule>) -> FailurePolicy {
    FailurePolicy {
        modes: vec![FailureMode { weight: 1.0, attrs: Default::default(), rules }],
        ..Default::default()
    }
}

/// Nodes a..d; links a-b and c-d in group G, a-c outside of it.
fn risk_net() -> Network {
    let mut net = Network::new();
    for n in &["a", "b", "c", "d"] {
        net.add_node(Node::new(*n)).unwrap();
    }
    net.add_risk_group(RiskGroup::new("G")).unwrap();
    let mut l1 = Link::new("a", "b", 1.0, 1.0);
    l1.risk_groups.insert("G".to_string());
    net.add_link(l1).unwrap();
    let mut l2 = Link::new("c", "d", 1.0, 1.0);
    l2.risk_groups.insert("G".to_string());
    net.add_link(l2).unwrap();
    net.add_link(Link::new("a", "c", 1.0, 1.0)).unwrap();
    net.finish().unwrap();
    net
}

#[test]
fn all_rule_fails_every_match() {
    let net = risk_net();
    let policy = single_mode(vec![rule(RuleScope::Link, RuleMode::All)]);
    let (failed, trace) = policy.apply(&net, &mut rng(1));
    assert_eq!(failed.links.len(), 3);
    assert!(failed.nodes.is_empty());
    assert_eq!(trace.unwrap().rules[0].selected.len(), 3);
}

#[test]
fn shared_risk_groups_expand_the_failure() {
    let net = risk_net();
    let mut policy = single_mode(vec![FailureRule {
        scope: RuleScope::Link,
        path: Some(r"a\|b\|0$".to_string()),
        match_spec: None,
        mode: RuleMode::All,
    }]);
    policy.expand_groups = true;
    let (failed, _) = policy.apply(&net, &mut rng(1));

    let ids: BTreeSet<String> =
        failed.links.iter().map(|l| net.link(*l).id.clone()).collect();
    assert!(ids.contains("a|b|0"));
    // every other member of G fails too
    assert!(ids.contains("c|d|0"));
    // the link outside the group survives
    assert!(!ids.contains("a|c|0"));
}

#[test]
fn risk_group_scope_fails_members_and_descendants() {
    let mut net = Network::new();
    for n in &["x", "y"] {
        net.add_node(Node::new(*n)).unwrap();
    }
    let mut parent = RiskGroup::new("parent");
    parent.children.push("child".to_string());
    net.add_risk_group(parent).unwrap();
    net.add_risk_group(RiskGroup::new("child")).unwrap();
    let mut link = Link::new("x", "y", 1.0, 1.0);
    link.risk_groups.insert("child".to_string());
    net.add_link(link).unwrap();
    net.finish().unwrap();

    let mut policy = single_mode(vec![FailureRule {
        scope: RuleScope::RiskGroup,
        path: Some("parent$".to_string()),
        match_spec: None,
        mode: RuleMode::All,
    }]);

    // without expand_children only the (memberless) parent fails
    let (failed, _) = policy.apply(&net, &mut rng(3));
    assert!(failed.is_empty());

    policy.expand_children = true;
    let (failed, _) = policy.apply(&net, &mut rng(3));
    assert_eq!(failed.links.len(), 1);
}

#[test]
fn mode_selection_honors_weights() {
    let net = risk_net();
    let policy = FailurePolicy {
        modes: vec![
            FailureMode { weight: 0.0, attrs: Default::default(), rules: vec![] },
            FailureMode {
                weight: 1.0,
                attrs: Default::default(),
                rules: vec![rule(RuleScope::Node, RuleMode::All)],
            },
        ],
        ..Default::default()
    };
    for seed in 0..32 {
        let (_, trace) = policy.apply(&net, &mut rng(seed));
        assert_eq!(trace.unwrap().mode, 1);
    }
}

#[test]
fn all_non_positive_weights_select_the_first_mode() {
    let net = risk_net();
    let policy = FailurePolicy {
        modes: vec![
            FailureMode { weight: 0.0, attrs: Default::default(), rules: vec![] },
            FailureMode { weight: -1.0, attrs: Default::default(), rules: vec![] },
        ],
        ..Default::default()
    };
    let (_, trace) = policy.apply(&net, &mut rng(9));
    assert_eq!(trace.unwrap().mode, 0);
}

#[test]
fn choice_samples_without_replacement() {
    let net = risk_net();
    let policy = single_mode(vec![rule(
        RuleScope::Link,
        RuleMode::Choice { count: 2, weight_by: None },
    )]);
    for seed in 0..16 {
        let (failed, _) = policy.apply(&net, &mut rng(seed));
        assert_eq!(failed.links.len(), 2);
    }
}

#[test]
fn choice_is_deterministic_per_seed() {
    let net = risk_net();
    let policy = single_mode(vec![rule(
        RuleScope::Link,
        RuleMode::Choice { count: 1, weight_by: None },
    )]);
    let (a, _) = policy.apply(&net, &mut rng(11));
    let (b, _) = policy.apply(&net, &mut rng(11));
    assert_eq!(a, b);
}

#[test]
fn weighted_choice_prefers_heavy_entities() {
    let mut net = Network::new();
    for n in &["u", "v"] {
        net.add_node(Node::new(*n)).unwrap();
    }
    let mut heavy = Link::new("u", "v", 1.0, 1.0);
    heavy.attrs.insert("w".to_string(), AttrValue::Float(50.0));
    net.add_link(heavy).unwrap();
    let mut light = Link::new("u", "v", 1.0, 1.0);
    light.attrs.insert("w".to_string(), AttrValue::Float(0.1));
    net.add_link(light).unwrap();
    // no weight at all: sampled only after the positively weighted ones
    net.add_link(Link::new("u", "v", 1.0, 1.0)).unwrap();
    net.finish().unwrap();

    let policy = single_mode(vec![rule(
        RuleScope::Link,
        RuleMode::Choice { count: 1, weight_by: Some("w".to_string()) },
    )]);

    let mut heavy_hits = 0;
    let mut unweighted_hits = 0;
    for seed in 0..200 {
        let (failed, _) = policy.apply(&net, &mut rng(seed));
        let id = net.link(*failed.links.iter().next().unwrap()).id.clone();
        if id == "u|v|0" {
            heavy_hits += 1;
        }
        if id == "u|v|2" {
            unweighted_hits += 1;
        }
    }
    assert!(heavy_hits > 150, "heavy link picked only {} times", heavy_hits);
    // weightless entities are drawn only when the positive ones do not fill the count
    assert_eq!(unweighted_hits, 0);
}

#[test]
fn random_rule_extremes() {
    let net = risk_net();
    let none = single_mode(vec![rule(RuleScope::Link, RuleMode::Random { probability: 0.0 })]);
    let (failed, _) = none.apply(&net, &mut rng(5));
    assert!(failed.is_empty());

    let all = single_mode(vec![rule(RuleScope::Link, RuleMode::Random { probability: 1.0 })]);
    let (failed, _) = all.apply(&net, &mut rng(5));
    assert_eq!(failed.links.len(), 3);
}

#[test]
fn invalid_policies_are_rejected() {
    let bad_probability =
        single_mode(vec![rule(RuleScope::Link, RuleMode::Random { probability: 1.5 })]);
    assert!(matches!(
        bad_probability.validate(),
        Err(ConfigurationError::InvalidProbability(_))
    ));

    let bad_weight = FailurePolicy {
        modes: vec![FailureMode { weight: f64::NAN, attrs: Default::default(), rules: vec![] }],
        ..Default::default()
    };
    assert!(matches!(
        bad_weight.validate(),
        Err(ConfigurationError::InvalidModeWeight(_))
    ));
}

#[test]
fn canonical_key_is_sorted_and_stable() {
    let net = risk_net();
    let policy = single_mode(vec![rule(RuleScope::Link, RuleMode::All)]);
    let (failed, _) = policy.apply(&net, &mut rng(2));
    let key = failed.canonical_key(&net);
    assert_eq!(key, "nodes[]|links[a|b|0,a|c|0,c|d|0]");
}
