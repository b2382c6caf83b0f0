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

//! Tests for selector resolution: grouping, ordering, condition operators and context
//! defaults.

use crate::error::SelectorError;
use crate::selectors::{
    select_links, select_nodes, CondOp, Condition, Logic, MatchSpec, Selector, SelectorCtx,
};
use crate::topology::{Link, Network, Node};
use crate::types::AttrValue;

fn fabric() -> Network {
    let mut net = Network::new();
    for (name, role, tier) in &[
        ("pod1/leaf/leaf-1", "leaf", 1i64),
        ("pod1/leaf/leaf-2", "leaf", 1),
        ("pod1/spine/spine-1", "spine", 2),
        ("pod2/leaf/leaf-1", "leaf", 1),
        ("pod2/spine/spine-1", "spine", 2),
    ] {
        let mut node = Node::new(*name);
        node.attrs.insert("role".to_string(), AttrValue::Str((*role).to_string()));
        node.attrs.insert("tier".to_string(), AttrValue::Int(*tier));
        net.add_node(node).unwrap();
    }
    let mut disabled = Node::new("pod1/leaf/leaf-3");
    disabled.attrs.insert("role".to_string(), AttrValue::Str("leaf".to_string()));
    disabled.disabled = true;
    net.add_node(disabled).unwrap();
    net.add_link(Link::new("pod1/leaf/leaf-1", "pod1/spine/spine-1", 10.0, 1.0)).unwrap();
    net.add_link(Link::new("pod2/leaf/leaf-1", "pod2/spine/spine-1", 20.0, 1.0)).unwrap();
    net.finish().unwrap();
    net
}

#[test]
fn capture_groups_partition_the_selection() {
    let net = fabric();
    let sel = Selector::path(r"(pod[0-9]+)/leaf");
    let groups = select_nodes(&net, &sel, SelectorCtx::Adjacency).unwrap();
    let keys: Vec<&str> = groups.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["pod1", "pod2"]);
    assert_eq!(groups["pod1"].len(), 3);
    assert_eq!(groups["pod2"].len(), 1);
}

#[test]
fn group_by_attribute_overrides_captures() {
    let net = fabric();
    let sel = Selector {
        path: Some(r"(pod[0-9]+)".to_string()),
        group_by: Some("role".to_string()),
        ..Default::default()
    };
    let groups = select_nodes(&net, &sel, SelectorCtx::Adjacency).unwrap();
    let keys: Vec<&str> = groups.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["leaf", "spine"]);
}

#[test]
fn leading_slash_is_cosmetic() {
    let net = fabric();
    let with = select_nodes(&net, &Selector::path("/pod1/leaf"), SelectorCtx::Adjacency).unwrap();
    let without = select_nodes(&net, &Selector::path("pod1/leaf"), SelectorCtx::Adjacency).unwrap();
    assert_eq!(with, without);
}

#[test]
fn active_only_defaults_per_context() {
    let net = fabric();
    let sel = Selector::path("pod1/leaf");
    // adjacency keeps disabled entities
    let adjacency = select_nodes(&net, &sel, SelectorCtx::Adjacency).unwrap();
    assert_eq!(adjacency[""].len(), 3);
    // demand selection filters them
    let demand = select_nodes(&net, &sel, SelectorCtx::Demand).unwrap();
    assert_eq!(demand[""].len(), 2);
}

#[test]
fn resolution_is_idempotent() {
    let net = fabric();
    let sel = Selector::path(r"(pod[0-9]+)/leaf");
    let first = select_nodes(&net, &sel, SelectorCtx::Demand).unwrap();
    let second = select_nodes(&net, &sel, SelectorCtx::Demand).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_selector_is_an_error_outside_failure_contexts() {
    let net = fabric();
    let sel = Selector::default();
    assert!(matches!(
        select_nodes(&net, &sel, SelectorCtx::Demand),
        Err(SelectorError::Empty)
    ));
    // failure rules select the whole universe instead
    let all = select_nodes(&net, &sel, SelectorCtx::FailureRule).unwrap();
    assert_eq!(all[""].len(), 6);
}

fn cond(attr: &str, op: CondOp, value: Option<AttrValue>) -> Condition {
    Condition { attr: attr.to_string(), op, value }
}

#[test]
fn condition_operators() {
    let net = fabric();
    let select = |conditions: Vec<Condition>, logic: Option<Logic>| {
        let sel = Selector {
            path: Some(".*".to_string()),
            match_spec: Some(MatchSpec { logic, conditions }),
            ..Default::default()
        };
        select_nodes(&net, &sel, SelectorCtx::Adjacency)
            .unwrap()
            .values()
            .map(|v| v.len())
            .sum::<usize>()
    };

    assert_eq!(select(vec![cond("role", CondOp::Eq, Some("spine".into()))], None), 2);
    assert_eq!(select(vec![cond("tier", CondOp::Gt, Some(AttrValue::Int(1)))], None), 2);
    assert_eq!(select(vec![cond("tier", CondOp::Le, Some(AttrValue::Float(1.0)))], None), 3);
    assert_eq!(select(vec![cond("role", CondOp::Contains, Some("pin".into()))], None), 2);
    assert_eq!(
        select(
            vec![cond(
                "role",
                CondOp::In,
                Some(AttrValue::List(vec!["leaf".into(), "spine".into()]))
            )],
            None
        ),
        6
    );
    assert_eq!(select(vec![cond("tier", CondOp::Exists, None)], None), 5);
    assert_eq!(select(vec![cond("tier", CondOp::NotExists, None)], None), 1);

    // or-logic unions, and-logic intersects
    let both = vec![
        cond("role", CondOp::Eq, Some("spine".into())),
        cond("tier", CondOp::Eq, Some(AttrValue::Int(1))),
    ];
    assert_eq!(select(both.clone(), Some(Logic::Or)), 5);
    assert_eq!(select(both, Some(Logic::And)), 0);
}

#[test]
fn link_selection_uses_stable_identifiers() {
    let net = fabric();
    let sel = Selector::path(r"pod1/");
    let groups = select_links(&net, &sel, SelectorCtx::Adjacency).unwrap();
    let ids: Vec<String> = groups
        .values()
        .flatten()
        .map(|id| net.link(*id).id.clone())
        .collect();
    assert_eq!(ids, vec!["pod1/leaf/leaf-1|pod1/spine/spine-1|0"]);
}

#[test]
fn link_condition_on_capacity() {
    let net = fabric();
    let sel = Selector {
        match_spec: Some(MatchSpec {
            logic: None,
            conditions: vec![cond("capacity", CondOp::Ge, Some(AttrValue::Float(15.0)))],
        }),
        ..Default::default()
    };
    let groups = select_links(&net, &sel, SelectorCtx::FailureRule).unwrap();
    let total: usize = groups.values().map(|v| v.len()).sum();
    assert_eq!(total, 1);
}
