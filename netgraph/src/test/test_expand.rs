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

//! Tests for the blueprint expander: group materialization, parameter overrides, adjacency
//! patterns, post-build rules and risk-group resolution.

use crate::error::{Error, ValidationError};
use crate::example_networks::clos_scenario;
use crate::expand::expand;
use crate::scenario::Scenario;
use crate::topology::{Network, RiskGroup};
use crate::types::AttrValue;

fn doc(v: Vec<(&str, AttrValue)>) -> AttrValue {
    AttrValue::Map(v.into_iter().map(|(k, val)| (k.to_string(), val)).collect())
}

fn expand_doc(v: AttrValue) -> Result<Network, Error> {
    let scenario = Scenario::from_value(&v)?;
    expand(&scenario)
}

fn from_yaml_like(groups: AttrValue, extra: Vec<(&str, AttrValue)>) -> AttrValue {
    let mut network = vec![("groups", groups)];
    network.extend(extra);
    doc(vec![("network", doc(network))])
}

#[test]
fn bracket_groups_multiply() {
    let groups = doc(vec![(
        "dc[1-3]/rack[a,b]",
        doc(vec![("node_count", AttrValue::Int(2))]),
    )]);
    let net = expand_doc(from_yaml_like(groups, vec![])).unwrap();
    assert_eq!(net.num_nodes(), 12);
    assert!(net.node_id("dc1/racka/racka-1").is_some());
    assert!(net.node_id("dc3/rackb/rackb-2").is_some());
}

#[test]
fn name_template_numbering_is_one_based() {
    let groups = doc(vec![(
        "leaf",
        doc(vec![
            ("node_count", AttrValue::Int(2)),
            ("name_template", "sw{n}".into()),
        ]),
    )]);
    let net = expand_doc(from_yaml_like(groups, vec![])).unwrap();
    assert!(net.node_id("leaf/sw1").is_some());
    assert!(net.node_id("leaf/sw2").is_some());
}

#[test]
fn clos_blueprint_materializes_both_pods() {
    let net = expand_doc(clos_scenario(false)).unwrap();
    assert_eq!(net.num_nodes(), 12);
    // 4 leaves x 2 spines per pod
    assert_eq!(net.num_links(), 16);
    assert!(net.node_id("pod1/leaf/leaf-4").is_some());
    assert!(net.node_id("pod2/spine/spine-2").is_some());
}

#[test]
fn blueprint_params_override_nested_attrs() {
    let blueprint = doc(vec![(
        "bp1",
        doc(vec![(
            "groups",
            doc(vec![(
                "leaf",
                doc(vec![
                    ("node_count", AttrValue::Int(1)),
                    ("attrs", doc(vec![("x", doc(vec![("y", AttrValue::Int(111))]))])),
                ]),
            )]),
        )]),
    )]);
    let network = doc(vec![(
        "groups",
        doc(vec![(
            "Main",
            doc(vec![
                ("use_blueprint", "bp1".into()),
                (
                    "params",
                    doc(vec![("leaf.attrs.x.y", AttrValue::Int(999))]),
                ),
            ]),
        )]),
    )]);
    let net =
        expand_doc(doc(vec![("blueprints", blueprint), ("network", network)])).unwrap();
    let id = net.node_id("Main/leaf/leaf-1").unwrap();
    let attrs = AttrValue::Map(net.node(id).attrs.clone());
    assert_eq!(attrs.get_path("x.y"), Some(&AttrValue::Int(999)));
}

#[test]
fn undefined_blueprint_is_fatal() {
    let network = doc(vec![(
        "groups",
        doc(vec![("Main", doc(vec![("use_blueprint", "nope".into())]))]),
    )]);
    let err = expand_doc(doc(vec![("network", network)])).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UndefinedBlueprint(name)) if name == "nope"
    ));
}

#[test]
fn unknown_direct_link_endpoint_is_fatal() {
    let network = doc(vec![
        ("nodes", doc(vec![("A", AttrValue::Null)])),
        (
            "links",
            AttrValue::List(vec![doc(vec![
                ("source", "A".into()),
                ("target", "missing".into()),
            ])]),
        ),
    ]);
    let err = expand_doc(doc(vec![("network", network)])).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownLinkEndpoint(name)) if name == "missing"
    ));
}

fn one_to_one_doc(src_count: i64, dst_count: i64) -> AttrValue {
    let groups = doc(vec![
        ("left", doc(vec![("node_count", AttrValue::Int(src_count))])),
        ("right", doc(vec![("node_count", AttrValue::Int(dst_count))])),
    ]);
    from_yaml_like(
        groups,
        vec![(
            "adjacency",
            AttrValue::List(vec![doc(vec![
                ("source", "left/".into()),
                ("target", "right/".into()),
                ("pattern", "one_to_one".into()),
            ])]),
        )],
    )
}

#[test]
fn one_to_one_pairs_modulo_the_smaller_group() {
    let net = expand_doc(one_to_one_doc(4, 2)).unwrap();
    assert_eq!(net.num_links(), 4);
    assert!(net.link_id("left/left-1|right/right-1|0").is_some());
    assert!(net.link_id("left/left-3|right/right-1|0").is_some());
}

#[test]
fn one_to_one_size_mismatch_is_fatal() {
    let err = expand_doc(one_to_one_doc(3, 2)).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::OneToOneSizeMismatch(3, 2))
    ));
}

#[test]
fn adjacency_expand_block_multiplies_the_record() {
    let groups = doc(vec![
        ("plane1", doc(vec![("node_count", AttrValue::Int(1))])),
        ("plane2", doc(vec![("node_count", AttrValue::Int(1))])),
        ("core", doc(vec![("node_count", AttrValue::Int(1))])),
    ]);
    let adjacency = AttrValue::List(vec![doc(vec![
        ("source", "plane${p}/".into()),
        ("target", "core/".into()),
        (
            "expand",
            doc(vec![(
                "vars",
                doc(vec![(
                    "p",
                    AttrValue::List(vec![AttrValue::Int(1), AttrValue::Int(2)]),
                )]),
            )]),
        ),
    ])]);
    let net = expand_doc(from_yaml_like(groups, vec![("adjacency", adjacency)])).unwrap();
    assert_eq!(net.num_links(), 2);
    assert!(net.link_id("plane1/plane1-1|core/core-1|0").is_some());
    assert!(net.link_id("plane2/plane2-1|core/core-1|0").is_some());
}

#[test]
fn node_overrides_rewrite_matching_nodes() {
    let groups = doc(vec![("leaf", doc(vec![("node_count", AttrValue::Int(2))]))]);
    let overrides = AttrValue::List(vec![doc(vec![
        ("path", "leaf/leaf-1$".into()),
        ("attrs", doc(vec![("hw", "gen2".into())])),
        ("disabled", AttrValue::Bool(true)),
    ])]);
    let net =
        expand_doc(from_yaml_like(groups, vec![("node_overrides", overrides)])).unwrap();
    let id = net.node_id("leaf/leaf-1").unwrap();
    assert!(net.node(id).disabled);
    assert_eq!(net.node(id).attrs.get("hw"), Some(&AttrValue::Str("gen2".to_string())));
    assert!(!net.node(net.node_id("leaf/leaf-2").unwrap()).disabled);
}

#[test]
fn link_overrides_rewrite_matching_links() {
    let network = doc(vec![
        ("nodes", doc(vec![("A", AttrValue::Null), ("B", AttrValue::Null)])),
        (
            "links",
            AttrValue::List(vec![doc(vec![
                ("source", "A".into()),
                ("target", "B".into()),
                (
                    "link_params",
                    doc(vec![("capacity", AttrValue::Float(1.0))]),
                ),
            ])]),
        ),
        (
            "link_overrides",
            AttrValue::List(vec![doc(vec![
                ("source", "A$".into()),
                ("target", "B$".into()),
                ("capacity", AttrValue::Float(7.0)),
            ])]),
        ),
    ]);
    let net = expand_doc(doc(vec![("network", network)])).unwrap();
    let id = net.link_id("A|B|0").unwrap();
    assert_eq!(net.link(id).capacity, 7.0);
}

#[test]
fn link_override_conditions_default_to_or_logic() {
    let condition = |value: &str| {
        doc(vec![
            ("attr", "media".into()),
            ("op", "==".into()),
            ("value", value.into()),
        ])
    };
    let link = |media: &str| {
        doc(vec![
            ("source", "A".into()),
            ("target", "B".into()),
            (
                "link_params",
                doc(vec![
                    ("capacity", AttrValue::Float(1.0)),
                    ("attrs", doc(vec![("media", media.into())])),
                ]),
            ),
        ])
    };
    let network = doc(vec![
        ("nodes", doc(vec![("A", AttrValue::Null), ("B", AttrValue::Null)])),
        ("links", AttrValue::List(vec![link("fiber"), link("copper")])),
        (
            "link_overrides",
            AttrValue::List(vec![doc(vec![
                (
                    "match",
                    // two conditions, no `logic` key: rule contexts combine with `or`
                    doc(vec![(
                        "conditions",
                        AttrValue::List(vec![condition("fiber"), condition("copper")]),
                    )]),
                ),
                ("capacity", AttrValue::Float(9.0)),
            ])]),
        ),
    ]);
    let net = expand_doc(doc(vec![("network", network)])).unwrap();
    // each link satisfies only one of the two conditions; both must be rewritten
    assert_eq!(net.link(net.link_id("A|B|0").unwrap()).capacity, 9.0);
    assert_eq!(net.link(net.link_id("A|B|1").unwrap()).capacity, 9.0);
}

#[test]
fn risk_group_membership_and_generate_blocks() {
    let network = doc(vec![
        ("nodes", doc(vec![("A", AttrValue::Null), ("B", AttrValue::Null)])),
        (
            "links",
            AttrValue::List(vec![
                doc(vec![
                    ("source", "A".into()),
                    ("target", "B".into()),
                    (
                        "link_params",
                        doc(vec![("attrs", doc(vec![("media", "fiber".into())]))]),
                    ),
                ]),
                doc(vec![
                    ("source", "B".into()),
                    ("target", "A".into()),
                    (
                        "link_params",
                        doc(vec![("attrs", doc(vec![("media", "copper".into())]))]),
                    ),
                ]),
            ]),
        ),
    ]);
    let risk_groups = AttrValue::List(vec![
        doc(vec![
            ("name", "RG[1-2]".into()),
            (
                "membership",
                AttrValue::List(vec![doc(vec![
                    ("scope", "link".into()),
                    (
                        "match",
                        doc(vec![(
                            "conditions",
                            AttrValue::List(vec![doc(vec![
                                ("attr", "media".into()),
                                ("op", "==".into()),
                                ("value", "fiber".into()),
                            ])]),
                        )]),
                    ),
                ])]),
            ),
        ]),
        doc(vec![(
            "generate",
            doc(vec![("scope", "link".into()), ("attr", "media".into())]),
        )]),
    ]);
    let net =
        expand_doc(doc(vec![("network", network), ("risk_groups", risk_groups)])).unwrap();

    // bracket expansion declared RG1 and RG2, both with the fiber link as member
    assert!(net.risk_group("RG1").is_some());
    assert!(net.risk_group("RG2").is_some());
    let fiber = net.link_id("A|B|0").unwrap();
    assert!(net.link(fiber).risk_groups.contains("RG1"));
    assert!(net.link(fiber).risk_groups.contains("RG2"));

    // generate blocks created one group per distinct media value
    assert!(net.risk_group("media-fiber").is_some());
    assert!(net.risk_group("media-copper").is_some());
    let copper = net.link_id("B|A|0").unwrap();
    assert!(net.link(copper).risk_groups.contains("media-copper"));
}

#[test]
fn undeclared_risk_group_reference_is_fatal() {
    let network = doc(vec![(
        "nodes",
        doc(vec![("A", doc(vec![("risk_groups", "ghost".into())]))]),
    )]);
    let err = expand_doc(doc(vec![("network", network)])).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UndefinedRiskGroup(_, name)) if name == "ghost"
    ));
}

#[test]
fn risk_group_cycles_are_detected() {
    let mut net = Network::new();
    let mut a = RiskGroup::new("A");
    a.children.push("B".to_string());
    let mut b = RiskGroup::new("B");
    b.children.push("A".to_string());
    net.add_risk_group(a).unwrap();
    net.add_risk_group(b).unwrap();
    assert!(matches!(net.finish(), Err(ValidationError::RiskGroupCycle(_))));
}

#[test]
fn parent_attrs_flow_to_children_and_child_wins() {
    let groups = doc(vec![(
        "zone",
        doc(vec![
            ("attrs", doc(vec![("region", "east".into()), ("power", "a".into())])),
            (
                "groups",
                doc(vec![(
                    "leaf",
                    doc(vec![
                        ("node_count", AttrValue::Int(1)),
                        ("attrs", doc(vec![("power", "b".into())])),
                    ]),
                )]),
            ),
        ]),
    )]);
    let net = expand_doc(from_yaml_like(groups, vec![])).unwrap();
    let id = net.node_id("zone/leaf/leaf-1").unwrap();
    let attrs = &net.node(id).attrs;
    assert_eq!(attrs["region"], AttrValue::Str("east".to_string()));
    assert_eq!(attrs["power"], AttrValue::Str("b".to_string()));
}

#[test]
fn unknown_top_level_key_is_a_schema_error() {
    let err = expand_doc(doc(vec![("netwrk", doc(vec![]))])).unwrap_err();
    assert!(matches!(err, Error::Schema(_)));
}

#[test]
fn scenario_parse_accepts_boundary_aliases() {
    let value = doc(vec![
        ("network", doc(vec![("nodes", doc(vec![("A", AttrValue::Null)]))])),
        (
            "traffic_matrix_set",
            doc(vec![(
                "default",
                AttrValue::List(vec![doc(vec![
                    ("source", "A".into()),
                    ("sink", "A".into()),
                    ("demand", AttrValue::Float(1.0)),
                ])]),
            )]),
        ),
        ("failure_policy_set", doc(vec![("none", doc(vec![]))])),
    ]);
    let scenario = Scenario::from_value(&value).unwrap();
    assert!(scenario.demands.contains_key("default"));
    assert!(scenario.failures.contains_key("none"));
}
