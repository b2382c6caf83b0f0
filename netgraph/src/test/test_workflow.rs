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

//! End-to-end tests through the workflow driver: scenario in, results document out.

use crate::example_networks::{clos_scenario, msd_scenario, square_mesh_scenario};
use crate::expand::expand;
use crate::flow::{max_flow, FlowPolicy, FlowRequest};
use crate::scenario::Scenario;
use crate::selectors::{select_nodes, Selector, SelectorCtx};
use crate::topology::{Network, NetworkView};
use crate::types::NodeId;
use crate::{inspect_scenario, run_scenario, RunOptions};
use assert_approx_eq::assert_approx_eq;

fn leaf_set(net: &Network, pod: &str) -> Vec<NodeId> {
    let sel = Selector::path(format!("{}/leaf", pod));
    select_nodes(net, &sel, SelectorCtx::Workflow)
        .unwrap()
        .into_iter()
        .flat_map(|(_, v)| v)
        .collect()
}

fn pod_to_pod_flow(net: &Network) -> f64 {
    let sources = leaf_set(net, "pod1");
    let sinks = leaf_set(net, "pod2");
    let view = NetworkView::new(net);
    let req = FlowRequest {
        sources: &sources,
        sinks: &sinks,
        policy: FlowPolicy::default(),
        limit: None,
        spf: None,
    };
    max_flow(&view, &req, None).total_flow
}

#[test]
fn isolated_pods_carry_no_flow() {
    let scenario = Scenario::from_value(&clos_scenario(false)).unwrap();
    let net = expand(&scenario).unwrap();
    assert_approx_eq!(pod_to_pod_flow(&net), 0.0);
}

#[test]
fn interconnected_pods_carry_the_spine_capacity() {
    let scenario = Scenario::from_value(&clos_scenario(true)).unwrap();
    let net = expand(&scenario).unwrap();
    assert_approx_eq!(pod_to_pod_flow(&net), 800.0);
}

#[test]
fn inspect_summarizes_the_scenario() {
    let summary = inspect_scenario(&square_mesh_scenario()).unwrap();
    assert_eq!(summary.node_count, 4);
    assert_eq!(summary.link_count, 6);
    assert_eq!(summary.failure_policies, vec!["single_link".to_string()]);
    assert_eq!(summary.workflow, vec!["mf (MaxFlow)".to_string()]);
}

#[test]
fn square_mesh_workflow_baseline_and_failures() {
    let doc = run_scenario(&square_mesh_scenario(), RunOptions::default()).unwrap();
    assert_eq!(doc.steps.len(), 1);
    let step = doc.get("mf").unwrap();
    assert_eq!(step.metadata.step_type, "MaxFlow");

    let baseline = &step.data["baseline"];
    assert_approx_eq!(baseline["total_flow"].as_f64().unwrap(), 5.0);

    let results = step.data["results"].as_array().unwrap();
    assert!(!results.is_empty());
    for r in results {
        let flow = r["total_flow"].as_f64().unwrap();
        assert!((3.0..=5.0).contains(&flow));
        assert_eq!(r["failed_links"].as_array().unwrap().len(), 1);
    }
}

#[test]
fn workflow_output_is_deterministic() {
    let a = run_scenario(&square_mesh_scenario(), RunOptions::default()).unwrap();
    let b = run_scenario(&square_mesh_scenario(), RunOptions::default()).unwrap();
    // metadata carries wall-clock durations; the payloads must match bit for bit
    for (x, y) in a.steps.iter().zip(b.steps.iter()) {
        assert_eq!(
            serde_json::to_string(&x.data).unwrap(),
            serde_json::to_string(&y.data).unwrap()
        );
    }
}

#[test]
fn msd_brackets_and_bisects_to_the_boundary() {
    let doc = run_scenario(&msd_scenario(), RunOptions::default()).unwrap();

    let msd = doc.get("msd").unwrap();
    let alpha_star = msd.data["alpha_star"].as_f64().unwrap();
    assert!(
        (1.0..1.011).contains(&alpha_star),
        "alpha_star {} outside the expected bracket",
        alpha_star
    );
    let history = msd.data["history"].as_array().unwrap();
    // the first probe accepts at 1.0, the growth probe rejects at 2.0
    assert_eq!(history[0][1].as_bool().unwrap(), true);
    assert_eq!(history[1][1].as_bool().unwrap(), false);

    // alpha_star threads into the placement step
    let tm = doc.get("tm").unwrap();
    assert_approx_eq!(tm.data["alpha"].as_f64().unwrap(), alpha_star);
    let placed = tm.data["baseline"]["summary"]["placed"].as_f64().unwrap();
    assert_approx_eq!(placed, 10.0);
}

#[test]
fn referencing_an_unknown_step_fails_that_step_only() {
    use crate::example_networks::msd_scenario;
    let mut doc_value = msd_scenario();
    // rewire the placement step to a non-existent source step
    if let crate::types::AttrValue::Map(map) = &mut doc_value {
        if let Some(crate::types::AttrValue::List(steps)) = map.get_mut("workflow") {
            if let Some(crate::types::AttrValue::Map(step)) = steps.get_mut(1) {
                step.insert(
                    "alpha_from_step".to_string(),
                    crate::types::AttrValue::Str("ghost".to_string()),
                );
            }
        }
    }
    let doc = run_scenario(&doc_value, RunOptions::default()).unwrap();
    // the MSD step survives, the broken step records its error
    assert!(doc.get("msd").unwrap().data.get("alpha_star").is_some());
    assert!(doc.get("tm").unwrap().data.get("error").is_some());
}

#[test]
fn duplicate_step_names_are_rejected() {
    use crate::example_networks::msd_scenario;
    let mut doc_value = msd_scenario();
    if let crate::types::AttrValue::Map(map) = &mut doc_value {
        if let Some(crate::types::AttrValue::List(steps)) = map.get_mut("workflow") {
            if let Some(crate::types::AttrValue::Map(step)) = steps.get_mut(1) {
                step.insert(
                    "name".to_string(),
                    crate::types::AttrValue::Str("msd".to_string()),
                );
            }
        }
    }
    assert!(run_scenario(&doc_value, RunOptions::default()).is_err());
}
