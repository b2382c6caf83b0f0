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

//! Tests for the Monte Carlo orchestrator: determinism under seed, deduplication by failure
//! pattern and scheduling independence.

use crate::example_networks::square_mesh;
use crate::failures::{FailureMode, FailurePolicy, FailureRule, RuleMode, RuleScope};
use crate::flow::{max_flow, FlowPolicy, FlowRequest};
use crate::montecarlo::{
    run_monte_carlo, FlowIterationResult, FlowSummary, IterationData, MonteCarloConfig,
};
use crate::topology::{Network, NetworkView};
use crate::Stopper;
use assert_approx_eq::assert_approx_eq;

fn single_link_policy() -> FailurePolicy {
    FailurePolicy {
        modes: vec![FailureMode {
            weight: 1.0,
            attrs: Default::default(),
            rules: vec![FailureRule {
                scope: RuleScope::Link,
                path: None,
                match_spec: None,
                mode: RuleMode::Choice { count: 1, weight_by: None },
            }],
        }],
        ..Default::default()
    }
}

fn flow_analysis(net: &Network) -> impl Fn(&NetworkView<'_>) -> IterationData + Send + Sync {
    let sources = vec![net.node_id("N1").unwrap()];
    let sinks = vec![net.node_id("N3").unwrap()];
    move |view: &NetworkView<'_>| {
        let req = FlowRequest {
            sources: &sources,
            sinks: &sinks,
            policy: FlowPolicy::default(),
            limit: None,
            spf: None,
        };
        let result = max_flow(view, &req, None);
        IterationData {
            total_flow: Some(result.total_flow),
            flow_results: None,
            summary: FlowSummary {
                placed: result.total_flow,
                dropped: 0.0,
                cost_distribution: None,
                min_cut: None,
            },
        }
    }
}

fn run(
    net: &Network,
    iterations: usize,
    parallelism: usize,
    seed: u64,
) -> crate::montecarlo::MonteCarloResult {
    let cfg = MonteCarloConfig {
        iterations,
        parallelism,
        seed,
        collect_trace: true,
        iteration_timeout: None,
    };
    run_monte_carlo(
        net,
        Some(&single_link_policy()),
        flow_analysis(net),
        &cfg,
        Stopper::new(),
    )
    .unwrap()
}

fn digest(results: &[FlowIterationResult]) -> Vec<(String, usize, f64)> {
    results
        .iter()
        .map(|r| (r.failure_id.clone(), r.occurrence_count, r.total_flow.unwrap()))
        .collect()
}

#[test]
fn baseline_has_no_failures() {
    let net = square_mesh();
    let result = run(&net, 4, 1, 42);
    assert_approx_eq!(result.baseline.total_flow.unwrap(), 5.0);
    assert!(result.baseline.failed_links.is_empty());
    assert_eq!(result.baseline.occurrence_count, 1);
}

#[test]
fn identical_seeds_reproduce_identical_results() {
    let net = square_mesh();
    let a = run(&net, 16, 1, 7);
    let b = run(&net, 16, 1, 7);
    assert_eq!(digest(&a.results), digest(&b.results));
}

#[test]
fn parallel_and_sequential_runs_reduce_identically() {
    let net = square_mesh();
    let sequential = run(&net, 16, 1, 99);
    let parallel = run(&net, 16, 4, 99);
    assert_eq!(digest(&sequential.results), digest(&parallel.results));
}

#[test]
fn results_are_deduplicated_by_pattern() {
    let net = square_mesh();
    let result = run(&net, 24, 1, 3);
    // 6 links, one failed per iteration: at most 6 distinct patterns
    assert!(result.results.len() <= 6);
    let occurrences: usize = result.results.iter().map(|r| r.occurrence_count).sum();
    assert_eq!(occurrences, result.iterations_run);
    assert_eq!(result.iterations_run, 24);

    // the reduced list is ordered by canonical pattern key
    let keys: Vec<&str> = result.results.iter().map(|r| r.failure_id.as_str()).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
}

#[test]
fn single_link_failures_stay_within_the_expected_range() {
    let net = square_mesh();
    let result = run(&net, 24, 2, 5);
    for r in &result.results {
        let flow = r.total_flow.unwrap();
        assert!(
            (3.0..=5.0).contains(&flow),
            "single-link failure produced unexpected flow {}",
            flow
        );
        assert_eq!(r.failed_links.len(), 1);
        assert!(r.failure_trace.is_some());
    }
}

#[test]
fn stop_flag_aborts_the_run() {
    let net = square_mesh();
    let stopper = Stopper::new();
    stopper.send_stop();
    let cfg = MonteCarloConfig {
        iterations: 8,
        parallelism: 1,
        seed: 0,
        collect_trace: false,
        iteration_timeout: None,
    };
    let result = run_monte_carlo(
        &net,
        Some(&single_link_policy()),
        flow_analysis(&net),
        &cfg,
        stopper,
    );
    assert!(matches!(result, Err(crate::Error::Abort)));
}
