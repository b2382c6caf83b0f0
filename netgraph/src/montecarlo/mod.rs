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

//! # Monte Carlo Orchestrator
//!
//! Deterministic-seeded parallel dispatch of an analysis over masked network views. Every
//! iteration derives an independent PRNG from the run seed and its index, samples a failure
//! pattern, builds a view masking the failed entities and runs the analysis on it. Iterations
//! producing identical failure patterns are deduplicated in the reduction; the result list is
//! ordered by canonical pattern key, so worker completion order never shows through.
//!
//! The graph store is shared read-only across workers; views, PRNGs and working graphs are
//! strictly per-iteration.

use crate::demands::FlowRecord;
use crate::error::Error;
use crate::failures::{FailurePolicy, FailureSet, FailureTrace};
use crate::topology::{Network, NetworkView};
use crate::Stopper;
use log::*;
use rand::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Aggregated flow metrics of one iteration.
#[derive(Debug, Clone, Serialize, Default)]
pub struct FlowSummary {
    /// Total volume (or flow) successfully placed
    pub placed: f64,
    /// Volume that could not be placed
    pub dropped: f64,
    /// Placed volume per distinct path cost, sorted by cost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_distribution: Option<Vec<(f64, f64)>>,
    /// Directed edges crossing the min cut, as `<link id>` / `<link id>:rev`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cut: Option<Vec<String>>,
}

/// What an analysis computes on one view. Max-flow analyses fill `total_flow`; traffic-matrix
/// analyses fill `flow_results`.
#[derive(Debug, Clone, Default)]
pub struct IterationData {
    /// Total max-flow of the iteration
    pub total_flow: Option<f64>,
    /// Per-sub-demand placement records of the iteration
    pub flow_results: Option<Vec<FlowRecord>>,
    /// Aggregate metrics
    pub summary: FlowSummary,
}

/// One reduced Monte Carlo outcome: the analysis result for a distinct failure pattern,
/// annotated with how many iterations produced that pattern.
#[derive(Debug, Clone, Serialize)]
pub struct FlowIterationResult {
    /// Canonical failure-pattern key
    pub failure_id: String,
    /// Names of failed nodes
    pub failed_nodes: Vec<String>,
    /// Identifiers of failed links
    pub failed_links: Vec<String>,
    /// Number of iterations that produced this pattern
    pub occurrence_count: usize,
    /// Total max-flow (max-flow analyses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_flow: Option<f64>,
    /// Per-sub-demand records (traffic-matrix analyses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_results: Option<Vec<FlowRecord>>,
    /// Aggregate metrics
    pub summary: FlowSummary,
    /// Which mode and rules selected this pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_trace: Option<FailureTrace>,
}

/// Orchestrator parameters.
#[derive(Debug, Clone)]
pub struct MonteCarloConfig {
    /// Number of failure iterations (the baseline does not count)
    pub iterations: usize,
    /// Worker threads; 1 runs inline
    pub parallelism: usize,
    /// Run seed; iteration seeds derive from it
    pub seed: u64,
    /// Record failure traces on the iteration results
    pub collect_trace: bool,
    /// Optional wall-clock budget per iteration; over-budget iterations are dropped from the
    /// aggregation with a warning
    pub iteration_timeout: Option<Duration>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        MonteCarloConfig {
            iterations: 1,
            parallelism: num_cpus::get(),
            seed: 0,
            collect_trace: false,
            iteration_timeout: None,
        }
    }
}

/// Reduced result of a Monte Carlo run.
#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloResult {
    /// The no-failure iteration (seed index 0)
    pub baseline: FlowIterationResult,
    /// Distinct failure patterns, ordered by canonical key
    pub results: Vec<FlowIterationResult>,
    /// Iterations that contributed to `results`
    pub iterations_run: usize,
    /// Iterations dropped by the per-iteration timeout
    pub skipped: usize,
}

/// Seed for iteration `index`, derived splitmix64-style so consecutive iterations get
/// statistically independent streams. Index 0 is the baseline and consumes no randomness.
pub fn derive_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

struct IterationRecord {
    key: String,
    failed_nodes: Vec<String>,
    failed_links: Vec<String>,
    data: IterationData,
    trace: Option<FailureTrace>,
}

fn run_one<F>(
    net: &Network,
    policy: Option<&FailurePolicy>,
    analysis: &F,
    seed: u64,
    index: u64,
    collect_trace: bool,
    timeout: Option<Duration>,
) -> Option<IterationRecord>
where
    F: Fn(&NetworkView<'_>) -> IterationData,
{
    let (failed, trace) = match policy {
        Some(p) => {
            let mut rng = StdRng::seed_from_u64(derive_seed(seed, index));
            p.apply(net, &mut rng)
        }
        None => (FailureSet::default(), None),
    };
    let view =
        NetworkView::with_masks(net, failed.nodes.iter().copied(), failed.links.iter().copied());
    let start = Instant::now();
    let data = analysis(&view);
    if let Some(budget) = timeout {
        if start.elapsed() > budget {
            warn!(
                "iteration {} exceeded its time budget ({:?}), dropping it",
                index,
                budget
            );
            return None;
        }
    }
    let mut failed_nodes: Vec<String> =
        failed.nodes.iter().map(|n| net.node(*n).name.clone()).collect();
    let mut failed_links: Vec<String> =
        failed.links.iter().map(|l| net.link(*l).id.clone()).collect();
    failed_nodes.sort();
    failed_links.sort();
    Some(IterationRecord {
        key: failed.canonical_key(net),
        failed_nodes,
        failed_links,
        data,
        trace: if collect_trace { trace } else { None },
    })
}

fn into_result(record: IterationRecord) -> FlowIterationResult {
    FlowIterationResult {
        failure_id: record.key,
        failed_nodes: record.failed_nodes,
        failed_links: record.failed_links,
        occurrence_count: 1,
        total_flow: record.data.total_flow,
        flow_results: record.data.flow_results,
        summary: record.data.summary,
        failure_trace: record.trace,
    }
}

/// Run the analysis over `iterations` randomized failure views plus the baseline.
///
/// The workers never mutate the base graph; each holds its own PRNG and working state. The
/// returned `results` list is deduplicated by failure pattern and sorted by pattern key, which
/// makes the output independent of scheduling.
pub fn run_monte_carlo<F>(
    net: &Network,
    policy: Option<&FailurePolicy>,
    analysis: F,
    cfg: &MonteCarloConfig,
    stopper: Stopper,
) -> Result<MonteCarloResult, Error>
where
    F: Fn(&NetworkView<'_>) -> IterationData + Send + Sync + 'static,
{
    // baseline: seed index 0, no failures
    let baseline_record = run_one(net, None, &analysis, cfg.seed, 0, false, None)
        .unwrap_or_else(|| unreachable!("baseline has no timeout"));
    let baseline = into_result(baseline_record);

    let mut reduced: BTreeMap<String, FlowIterationResult> = BTreeMap::new();
    let mut iterations_run = 0usize;
    let mut skipped = 0usize;

    if cfg.parallelism <= 1 || cfg.iterations <= 1 {
        for index in 1..=cfg.iterations {
            if stopper.is_stop() {
                return Err(Error::Abort);
            }
            match run_one(
                net,
                policy,
                &analysis,
                cfg.seed,
                index as u64,
                cfg.collect_trace,
                cfg.iteration_timeout,
            ) {
                Some(record) => {
                    iterations_run += 1;
                    reduce(&mut reduced, record);
                }
                None => skipped += 1,
            }
        }
    } else {
        let n_threads = cfg.parallelism.min(cfg.iterations);
        info!("Spawning {} Monte Carlo workers", n_threads);
        let net = Arc::new(net.clone());
        let policy = Arc::new(policy.cloned());
        let analysis = Arc::new(analysis);
        let next_index = Arc::new(Mutex::new(1usize));
        let (sender, receiver) = channel::<Option<IterationRecord>>();

        let workers: Vec<thread::JoinHandle<()>> = (0..n_threads)
            .map(|_| {
                let net = net.clone();
                let policy = policy.clone();
                let analysis = analysis.clone();
                let next_index = next_index.clone();
                let tx = sender.clone();
                let stopper = stopper.clone();
                let cfg = cfg.clone();
                thread::spawn(move || loop {
                    if stopper.is_stop() {
                        return;
                    }
                    let index = {
                        let mut lock = next_index.lock().unwrap();
                        if *lock > cfg.iterations {
                            return;
                        }
                        let i = *lock;
                        *lock += 1;
                        i
                    };
                    let record = run_one(
                        &net,
                        (*policy).as_ref(),
                        analysis.as_ref(),
                        cfg.seed,
                        index as u64,
                        cfg.collect_trace,
                        cfg.iteration_timeout,
                    );
                    if tx.send(record).is_err() {
                        return;
                    }
                })
            })
            .collect();
        drop(sender);

        for record in receiver {
            match record {
                Some(record) => {
                    iterations_run += 1;
                    reduce(&mut reduced, record);
                }
                None => skipped += 1,
            }
        }
        workers.into_iter().for_each(|w| {
            let _ = w.join();
        });
        if stopper.is_stop() {
            return Err(Error::Abort);
        }
    }

    Ok(MonteCarloResult {
        baseline,
        results: reduced.into_iter().map(|(_, r)| r).collect(),
        iterations_run,
        skipped,
    })
}

/// Iterations with identical failure patterns are identical computations; keep the first and
/// count the occurrences.
fn reduce(reduced: &mut BTreeMap<String, FlowIterationResult>, record: IterationRecord) {
    match reduced.get_mut(&record.key) {
        Some(existing) => existing.occurrence_count += 1,
        None => {
            let result = into_result(record);
            reduced.insert(result.failure_id.clone(), result);
        }
    }
}
