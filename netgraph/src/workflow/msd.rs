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

//! Maximum supported demand: bisection on the matrix scale factor.
//!
//! The predicate `accepts(alpha)` — "does the matrix at `volume * alpha` place within
//! tolerance of fully?" — is monotone in `alpha` up to placement noise. The search brackets a
//! flip starting from `alpha_start` (growing when the start is feasible, shrinking when it is
//! not) and then bisects down to `resolution`. Each probe may run several times; a strict
//! majority of acceptances accepts the probe.

use crate::demands::{place_demands, Demand};
use crate::error::{AnalysisError, Error};
use crate::topology::{Network, NetworkView};
use crate::workflow::MsdStep;
use serde::Serialize;

/// Tolerance, relative to the scaled matrix volume, below which leftover demand still counts
/// as fully placed.
const ACCEPT_TOL: f64 = 1e-9;

/// Result of the search.
#[derive(Debug, Clone, Serialize)]
pub struct MsdOutcome {
    /// Largest scale factor that still places fully (within `resolution`)
    pub alpha_star: f64,
    /// Number of predicate probes spent
    pub iterations: usize,
    /// Every probe as `(alpha, accepted)`, in probe order
    pub history: Vec<(f64, bool)>,
}

struct Probe<'a> {
    net: &'a Network,
    demands: &'a [Demand],
    seeds_per_alpha: usize,
    probes: usize,
    history: Vec<(f64, bool)>,
}

impl<'a> Probe<'a> {
    fn accepts(&mut self, alpha: f64) -> Result<bool, Error> {
        let scaled: Vec<Demand> = self
            .demands
            .iter()
            .map(|d| Demand { volume: d.volume * alpha, ..d.clone() })
            .collect();
        let total: f64 = scaled.iter().map(|d| d.volume).sum();
        let mut accepted = 0usize;
        for _ in 0..self.seeds_per_alpha.max(1) {
            let view = NetworkView::new(self.net);
            let placement = place_demands(&view, &scaled)?;
            if placement.total_unplaced <= ACCEPT_TOL * total.max(1.0) {
                accepted += 1;
            }
        }
        // strict majority; a tie rejects
        let ok = accepted * 2 > self.seeds_per_alpha.max(1);
        self.probes += 1;
        self.history.push((alpha, ok));
        Ok(ok)
    }
}

/// Run the bracket + bisect search for a matrix on the unfailed network.
pub fn maximum_supported_demand(
    net: &Network,
    demands: &[Demand],
    step: &MsdStep,
) -> Result<MsdOutcome, Error> {
    let mut probe = Probe {
        net,
        demands,
        seeds_per_alpha: step.seeds_per_alpha,
        probes: 0,
        history: Vec::new(),
    };

    let mut alpha = step.alpha_start;
    let start_ok = probe.accepts(alpha)?;

    // bracket the flip
    let (mut lo, mut hi) = if start_ok {
        let mut lo = alpha;
        let mut hi = None;
        for _ in 0..step.max_bracket_iters {
            if lo >= step.alpha_max {
                break;
            }
            let next = (lo * step.growth_factor).min(step.alpha_max);
            if probe.accepts(next)? {
                lo = next;
            } else {
                hi = Some(next);
                break;
            }
        }
        match hi {
            Some(hi) => (lo, hi),
            // never flipped: the matrix is supported all the way to the cap
            None => {
                return Ok(MsdOutcome {
                    alpha_star: lo,
                    iterations: probe.probes,
                    history: probe.history,
                })
            }
        }
    } else {
        let mut hi = alpha;
        let mut lo = None;
        for _ in 0..step.max_bracket_iters {
            if hi <= step.alpha_min {
                break;
            }
            let next = (hi / step.growth_factor).max(step.alpha_min);
            if probe.accepts(next)? {
                lo = Some(next);
                break;
            } else {
                hi = next;
            }
        }
        match lo {
            Some(lo) => (lo, hi),
            None => return Err(AnalysisError::BracketFailed(hi).into()),
        }
    };

    // bisect to resolution
    for _ in 0..step.max_bisect_iters {
        if hi - lo <= step.resolution {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if probe.accepts(mid)? {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    alpha = lo;
    Ok(MsdOutcome { alpha_star: alpha, iterations: probe.probes, history: probe.history })
}
