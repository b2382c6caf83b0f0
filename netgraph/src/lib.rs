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

#![deny(missing_docs)]

//! # NetGraph: Scenario-Driven Network Modeling and Capacity Analysis
//!
//! NetGraph materializes a declaratively described network — topology (nodes, links,
//! hierarchical blueprints), shared-risk groups, traffic demands and failure policies — into a
//! directed multigraph, and then executes an analysis workflow computing flow-based capacity
//! metrics under randomized failure regimes.
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`scenario`]**: The semantic model of the declarative scenario document. The document
//!   itself arrives as an already-parsed tree of plain values (see [`types::AttrValue`]); this
//!   module validates it and produces typed declarations.
//!
//! - **[`expand`]**: The blueprint expander, a small compiler turning the declarations into a
//!   concrete [`Network`](topology::Network): bracket patterns, variable substitution, group and
//!   blueprint materialization, adjacency rules, post-build overrides and risk-group resolution.
//!
//! - **[`topology`]**: The immutable-after-build graph store
//!   ([`Network`](topology::Network)) with first-class, addressable parallel links, and the
//!   zero-copy [`NetworkView`](topology::NetworkView) overlay that masks failed or disabled
//!   entities.
//!
//! - **[`selectors`]**: Path-regex and attribute-condition selectors resolving to ordered groups
//!   of nodes, links or risk groups, with context-aware defaults.
//!
//! - **[`flow`]**: The algorithmic core: the shortest-path DAG kernel
//!   ([`spf`](flow::spf)), pluggable flow-placement policies emulating ECMP/WCMP/TE behavior,
//!   and the capacity-constrained max-flow engine with min-cut extraction and sensitivity
//!   probing.
//!
//! - **[`demands`]**: Expansion of a traffic matrix into concrete sub-demands and their
//!   placement onto a shared working graph in priority order.
//!
//! - **[`failures`]**: Weighted failure-mode selection and rule evaluation producing failed
//!   entity sets, including shared-risk-group expansion.
//!
//! - **[`montecarlo`]**: Deterministic-seeded parallel dispatch of analyses over masked network
//!   views, with deduplication of iteration results by failure pattern.
//!
//! - **[`workflow`]**: The driver sequencing the fixed catalog of analysis steps and threading
//!   step outputs (such as `alpha_star`) into later steps.
//!
//! ## Usage
//!
//! The typical entry points are [`run_scenario`] and [`inspect_scenario`], which take the parsed
//! scenario tree and return the results document (or the validation summary):
//!
//! ```
//! use netgraph::example_networks;
//! use netgraph::{run_scenario, Error};
//!
//! fn main() -> Result<(), Error> {
//!     let doc = example_networks::square_mesh_scenario();
//!     let results = run_scenario(&doc, Default::default())?;
//!     println!("{}", results.to_json_pretty());
//!     Ok(())
//! }
//! ```

pub mod demands;
mod error;
pub mod example_networks;
pub mod expand;
pub mod failures;
pub mod flow;
pub mod montecarlo;
pub mod scenario;
pub mod selectors;
mod test;
pub mod topology;
pub mod types;
pub mod workflow;

mod run;
pub use run::{inspect_scenario, run_scenario, InspectSummary, RunOptions};

pub use error::{
    AnalysisError, ConfigurationError, Error, ExpansionError, SchemaError, SelectorError,
    ValidationError,
};

use std::sync::{Arc, RwLock};

/// Stopper, to check when to stop, or to send the stop command. Cancellation is cooperative:
/// Monte Carlo workers check the flag between iterations and never abort an iteration in flight.
#[derive(Clone, Debug)]
pub struct Stopper {
    b: Arc<RwLock<bool>>,
    c: usize,
}

impl Default for Stopper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopper {
    /// Create a new stopper
    pub fn new() -> Self {
        Self { b: Arc::new(RwLock::new(false)), c: 0 }
    }

    /// Send the stop command. This function will block until the write lock can be acquired.
    pub fn send_stop(&self) {
        *self.b.write().unwrap() = true;
    }

    /// Checks if the stop flag is set. This function will not block, just continue if the
    /// read-lock cannot be acquired. Only every ninth call actually touches the lock.
    pub fn try_is_stop(&mut self) -> Option<bool> {
        self.c += 1;
        if self.c >= 9 {
            self.c = 0;
            self.b.try_read().map(|x| *x).ok()
        } else {
            None
        }
    }

    /// Checks if the stop flag is set. This function will block until the read lock can be
    /// acquired.
    pub fn is_stop(&self) -> bool {
        *self.b.read().unwrap()
    }
}
