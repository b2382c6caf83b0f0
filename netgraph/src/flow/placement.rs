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

//! # Flow Placement Policies
//!
//! A placement policy is a splitting rule over the equal-cost successor DAG. The preset routing
//! modes compose a path-algorithm choice (shortest paths only vs. arbitrary paths) with such a
//! rule:
//!
//! | Preset                  | Paths                | Placement            | Semantics       |
//! |-------------------------|----------------------|----------------------|-----------------|
//! | `SHORTEST_PATHS_ECMP`   | shortest             | equal-balanced       | IP/IGP ECMP     |
//! | `SHORTEST_PATHS_WCMP`   | shortest             | proportional         | IP/IGP WCMP     |
//! | `TE_WCMP_UNLIM`         | any                  | proportional         | idealized TE    |
//! | `TE_ECMP_16_LSP`        | any, ≤16 bundles     | proportional/bundle  | MPLS-TE         |
//! | `TE_ECMP_UP_TO_256_LSP` | any, ≤256 bundles    | proportional/bundle  | MPLS-TE (wide)  |

use crate::error::SchemaError;
use serde::Serialize;
use std::fmt;

/// Splitting rule at each branching node of the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlowPlacement {
    /// Split arriving flow across outgoing DAG edges in proportion to residual capacity
    /// (WCMP). Yields the full max-flow of the shortest-path DAG when unrestricted.
    Proportional,
    /// Split equally across outgoing DAG edges regardless of residual capacity (ECMP). The
    /// achievable flow is bounded by the thinnest edge times the fan-out at each split point,
    /// applied end-to-end.
    EqualBalanced,
}

/// The preset routing modes addressable from scenario documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::enum_variant_names)]
pub enum FlowPolicyConfig {
    /// IP/IGP ECMP
    ShortestPathsEcmp,
    /// IP/IGP WCMP
    ShortestPathsWcmp,
    /// Idealized traffic engineering: any path, proportional split, unlimited bundles
    TeWcmpUnlim,
    /// MPLS-TE with at most 16 equal-cost bundles
    TeEcmp16Lsp,
    /// MPLS-TE with at most 256 equal-cost bundles
    TeEcmpUpTo256Lsp,
}

impl FlowPolicyConfig {
    /// Parse the document spelling of a preset
    pub fn parse(s: &str) -> Result<Self, SchemaError> {
        Ok(match s {
            "SHORTEST_PATHS_ECMP" => FlowPolicyConfig::ShortestPathsEcmp,
            "SHORTEST_PATHS_WCMP" => FlowPolicyConfig::ShortestPathsWcmp,
            "TE_WCMP_UNLIM" => FlowPolicyConfig::TeWcmpUnlim,
            "TE_ECMP_16_LSP" => FlowPolicyConfig::TeEcmp16Lsp,
            "TE_ECMP_UP_TO_256_LSP" => FlowPolicyConfig::TeEcmpUpTo256Lsp,
            other => {
                return Err(SchemaError::UnknownKeyword {
                    key: "flow_policy".to_string(),
                    allowed: "SHORTEST_PATHS_ECMP, SHORTEST_PATHS_WCMP, TE_WCMP_UNLIM, \
                              TE_ECMP_16_LSP, TE_ECMP_UP_TO_256_LSP",
                    found: other.to_string(),
                })
            }
        })
    }

    /// The structured form of the preset
    pub fn policy(self) -> FlowPolicy {
        match self {
            FlowPolicyConfig::ShortestPathsEcmp => FlowPolicy {
                shortest_path: true,
                placement: FlowPlacement::EqualBalanced,
                max_flow_count: None,
            },
            FlowPolicyConfig::ShortestPathsWcmp => FlowPolicy {
                shortest_path: true,
                placement: FlowPlacement::Proportional,
                max_flow_count: None,
            },
            FlowPolicyConfig::TeWcmpUnlim => FlowPolicy {
                shortest_path: false,
                placement: FlowPlacement::Proportional,
                max_flow_count: None,
            },
            FlowPolicyConfig::TeEcmp16Lsp => FlowPolicy {
                shortest_path: false,
                placement: FlowPlacement::Proportional,
                max_flow_count: Some(16),
            },
            FlowPolicyConfig::TeEcmpUpTo256Lsp => FlowPolicy {
                shortest_path: false,
                placement: FlowPlacement::Proportional,
                max_flow_count: Some(256),
            },
        }
    }

    /// True when the preset's path selection never looks at residual capacity, which makes the
    /// per-source SPF result reusable while residuals change (the IGP family). The TE presets
    /// search the residual graph and must recompute.
    pub fn spf_cacheable(self) -> bool {
        matches!(
            self,
            FlowPolicyConfig::ShortestPathsEcmp | FlowPolicyConfig::ShortestPathsWcmp
        )
    }
}

impl fmt::Display for FlowPolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowPolicyConfig::ShortestPathsEcmp => "SHORTEST_PATHS_ECMP",
            FlowPolicyConfig::ShortestPathsWcmp => "SHORTEST_PATHS_WCMP",
            FlowPolicyConfig::TeWcmpUnlim => "TE_WCMP_UNLIM",
            FlowPolicyConfig::TeEcmp16Lsp => "TE_ECMP_16_LSP",
            FlowPolicyConfig::TeEcmpUpTo256Lsp => "TE_ECMP_UP_TO_256_LSP",
        };
        f.write_str(s)
    }
}

/// Structured routing mode consumed by the max-flow engine. Presets decompose into this; an
/// implementation-defined combination is equally valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowPolicy {
    /// Restrict augmentation to the shortest-path DAG of the unloaded cost metric
    pub shortest_path: bool,
    /// Splitting rule
    pub placement: FlowPlacement,
    /// Bound on the number of augmentation bundles (TE LSP presets)
    pub max_flow_count: Option<usize>,
}

impl Default for FlowPolicy {
    /// Unrestricted proportional placement — the policy that computes the true max-flow
    fn default() -> Self {
        FlowPolicy { shortest_path: false, placement: FlowPlacement::Proportional, max_flow_count: None }
    }
}
