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

//! Module containing all error types.
//!
//! Errors detected during materialization are fatal and abort the workflow before any analysis
//! runs. Errors detected during analysis abort that step but preserve earlier successful steps'
//! results. Selector misses are warnings, never errors.

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// The document violates a structural contract
    #[error("Schema Error: {0}")]
    Schema(#[from] SchemaError),
    /// A declared entity violates an invariant
    #[error("Validation Error: {0}")]
    Validation(#[from] ValidationError),
    /// A template cannot be expanded
    #[error("Expansion Error: {0}")]
    Expansion(#[from] ExpansionError),
    /// A selector is malformed
    #[error("Selector Error: {0}")]
    Selector(#[from] SelectorError),
    /// An algorithmic precondition failed at run time
    #[error("Analysis Error: {0}")]
    Analysis(#[from] AnalysisError),
    /// A policy is contradictory
    #[error("Configuration Error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The operation was aborted via the stop flag
    #[error("The operation was aborted")]
    Abort,
}

/// The document violates a structural contract (unknown key, wrong type).
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    /// A key is not part of the schema at this position
    #[error("unknown key `{key}` in {context}")]
    UnknownKey {
        /// The offending key
        key: String,
        /// Where in the document the key was found
        context: String,
    },
    /// A value has the wrong type
    #[error("`{key}` must be {expected}, found {found}")]
    WrongType {
        /// The key holding the value
        key: String,
        /// The expected type
        expected: &'static str,
        /// The type actually found
        found: &'static str,
    },
    /// A required key is missing
    #[error("missing required key `{key}` in {context}")]
    MissingKey {
        /// The missing key
        key: String,
        /// Where in the document the key was expected
        context: String,
    },
    /// A string value is not one of the allowed keywords
    #[error("`{key}` must be one of {allowed}, found `{found}`")]
    UnknownKeyword {
        /// The key holding the value
        key: String,
        /// The allowed keywords
        allowed: &'static str,
        /// The value actually found
        found: String,
    },
}

/// A declared entity violates an invariant.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A group references a blueprint that was never declared
    #[error("blueprint `{0}` is not defined")]
    UndefinedBlueprint(String),
    /// Two nodes materialized with the same name
    #[error("duplicate node name `{0}`")]
    DuplicateNode(String),
    /// A direct link references a node that does not exist
    #[error("link endpoint `{0}` is not a known node")]
    UnknownLinkEndpoint(String),
    /// An entity references a risk group that was never declared
    #[error("entity `{0}` references undeclared risk group `{1}`")]
    UndefinedRiskGroup(String, String),
    /// Two risk groups were declared with the same name
    #[error("duplicate risk group `{0}`")]
    DuplicateRiskGroup(String),
    /// The risk-group parent/child relation contains a cycle
    #[error("risk group hierarchy contains a cycle through `{0}`")]
    RiskGroupCycle(String),
    /// `one_to_one` adjacency requires one group size to divide the other
    #[error("one_to_one adjacency between groups of size {0} and {1}: sizes do not divide")]
    OneToOneSizeMismatch(usize, usize),
    /// Link capacity must be non-negative
    #[error("link `{0}` has negative capacity {1}")]
    NegativeCapacity(String, f64),
    /// Link cost must be non-negative
    #[error("link `{0}` has negative cost {1}")]
    NegativeCost(String, f64),
}

/// A template cannot be expanded.
#[derive(Debug, Error, PartialEq)]
pub enum ExpansionError {
    /// The number of produced combinations exceeds the hard cap
    #[error("expansion of `{0}` produces {1} combinations, the cap is {2}")]
    CapExceeded(String, usize, usize),
    /// A `$var` or `${var}` reference has no binding
    #[error("unresolved variable `{0}` in `{1}`")]
    UnresolvedVariable(String, String),
    /// `zip` mode requires all variable lists to have the same length
    #[error("zip expansion requires equal-length lists, found lengths {0} and {1}")]
    ZipLengthMismatch(usize, usize),
    /// A `[` was opened but never closed
    #[error("unterminated bracket in `{0}`")]
    UnterminatedBracket(String),
    /// A bracket expression contains no tokens
    #[error("empty bracket expression in `{0}`")]
    EmptyBracket(String),
    /// An `a-b` range token could not be parsed or is reversed
    #[error("invalid bracket range `{0}`")]
    InvalidRange(String),
}

/// A selector is malformed.
#[derive(Debug, Error, PartialEq)]
pub enum SelectorError {
    /// A selector must constrain something
    #[error("selector requires at least one of `path`, `group_by` or `match`")]
    Empty,
    /// The `path` regex did not compile
    #[error("invalid path regex `{0}`: {1}")]
    InvalidRegex(String, String),
    /// The condition operator is not part of the catalog
    #[error("unknown condition operator `{0}`")]
    UnknownOperator(String),
    /// All operators except `exists`/`not_exists` need a comparison value
    #[error("condition on `{0}` with operator `{1}` requires a value")]
    MissingValue(String, String),
}

/// An algorithmic precondition failed at run time.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// A workflow step references an earlier step that does not exist
    #[error("step `{0}` references unknown step `{1}`")]
    UnknownStepReference(String, String),
    /// A dot-path into an earlier step's result found nothing
    #[error("step `{0}`: field `{1}` not found in referenced result")]
    UnknownStepField(String, String),
    /// A step names a traffic matrix that was never declared
    #[error("unknown traffic matrix `{0}`")]
    UnknownMatrix(String),
    /// A step names a failure policy that was never declared
    #[error("unknown failure policy `{0}`")]
    UnknownFailurePolicy(String),
    /// The MSD bracket phase ran out of iterations without observing a flip
    #[error("maximum supported demand search could not bracket a transition (alpha = {0})")]
    BracketFailed(f64),
    /// Two workflow steps share a name, which would clobber stored results
    #[error("duplicate workflow step name `{0}`")]
    DuplicateStepName(String),
}

/// A policy is contradictory.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    /// Weighted sampling makes no sense for independent Bernoulli selection
    #[error("`weight_by` cannot be combined with rule mode `random`")]
    WeightByOnRandom,
    /// Probabilities live in [0, 1]
    #[error("rule probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
    /// Mode weights must be finite numbers
    #[error("failure mode weight must be finite, got {0}")]
    InvalidModeWeight(f64),
    /// A `random` rule needs a probability
    #[error("rule mode `random` requires `probability`")]
    RandomWithoutProbability,
}
