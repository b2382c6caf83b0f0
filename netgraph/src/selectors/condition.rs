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

//! Attribute predicates for selectors, failure rules and membership rules.

use crate::error::SelectorError;
use crate::types::{compare_values, AttrValue};
use std::cmp::Ordering;

/// Condition operators. All condition evaluation dispatches on the tag of the attribute value;
/// a missing attribute satisfies only `not_exists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondOp {
    /// Equality (numeric kinds coerce)
    Eq,
    /// Inequality
    Ne,
    /// Strictly less
    Lt,
    /// Less or equal
    Le,
    /// Strictly greater
    Gt,
    /// Greater or equal
    Ge,
    /// Substring (strings) or membership (lists)
    Contains,
    /// Negated `contains`
    NotContains,
    /// Attribute value is a member of the condition's list value
    In,
    /// Negated `in`
    NotIn,
    /// The attribute is present
    Exists,
    /// The attribute is absent
    NotExists,
}

impl CondOp {
    /// Parse the documented operator spelling
    pub fn parse(s: &str) -> Result<Self, SelectorError> {
        Ok(match s {
            "==" => CondOp::Eq,
            "!=" => CondOp::Ne,
            "<" => CondOp::Lt,
            "<=" => CondOp::Le,
            ">" => CondOp::Gt,
            ">=" => CondOp::Ge,
            "contains" => CondOp::Contains,
            "not_contains" => CondOp::NotContains,
            "in" => CondOp::In,
            "not_in" => CondOp::NotIn,
            "exists" => CondOp::Exists,
            "not_exists" => CondOp::NotExists,
            other => return Err(SelectorError::UnknownOperator(other.to_string())),
        })
    }

    /// Spelling used in documents and error messages
    pub fn as_str(self) -> &'static str {
        match self {
            CondOp::Eq => "==",
            CondOp::Ne => "!=",
            CondOp::Lt => "<",
            CondOp::Le => "<=",
            CondOp::Gt => ">",
            CondOp::Ge => ">=",
            CondOp::Contains => "contains",
            CondOp::NotContains => "not_contains",
            CondOp::In => "in",
            CondOp::NotIn => "not_in",
            CondOp::Exists => "exists",
            CondOp::NotExists => "not_exists",
        }
    }

    fn needs_value(self) -> bool {
        !matches!(self, CondOp::Exists | CondOp::NotExists)
    }
}

/// How multiple conditions combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    /// All conditions must hold
    And,
    /// At least one condition must hold
    Or,
}

/// A single attribute condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Dotted attribute path
    pub attr: String,
    /// Operator
    pub op: CondOp,
    /// Comparison value; required for every operator except `exists`/`not_exists`
    pub value: Option<AttrValue>,
}

impl Condition {
    pub(crate) fn validate(&self) -> Result<(), SelectorError> {
        if self.op.needs_value() && self.value.is_none() {
            return Err(SelectorError::MissingValue(
                self.attr.clone(),
                self.op.as_str().to_string(),
            ));
        }
        Ok(())
    }

    /// Evaluate against the attribute value found for `attr` (or `None` when absent)
    pub fn eval(&self, found: Option<&AttrValue>) -> bool {
        match self.op {
            CondOp::Exists => found.is_some(),
            CondOp::NotExists => found.is_none(),
            _ => {
                let actual = match found {
                    Some(v) => v,
                    None => return false,
                };
                let expected = match &self.value {
                    Some(v) => v,
                    None => return false,
                };
                match self.op {
                    CondOp::Eq => {
                        compare_values(actual, expected) == Some(Ordering::Equal)
                            || actual == expected
                    }
                    CondOp::Ne => {
                        !(compare_values(actual, expected) == Some(Ordering::Equal)
                            || actual == expected)
                    }
                    CondOp::Lt => compare_values(actual, expected) == Some(Ordering::Less),
                    CondOp::Le => matches!(
                        compare_values(actual, expected),
                        Some(Ordering::Less) | Some(Ordering::Equal)
                    ),
                    CondOp::Gt => compare_values(actual, expected) == Some(Ordering::Greater),
                    CondOp::Ge => matches!(
                        compare_values(actual, expected),
                        Some(Ordering::Greater) | Some(Ordering::Equal)
                    ),
                    CondOp::Contains => contains(actual, expected),
                    CondOp::NotContains => !contains(actual, expected),
                    CondOp::In => is_member(expected, actual),
                    CondOp::NotIn => !is_member(expected, actual),
                    CondOp::Exists | CondOp::NotExists => unreachable!(),
                }
            }
        }
    }
}

/// `haystack contains needle`: substring for strings, membership for lists
fn contains(haystack: &AttrValue, needle: &AttrValue) -> bool {
    match (haystack, needle) {
        (AttrValue::Str(h), AttrValue::Str(n)) => h.contains(n.as_str()),
        (AttrValue::List(items), n) => items.iter().any(|i| {
            i == n || compare_values(i, n) == Some(Ordering::Equal)
        }),
        _ => false,
    }
}

/// `value in list`
fn is_member(list: &AttrValue, value: &AttrValue) -> bool {
    match list {
        AttrValue::List(items) => items.iter().any(|i| {
            i == value || compare_values(i, value) == Some(Ordering::Equal)
        }),
        _ => false,
    }
}

/// A predicate: a list of conditions plus the combining logic (the context default applies when
/// `logic` is unset).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSpec {
    /// Combining logic; `None` defers to the context default
    pub logic: Option<Logic>,
    /// The conditions
    pub conditions: Vec<Condition>,
}

/// Evaluate a match spec against an attribute lookup function. An empty condition list matches
/// everything.
pub(crate) fn evaluate(
    spec: &MatchSpec,
    logic: Logic,
    attr_of: impl Fn(&str) -> Option<AttrValue>,
) -> bool {
    if spec.conditions.is_empty() {
        return true;
    }
    match logic {
        Logic::And => spec.conditions.iter().all(|c| c.eval(attr_of(&c.attr).as_ref())),
        Logic::Or => spec.conditions.iter().any(|c| c.eval(attr_of(&c.attr).as_ref())),
    }
}
