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

//! Variable templates: `$name` / `${name}` substitution under cartesian or zip binding modes.

use crate::error::ExpansionError;
use crate::types::AttrValue;
use std::collections::BTreeMap;

/// Hard cap on the number of binding combinations a single template may produce.
pub const EXPANSION_CAP: usize = 10_000;

/// How variable lists combine into bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandMode {
    /// All combinations of all lists
    Cartesian,
    /// All lists must have equal length; combine by index
    Zip,
}

/// One concrete assignment of every variable
pub type Bindings = BTreeMap<String, AttrValue>;

/// Produce the list of bindings for a variable mapping. Variables iterate in name order, so the
/// combination order is deterministic. Exceeding [`EXPANSION_CAP`] is fatal.
pub fn expand_bindings(
    vars: &BTreeMap<String, Vec<AttrValue>>,
    mode: ExpandMode,
) -> Result<Vec<Bindings>, ExpansionError> {
    if vars.is_empty() {
        return Ok(vec![Bindings::new()]);
    }
    match mode {
        ExpandMode::Zip => {
            let mut len = None;
            for list in vars.values() {
                match len {
                    None => len = Some(list.len()),
                    Some(l) if l != list.len() => {
                        return Err(ExpansionError::ZipLengthMismatch(l, list.len()))
                    }
                    _ => {}
                }
            }
            let len = len.unwrap_or(0);
            check_cap(vars, len)?;
            let mut out = Vec::with_capacity(len);
            for i in 0..len {
                out.push(
                    vars.iter().map(|(k, list)| (k.clone(), list[i].clone())).collect(),
                );
            }
            Ok(out)
        }
        ExpandMode::Cartesian => {
            let total = vars
                .values()
                .fold(1usize, |acc, list| acc.saturating_mul(list.len()));
            check_cap(vars, total)?;
            let mut out: Vec<Bindings> = vec![Bindings::new()];
            for (name, list) in vars {
                let mut next = Vec::with_capacity(out.len() * list.len());
                for binding in &out {
                    for value in list {
                        let mut b = binding.clone();
                        b.insert(name.clone(), value.clone());
                        next.push(b);
                    }
                }
                out = next;
            }
            Ok(out)
        }
    }
}

fn check_cap(
    vars: &BTreeMap<String, Vec<AttrValue>>,
    total: usize,
) -> Result<(), ExpansionError> {
    if total > EXPANSION_CAP {
        Err(ExpansionError::CapExceeded(describe(vars), total, EXPANSION_CAP))
    } else {
        Ok(())
    }
}

fn describe(vars: &BTreeMap<String, Vec<AttrValue>>) -> String {
    let names: Vec<&str> = vars.keys().map(|k| k.as_str()).collect();
    format!("vars({})", names.join(","))
}

/// Substitute `$name` and `${name}` references in a string. A reference to a variable without a
/// binding is fatal; `$` followed by anything that cannot start a variable name stays literal.
pub fn substitute(template: &str, bindings: &Bindings) -> Result<String, ExpansionError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let braced = matches!(chars.peek(), Some((_, '{')));
        if braced {
            chars.next();
        }
        let mut name = String::new();
        while let Some((_, c)) = chars.peek() {
            if braced && *c == '}' {
                break;
            }
            if !braced && !(c.is_ascii_alphanumeric() || *c == '_') {
                break;
            }
            name.push(*c);
            chars.next();
        }
        if braced {
            match chars.next() {
                Some((_, '}')) => {}
                _ => {
                    return Err(ExpansionError::UnresolvedVariable(
                        name,
                        template.to_string(),
                    ))
                }
            }
        }
        if name.is_empty() {
            if braced {
                return Err(ExpansionError::UnresolvedVariable(name, template.to_string()));
            }
            out.push('$');
            continue;
        }
        match bindings.get(&name) {
            Some(value) => out.push_str(&value.to_key_string()),
            None => {
                return Err(ExpansionError::UnresolvedVariable(name, template.to_string()))
            }
        }
    }
    Ok(out)
}

/// Substitute variables in every string found in a value tree.
pub fn substitute_value(
    value: &AttrValue,
    bindings: &Bindings,
) -> Result<AttrValue, ExpansionError> {
    Ok(match value {
        AttrValue::Str(s) => AttrValue::Str(substitute(s, bindings)?),
        AttrValue::List(items) => AttrValue::List(
            items.iter().map(|i| substitute_value(i, bindings)).collect::<Result<_, _>>()?,
        ),
        AttrValue::Map(map) => AttrValue::Map(
            map.iter()
                .map(|(k, v)| Ok((substitute(k, bindings)?, substitute_value(v, bindings)?)))
                .collect::<Result<_, ExpansionError>>()?,
        ),
        other => other.clone(),
    })
}
