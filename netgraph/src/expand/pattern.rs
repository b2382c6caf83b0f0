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

//! Bracket patterns and name templates.
//!
//! Bracket expansion turns `dc[1-3]/rack[a,b]` into the cartesian product of its token choices,
//! left-to-right. It applies to group and blueprint-instance names, risk-group names (including
//! children) and risk-group membership arrays; everywhere else brackets are literal.

use crate::error::ExpansionError;

/// One parsed segment of a bracketed name
enum Segment {
    Literal(String),
    Choices(Vec<String>),
}

/// Expand `[a-b]` (inclusive integer range) and `[x,y,z]` (explicit list; items may themselves
/// be ranges) tokens in a name. Multiple brackets produce the cartesian product in left-to-right
/// order. A name without brackets expands to itself, which makes expansion idempotent: expanded
/// names contain no brackets.
pub fn expand_brackets(name: &str) -> Result<Vec<String>, ExpansionError> {
    let segments = parse_segments(name)?;
    let mut result = vec![String::new()];
    for segment in &segments {
        match segment {
            Segment::Literal(lit) => {
                for r in &mut result {
                    r.push_str(lit);
                }
            }
            Segment::Choices(choices) => {
                let mut next = Vec::with_capacity(result.len() * choices.len());
                for prefix in &result {
                    for choice in choices {
                        let mut s = prefix.clone();
                        s.push_str(choice);
                        next.push(s);
                    }
                }
                result = next;
            }
        }
    }
    Ok(result)
}

fn parse_segments(name: &str) -> Result<Vec<Segment>, ExpansionError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c != '[' {
            literal.push(c);
            continue;
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        let mut body = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == ']' {
                closed = true;
                break;
            }
            body.push(c);
        }
        if !closed {
            return Err(ExpansionError::UnterminatedBracket(name.to_string()));
        }
        segments.push(Segment::Choices(expand_tokens(name, &body)?));
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn expand_tokens(name: &str, body: &str) -> Result<Vec<String>, ExpansionError> {
    if body.trim().is_empty() {
        return Err(ExpansionError::EmptyBracket(name.to_string()));
    }
    let mut choices = Vec::new();
    for token in body.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(ExpansionError::EmptyBracket(name.to_string()));
        }
        match parse_range(token) {
            Some((lo, hi)) => {
                if lo > hi {
                    return Err(ExpansionError::InvalidRange(token.to_string()));
                }
                for i in lo..=hi {
                    choices.push(i.to_string());
                }
            }
            None => choices.push(token.to_string()),
        }
    }
    Ok(choices)
}

/// `a-b` with both sides non-negative integers. Anything else is a plain token.
fn parse_range(token: &str) -> Option<(u64, u64)> {
    let dash = token.find('-')?;
    let (lo, hi) = (token[..dash].trim(), token[dash + 1..].trim());
    Some((lo.parse().ok()?, hi.parse().ok()?))
}

/// Substitute the programmatic numbering placeholders of a `name_template`: `{n}` and
/// `{node_num}` take the 1-based node counter, `{group}` takes the group name. Unknown
/// placeholders stay literal.
pub fn render_name_template(template: &str, group: &str, n: usize) -> String {
    template
        .replace("{n}", &n.to_string())
        .replace("{node_num}", &n.to_string())
        .replace("{group}", group)
}

/// The default node name template used when a group declares `node_count` without a
/// `name_template`.
pub const DEFAULT_NAME_TEMPLATE: &str = "{group}-{n}";

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_names_are_identity() {
        assert_eq!(expand_brackets("spine").unwrap(), vec!["spine"]);
        assert_eq!(expand_brackets("").unwrap(), vec![""]);
    }

    #[test]
    fn integer_range() {
        assert_eq!(expand_brackets("dc[1-3]").unwrap(), vec!["dc1", "dc2", "dc3"]);
    }

    #[test]
    fn list_and_cartesian_product() {
        assert_eq!(
            expand_brackets("dc[1-2]/rack[a,b]").unwrap(),
            vec!["dc1/racka", "dc1/rackb", "dc2/racka", "dc2/rackb"]
        );
    }

    #[test]
    fn list_items_may_be_ranges() {
        assert_eq!(
            expand_brackets("n[1-2,9]").unwrap(),
            vec!["n1", "n2", "n9"]
        );
    }

    #[test]
    fn expansion_is_idempotent() {
        for name in expand_brackets("pod[1-3]/leaf[a,b]").unwrap() {
            assert_eq!(expand_brackets(&name).unwrap(), vec![name.clone()]);
        }
    }

    #[test]
    fn unterminated_bracket_fails() {
        assert!(matches!(
            expand_brackets("dc[1-3"),
            Err(ExpansionError::UnterminatedBracket(_))
        ));
    }

    #[test]
    fn reversed_range_fails() {
        assert!(matches!(expand_brackets("dc[3-1]"), Err(ExpansionError::InvalidRange(_))));
    }

    #[test]
    fn name_template_placeholders() {
        assert_eq!(render_name_template("{group}-{n}", "leaf", 3), "leaf-3");
        assert_eq!(render_name_template("node{node_num}", "x", 12), "node12");
    }
}
