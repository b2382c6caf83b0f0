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

//! The results document: one entry per executed workflow step, keyed by step name.

use serde::Serialize;

/// Metadata attached to every step result.
#[derive(Debug, Clone, Serialize)]
pub struct StepMetadata {
    /// Wall-clock execution time
    pub duration_sec: f64,
    /// Catalog name of the step
    pub step_type: String,
    /// The step's (unique) name
    pub step_name: String,
}

/// One executed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    /// Execution metadata
    pub metadata: StepMetadata,
    /// Step-specific payload
    pub data: serde_json::Value,
}

impl StepResult {
    /// Navigate a dotted field path (e.g. `data.alpha_star`) from the step-result root.
    pub fn lookup(&self, path: &str) -> Option<serde_json::Value> {
        let root = serde_json::json!({
            "metadata": self.metadata,
            "data": self.data,
        });
        let mut current = &root;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }
}

/// The full results document, steps in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultsDocument {
    /// Executed steps
    pub steps: Vec<StepResult>,
}

impl ResultsDocument {
    /// Find a step result by name
    pub fn get(&self, name: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.metadata.step_name == name)
    }

    /// Pretty-printed JSON rendering of the document
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Keep only the steps with the given names (the CLI `--keys` filter)
    pub fn filter_keys(&mut self, keys: &[String]) {
        self.steps.retain(|s| keys.contains(&s.metadata.step_name));
    }
}
