// Copyright 2025 Relkit Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sequential dispatch of one slot's plugins.

use crate::error::PluginResult;
use crate::slot::SlotName;
use serde_json::Value;

use super::assembler::PluginSet;

/// Policy knobs for dispatching one slot.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Keep invoking the remaining plugins after a step fails. Off by
    /// default: the first failure stops the slot and skips the rest.
    pub continue_on_error: bool,
}

/// Outcome of one plugin invocation within a slot run.
#[derive(Debug)]
pub struct StepResult {
    /// Display name of the plugin that ran.
    pub plugin: String,
    /// What the invocation resolved to.
    pub result: PluginResult<Value>,
}

/// Result of dispatching one slot.
#[derive(Debug)]
pub struct SlotRun {
    /// Slot that was dispatched.
    pub slot: SlotName,
    /// Per-step results, in invocation order. Steps skipped after a
    /// failure do not appear.
    pub results: Vec<StepResult>,
    /// Number of steps that resolved.
    pub success_count: usize,
    /// Number of steps that failed.
    pub failure_count: usize,
}

impl SlotRun {
    fn empty(slot: SlotName) -> Self {
        Self {
            slot,
            results: Vec::new(),
            success_count: 0,
            failure_count: 0,
        }
    }

    /// Whether no step failed.
    pub fn all_successful(&self) -> bool {
        self.failure_count == 0
    }

    /// The successful outputs, in invocation order.
    pub fn outputs(&self) -> Vec<&Value> {
        self.results
            .iter()
            .filter_map(|step| step.result.as_ref().ok())
            .collect()
    }
}

impl PluginSet {
    /// Invoke one slot's plugins strictly in order, never concurrently.
    ///
    /// Every plugin receives the same `input`; nothing is retried and no
    /// timeout is imposed. A slot missing from the set dispatches to an
    /// empty successful run.
    pub async fn dispatch(
        &self,
        slot: SlotName,
        input: Option<&Value>,
        options: &DispatchOptions,
    ) -> SlotRun {
        let plugins = match self.slots.get(&slot) {
            Some(plugins) => plugins,
            None => return SlotRun::empty(slot),
        };

        tracing::debug!(slot = %slot, steps = plugins.len(), "Dispatching slot");
        let mut run = SlotRun::empty(slot);
        for plugin in plugins.iter() {
            let result = plugin.call(input).await;
            match &result {
                Ok(_) => run.success_count += 1,
                Err(error) => {
                    tracing::debug!(slot = %slot, plugin = %plugin.name(), %error, "Step failed");
                    run.failure_count += 1;
                }
            }
            let failed = result.is_err();
            run.results.push(StepResult {
                plugin: plugin.name().to_string(),
                result,
            });
            if failed && !options.continue_on_error {
                break;
            }
        }

        tracing::debug!(
            slot = %slot,
            successes = run.success_count,
            failures = run.failure_count,
            "Slot dispatch finished"
        );
        run
    }
}
