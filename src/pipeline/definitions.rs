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

//! Per-slot schema: default plugins and output checks.

use crate::definition::PluginDefinition;
use crate::normalize::OutputCheck;
use crate::slot::SlotName;
use serde_json::Value;
use std::collections::HashMap;

/// Release types an `analyzeCommits` plugin may output.
pub const RELEASE_TYPES: [&str; 3] = ["patch", "minor", "major"];

/// What the assembler knows about one slot beyond its name.
///
/// `default` makes the "bare options object" definition shape legal for the
/// slot: the assembler substitutes the default's target and layers the
/// user's options over the default's. `output_check` is attached to every
/// plugin normalized for the slot.
#[derive(Debug, Clone, Default)]
pub struct SlotDefinition {
    default: Option<PluginDefinition>,
    output_check: Option<OutputCheck>,
}

impl SlotDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the plugin a bare options object resolves against.
    pub fn with_default(mut self, definition: PluginDefinition) -> Self {
        self.default = Some(definition);
        self
    }

    /// Set the post-call output check for the slot.
    pub fn with_output_check(mut self, check: OutputCheck) -> Self {
        self.output_check = Some(check);
        self
    }

    pub fn default_plugin(&self) -> Option<&PluginDefinition> {
        self.default.as_ref()
    }

    pub fn output_check(&self) -> Option<&OutputCheck> {
        self.output_check.as_ref()
    }
}

/// Slot schema handed to the assembler.
///
/// Which slots carry a built-in default plugin is host knowledge, so it
/// arrives here as an explicit input instead of being inferred.
#[derive(Debug, Clone, Default)]
pub struct PipelineDefinitions {
    slots: HashMap<SlotName, SlotDefinition>,
}

impl PipelineDefinitions {
    /// Empty schema: no defaults, no output checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock release-pipeline output checks. Defaults stay
    /// host-provided; add them with [`PipelineDefinitions::with_slot`].
    pub fn standard() -> Self {
        Self::new()
            .with_slot(
                SlotName::AnalyzeCommits,
                SlotDefinition::new().with_output_check(OutputCheck::new(
                    "The analyzeCommits plugin output, if defined, must be a valid release type \
                     (patch, minor, major).",
                    |output| match output {
                        Value::Null => true,
                        Value::String(release_type) => {
                            RELEASE_TYPES.contains(&release_type.as_str())
                        }
                        _ => false,
                    },
                )),
            )
            .with_slot(
                SlotName::GenerateNotes,
                SlotDefinition::new().with_output_check(OutputCheck::new(
                    "The generateNotes plugin output, if defined, must be a string.",
                    |output| output.is_null() || output.is_string(),
                )),
            )
            .with_slot(
                SlotName::Publish,
                SlotDefinition::new().with_output_check(release_output_check(
                    "The publish plugin output, if defined, must be false or an object.",
                )),
            )
            .with_slot(
                SlotName::AddChannel,
                SlotDefinition::new().with_output_check(release_output_check(
                    "The addChannel plugin output, if defined, must be false or an object.",
                )),
            )
    }

    /// Set one slot's definition (builder style).
    pub fn with_slot(mut self, slot: SlotName, definition: SlotDefinition) -> Self {
        self.slots.insert(slot, definition);
        self
    }

    pub fn slot(&self, slot: SlotName) -> Option<&SlotDefinition> {
        self.slots.get(&slot)
    }
}

// publish and addChannel share the "release or skip marker" output shape.
fn release_output_check(message: &str) -> OutputCheck {
    OutputCheck::new(message, |output| {
        matches!(output, Value::Null | Value::Bool(false) | Value::Object(_))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check_for(slot: SlotName) -> OutputCheck {
        PipelineDefinitions::standard()
            .slot(slot)
            .and_then(SlotDefinition::output_check)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_standard_analyze_commits_check() {
        let check = check_for(SlotName::AnalyzeCommits);
        assert!(check.accepts(&Value::Null));
        for release_type in RELEASE_TYPES {
            assert!(check.accepts(&json!(release_type)));
        }
        assert!(!check.accepts(&json!("prerelease")));
        assert!(!check.accepts(&json!(2)));
    }

    #[test]
    fn test_standard_generate_notes_check() {
        let check = check_for(SlotName::GenerateNotes);
        assert!(check.accepts(&Value::Null));
        assert!(check.accepts(&json!("## 1.0.0")));
        assert!(!check.accepts(&json!(["notes"])));
    }

    #[test]
    fn test_standard_release_checks() {
        for slot in [SlotName::Publish, SlotName::AddChannel] {
            let check = check_for(slot);
            assert!(check.accepts(&Value::Null));
            assert!(check.accepts(&json!(false)));
            assert!(check.accepts(&json!({"url": "https://example.com"})));
            assert!(!check.accepts(&json!(true)));
            assert!(!check.accepts(&json!("released")));
        }
    }

    #[test]
    fn test_standard_leaves_other_slots_unchecked() {
        let definitions = PipelineDefinitions::standard();
        for slot in [SlotName::VerifyConditions, SlotName::Prepare, SlotName::Success] {
            assert!(definitions
                .slot(slot)
                .and_then(SlotDefinition::output_check)
                .is_none());
        }
    }

    #[test]
    fn test_with_slot_default() {
        let definitions = PipelineDefinitions::new().with_slot(
            SlotName::Publish,
            SlotDefinition::new()
                .with_default(PluginDefinition::Specifier("@relkit/git".to_string())),
        );

        let default = definitions
            .slot(SlotName::Publish)
            .and_then(SlotDefinition::default_plugin)
            .unwrap();
        assert!(default.has_target());
        assert!(definitions.slot(SlotName::Prepare).is_none());
    }
}
