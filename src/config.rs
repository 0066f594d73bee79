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

//! Pipeline configuration ingestion.

use crate::definition::SlotConfig;
use crate::slot::SlotName;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Full plugin configuration for one release pipeline.
///
/// Slot keys hold plugin definitions; every other key is a global option
/// handed to all plugins.
///
/// # Example JSON Configuration
///
/// ```json
/// {
///     "repositoryUrl": "https://github.com/owner/repo.git",
///     "verifyConditions": ["@relkit/git", "@relkit/changelog"],
///     "publish": {"path": "@relkit/git", "assets": ["CHANGELOG.md"]}
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Definitions per configured slot.
    pub slots: HashMap<SlotName, SlotConfig>,

    /// Options shared by every plugin.
    pub globals: Map<String, Value>,
}

impl PipelineConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    /// Parse a configuration from a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let value: toml::Value =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let json = serde_json::to_value(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_value(json)
    }

    /// Split an already-parsed document into slot definitions and globals.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let entries = match value {
            Value::Object(entries) => entries,
            _ => return Err(ConfigError::Parse("expected a top-level object".to_string())),
        };

        let mut config = PipelineConfig::default();
        for (key, entry) in entries {
            match SlotName::from_key(&key) {
                Some(slot) => match SlotConfig::from_value(&entry) {
                    Some(slot_config) => {
                        config.slots.insert(slot, slot_config);
                    }
                    None => {
                        return Err(ConfigError::InvalidDefinition {
                            key,
                            reason: "expected a string, an object with an optional string path, \
                                     or an array of those"
                                .to_string(),
                        });
                    }
                },
                None => {
                    config.globals.insert(key, entry);
                }
            }
        }
        Ok(config)
    }

    /// Set one slot's definition (builder style).
    pub fn with_slot(mut self, slot: SlotName, definition: SlotConfig) -> Self {
        self.slots.insert(slot, definition);
        self
    }

    /// Set a global option (builder style).
    pub fn with_global(mut self, key: impl Into<String>, value: Value) -> Self {
        self.globals.insert(key.into(), value);
        self
    }

    /// Get one slot's raw definition.
    pub fn slot(&self, slot: SlotName) -> Option<&SlotConfig> {
        self.slots.get(&slot)
    }
}

/// Errors that can occur while reading pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid plugin definition for \"{key}\": {reason}")]
    InvalidDefinition { key: String, reason: String },
}
