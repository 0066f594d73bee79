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

//! Plugin definition shapes.

use crate::handler::AsyncSlotHandler;
use serde_json::{Map, Value};
use std::fmt;

/// The value behind a definition's `path`: a module to load, or a handler
/// that skips loading entirely.
#[derive(Clone)]
pub enum PluginTarget {
    /// Module specifier to resolve and load.
    Specifier(String),
    /// Already-resolved callable.
    Handler(AsyncSlotHandler),
}

impl PluginTarget {
    /// Name used in logs and error messages.
    pub fn display_name(&self) -> String {
        match self {
            PluginTarget::Specifier(specifier) => specifier.clone(),
            PluginTarget::Handler(handler) => format!("[Function: {}]", handler.name()),
        }
    }
}

impl fmt::Debug for PluginTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginTarget::Specifier(specifier) => {
                f.debug_tuple("Specifier").field(specifier).finish()
            }
            PluginTarget::Handler(handler) => {
                f.debug_tuple("Handler").field(&handler.name()).finish()
            }
        }
    }
}

/// A user-supplied reference to one plugin.
#[derive(Clone)]
pub enum PluginDefinition {
    /// Bare module specifier.
    Specifier(String),
    /// Already-resolved callable.
    Handler(AsyncSlotHandler),
    /// The `{path, ...options}` object. `config` holds every key except
    /// `path`; a definition without `path` only assembles against a slot
    /// default.
    Options {
        path: Option<PluginTarget>,
        config: Map<String, Value>,
    },
}

impl PluginDefinition {
    /// Build a definition from its JSON form.
    ///
    /// Strings and objects are the JSON-expressible shapes; handlers enter
    /// through programmatic configuration only. Returns `None` when the
    /// value is not a definition.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(specifier) => Some(PluginDefinition::Specifier(specifier.clone())),
            Value::Object(entries) => {
                let mut config = entries.clone();
                let path = match config.remove("path") {
                    None => None,
                    Some(Value::String(specifier)) => Some(PluginTarget::Specifier(specifier)),
                    Some(_) => return None,
                };
                Some(PluginDefinition::Options { path, config })
            }
            _ => None,
        }
    }

    /// Whether the definition names its own target.
    pub fn has_target(&self) -> bool {
        !matches!(self, PluginDefinition::Options { path: None, .. })
    }

    /// Split into the target and the plugin-local configuration.
    pub(crate) fn parse(&self) -> (Option<PluginTarget>, Map<String, Value>) {
        match self {
            PluginDefinition::Specifier(specifier) => (
                Some(PluginTarget::Specifier(specifier.clone())),
                Map::new(),
            ),
            PluginDefinition::Handler(handler) => {
                (Some(PluginTarget::Handler(handler.clone())), Map::new())
            }
            PluginDefinition::Options { path, config } => (path.clone(), config.clone()),
        }
    }
}

impl fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginDefinition::Specifier(specifier) => {
                f.debug_tuple("Specifier").field(specifier).finish()
            }
            PluginDefinition::Handler(handler) => {
                f.debug_tuple("Handler").field(&handler.name()).finish()
            }
            PluginDefinition::Options { path, config } => f
                .debug_struct("Options")
                .field("path", path)
                .field("config", config)
                .finish(),
        }
    }
}

/// Raw user configuration for one slot.
#[derive(Debug, Clone)]
pub enum SlotConfig {
    /// One definition.
    Single(PluginDefinition),
    /// Ordered definitions, invoked in sequence.
    Sequence(Vec<PluginDefinition>),
}

impl SlotConfig {
    /// Build a slot configuration from its JSON form.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(PluginDefinition::from_value)
                .collect::<Option<Vec<_>>>()
                .map(SlotConfig::Sequence),
            other => PluginDefinition::from_value(other).map(SlotConfig::Single),
        }
    }
}
