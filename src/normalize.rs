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

//! Plugin normalization: one definition in, one uniform async callable out.
//!
//! Resolution, loading, and capability selection all happen here, eagerly.
//! The [`NormalizedPlugin`] that comes out holds the resolved target and the
//! merged configuration; invoking it never looks anything up again.

use crate::definition::{PluginDefinition, PluginTarget};
use crate::error::{PluginError, PluginResult};
use crate::handler::{AsyncSlotHandler, NoOpHandler};
use crate::loader::ModuleLoader;
use crate::logger::PipelineLogger;
use crate::resolve::{resolve_reference, ShareableConfigMap};
use crate::slot::SlotName;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Shallow-merge global and plugin-local options.
///
/// Local keys win. `path` never survives into the result no matter which
/// side carried it.
pub fn merge_config(
    global: &Map<String, Value>,
    local: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = global.clone();
    for (key, value) in local {
        merged.insert(key.clone(), value.clone());
    }
    merged.remove("path");
    merged
}

/// Post-call check of a plugin's resolved output.
#[derive(Clone)]
pub struct OutputCheck {
    validator: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
    message: String,
}

impl OutputCheck {
    /// Build a check from the message used on rejection and a predicate.
    pub fn new<F>(message: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            validator: Arc::new(validator),
            message: message.into(),
        }
    }

    /// Run the predicate against a plugin output.
    pub fn accepts(&self, output: &Value) -> bool {
        (self.validator)(output)
    }

    /// Message prefix used when the check rejects.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for OutputCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputCheck")
            .field("message", &self.message)
            .finish()
    }
}

/// Collaborators shared by every normalization in one assembly run.
pub struct NormalizeContext<'a> {
    /// Module loader for specifier definitions.
    pub loader: &'a dyn ModuleLoader,
    /// Specifier to shareable-config origin mapping.
    pub paths: &'a ShareableConfigMap,
    /// Options shared by every plugin.
    pub global_config: &'a Map<String, Value>,
    /// Sink for the resolution log lines.
    pub logger: &'a dyn PipelineLogger,
}

/// Turn one plugin definition into a uniform async callable for `slot`.
///
/// An absent definition yields a no-op plugin resolving to `Value::Null`.
/// Specifier definitions are resolved against the shareable-config map,
/// loaded, and the slot capability selected; one log line goes to the
/// logger before the load. Definitions that already carry a handler skip
/// all of that and stay silent.
///
/// `ModuleNotFound` and `InvalidPluginExport` surface here, not at call
/// time.
pub fn normalize(
    ctx: &NormalizeContext<'_>,
    slot: SlotName,
    definition: Option<&PluginDefinition>,
    validation: Option<&OutputCheck>,
) -> PluginResult<NormalizedPlugin> {
    let definition = match definition {
        Some(definition) => definition,
        None => {
            return Ok(NormalizedPlugin {
                slot,
                name: "noop".to_string(),
                config: merge_config(ctx.global_config, &Map::new()),
                target: Arc::new(NoOpHandler),
                output_check: None,
            });
        }
    };

    let (target, local_config) = definition.parse();
    let target = target.ok_or(PluginError::InvalidPluginConfig { slot })?;
    let name = target.display_name();

    let handler = match target {
        PluginTarget::Handler(handler) => handler,
        PluginTarget::Specifier(specifier) => {
            let reference = resolve_reference(&specifier, ctx.paths);
            match &reference.base_dir {
                Some(base_dir) => ctx.logger.log(format!(
                    "Load plugin {} from {} in shareable config {}",
                    slot,
                    specifier,
                    base_dir.display()
                )),
                None => ctx
                    .logger
                    .log(format!("Load plugin {} from {}", slot, specifier)),
            }

            let export = ctx.loader.load(&reference.effective)?;
            export
                .select(slot)
                .ok_or(PluginError::InvalidPluginExport { slot, specifier })?
        }
    };

    let config = merge_config(ctx.global_config, &local_config);
    tracing::debug!(plugin = %name, slot = %slot, options = ?config, "Merged plugin options");

    Ok(NormalizedPlugin {
        slot,
        name,
        config,
        target: handler,
        output_check: validation.cloned(),
    })
}

/// The uniform async callable produced from any plugin definition.
///
/// Every call hands the target a fresh copy of the stored configuration
/// and of the input, so nothing a plugin mutates is ever observable in
/// caller-owned state. Outputs flow back unguarded, subject only to the
/// attached [`OutputCheck`].
#[derive(Clone)]
pub struct NormalizedPlugin {
    slot: SlotName,
    name: String,
    config: Map<String, Value>,
    target: AsyncSlotHandler,
    output_check: Option<OutputCheck>,
}

impl NormalizedPlugin {
    /// Slot this plugin serves.
    pub fn slot(&self) -> SlotName {
        self.slot
    }

    /// Display name: the specifier, or `[Function: <name>]` for handlers.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The merged configuration every call receives a copy of.
    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Invoke the plugin with an optional input argument.
    pub async fn call(&self, input: Option<&Value>) -> PluginResult<Value> {
        let config = Value::Object(self.config.clone());
        let input = input.cloned().unwrap_or(Value::Null);

        let output = self
            .target
            .call(config, input)
            .await
            .map_err(|cause| PluginError::Execution {
                plugin: self.name.clone(),
                slot: self.slot,
                cause,
            })?;

        if let Some(check) = &self.output_check {
            if !check.accepts(&output) {
                return Err(PluginError::OutputValidation {
                    slot: self.slot,
                    message: check.message().to_string(),
                    received: output.to_string(),
                });
            }
        }

        Ok(output)
    }
}

impl fmt::Debug for NormalizedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedPlugin")
            .field("slot", &self.slot)
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}
