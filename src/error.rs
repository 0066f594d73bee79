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

//! Plugin error types

use crate::slot::SlotName;
use thiserror::Error;

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors surfaced while resolving, assembling, or invoking plugins.
///
/// Message templates are part of the public contract; embedders match on
/// them and on [`PluginError::code`].
#[derive(Debug, Error)]
pub enum PluginError {
    // Resolution errors
    #[error("Cannot find module '{specifier}'")]
    ModuleNotFound { specifier: String },

    #[error(
        "The {slot} plugin must be a function, or an object with a function in the property {slot}."
    )]
    InvalidPluginExport { slot: SlotName, specifier: String },

    // Configuration errors
    #[error(
        "The \"{slot}\" plugin, if defined, must be a single or an array of plugins definition. A plugin definition is either a string or an object with a path property."
    )]
    InvalidPluginConfig { slot: SlotName },

    // Invocation errors
    #[error("{message} Received: {received}")]
    OutputValidation {
        slot: SlotName,
        message: String,
        received: String,
    },

    #[error("Failed step \"{slot}\" of plugin \"{plugin}\": {cause}")]
    Execution {
        plugin: String,
        slot: SlotName,
        // anyhow::Error is not a std Error; the field name keeps it away
        // from thiserror's source detection.
        cause: anyhow::Error,
    },
}

impl PluginError {
    /// Fixed domain error name surfaced to embedders.
    pub fn name(&self) -> &'static str {
        "RelkitError"
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            PluginError::ModuleNotFound { .. } => "MODULE_NOT_FOUND",
            PluginError::InvalidPluginExport { .. } => "EPLUGINCONF",
            PluginError::InvalidPluginConfig { .. } => "EPLUGINCONF",
            PluginError::OutputValidation { slot, .. } => slot.output_code(),
            PluginError::Execution { .. } => "EPLUGINEXECUTION",
        }
    }
}
