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

//! Relkit Plugin System
//!
//! Resolves the plugin definitions of a release-pipeline configuration into
//! uniform, validated, side-effect-isolated async callables.
//!
//! # Architecture
//!
//! A plugin definition is a module specifier, a `{path, ...options}`
//! object, or an already-resolved handler. Normalization turns any of them
//! into a [`NormalizedPlugin`] for one pipeline slot:
//!
//! - **Resolution**: relative specifiers introduced by a shareable config
//!   are rewritten against that config's directory.
//! - **Loading**: modules come from a [`ModuleLoader`]; the in-process
//!   [`ModuleRegistry`] is the stock implementation, real loading mechanics
//!   stay behind the trait.
//! - **Selection**: one callable is picked out of the loaded export for the
//!   requested slot, or normalization fails.
//! - **Isolation**: every invocation hands the plugin fresh copies of its
//!   merged configuration and input; caller state is never observable.
//! - **Validation**: an optional [`OutputCheck`] rejects bad outputs at
//!   call time.
//!
//! [`PipelineAssembler`] applies this to every slot of the closed pipeline
//! set and produces a [`PluginSet`], filling unconfigured slots with a
//! no-op.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use relkit_plugins::{
//!     CallbackHandler, DispatchOptions, ModuleExport, ModuleRegistry, PipelineAssembler,
//!     PipelineConfig, PipelineDefinitions, ShareableConfigMap, SlotName, TracingLogger,
//! };
//!
//! let registry = Arc::new(ModuleRegistry::new());
//! registry.register(
//!     "@relkit/git",
//!     ModuleExport::capability(
//!         SlotName::Publish,
//!         CallbackHandler::shared("git", |config, _input| Ok(config)),
//!     ),
//! );
//!
//! let config = PipelineConfig::from_json(r#"{
//!     "repositoryUrl": "https://github.com/owner/repo.git",
//!     "publish": {"path": "@relkit/git", "assets": ["CHANGELOG.md"]}
//! }"#)?;
//!
//! let assembler =
//!     PipelineAssembler::new(registry).with_definitions(PipelineDefinitions::standard());
//! let plugins = assembler.get_plugins(&config, &ShareableConfigMap::new(), &TracingLogger)?;
//!
//! let run = plugins
//!     .dispatch(SlotName::Publish, None, &DispatchOptions::default())
//!     .await;
//! assert!(run.all_successful());
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod handler;
pub mod loader;
pub mod logger;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
pub mod slot;

pub use config::{ConfigError, PipelineConfig};
pub use definition::{PluginDefinition, PluginTarget, SlotConfig};
pub use error::{PluginError, PluginResult};
pub use handler::{AsyncSlotHandler, CallbackHandler, LoggingHandler, NoOpHandler, SlotHandler};
pub use loader::{ModuleExport, ModuleLoader, ModuleRegistry};
pub use logger::{PipelineLogger, TracingLogger};
pub use normalize::{merge_config, normalize, NormalizeContext, NormalizedPlugin, OutputCheck};
pub use pipeline::{
    DispatchOptions, PipelineAssembler, PipelineDefinitions, PluginSet, SlotDefinition, SlotPlugins,
    SlotRun, StepResult, RELEASE_TYPES,
};
pub use resolve::{resolve_reference, ResolvedReference, ShareableConfigMap};
pub use slot::SlotName;
