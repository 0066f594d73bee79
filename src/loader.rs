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

//! Module loading seam and the in-process registry loader.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

use crate::error::{PluginError, PluginResult};
use crate::handler::AsyncSlotHandler;
use crate::slot::SlotName;

/// Loads modules by effective specifier.
///
/// Loading is synchronous and happens eagerly while plugins are normalized,
/// never during a pipeline run.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, specifier: &str) -> PluginResult<ModuleExport>;
}

/// The value a loaded module exposes.
#[derive(Clone)]
pub enum ModuleExport {
    /// Single-purpose module: one callable serving any slot.
    Callable(AsyncSlotHandler),
    /// Capability-name to callable mapping.
    Capabilities(HashMap<String, AsyncSlotHandler>),
    /// Container with a `default` member holding one of the above.
    DefaultExport(Box<ModuleExport>),
}

impl ModuleExport {
    /// Capability map exposing a single slot.
    pub fn capability(slot: SlotName, handler: AsyncSlotHandler) -> Self {
        let mut map = HashMap::new();
        map.insert(slot.as_str().to_string(), handler);
        ModuleExport::Capabilities(map)
    }

    /// Select the callable implementing `slot`.
    ///
    /// A callable module serves every slot. A `default` container is
    /// unwrapped exactly one level before the lookup, so nothing nested
    /// deeper ever matches.
    pub fn select(&self, slot: SlotName) -> Option<AsyncSlotHandler> {
        match self {
            ModuleExport::Callable(handler) => Some(handler.clone()),
            ModuleExport::Capabilities(map) => map.get(slot.as_str()).cloned(),
            ModuleExport::DefaultExport(inner) => match inner.as_ref() {
                ModuleExport::Callable(handler) => Some(handler.clone()),
                ModuleExport::Capabilities(map) => map.get(slot.as_str()).cloned(),
                ModuleExport::DefaultExport(_) => None,
            },
        }
    }
}

impl fmt::Debug for ModuleExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleExport::Callable(handler) => {
                f.debug_tuple("Callable").field(&handler.name()).finish()
            }
            ModuleExport::Capabilities(map) => {
                let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
                names.sort_unstable();
                f.debug_tuple("Capabilities").field(&names).finish()
            }
            ModuleExport::DefaultExport(inner) => {
                f.debug_tuple("DefaultExport").field(inner).finish()
            }
        }
    }
}

/// In-process module loader backed by a registry of exports.
///
/// Real loading mechanics (filesystem, dynamic libraries, subprocesses)
/// stay behind the [`ModuleLoader`] trait; hosts register whatever their
/// runtime exposes and normalization loads from here.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, ModuleExport>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under `specifier`, returning the export it replaced.
    pub fn register(
        &self,
        specifier: impl Into<String>,
        export: ModuleExport,
    ) -> Option<ModuleExport> {
        self.modules.write().insert(specifier.into(), export)
    }

    /// Remove a registered module.
    pub fn unregister(&self, specifier: &str) -> Option<ModuleExport> {
        self.modules.write().remove(specifier)
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.modules.read().contains_key(specifier)
    }

    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load(&self, specifier: &str) -> PluginResult<ModuleExport> {
        self.modules
            .read()
            .get(specifier)
            .cloned()
            .ok_or_else(|| PluginError::ModuleNotFound {
                specifier: specifier.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{CallbackHandler, NoOpHandler};
    use serde_json::json;
    use std::sync::Arc;

    fn handler(name: &str) -> AsyncSlotHandler {
        CallbackHandler::shared(name.to_string(), |_, _| Ok(json!("ok")))
    }

    #[test]
    fn test_register_and_load() {
        let registry = ModuleRegistry::new();
        assert!(registry.is_empty());

        registry.register("@relkit/git", ModuleExport::capability(SlotName::Publish, handler("git")));
        assert!(registry.contains("@relkit/git"));
        assert_eq!(registry.len(), 1);

        let export = registry.load("@relkit/git").unwrap();
        assert!(export.select(SlotName::Publish).is_some());
    }

    #[test]
    fn test_missing_module() {
        let registry = ModuleRegistry::new();
        let err = registry.load("no-such-path").unwrap_err();
        assert_eq!(err.code(), "MODULE_NOT_FOUND");
        assert_eq!(err.to_string(), "Cannot find module 'no-such-path'");
    }

    #[test]
    fn test_register_replaces_silently() {
        let registry = ModuleRegistry::new();
        assert!(registry
            .register("mod", ModuleExport::Callable(Arc::new(NoOpHandler)))
            .is_none());

        let displaced = registry.register("mod", ModuleExport::Callable(handler("next")));
        assert!(displaced.is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister() {
        let registry = ModuleRegistry::new();
        registry.register("mod", ModuleExport::Callable(Arc::new(NoOpHandler)));
        assert!(registry.unregister("mod").is_some());
        assert!(!registry.contains("mod"));
        assert!(registry.unregister("mod").is_none());
    }

    #[test]
    fn test_select_callable_serves_any_slot() {
        let export = ModuleExport::Callable(handler("universal"));
        for slot in SlotName::ALL {
            assert!(export.select(slot).is_some());
        }
    }

    #[test]
    fn test_select_capability_lookup() {
        let export = ModuleExport::capability(SlotName::Publish, handler("git"));
        assert!(export.select(SlotName::Publish).is_some());
        assert!(export.select(SlotName::VerifyConditions).is_none());
    }

    #[test]
    fn test_select_unwraps_one_default_level() {
        let export = ModuleExport::DefaultExport(Box::new(ModuleExport::capability(
            SlotName::Publish,
            handler("git"),
        )));
        assert!(export.select(SlotName::Publish).is_some());
        assert!(export.select(SlotName::Prepare).is_none());

        let nested = ModuleExport::DefaultExport(Box::new(ModuleExport::DefaultExport(Box::new(
            ModuleExport::Callable(handler("hidden")),
        ))));
        assert!(nested.select(SlotName::Publish).is_none());
    }
}
