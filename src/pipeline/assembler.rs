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

//! Pipeline assembly: every slot of the closed set, normalized.

use crate::config::PipelineConfig;
use crate::definition::{PluginDefinition, SlotConfig};
use crate::error::{PluginError, PluginResult};
use crate::loader::ModuleLoader;
use crate::logger::PipelineLogger;
use crate::normalize::{merge_config, normalize, NormalizeContext, NormalizedPlugin};
use crate::resolve::ShareableConfigMap;
use crate::slot::SlotName;
use std::collections::HashMap;
use std::sync::Arc;

use super::definitions::{PipelineDefinitions, SlotDefinition};

/// The normalized plugins serving one slot.
#[derive(Debug, Clone)]
pub enum SlotPlugins {
    /// One plugin (including the no-op for unconfigured slots).
    Single(NormalizedPlugin),
    /// Ordered plugins, invoked in sequence.
    Sequence(Vec<NormalizedPlugin>),
}

impl SlotPlugins {
    /// The plugins in invocation order.
    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedPlugin> {
        match self {
            SlotPlugins::Single(plugin) => std::slice::from_ref(plugin).iter(),
            SlotPlugins::Sequence(plugins) => plugins.iter(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SlotPlugins::Single(_) => 1,
            SlotPlugins::Sequence(plugins) => plugins.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The full set of normalized pipeline plugins, one entry per slot.
///
/// Built once per release run and immutable afterward. Every slot of the
/// closed set is present; unconfigured slots hold a single no-op plugin.
#[derive(Debug, Clone)]
pub struct PluginSet {
    pub(super) slots: HashMap<SlotName, SlotPlugins>,
}

impl PluginSet {
    /// Get the plugins assembled for a slot.
    pub fn get(&self, slot: SlotName) -> Option<&SlotPlugins> {
        self.slots.get(&slot)
    }
}

/// Builds a [`PluginSet`] from a pipeline configuration.
///
/// Assembly is eager and fail-fast: definition shapes are validated for
/// every slot before any module is loaded, and the first resolution error
/// aborts the whole build. No partial set is ever returned.
pub struct PipelineAssembler {
    loader: Arc<dyn ModuleLoader>,
    definitions: PipelineDefinitions,
}

impl PipelineAssembler {
    /// Create an assembler loading modules from `loader`, with no slot
    /// defaults or output checks.
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            definitions: PipelineDefinitions::new(),
        }
    }

    /// Use `definitions` as the slot schema (defaults and output checks).
    pub fn with_definitions(mut self, definitions: PipelineDefinitions) -> Self {
        self.definitions = definitions;
        self
    }

    /// Assemble the full plugin set for one release run.
    pub fn get_plugins(
        &self,
        config: &PipelineConfig,
        paths: &ShareableConfigMap,
        logger: &dyn PipelineLogger,
    ) -> PluginResult<PluginSet> {
        // Shape pass: reject invalid definitions everywhere before loading
        // anything.
        for slot in SlotName::ALL {
            if let Some(slot_config) = config.slot(slot) {
                self.validate_shape(slot, slot_config)?;
            }
        }

        let ctx = NormalizeContext {
            loader: self.loader.as_ref(),
            paths,
            global_config: &config.globals,
            logger,
        };

        let mut slots = HashMap::new();
        for slot in SlotName::ALL {
            let validation = self
                .definitions
                .slot(slot)
                .and_then(SlotDefinition::output_check);

            let plugins = match config.slot(slot) {
                None => SlotPlugins::Single(normalize(&ctx, slot, None, validation)?),
                Some(SlotConfig::Single(definition)) => {
                    let definition = self.apply_default(slot, definition);
                    SlotPlugins::Single(normalize(&ctx, slot, Some(&definition), validation)?)
                }
                Some(SlotConfig::Sequence(definitions)) => SlotPlugins::Sequence(
                    definitions
                        .iter()
                        .map(|definition| normalize(&ctx, slot, Some(definition), validation))
                        .collect::<PluginResult<Vec<_>>>()?,
                ),
            };
            slots.insert(slot, plugins);
        }

        tracing::debug!(slots = slots.len(), "Assembled pipeline plugin set");
        Ok(PluginSet { slots })
    }

    fn validate_shape(&self, slot: SlotName, slot_config: &SlotConfig) -> PluginResult<()> {
        let valid = match slot_config {
            // A bare options object is only meaningful against a slot
            // default.
            SlotConfig::Single(definition) => {
                definition.has_target() || self.default_for(slot).is_some()
            }
            // Sequence elements always name their own target.
            SlotConfig::Sequence(definitions) => {
                definitions.iter().all(PluginDefinition::has_target)
            }
        };

        if valid {
            Ok(())
        } else {
            Err(PluginError::InvalidPluginConfig { slot })
        }
    }

    fn default_for(&self, slot: SlotName) -> Option<&PluginDefinition> {
        self.definitions
            .slot(slot)
            .and_then(SlotDefinition::default_plugin)
    }

    /// Resolve a bare options object into the slot default's target with
    /// the user's options layered over the default's.
    fn apply_default(&self, slot: SlotName, definition: &PluginDefinition) -> PluginDefinition {
        match (definition, self.default_for(slot)) {
            (PluginDefinition::Options { path: None, config }, Some(default)) => {
                let (path, default_config) = default.parse();
                PluginDefinition::Options {
                    path,
                    config: merge_config(&default_config, config),
                }
            }
            _ => definition.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{AsyncSlotHandler, CallbackHandler};
    use crate::loader::{ModuleExport, ModuleRegistry};
    use crate::normalize::OutputCheck;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::path::PathBuf;

    struct RecordingLogger(Mutex<Vec<String>>);

    impl RecordingLogger {
        fn new() -> Self {
            Self(Mutex::new(Vec::new()))
        }

        fn lines(&self) -> Vec<String> {
            self.0.lock().clone()
        }
    }

    impl PipelineLogger for RecordingLogger {
        fn log(&self, message: String) {
            self.0.lock().push(message);
        }
    }

    // Loader that records every specifier it is asked for.
    struct TracingLoader {
        inner: ModuleRegistry,
        requests: Mutex<Vec<String>>,
    }

    impl TracingLoader {
        fn new(inner: ModuleRegistry) -> Self {
            Self {
                inner,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModuleLoader for TracingLoader {
        fn load(&self, specifier: &str) -> PluginResult<ModuleExport> {
            self.requests.lock().push(specifier.to_string());
            self.inner.load(specifier)
        }
    }

    fn echo_config() -> AsyncSlotHandler {
        CallbackHandler::shared("echo", |config, _input| Ok(config))
    }

    fn universal_registry(specifiers: &[&str]) -> ModuleRegistry {
        let registry = ModuleRegistry::new();
        for specifier in specifiers {
            registry.register(*specifier, ModuleExport::Callable(echo_config()));
        }
        registry
    }

    #[tokio::test]
    async fn test_every_slot_gets_a_callable() {
        let registry = universal_registry(&["@relkit/git"]);
        let assembler = PipelineAssembler::new(Arc::new(registry));
        let config = PipelineConfig::from_json(
            r#"{
                "repositoryUrl": "https://github.com/owner/repo.git",
                "verifyConditions": ["@relkit/git"],
                "publish": "@relkit/git"
            }"#,
        )
        .unwrap();
        let logger = RecordingLogger::new();

        let set = assembler
            .get_plugins(&config, &ShareableConfigMap::new(), &logger)
            .unwrap();

        for slot in SlotName::ALL {
            let plugins = set.get(slot).unwrap();
            assert!(!plugins.is_empty());
            for plugin in plugins.iter() {
                assert!(plugin.call(None).await.is_ok());
            }
        }
        assert!(matches!(
            set.get(SlotName::VerifyConditions),
            Some(SlotPlugins::Sequence(_))
        ));
        assert!(matches!(set.get(SlotName::Prepare), Some(SlotPlugins::Single(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_slots_are_noops() {
        let assembler = PipelineAssembler::new(Arc::new(ModuleRegistry::new()));
        let logger = RecordingLogger::new();

        let set = assembler
            .get_plugins(&PipelineConfig::default(), &ShareableConfigMap::new(), &logger)
            .unwrap();

        let plugins = set.get(SlotName::Publish).unwrap();
        match plugins {
            SlotPlugins::Single(plugin) => {
                assert_eq!(plugin.name(), "noop");
                assert_eq!(plugin.call(None).await.unwrap(), Value::Null);
            }
            SlotPlugins::Sequence(_) => panic!("expected a single no-op"),
        }
        assert!(logger.lines().is_empty());
    }

    #[tokio::test]
    async fn test_globals_reach_every_plugin() {
        let registry = universal_registry(&["@relkit/git"]);
        let assembler = PipelineAssembler::new(Arc::new(registry));
        let config = PipelineConfig::from_json(
            r#"{
                "otherOpt": "global",
                "publish": {"path": "@relkit/git", "otherOpt": "local"},
                "prepare": "@relkit/git"
            }"#,
        )
        .unwrap();
        let logger = RecordingLogger::new();

        let set = assembler
            .get_plugins(&config, &ShareableConfigMap::new(), &logger)
            .unwrap();

        // Local options win over the global of the same name.
        let publish = set.get(SlotName::Publish).unwrap().iter().next().unwrap();
        assert_eq!(publish.call(None).await.unwrap()["otherOpt"], json!("local"));

        let prepare = set.get(SlotName::Prepare).unwrap().iter().next().unwrap();
        assert_eq!(prepare.call(None).await.unwrap()["otherOpt"], json!("global"));
    }

    #[tokio::test]
    async fn test_invalid_sequence_shape_fails_before_any_load() {
        let registry = universal_registry(&["a"]);
        let loader = Arc::new(TracingLoader::new(registry));
        let assembler = PipelineAssembler::new(loader.clone());
        let config = PipelineConfig::from_json(
            r#"{"verifyConditions": [{"path": "a"}, {}]}"#,
        )
        .unwrap();
        let logger = RecordingLogger::new();

        let err = assembler
            .get_plugins(&config, &ShareableConfigMap::new(), &logger)
            .unwrap_err();

        assert_eq!(err.code(), "EPLUGINCONF");
        assert_eq!(
            err.to_string(),
            "The \"verifyConditions\" plugin, if defined, must be a single or an array of \
             plugins definition. A plugin definition is either a string or an object with a \
             path property."
        );
        assert!(loader.requests.lock().is_empty());
        assert!(logger.lines().is_empty());
    }

    #[tokio::test]
    async fn test_bare_options_without_default_fail() {
        let assembler = PipelineAssembler::new(Arc::new(ModuleRegistry::new()));
        let config =
            PipelineConfig::from_json(r#"{"publish": {"assets": ["CHANGELOG.md"]}}"#).unwrap();
        let logger = RecordingLogger::new();

        let err = assembler
            .get_plugins(&config, &ShareableConfigMap::new(), &logger)
            .unwrap_err();
        assert_eq!(err.code(), "EPLUGINCONF");
    }

    #[tokio::test]
    async fn test_bare_options_merge_over_slot_default() {
        let registry = universal_registry(&["@relkit/git"]);
        let assembler = PipelineAssembler::new(Arc::new(registry)).with_definitions(
            PipelineDefinitions::new().with_slot(
                SlotName::Publish,
                SlotDefinition::new().with_default(PluginDefinition::Options {
                    path: Some(crate::definition::PluginTarget::Specifier(
                        "@relkit/git".to_string(),
                    )),
                    config: [
                        ("assets".to_string(), json!(["package.json"])),
                        ("push".to_string(), json!(true)),
                    ]
                    .into_iter()
                    .collect(),
                }),
            ),
        );
        let config =
            PipelineConfig::from_json(r#"{"publish": {"assets": ["CHANGELOG.md"]}}"#).unwrap();
        let logger = RecordingLogger::new();

        let set = assembler
            .get_plugins(&config, &ShareableConfigMap::new(), &logger)
            .unwrap();

        let publish = set.get(SlotName::Publish).unwrap().iter().next().unwrap();
        let options = publish.call(None).await.unwrap();
        // User options win; untouched default options survive.
        assert_eq!(options["assets"], json!(["CHANGELOG.md"]));
        assert_eq!(options["push"], json!(true));
        assert_eq!(publish.name(), "@relkit/git");
    }

    #[tokio::test]
    async fn test_output_checks_come_from_definitions() {
        let registry = ModuleRegistry::new();
        registry.register(
            "commit-analyzer",
            ModuleExport::Callable(CallbackHandler::shared("analyzer", |_, _| {
                Ok(json!("prerelease"))
            })),
        );
        let assembler = PipelineAssembler::new(Arc::new(registry))
            .with_definitions(PipelineDefinitions::standard());
        let config =
            PipelineConfig::from_json(r#"{"analyzeCommits": "commit-analyzer"}"#).unwrap();
        let logger = RecordingLogger::new();

        let set = assembler
            .get_plugins(&config, &ShareableConfigMap::new(), &logger)
            .unwrap();

        let analyze = set
            .get(SlotName::AnalyzeCommits)
            .unwrap()
            .iter()
            .next()
            .unwrap();
        let err = analyze.call(None).await.unwrap_err();
        assert_eq!(err.code(), "EANALYZECOMMITSOUTPUT");
        assert!(err.to_string().ends_with("Received: \"prerelease\""));
    }

    #[tokio::test]
    async fn test_custom_output_check_applies_to_whole_sequence() {
        let registry = universal_registry(&["a", "b"]);
        let check = OutputCheck::new("Should be an object.", Value::is_object);
        let assembler = PipelineAssembler::new(Arc::new(registry)).with_definitions(
            PipelineDefinitions::new().with_slot(
                SlotName::VerifyConditions,
                SlotDefinition::new().with_output_check(check),
            ),
        );
        let config =
            PipelineConfig::from_json(r#"{"verifyConditions": ["a", "b"]}"#).unwrap();
        let logger = RecordingLogger::new();

        let set = assembler
            .get_plugins(&config, &ShareableConfigMap::new(), &logger)
            .unwrap();

        // echo_config resolves to the (object) config, so both pass.
        for plugin in set.get(SlotName::VerifyConditions).unwrap().iter() {
            assert!(plugin.call(None).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_missing_module_aborts_assembly() {
        let assembler = PipelineAssembler::new(Arc::new(ModuleRegistry::new()));
        let config = PipelineConfig::from_json(r#"{"publish": "no-such-path"}"#).unwrap();
        let logger = RecordingLogger::new();

        let err = assembler
            .get_plugins(&config, &ShareableConfigMap::new(), &logger)
            .unwrap_err();
        assert_eq!(err.code(), "MODULE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_shareable_config_origin_logged_during_assembly() {
        let registry = ModuleRegistry::new();
        registry.register(
            "/workspace/shareable/publish.js",
            ModuleExport::Callable(echo_config()),
        );
        let assembler = PipelineAssembler::new(Arc::new(registry));
        let config = PipelineConfig::from_json(r#"{"publish": "./publish.js"}"#).unwrap();
        let paths: ShareableConfigMap = [(
            "./publish.js".to_string(),
            PathBuf::from("/workspace/shareable/release.config.js"),
        )]
        .into_iter()
        .collect();
        let logger = RecordingLogger::new();

        assembler.get_plugins(&config, &paths, &logger).unwrap();
        assert_eq!(
            logger.lines(),
            vec![
                "Load plugin publish from ./publish.js in shareable config /workspace/shareable"
                    .to_string()
            ]
        );
    }
}
