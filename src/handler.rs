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

//! Slot handler traits and adapters.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Trait for the async callable behind one pipeline slot.
///
/// `config` is the merged plugin configuration and `input` the per-call
/// argument. Both arrive as owned copies; the handler is free to consume
/// or mutate them without the caller ever observing it.
#[async_trait]
pub trait SlotHandler: Send + Sync {
    /// Run the capability.
    async fn call(&self, config: Value, input: Value) -> anyhow::Result<Value>;

    /// Get the handler name.
    fn name(&self) -> &str;
}

/// Type alias for a shared async slot handler.
pub type AsyncSlotHandler = Arc<dyn SlotHandler>;

/// Handler for unconfigured slots; accepts anything and resolves to
/// `Value::Null` without side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHandler;

#[async_trait]
impl SlotHandler for NoOpHandler {
    async fn call(&self, _config: Value, _input: Value) -> anyhow::Result<Value> {
        Ok(Value::Null)
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Handler that logs invocations (for wiring checks and examples).
pub struct LoggingHandler {
    name: String,
}

impl LoggingHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl SlotHandler for LoggingHandler {
    async fn call(&self, config: Value, input: Value) -> anyhow::Result<Value> {
        tracing::info!(
            handler = %self.name,
            config = %config,
            input = %input,
            "Slot handler invoked"
        );
        Ok(Value::Null)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Handler that invokes a callback function.
pub struct CallbackHandler<F>
where
    F: Fn(Value, Value) -> anyhow::Result<Value> + Send + Sync,
{
    name: String,
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(Value, Value) -> anyhow::Result<Value> + Send + Sync,
{
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }

    /// Create a shared handler ready to drop into a plugin definition.
    pub fn shared(name: impl Into<String>, callback: F) -> AsyncSlotHandler
    where
        F: 'static,
    {
        Arc::new(Self::new(name, callback))
    }
}

#[async_trait]
impl<F> SlotHandler for CallbackHandler<F>
where
    F: Fn(Value, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    async fn call(&self, config: Value, input: Value) -> anyhow::Result<Value> {
        (self.callback)(config, input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
