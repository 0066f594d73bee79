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

//! Logger seam for plugin resolution messages.

/// Receives the user-facing resolution log lines.
///
/// One call per plugin loaded from a specifier; definitions carrying an
/// already-resolved handler produce no call.
pub trait PipelineLogger: Send + Sync {
    fn log(&self, message: String);
}

/// Stock logger forwarding to `tracing` at info level. Silent when no
/// subscriber is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl PipelineLogger for TracingLogger {
    fn log(&self, message: String) {
        tracing::info!("{}", message);
    }
}
