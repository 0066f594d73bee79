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

//! Pipeline assembly and dispatch.
//!
//! [`PipelineAssembler`] turns a full pipeline configuration into a
//! [`PluginSet`]: one entry per slot of the closed set, each holding the
//! normalized plugins to run for that phase. Assembly is eager and
//! fail-fast; nothing is loaded lazily at run time.
//!
//! [`PluginSet::dispatch`] then runs one slot's plugins strictly in order,
//! with the only policy knob being [`DispatchOptions::continue_on_error`].

mod assembler;
mod definitions;
mod dispatch;

pub use assembler::{PipelineAssembler, PluginSet, SlotPlugins};
pub use definitions::{PipelineDefinitions, SlotDefinition, RELEASE_TYPES};
pub use dispatch::{DispatchOptions, SlotRun, StepResult};
