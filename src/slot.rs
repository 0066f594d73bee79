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

//! Pipeline slot names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named phase of the release pipeline.
///
/// The set is closed. Configuration keys are matched against these names;
/// anything else in a pipeline configuration is a global option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotName {
    VerifyConditions,
    AnalyzeCommits,
    VerifyRelease,
    GenerateNotes,
    Prepare,
    Publish,
    AddChannel,
    Success,
    Fail,
}

impl SlotName {
    /// Every slot, in pipeline order.
    pub const ALL: [SlotName; 9] = [
        SlotName::VerifyConditions,
        SlotName::AnalyzeCommits,
        SlotName::VerifyRelease,
        SlotName::GenerateNotes,
        SlotName::Prepare,
        SlotName::Publish,
        SlotName::AddChannel,
        SlotName::Success,
        SlotName::Fail,
    ];

    /// Configuration key and log name for this slot.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::VerifyConditions => "verifyConditions",
            SlotName::AnalyzeCommits => "analyzeCommits",
            SlotName::VerifyRelease => "verifyRelease",
            SlotName::GenerateNotes => "generateNotes",
            SlotName::Prepare => "prepare",
            SlotName::Publish => "publish",
            SlotName::AddChannel => "addChannel",
            SlotName::Success => "success",
            SlotName::Fail => "fail",
        }
    }

    /// Parse a configuration key. Non-slot keys return `None`.
    pub fn from_key(key: &str) -> Option<SlotName> {
        SlotName::ALL.iter().find(|slot| slot.as_str() == key).copied()
    }

    /// Error code carried by output validation failures for this slot.
    pub(crate) fn output_code(&self) -> &'static str {
        match self {
            SlotName::VerifyConditions => "EVERIFYCONDITIONSOUTPUT",
            SlotName::AnalyzeCommits => "EANALYZECOMMITSOUTPUT",
            SlotName::VerifyRelease => "EVERIFYRELEASEOUTPUT",
            SlotName::GenerateNotes => "EGENERATENOTESOUTPUT",
            SlotName::Prepare => "EPREPAREOUTPUT",
            SlotName::Publish => "EPUBLISHOUTPUT",
            SlotName::AddChannel => "EADDCHANNELOUTPUT",
            SlotName::Success => "ESUCCESSOUTPUT",
            SlotName::Fail => "EFAILOUTPUT",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
