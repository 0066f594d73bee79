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

//! Module reference resolution against shareable-config origins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Maps a plugin specifier to the file path of the shareable configuration
/// module that declared it.
pub type ShareableConfigMap = HashMap<String, PathBuf>;

/// Where a specifier should be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// Specifier to hand to the module loader.
    pub effective: String,
    /// Directory of the declaring shareable config, when one is known.
    pub base_dir: Option<PathBuf>,
}

/// Resolve a specifier against the shareable config that declared it.
///
/// A specifier introduced by a shareable config resolves filesystem-relative
/// paths (`./x`, `../x`) against that config's directory. Everything else
/// passes through unchanged; unresolvable specifiers are the loader's
/// problem, not ours.
pub fn resolve_reference(specifier: &str, paths: &ShareableConfigMap) -> ResolvedReference {
    let base_dir = paths
        .get(specifier)
        .and_then(|config_path| config_path.parent())
        .map(Path::to_path_buf);

    let effective = match &base_dir {
        Some(dir) if is_relative_specifier(specifier) => {
            let trimmed = specifier.strip_prefix("./").unwrap_or(specifier);
            dir.join(trimmed).to_string_lossy().into_owned()
        }
        _ => specifier.to_string(),
    };

    ResolvedReference { effective, base_dir }
}

// Bare package names are never filesystem-relative.
fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}
