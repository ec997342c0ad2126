use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Describes where the staged payload lives and how its entries are spelled
/// inside setup.inf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Build configurations, in the order their entries are emitted
    pub architectures: Vec<String>,

    /// Managed plugins, in the order their entries are emitted
    pub modules: Vec<String>,

    /// File names (compared case-insensitively) that are always refreshed
    pub always_refresh: Vec<String>,

    #[serde(default)]
    pub paths: PathTokens,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathTokens {
    /// Token the installer expands to the source root
    pub source_root: String,

    /// Directory under the build root holding the per-architecture trees
    pub staging_dir: String,

    /// Segment between the architecture (or destination root) and the module
    pub container: String,

    /// Token the installer expands to the installation directory
    pub dest_root: String,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            architectures: vec!["Release_x64".to_string(), "Release_x86".to_string()],
            modules: vec![
                "jsonviewer".to_string(),
                "textviewer".to_string(),
                "webview2renderviewer".to_string(),
                "samandarin".to_string(),
            ],
            always_refresh: vec![
                "dependencies.md".to_string(),
                "supported_file_types.md".to_string(),
            ],
            paths: PathTokens::default(),
        }
    }
}

impl Default for PathTokens {
    fn default() -> Self {
        PathTokens {
            source_root: "%0".to_string(),
            staging_dir: "salamander".to_string(),
            container: "plugins".to_string(),
            dest_root: "%1".to_string(),
        }
    }
}

impl Layout {
    /// On-disk directory holding one module's payload for one architecture.
    pub fn module_dir(&self, build_root: &Path, arch: &str, module: &str) -> PathBuf {
        build_root
            .join(&self.paths.staging_dir)
            .join(arch)
            .join(&self.paths.container)
            .join(module)
    }

    /// `%1\plugins`
    pub fn dest_container(&self) -> String {
        format!("{}\\{}", self.paths.dest_root, self.paths.container)
    }

    /// Removal pattern for copy entries of `module`.
    pub fn copy_pattern(&self, module: &str) -> String {
        format!("\\{}\\{}\\", self.paths.container, module)
    }

    /// Removal pattern for directory entries of `module`.
    pub fn dir_pattern(&self, module: &str) -> String {
        format!("{}\\{}\\", self.dest_container(), module)
    }

    pub fn is_always_refresh(&self, file_name: &str) -> bool {
        let file_name = file_name.to_lowercase();
        self.always_refresh
            .iter()
            .any(|name| name.to_lowercase() == file_name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.architectures.is_empty() {
            return Err(Error::layout("at least one architecture is required"));
        }
        if self.modules.is_empty() {
            return Err(Error::layout("at least one module is required"));
        }
        let tokens = [
            ("source_root", &self.paths.source_root),
            ("staging_dir", &self.paths.staging_dir),
            ("container", &self.paths.container),
            ("dest_root", &self.paths.dest_root),
        ];
        for (field, value) in tokens {
            if value.trim().is_empty() {
                return Err(Error::layout(format!("paths.{} must not be empty", field)));
            }
        }
        for module in &self.modules {
            if module.is_empty() || module.contains(['\\', '/']) {
                return Err(Error::layout(format!("invalid module name '{}'", module)));
            }
        }
        Ok(())
    }
}

pub fn load(layout_path: &Path) -> Result<Layout> {
    if !layout_path.exists() {
        return Err(Error::layout(format!(
            "layout file not found at {}",
            layout_path.display()
        )));
    }

    let contents = fs::read_to_string(layout_path).map_err(|e| Error::io(layout_path, e))?;
    let layout: Layout = toml::from_str(&contents)
        .map_err(|e| Error::layout(format!("failed to parse {}: {}", layout_path.display(), e)))?;
    layout.validate()?;

    Ok(layout)
}

/// Layout from `path` when given, otherwise the built-in one.
pub fn load_or_default(layout_path: Option<&Path>) -> Result<Layout> {
    match layout_path {
        Some(path) => load(path),
        None => Ok(Layout::default()),
    }
}
