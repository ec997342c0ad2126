//! Discovery of the staged plugin payload.
//!
//! Walks `<build-root>/<staging>/<arch>/<container>/<module>` for every
//! configured pair and records each regular file relative to the module
//! directory. Missing module directories are skipped silently.

use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cfg::Layout;
use crate::error::{Error, Result};

/// Copy behaviour the installer applies to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFlag {
    /// Skip the copy when the target is identical
    SkipSame,
    /// Always overwrite the target
    Always,
}

impl TransferFlag {
    pub fn code(&self) -> &'static str {
        match self {
            TransferFlag::SkipSame => "0x20",
            TransferFlag::Always => "0x01",
        }
    }
}

impl fmt::Display for TransferFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEntry {
    /// Path relative to the module directory, `/`-separated
    pub rel_path: String,
    pub flag: TransferFlag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePayload {
    pub module: String,
    pub files: Vec<PayloadEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchPayload {
    pub arch: String,
    pub modules: Vec<ModulePayload>,
}

/// Files found per architecture and module, in layout order.
///
/// Only pairs with at least one file are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadSet {
    archs: Vec<ArchPayload>,
}

impl PayloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `files` for a pair; empty lists are dropped.
    pub fn insert(&mut self, arch: &str, module: &str, files: Vec<PayloadEntry>) {
        if files.is_empty() {
            return;
        }
        let slot = match self.archs.iter().position(|a| a.arch == arch) {
            Some(idx) => &mut self.archs[idx],
            None => {
                self.archs.push(ArchPayload {
                    arch: arch.to_string(),
                    modules: Vec::new(),
                });
                let last = self.archs.len() - 1;
                &mut self.archs[last]
            }
        };
        slot.modules.push(ModulePayload {
            module: module.to_string(),
            files,
        });
    }

    pub fn get(&self, arch: &str, module: &str) -> Option<&[PayloadEntry]> {
        self.archs
            .iter()
            .find(|a| a.arch == arch)?
            .modules
            .iter()
            .find(|m| m.module == module)
            .map(|m| m.files.as_slice())
    }

    pub fn archs(&self) -> impl Iterator<Item = &ArchPayload> {
        self.archs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.archs.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.archs
            .iter()
            .flat_map(|a| a.modules.iter())
            .map(|m| m.files.len())
            .sum()
    }
}

/// Scans every configured (architecture, module) pair under `build_root`.
///
/// Fails with [`Error::NoPayload`] when no pair yields a single file.
pub fn scan_payload(build_root: &Path, layout: &Layout) -> Result<PayloadSet> {
    let mut payload = PayloadSet::new();

    for arch in &layout.architectures {
        for module in &layout.modules {
            let module_dir = layout.module_dir(build_root, arch, module);
            if !module_dir.is_dir() {
                continue;
            }
            let files = scan_module_dir(&module_dir, layout)?;
            payload.insert(arch, module, files);
        }
    }

    if payload.is_empty() {
        return Err(Error::NoPayload {
            build_root: build_root.to_path_buf(),
        });
    }

    Ok(payload)
}

/// Lists the regular files below `module_dir`, sorted by relative path.
pub fn scan_module_dir(module_dir: &Path, layout: &Layout) -> Result<Vec<PayloadEntry>> {
    let mut found: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(module_dir).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(module_dir).to_path_buf();
            Error::io(path, e.into())
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let rel = path
            .strip_prefix(module_dir)
            .unwrap_or(path)
            .to_path_buf();
        found.push(rel);
    }

    // PathBuf ordering compares component by component
    found.sort();

    found
        .into_iter()
        .map(|rel| -> Result<PayloadEntry> {
            let rel_path = to_slash(&rel, module_dir)?;
            let file_name = rel
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            let flag = if layout.is_always_refresh(file_name) {
                TransferFlag::Always
            } else {
                TransferFlag::SkipSame
            };
            Ok(PayloadEntry { rel_path, flag })
        })
        .collect()
}

fn to_slash(rel: &Path, module_dir: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| Error::Encoding {
                path: module_dir.join(rel),
            })?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}
