//! Rendering of setup.inf entries from the scanned payload.

pub mod dirs;

use crate::cfg::Layout;
use crate::scan::{PayloadEntry, PayloadSet};

pub use dirs::derive_directories;

fn backslashed(rel_path: &str) -> String {
    rel_path.replace('/', "\\")
}

/// `%0\salamander\<arch>\plugins\<module>\<rel>,%1\plugins\<module>\<rel>,<flag>`
pub fn copy_line(layout: &Layout, arch: &str, module: &str, entry: &PayloadEntry) -> String {
    let rel = backslashed(&entry.rel_path);
    let src = format!(
        "{}\\{}\\{}\\{}\\{}\\{}",
        layout.paths.source_root,
        layout.paths.staging_dir,
        arch,
        layout.paths.container,
        module,
        rel
    );
    format!("{},{},{}", src, dest_path(layout, module, entry), entry.flag)
}

/// Destination form of a payload file: `%1\plugins\<module>\<rel>`.
pub fn dest_path(layout: &Layout, module: &str, entry: &PayloadEntry) -> String {
    format!(
        "{}\\{}\\{}",
        layout.dest_container(),
        module,
        backslashed(&entry.rel_path)
    )
}

pub fn module_comment(module: &str, arch: &str) -> String {
    format!("; {} ({})", module, arch)
}

/// Body of the CopyFiles block, without sentinels or line terminators.
///
/// Architectures and modules follow layout order; the payload's own file
/// order is kept.
pub fn copy_block_lines(layout: &Layout, payload: &PayloadSet) -> Vec<String> {
    let mut lines = Vec::new();

    for arch in &layout.architectures {
        for module in &layout.modules {
            let files = match payload.get(arch, module) {
                Some(files) if !files.is_empty() => files,
                _ => continue,
            };
            lines.push(module_comment(module, arch));
            for entry in files {
                lines.push(copy_line(layout, arch, module, entry));
            }
        }
    }

    lines
}

/// Destination paths of every payload file across all architectures.
pub fn dest_paths(layout: &Layout, payload: &PayloadSet) -> Vec<String> {
    payload
        .archs()
        .flat_map(|arch| arch.modules.iter())
        .flat_map(|m| m.files.iter().map(move |f| dest_path(layout, &m.module, f)))
        .collect()
}
