//! Directories CreateDirs must list for the generated copy entries.

use std::collections::BTreeSet;

use crate::cfg::Layout;

/// Derives the intermediate directories implied by destination file paths.
///
/// For `%1\plugins\M\a\b\file.txt` this yields `%1\plugins\M\a` and
/// `%1\plugins\M\a\b`. The bare module directory is never emitted; the
/// installer template already creates it. Paths outside
/// `<dest_root>\<container>\` are ignored.
///
/// The result is sorted case-insensitively and free of duplicates.
pub fn derive_directories<'a, I>(dest_paths: I, layout: &Layout) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let container = layout.dest_container();
    let container_prefix = format!("{}\\", container);
    let wanted = container_prefix.to_lowercase();
    let mut chains: BTreeSet<(String, String)> = BTreeSet::new();

    for path in dest_paths {
        let head = match path.get(..container_prefix.len()) {
            Some(head) => head,
            None => continue,
        };
        if head.to_lowercase() != wanted {
            continue;
        }
        let rest = &path[container_prefix.len()..];

        let mut parts: Vec<&str> = rest.split('\\').filter(|p| !p.is_empty()).collect();
        // Drop the file name
        parts.pop();

        // parts[0] is the module; only sub-directories of it are collected
        for depth in 2..=parts.len() {
            let chain = parts[..depth].join("\\");
            chains.insert((chain.to_lowercase(), chain));
        }
    }

    chains
        .into_iter()
        .map(|(_, chain)| format!("{}\\{}", container, chain))
        .collect()
}
