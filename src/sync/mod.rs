//! One infsync run: validate inputs, scan the payload, rewrite the two
//! managed sections in memory and persist the result.
//!
//! Nothing reaches the disk until every phase has succeeded.

use std::path::{Path, PathBuf};

use crate::cfg::Layout;
use crate::entries;
use crate::error::{Error, Result};
use crate::manifest::block::{self, SectionUpdate};
use crate::manifest::{
    ManifestDocument, ManifestFile, WriteOptions, WriteOutcome, COPY_FILES_MARKERS,
    CREATE_DIRS_MARKERS,
};
use crate::scan::{self, PayloadSet};
use crate::ui;

pub const COPY_FILES_SECTION: &str = "CopyFiles";
pub const CREATE_DIRS_SECTION: &str = "CreateDirs";

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub build_root: Option<PathBuf>,
    pub setup_inf: PathBuf,
    pub write: WriteOptions,
}

/// Counts describing what a document sync generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentSync {
    pub files: usize,
    pub directories: usize,
    pub copy_files: SectionUpdate,
    pub create_dirs: SectionUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub setup_inf: PathBuf,
    pub stats: DocumentSync,
    pub outcome: WriteOutcome,
}

/// Rewrites both managed sections of `doc` from `payload`.
pub fn sync_document(
    doc: &mut ManifestDocument,
    payload: &PayloadSet,
    layout: &Layout,
) -> Result<DocumentSync> {
    let copy_files = update_copy_files(doc, payload, layout)?;
    let (create_dirs, directories) = update_create_dirs(doc, payload, layout)?;

    Ok(DocumentSync {
        files: payload.file_count(),
        directories,
        copy_files,
        create_dirs,
    })
}

fn update_copy_files(
    doc: &mut ManifestDocument,
    payload: &PayloadSet,
    layout: &Layout,
) -> Result<SectionUpdate> {
    let patterns: Vec<String> = layout.modules.iter().map(|m| layout.copy_pattern(m)).collect();
    let body = entries::copy_block_lines(layout, payload);

    block::sync_section(doc, COPY_FILES_SECTION, COPY_FILES_MARKERS, &patterns, body)
}

fn update_create_dirs(
    doc: &mut ManifestDocument,
    payload: &PayloadSet,
    layout: &Layout,
) -> Result<(SectionUpdate, usize)> {
    let patterns: Vec<String> = layout.modules.iter().map(|m| layout.dir_pattern(m)).collect();
    let dest_paths = entries::dest_paths(layout, payload);
    let directories = entries::derive_directories(dest_paths.iter().map(String::as_str), layout);
    let count = directories.len();

    let update =
        block::sync_section(doc, CREATE_DIRS_SECTION, CREATE_DIRS_MARKERS, &patterns, directories)?;
    Ok((update, count))
}

fn resolve_build_root(build_root: Option<&Path>) -> Result<&Path> {
    let build_root = build_root
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(Error::BuildRootNotProvided)?;
    if !build_root.exists() {
        return Err(Error::BuildRootMissing {
            path: build_root.to_path_buf(),
        });
    }
    Ok(build_root)
}

pub fn run(layout: &Layout, opts: &SyncOptions) -> Result<SyncReport> {
    layout.validate()?;
    let build_root = resolve_build_root(opts.build_root.as_deref())?;

    let file = ManifestFile::read(&opts.setup_inf)?;
    let mut doc = file.document();
    ui::detail(&format!(
        "Read {} ({} lines, {:?} line endings)",
        file.path().display(),
        doc.lines().len(),
        doc.line_ending()
    ));

    let payload = scan::scan_payload(build_root, layout)?;
    for arch in payload.archs() {
        for module in &arch.modules {
            ui::detail(&format!(
                "{} ({}): {} files",
                module.module,
                arch.arch,
                module.files.len()
            ));
        }
    }

    let stats = sync_document(&mut doc, &payload, layout)?;
    ui::detail(&format!(
        "[{}] removed {} lines, inserted {}; [{}] removed {} lines, inserted {}",
        COPY_FILES_SECTION,
        stats.copy_files.removed,
        stats.copy_files.inserted,
        CREATE_DIRS_SECTION,
        stats.create_dirs.removed,
        stats.create_dirs.inserted
    ));

    let outcome = file.persist(&doc, opts.write)?;

    Ok(SyncReport {
        setup_inf: opts.setup_inf.clone(),
        stats,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{PayloadEntry, TransferFlag};
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = "[Setup]\r\n\
                            Name=Open Salamander\r\n\
                            \r\n\
                            [CopyFiles]\r\n\
                            %0\\salamander.exe,%1\\salamander.exe,0x20\r\n\
                            \r\n\
                            [CreateDirs]\r\n\
                            %1\\plugins\r\n\
                            %1\\plugins\\jsonviewer\r\n\
                            \r\n\
                            [Shortcuts]\r\n\
                            Open Salamander\r\n";

    fn entry(rel: &str) -> PayloadEntry {
        PayloadEntry {
            rel_path: rel.to_string(),
            flag: TransferFlag::SkipSame,
        }
    }

    fn sample_payload() -> PayloadSet {
        let mut payload = PayloadSet::new();
        payload.insert(
            "Release_x64",
            "jsonviewer",
            vec![entry("jsonviewer.spl"), entry("lang/english.slg")],
        );
        payload.insert("Release_x86", "jsonviewer", vec![entry("jsonviewer.spl")]);
        payload
    }

    #[test]
    fn test_sync_document_output() {
        let mut doc = ManifestDocument::parse(MANIFEST);
        let stats = sync_document(&mut doc, &sample_payload(), &Layout::default()).unwrap();

        assert_eq!(stats.files, 3);
        assert_eq!(stats.directories, 1);
        assert_eq!(
            doc.render(),
            "[Setup]\r\n\
             Name=Open Salamander\r\n\
             \r\n\
             [CopyFiles]\r\n\
             %0\\salamander.exe,%1\\salamander.exe,0x20\r\n\
             \r\n\
             ; BEGIN auto-generated plugin copy entries\r\n\
             ; jsonviewer (Release_x64)\r\n\
             %0\\salamander\\Release_x64\\plugins\\jsonviewer\\jsonviewer.spl,%1\\plugins\\jsonviewer\\jsonviewer.spl,0x20\r\n\
             %0\\salamander\\Release_x64\\plugins\\jsonviewer\\lang\\english.slg,%1\\plugins\\jsonviewer\\lang\\english.slg,0x20\r\n\
             ; jsonviewer (Release_x86)\r\n\
             %0\\salamander\\Release_x86\\plugins\\jsonviewer\\jsonviewer.spl,%1\\plugins\\jsonviewer\\jsonviewer.spl,0x20\r\n\
             ; END auto-generated plugin copy entries\r\n\
             [CreateDirs]\r\n\
             %1\\plugins\r\n\
             %1\\plugins\\jsonviewer\r\n\
             \r\n\
             ; BEGIN auto-generated plugin directories\r\n\
             %1\\plugins\\jsonviewer\\lang\r\n\
             ; END auto-generated plugin directories\r\n\
             [Shortcuts]\r\n\
             Open Salamander\r\n"
        );
    }

    #[test]
    fn test_sync_document_twice_is_stable() {
        let layout = Layout::default();
        let mut doc = ManifestDocument::parse(MANIFEST);
        sync_document(&mut doc, &sample_payload(), &layout).unwrap();
        let first = doc.render();

        let mut again = ManifestDocument::parse(&first);
        sync_document(&mut again, &sample_payload(), &layout).unwrap();
        assert_eq!(again.render(), first);
    }

    #[test]
    fn test_shrinking_payload_drops_old_entries() {
        let layout = Layout::default();
        let mut doc = ManifestDocument::parse(MANIFEST);
        sync_document(&mut doc, &sample_payload(), &layout).unwrap();

        let mut smaller = PayloadSet::new();
        smaller.insert("Release_x64", "jsonviewer", vec![entry("jsonviewer.spl")]);
        let stats = sync_document(&mut doc, &smaller, &layout).unwrap();

        let text = doc.render();
        assert_eq!(stats.directories, 0);
        assert!(!text.contains("english.slg"));
        assert!(!text.contains("Release_x86"));
        assert!(!text.contains("auto-generated plugin directories"));
        // Hand-written bare module directory survives
        assert!(text.contains("%1\\plugins\\jsonviewer\r\n"));
    }

    #[test]
    fn test_missing_section_leaves_nothing_behind() {
        let mut doc = ManifestDocument::parse("[CopyFiles]\n");
        let err = sync_document(&mut doc, &sample_payload(), &Layout::default()).unwrap_err();
        assert!(matches!(err, Error::SectionNotFound { ref section } if section == "CreateDirs"));
    }

    #[test]
    fn test_run_requires_build_root() {
        let temp_dir = TempDir::new().unwrap();
        let opts = SyncOptions {
            build_root: Some(PathBuf::new()),
            setup_inf: temp_dir.path().join("setup.inf"),
            write: WriteOptions::default(),
        };
        let err = run(&Layout::default(), &opts).unwrap_err();
        assert!(matches!(err, Error::BuildRootNotProvided));
    }

    #[test]
    fn test_run_without_payload_keeps_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let setup_inf = temp_dir.path().join("setup.inf");
        fs::write(&setup_inf, MANIFEST).unwrap();
        let build_root = temp_dir.path().join("build");
        fs::create_dir_all(build_root.join("salamander/Release_x64/plugins/other")).unwrap();
        fs::write(build_root.join("salamander/Release_x64/plugins/other/x.spl"), "x").unwrap();

        let opts = SyncOptions {
            build_root: Some(build_root),
            setup_inf: setup_inf.clone(),
            write: WriteOptions {
                backup: true,
                dry_run: false,
            },
        };
        let err = run(&Layout::default(), &opts).unwrap_err();

        assert!(matches!(err, Error::NoPayload { .. }));
        assert_eq!(fs::read_to_string(&setup_inf).unwrap(), MANIFEST);
        assert!(!temp_dir.path().join("setup.inf.bak").exists());
    }

    #[test]
    fn test_run_updates_then_settles() {
        let temp_dir = TempDir::new().unwrap();
        let setup_inf = temp_dir.path().join("setup.inf");
        fs::write(&setup_inf, MANIFEST).unwrap();
        let module_dir = temp_dir
            .path()
            .join("salamander/Release_x86/plugins/samandarin");
        fs::create_dir_all(module_dir.join("data")).unwrap();
        fs::write(module_dir.join("samandarin.spl"), "spl").unwrap();
        fs::write(module_dir.join("data/Dependencies.md"), "deps").unwrap();

        let opts = SyncOptions {
            build_root: Some(temp_dir.path().to_path_buf()),
            setup_inf: setup_inf.clone(),
            write: WriteOptions {
                backup: false,
                dry_run: false,
            },
        };

        let report = run(&Layout::default(), &opts).unwrap();
        assert_eq!(report.outcome, WriteOutcome::Updated { backup: None });
        let written = fs::read_to_string(&setup_inf).unwrap();
        assert!(written.contains(
            "%0\\salamander\\Release_x86\\plugins\\samandarin\\data\\Dependencies.md,\
             %1\\plugins\\samandarin\\data\\Dependencies.md,0x01\r\n"
        ));
        assert!(written.contains("\r\n%1\\plugins\\samandarin\\data\r\n"));

        let report = run(&Layout::default(), &opts).unwrap();
        assert_eq!(report.outcome, WriteOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&setup_inf).unwrap(), written);
    }
}
