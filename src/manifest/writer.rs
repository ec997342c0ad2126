//! Reading setup.inf from disk and writing it back.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::ManifestDocument;
use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Save the original bytes to `<file>.bak` before overwriting
    pub backup: bool,
    /// Report the outcome without touching the disk
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Unchanged,
    WouldUpdate,
    Updated { backup: Option<PathBuf> },
}

/// A manifest as loaded from disk, kept around to compare against and to
/// back up.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    path: PathBuf,
    raw: Vec<u8>,
    has_bom: bool,
    text: String,
}

impl ManifestFile {
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ManifestMissing {
                path: path.to_path_buf(),
            });
        }

        let raw = fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::from_bytes(path, raw)
    }

    pub fn from_bytes(path: &Path, raw: Vec<u8>) -> Result<Self> {
        let has_bom = raw.starts_with(UTF8_BOM);
        let body = if has_bom { &raw[UTF8_BOM.len()..] } else { &raw[..] };
        let text = std::str::from_utf8(body)
            .map_err(|_| Error::Encoding {
                path: path.to_path_buf(),
            })?
            .to_string();

        Ok(ManifestFile {
            path: path.to_path_buf(),
            raw,
            has_bom,
            text,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> ManifestDocument {
        ManifestDocument::parse(&self.text)
    }

    /// `setup.inf` -> `setup.inf.bak`
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("setup.inf"));
        name.push(".bak");
        self.path.with_file_name(name)
    }

    /// Writes `doc` over the file when its content differs from what was read.
    pub fn persist(&self, doc: &ManifestDocument, opts: WriteOptions) -> Result<WriteOutcome> {
        let updated = doc.render();
        if updated == self.text {
            return Ok(WriteOutcome::Unchanged);
        }
        if opts.dry_run {
            return Ok(WriteOutcome::WouldUpdate);
        }

        let backup = if opts.backup {
            let backup_path = self.backup_path();
            fs::write(&backup_path, &self.raw).map_err(|e| Error::io(&backup_path, e))?;
            Some(backup_path)
        } else {
            None
        };

        let mut bytes = Vec::with_capacity(updated.len() + UTF8_BOM.len());
        if self.has_bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(updated.as_bytes());
        fs::write(&self.path, bytes).map_err(|e| Error::io(&self.path, e))?;

        Ok(WriteOutcome::Updated { backup })
    }
}
