//! In-memory model of setup.inf.
//!
//! The document is a list of lines, each keeping its own terminator, so
//! rendering an untouched document reproduces the input byte for byte.

pub mod block;
pub mod section;
pub mod writer;

use crate::error::Result;

pub use block::{BlockMarkers, SectionUpdate, COPY_FILES_MARKERS, CREATE_DIRS_MARKERS};
pub use section::Section;
pub use writer::{ManifestFile, WriteOptions, WriteOutcome};

#[cfg(windows)]
const HOST_LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const HOST_LINE_ENDING: &str = "\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
    lines: Vec<String>,
    line_ending: &'static str,
}

impl ManifestDocument {
    /// Splits `text` (already stripped of any BOM) into lines.
    pub fn parse(text: &str) -> Self {
        let lines = split_lines(text);
        let line_ending = detect_line_ending(&lines);
        ManifestDocument { lines, line_ending }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Terminator used for lines this tool generates.
    pub fn line_ending(&self) -> &'static str {
        self.line_ending
    }

    pub fn section(&self, name: &str) -> Result<Section> {
        section::find_section(&self.lines, name)
    }

    pub fn render(&self) -> String {
        self.lines.concat()
    }

    pub(crate) fn lines_mut(&mut self) -> &mut Vec<String> {
        &mut self.lines
    }
}

/// Splits on `\n`, keeping each terminator (`\n` or `\r\n`) with its line.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Terminator of the first terminated line, or the host default.
pub fn detect_line_ending(lines: &[String]) -> &'static str {
    for line in lines {
        if line.ends_with("\r\n") {
            return "\r\n";
        }
        if line.ends_with('\n') {
            return "\n";
        }
    }
    HOST_LINE_ENDING
}
