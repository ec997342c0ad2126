use std::ops::Range;

use crate::error::{Error, Result};

/// Line range of a bracketed section: the header line up to (not including)
/// the next header or the end of the document.
///
/// Indices go stale as soon as lines are inserted or removed; locate the
/// section again after every structural edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub header: usize,
    pub end: usize,
}

impl Section {
    /// Lines after the header.
    pub fn body(&self) -> Range<usize> {
        self.header + 1..self.end
    }

    pub fn has_body(&self) -> bool {
        self.end > self.header + 1
    }
}

/// Finds `[name]` (trimmed, case-insensitive) and the start of the next section.
pub fn find_section(lines: &[String], name: &str) -> Result<Section> {
    let target = format!("[{}]", name.to_lowercase());

    let header = lines
        .iter()
        .position(|line| line.trim().to_lowercase() == target)
        .ok_or_else(|| Error::SectionNotFound {
            section: name.to_string(),
        })?;

    let end = lines[header + 1..]
        .iter()
        .position(|line| line.starts_with('['))
        .map(|offset| header + 1 + offset)
        .unwrap_or(lines.len());

    Ok(Section { header, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::split_lines;

    const SAMPLE: &str = "[Setup]\r\n\
                          Name=Open Salamander\r\n\
                          \r\n\
                          [copyfiles]  \r\n\
                          a,b,0x20\r\n\
                          \r\n\
                          [CreateDirs]\r\n\
                          %1\\plugins\r\n";

    #[test]
    fn test_find_section_ignores_case_and_padding() {
        let lines = split_lines(SAMPLE);
        let section = find_section(&lines, "CopyFiles").unwrap();
        assert_eq!(section, Section { header: 3, end: 6 });
        assert_eq!(section.body(), 4..6);
    }

    #[test]
    fn test_last_section_runs_to_end() {
        let lines = split_lines(SAMPLE);
        let section = find_section(&lines, "CreateDirs").unwrap();
        assert_eq!(section, Section { header: 6, end: 8 });
    }

    #[test]
    fn test_header_only_section_has_no_body() {
        let lines = split_lines("[CopyFiles]\n[CreateDirs]\n");
        let section = find_section(&lines, "CopyFiles").unwrap();
        assert!(!section.has_body());
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let lines = split_lines(SAMPLE);
        let err = find_section(&lines, "DeleteFiles").unwrap_err();
        assert!(matches!(err, Error::SectionNotFound { ref section } if section == "DeleteFiles"));
    }

    #[test]
    fn test_indented_bracket_does_not_end_section() {
        let lines = split_lines("[CopyFiles]\n  [not a header\nx\n[Next]\n");
        let section = find_section(&lines, "CopyFiles").unwrap();
        assert_eq!(section.end, 3);
    }
}
