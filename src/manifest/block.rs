//! The sentinel-delimited block infsync owns inside a section.
//!
//! A sync never diffs against the previous block. It deletes everything it
//! may have produced before (whole blocks, lone sentinels and stray lines
//! naming a managed module) and appends a fresh block at the end of the
//! section.

use super::section::Section;
use super::ManifestDocument;
use crate::error::Result;

/// Comment lines opening and closing a generated block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMarkers {
    pub begin: &'static str,
    pub end: &'static str,
}

pub const COPY_FILES_MARKERS: BlockMarkers = BlockMarkers {
    begin: "; BEGIN auto-generated plugin copy entries",
    end: "; END auto-generated plugin copy entries",
};

pub const CREATE_DIRS_MARKERS: BlockMarkers = BlockMarkers {
    begin: "; BEGIN auto-generated plugin directories",
    end: "; END auto-generated plugin directories",
};

const ALL_MARKERS: [BlockMarkers; 2] = [COPY_FILES_MARKERS, CREATE_DIRS_MARKERS];

/// What a section sync did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionUpdate {
    pub removed: usize,
    pub inserted: usize,
}

fn normalize(line: &str) -> String {
    line.trim().to_lowercase()
}

fn is_marker(key: &str) -> bool {
    ALL_MARKERS
        .iter()
        .any(|m| key == m.begin.to_lowercase() || key == m.end.to_lowercase())
}

/// Deletes previously generated content from the body of `section`.
///
/// Removed are: every BEGIN..END pair with everything between them, any
/// unpaired sentinel, and any line containing one of `patterns`
/// (case-insensitive). Blank lines outside a block stay. Returns the number
/// of lines removed.
pub fn remove_generated(lines: &mut Vec<String>, section: Section, patterns: &[String]) -> usize {
    let body = section.body();
    let patterns: Vec<String> = patterns.iter().map(|p| p.to_lowercase()).collect();
    let keys: Vec<String> = lines[body.clone()].iter().map(|l| normalize(l)).collect();
    let mut doomed = vec![false; keys.len()];

    let mut idx = 0;
    while idx < keys.len() {
        let opening = ALL_MARKERS
            .iter()
            .find(|m| keys[idx] == m.begin.to_lowercase())
            .map(|m| (m.begin.to_lowercase(), m.end.to_lowercase()));
        if let Some((begin_key, end_key)) = opening {
            // A later BEGIN of the same kind leaves this one unpaired
            let next = keys[idx + 1..]
                .iter()
                .position(|k| *k == end_key || *k == begin_key)
                .map(|offset| idx + 1 + offset);
            if let Some(last) = next.filter(|&last| keys[last] == end_key) {
                doomed[idx..=last].iter_mut().for_each(|d| *d = true);
                idx = last + 1;
                continue;
            }
        }

        let key = &keys[idx];
        if is_marker(key) || patterns.iter().any(|p| key.contains(p.as_str())) {
            doomed[idx] = true;
        }
        idx += 1;
    }

    let removed = doomed.iter().filter(|d| **d).count();
    if removed > 0 {
        let kept: Vec<String> = lines
            .drain(body.clone())
            .zip(doomed)
            .filter(|(_, gone)| !gone)
            .map(|(line, _)| line)
            .collect();
        lines.splice(body.start..body.start, kept);
    }
    removed
}

/// Appends `block` (terminated lines) at the end of `section`.
///
/// A single blank separator is added when the preceding body line carries
/// text. A final line without terminator gets `line_ending` first. Returns
/// the number of lines inserted, separator included.
pub fn insert_at_end(
    lines: &mut Vec<String>,
    section: Section,
    block: Vec<String>,
    line_ending: &str,
) -> usize {
    let mut at = section.end;
    let mut inserted = block.len();

    // `end` is past the header, so there is always a previous line
    let prev = &mut lines[at - 1];
    if !prev.ends_with('\n') {
        prev.push_str(line_ending);
    }

    if section.has_body() && !lines[at - 1].trim().is_empty() {
        lines.insert(at, line_ending.to_string());
        at += 1;
        inserted += 1;
    }

    lines.splice(at..at, block);
    inserted
}

/// Replaces the generated block of section `name` with `body`.
///
/// `body` holds unterminated lines; markers and terminators are added here.
/// An empty `body` only removes old content.
pub fn sync_section(
    doc: &mut ManifestDocument,
    name: &str,
    markers: BlockMarkers,
    patterns: &[String],
    body: Vec<String>,
) -> Result<SectionUpdate> {
    let section = doc.section(name)?;
    let removed = remove_generated(doc.lines_mut(), section, patterns);

    if body.is_empty() {
        return Ok(SectionUpdate {
            removed,
            inserted: 0,
        });
    }

    // Removal shifted everything after the section header
    let section = doc.section(name)?;
    let line_ending = doc.line_ending();
    let block: Vec<String> = std::iter::once(markers.begin.to_string())
        .chain(body)
        .chain(std::iter::once(markers.end.to_string()))
        .map(|line| format!("{}{}", line, line_ending))
        .collect();

    let inserted = insert_at_end(doc.lines_mut(), section, block, line_ending);
    Ok(SectionUpdate { removed, inserted })
}
