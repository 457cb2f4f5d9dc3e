//! Materialized location paths
//!
//! A location is stored as a single string of segments joined by a
//! category-specific separator, e.g. `Lab/Bench3/Drawer1`. All structural
//! questions (parent, ancestry, depth) are answered from the string alone.

use crate::core::error::{LedgerError, LedgerResult};

/// Name of the root location that always exists and cannot be deleted
pub const UNASSIGNED: &str = "Unassigned";

/// Default segment separator
pub const DEFAULT_SEPARATOR: char = '/';

/// Parses, builds and compares location paths for one separator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCodec {
    separator: char,
}

impl Default for PathCodec {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl PathCodec {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Path with its last segment removed, or `None` for a top-level path
    pub fn parent_of<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.rsplit_once(self.separator).map(|(parent, _)| parent)
    }

    /// True if `candidate` is `ancestor` or lies anywhere below it
    pub fn is_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        candidate == ancestor || self.is_strict_descendant(candidate, ancestor)
    }

    /// True if `candidate` lies below `ancestor` (excluding equality)
    pub fn is_strict_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        candidate.len() > ancestor.len()
            && candidate.starts_with(ancestor)
            && candidate[ancestor.len()..].starts_with(self.separator)
    }

    /// Join segments into a path.
    ///
    /// Segments are trimmed, empty ones are dropped and repeated segments are
    /// kept only at their first occurrence. A segment containing the
    /// separator is rejected, as is an input with no usable segments.
    pub fn normalize<I, S>(&self, segments: I) -> LedgerResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept: Vec<String> = Vec::new();
        for segment in segments {
            let segment = segment.as_ref().trim();
            if segment.is_empty() {
                continue;
            }
            if segment.contains(self.separator) {
                return Err(LedgerError::invalid_segment(
                    segment,
                    format!("segments may not contain '{}'", self.separator),
                ));
            }
            if !kept.iter().any(|k| k == segment) {
                kept.push(segment.to_string());
            }
        }

        if kept.is_empty() {
            return Err(LedgerError::invalid_segment("", "path has no segments"));
        }

        Ok(kept.join(&self.separator.to_string()))
    }

    /// Parse user-entered text such as `Lab / Bench3/` into a normalized path
    pub fn parse(&self, text: &str) -> LedgerResult<String> {
        self.normalize(text.split(self.separator))
    }

    /// Build the path of a child named `segment` below `parent`
    pub fn join(&self, parent: Option<&str>, segment: &str) -> LedgerResult<String> {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(LedgerError::invalid_segment(segment, "segment is empty"));
        }
        if segment.contains(self.separator) {
            return Err(LedgerError::invalid_segment(
                segment,
                format!("segments may not contain '{}'", self.separator),
            ));
        }
        Ok(match parent {
            Some(parent) => format!("{}{}{}", parent, self.separator, segment),
            None => segment.to_string(),
        })
    }

    pub fn segments<'p>(&self, path: &'p str) -> impl Iterator<Item = &'p str> {
        path.split(self.separator)
    }

    /// Number of segments in the path
    pub fn depth(&self, path: &str) -> usize {
        self.segments(path).count()
    }

    /// Last segment of the path
    pub fn name<'p>(&self, path: &'p str) -> &'p str {
        path.rsplit(self.separator).next().unwrap_or(path)
    }

    /// All proper ancestors, nearest first
    pub fn ancestors<'p>(&self, path: &'p str) -> Vec<&'p str> {
        let mut out = Vec::new();
        let mut current = path;
        while let Some(parent) = self.parent_of(current) {
            out.push(parent);
            current = parent;
        }
        out
    }

    /// The segment directly below `parent` on the way to `path`.
    ///
    /// Returns `None` when `path` is not a strict descendant of `parent`.
    /// With no parent, returns the top-level segment.
    pub fn next_segment<'p>(&self, path: &'p str, parent: Option<&str>) -> Option<&'p str> {
        let rest = match parent {
            Some(parent) => {
                if !self.is_strict_descendant(path, parent) {
                    return None;
                }
                &path[parent.len() + self.separator.len_utf8()..]
            }
            None => path,
        };
        rest.split(self.separator).next()
    }

    /// Prefix every strict descendant of `path` starts with
    pub fn child_prefix(&self, path: &str) -> String {
        format!("{}{}", path, self.separator)
    }

    /// True for the top-level `Unassigned` location and anything below it
    pub fn is_protected(&self, path: &str) -> bool {
        self.is_descendant(path, UNASSIGNED)
    }
}
