use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// An immutable path addressing a node in a strata tree.
///
/// A path is an ordered sequence of non-empty string segments. The root path
/// has zero segments. Two paths are equal iff their segment sequences are
/// equal. The textual form is slash-separated with a leading slash; the root
/// renders as `"/"`.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    /// The root path (zero segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from owned segments.
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Returns `true` if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The segment at `index`, if any.
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// The final segment, or `None` for the root path.
    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// All segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Returns a new path with `name` appended as the final segment.
    pub fn append(&self, name: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(name.to_owned());
        Self { segments }
    }

    /// Returns a new path with the final `count` segments removed.
    ///
    /// Removing more segments than the path has yields the root path.
    pub fn remove_last_segments(&self, count: usize) -> Self {
        let keep = self.segments.len().saturating_sub(count);
        Self {
            segments: self.segments[..keep].to_vec(),
        }
    }

    /// The parent path, or `None` for the root path.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(self.remove_last_segments(1))
    }

    /// Returns `true` if `other` is this path extended by one or more
    /// segments.
    pub fn is_ancestor_of(&self, other: &TreePath) -> bool {
        other.segments.len() > self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }
}

impl FromStr for TreePath {
    type Err = PathError;

    /// Parse a slash-separated textual path. `""` and `"/"` are the root;
    /// leading and trailing slashes are accepted; interior empty segments
    /// are rejected.
    fn from_str(text: &str) -> Result<Self, PathError> {
        let trimmed = text.trim_start_matches('/').trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(text.to_owned()));
            }
            segments.push(segment.to_owned());
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreePath({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> TreePath {
        text.parse().unwrap()
    }

    #[test]
    fn root_has_no_segments() {
        let root = TreePath::root();
        assert!(root.is_root());
        assert_eq!(root.segment_count(), 0);
        assert_eq!(root.last_segment(), None);
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn parse_and_display_roundtrip() {
        assert_eq!(path("/a/b/c").to_string(), "/a/b/c");
        assert_eq!(path("a/b").to_string(), "/a/b");
        assert_eq!(path("/a/b/").to_string(), "/a/b");
        assert_eq!(path("/").to_string(), "/");
        assert_eq!(path("").to_string(), "/");
    }

    #[test]
    fn interior_empty_segment_rejected() {
        let err = "a//b".parse::<TreePath>().unwrap_err();
        assert!(matches!(err, PathError::EmptySegment(_)));
    }

    #[test]
    fn append_extends_by_one() {
        let p = path("/a").append("b");
        assert_eq!(p, path("/a/b"));
        assert_eq!(p.segment_count(), 2);
        assert_eq!(p.last_segment(), Some("b"));
    }

    #[test]
    fn remove_last_segments_trims() {
        let p = path("/a/b/c");
        assert_eq!(p.remove_last_segments(1), path("/a/b"));
        assert_eq!(p.remove_last_segments(2), path("/a"));
        assert_eq!(p.remove_last_segments(3), TreePath::root());
        assert_eq!(p.remove_last_segments(99), TreePath::root());
    }

    #[test]
    fn parent_chain_reaches_root() {
        let p = path("/a/b");
        let parent = p.parent().unwrap();
        assert_eq!(parent, path("/a"));
        assert_eq!(parent.parent().unwrap(), TreePath::root());
    }

    #[test]
    fn equality_is_by_segments() {
        assert_eq!(path("/a/b"), TreePath::root().append("a").append("b"));
        assert_ne!(path("/a/b"), path("/a/c"));
        assert_ne!(path("/a"), path("/a/b"));
    }

    #[test]
    fn ancestor_check() {
        assert!(path("/a").is_ancestor_of(&path("/a/b")));
        assert!(TreePath::root().is_ancestor_of(&path("/a")));
        assert!(!path("/a/b").is_ancestor_of(&path("/a")));
        assert!(!path("/a").is_ancestor_of(&path("/a")));
        assert!(!path("/ab").is_ancestor_of(&path("/a/b")));
    }

    #[test]
    fn segment_access() {
        let p = path("/x/y/z");
        assert_eq!(p.segment(0), Some("x"));
        assert_eq!(p.segment(2), Some("z"));
        assert_eq!(p.segment(3), None);
        let collected: Vec<&str> = p.segments().collect();
        assert_eq!(collected, vec!["x", "y", "z"]);
    }

    #[test]
    fn serde_roundtrip() {
        let p = path("/a/b");
        let json = serde_json::to_string(&p).unwrap();
        let back: TreePath = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    proptest::proptest! {
        #[test]
        fn display_parse_roundtrip(segments in proptest::collection::vec("[a-z][a-z0-9]{0,8}", 0..6)) {
            let p = TreePath::from_segments(segments);
            let reparsed: TreePath = p.to_string().parse().unwrap();
            proptest::prop_assert_eq!(p, reparsed);
        }
    }
}
