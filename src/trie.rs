// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;

use log::warn;

use crate::path::{Path, PathSegment};

/// A set of paths stored as a prefix tree.
///
/// Paths sharing a prefix share the chain of nodes for it. Index and key
/// children are kept apart so that `0` and `"0"` stay distinct. Each node
/// remembers whether a path ending at it was recorded, which lets a path and
/// its extensions be reported independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTrie {
    indices: BTreeMap<u64, PathTrie>,
    keys: BTreeMap<String, PathTrie>,
    recorded: bool,
}

impl PathTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `path`. Inserting the root path is a no-op.
    pub fn add(&mut self, path: &[PathSegment]) {
        if path.is_empty() {
            return;
        }

        let mut node = self;
        for segment in path {
            node = node.child_mut(segment);
        }
        node.recorded = true;
    }

    /// Insert a path given in generic decoded form.
    ///
    /// Floats are truncated to indices. A segment of any other shape drops the
    /// whole path; nothing is inserted.
    pub fn add_segments(&mut self, segments: &[serde_json::Value]) {
        let mut path = Path::root();
        for segment in segments {
            match PathSegment::from_json(segment) {
                Some(s) => path.push(s),
                None => {
                    warn!("uncovered: unsupported path segment {segment}");
                    return;
                }
            }
        }
        self.add(&path);
    }

    /// Every recorded path, in no particular order.
    ///
    /// A trie with nothing recorded reports the root path alone.
    pub fn list(&self) -> Vec<Path> {
        let mut paths = self.recorded_paths();
        if paths.is_empty() {
            paths.push(Path::root());
        }
        paths
    }

    /// Every recorded path, without the root fallback of [`PathTrie::list`].
    pub(crate) fn recorded_paths(&self) -> Vec<Path> {
        let mut paths = vec![];
        let mut prefix = Path::root();
        self.collect(&mut prefix, &mut paths);
        paths
    }

    fn collect(&self, prefix: &mut Path, paths: &mut Vec<Path>) {
        if self.recorded {
            paths.push(prefix.clone());
        }
        for (idx, child) in self.indices.iter() {
            prefix.push(PathSegment::Index(*idx));
            child.collect(prefix, paths);
            prefix.pop();
        }
        for (key, child) in self.keys.iter() {
            prefix.push(PathSegment::Key(key.clone()));
            child.collect(prefix, paths);
            prefix.pop();
        }
    }

    /// True if `path` or one of its ancestors was recorded.
    pub fn covers(&self, path: &[PathSegment]) -> bool {
        let mut node = self;
        for segment in path {
            node = match node.child(segment) {
                Some(child) => child,
                None => return false,
            };
            if node.recorded {
                return true;
            }
        }
        false
    }

    /// True if the trie holds any node strictly below `path`.
    pub(crate) fn has_descendants(&self, path: &[PathSegment]) -> bool {
        let mut node = self;
        for segment in path {
            node = match node.child(segment) {
                Some(child) => child,
                None => return false,
            };
        }
        !node.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.keys.is_empty()
    }

    /// Number of recorded paths.
    pub fn len(&self) -> usize {
        let children = self.indices.values().chain(self.keys.values());
        usize::from(self.recorded) + children.map(PathTrie::len).sum::<usize>()
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.keys.clear();
        self.recorded = false;
    }

    fn child(&self, segment: &PathSegment) -> Option<&PathTrie> {
        match segment {
            PathSegment::Index(idx) => self.indices.get(idx),
            PathSegment::Key(key) => self.keys.get(key),
        }
    }

    fn child_mut(&mut self, segment: &PathSegment) -> &mut PathTrie {
        match segment {
            PathSegment::Index(idx) => self.indices.entry(*idx).or_default(),
            PathSegment::Key(key) => self.keys.entry(key.clone()).or_default(),
        }
    }
}
