// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::path::{Path, PathSegment};
use crate::term::{Term, TermValue};
use crate::trie::PathTrie;

use serde::Serialize;

/// Coverage of one input document by one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    /// Document paths whose values were read, sorted.
    pub covered: Vec<Path>,
    /// Document leaves that no covered path reaches, sorted.
    pub not_covered: Vec<Path>,
}

impl CoverageReport {
    pub(crate) fn from_trie(trie: &PathTrie, document: &Term) -> CoverageReport {
        let mut covered = trie.recorded_paths();
        covered.sort();

        let mut not_covered = vec![];
        let mut path = Path::root();
        gather_uncovered(trie, document, &mut path, &mut not_covered);
        not_covered.sort();

        CoverageReport {
            covered,
            not_covered,
        }
    }

    pub fn is_fully_covered(&self) -> bool {
        self.not_covered.is_empty()
    }

    pub fn to_json_str(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human readable listing, one path per line.
    pub fn to_string_pretty(&self) -> String {
        let mut s = format!(
            "COVERAGE REPORT: {} covered, {} not covered\n",
            self.covered.len(),
            self.not_covered.len()
        );
        for p in self.covered.iter() {
            s.push_str(&format!("  + input{}\n", display_suffix(p)));
        }
        for p in self.not_covered.iter() {
            s.push_str(&format!("  - input{}\n", display_suffix(p)));
        }
        s
    }
}

fn display_suffix(path: &Path) -> String {
    match path.first() {
        Some(PathSegment::Key(_)) => {
            let rendered = path.to_string();
            // Quoted keys already start with `[`.
            match rendered.starts_with('[') {
                true => rendered,
                false => format!(".{rendered}"),
            }
        }
        _ => path.to_string(),
    }
}

fn gather_uncovered(trie: &PathTrie, term: &Term, path: &mut Path, out: &mut Vec<Path>) {
    if trie.covers(path) {
        return;
    }

    let mut has_children = false;
    match &term.value {
        TermValue::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                has_children = true;
                path.push(PathSegment::Index(idx as u64));
                gather_uncovered(trie, item, path, out);
                path.pop();
            }
        }
        TermValue::Object(fields) => {
            for (key, value) in fields.iter() {
                if let TermValue::String(k) = &key.value {
                    has_children = true;
                    path.push(PathSegment::Key(k.to_string()));
                    gather_uncovered(trie, value, path, out);
                    path.pop();
                }
            }
        }
        _ => (),
    }

    // A leaf with recorded paths below it is a prefix of covered data.
    if !has_children && !trie.has_descendants(path) {
        out.push(path.clone());
    }
}
