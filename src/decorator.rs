// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::codec;
use crate::error::CoverageError;
use crate::path::{Path, PathSegment};
use crate::term::{Term, TermValue};

use log::trace;

/// Tag every node of `root` with its path, root included.
///
/// Array elements are reached by index and object values by key. Object
/// entries whose key is not a string are left untagged along with everything
/// beneath them. Decorating an already decorated document rewrites the same
/// tags.
pub fn decorate(root: &mut Term) -> Result<(), CoverageError> {
    let mut path = Path::root();
    decorate_term(root, &mut path)
}

/// Build a document from JSON and decorate it.
pub fn decorate_json(json: serde_json::Value) -> anyhow::Result<Term> {
    let mut root = Term::from_json_value(json)?;
    decorate(&mut root)?;
    Ok(root)
}

fn decorate_term(term: &mut Term, path: &mut Path) -> Result<(), CoverageError> {
    let origin = codec::encode(path)?;
    trace!("decorated with {origin}");
    term.set_origin(origin);

    match &mut term.value {
        TermValue::Array(items) => {
            for (idx, item) in items.iter_mut().enumerate() {
                path.push(PathSegment::Index(idx as u64));
                let r = decorate_term(item, path);
                path.pop();
                r?;
            }
        }
        TermValue::Object(fields) => {
            for (key, value) in fields.iter_mut() {
                let TermValue::String(k) = &key.value else {
                    continue;
                };
                path.push(PathSegment::Key(k.to_string()));
                let r = decorate_term(value, path);
                path.pop();
                r?;
            }
        }
        _ => (),
    }

    Ok(())
}
