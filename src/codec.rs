// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Encoding of paths into a term's origin attribute.
//!
//! The host engine only lets us attach a location to a term. The file component
//! of that location is overloaded to carry a marker followed by the JSON form of
//! the path. Any origin without the marker belongs to someone else and is ignored.

use crate::error::CoverageError;
use crate::path::{Path, PathSegment};

/// Prefix distinguishing encoded paths from real file names.
pub const PATH_MARKER: &str = "path:";

pub fn encode(path: &Path) -> Result<String, CoverageError> {
    let payload = serde_json::to_string(path)?;
    Ok(format!("{PATH_MARKER}{payload}"))
}

/// Encode a path given in generic decoded form.
///
/// Fails if a segment is neither a string nor a non-negative number.
pub fn encode_segments(segments: &[serde_json::Value]) -> Result<String, CoverageError> {
    let path = segments
        .iter()
        .map(|s| {
            PathSegment::from_json(s).ok_or_else(|| CoverageError::UnsupportedSegment {
                segment: s.to_string(),
            })
        })
        .collect::<Result<Path, _>>()?;
    encode(&path)
}

/// Recover a path from an origin string. Never fails; returns `None` when the
/// origin is not one of ours or is malformed.
pub fn decode(origin: &str) -> Option<Path> {
    let payload = origin.strip_prefix(PATH_MARKER)?;
    serde_json::from_str(payload).ok()
}
