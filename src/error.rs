// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Errors surfaced while tagging a document with paths.
#[derive(thiserror::Error, Debug)]
pub enum CoverageError {
    #[error("could not encode path: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("unsupported path segment: {segment}")]
    UnsupportedSegment { segment: String },
}
