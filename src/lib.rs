// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod builtins;
mod codec;
mod decorator;
mod error;
mod path;
mod report;
mod term;
mod trace;
mod tracer;
mod trie;

#[cfg(feature = "arc")]
pub(crate) use std::sync::Arc as Rc;

#[cfg(not(feature = "arc"))]
pub(crate) use std::rc::Rc;

pub use builtins::{BuiltinRegistry, OpaBuiltins};
pub use codec::{decode, encode, encode_segments, PATH_MARKER};
pub use decorator::{decorate, decorate_json};
pub use error::CoverageError;
pub use path::{Path, PathSegment};
pub use report::CoverageReport;
pub use term::{Location, Term, TermValue};
pub use trace::{Event, EventKind, Expr, QueryTracer, TraceConfig};
pub use tracer::{CoverageOptions, CoverageTracer};
pub use trie::PathTrie;
