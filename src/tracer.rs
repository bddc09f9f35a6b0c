// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::{BuiltinRegistry, OpaBuiltins};
use crate::codec;
use crate::path::Path;
use crate::report::CoverageReport;
use crate::term::Term;
use crate::trace::{Event, EventKind, Expr, QueryTracer, TraceConfig};
use crate::trie::PathTrie;

use log::debug;
use serde::{Deserialize, Serialize};
use spin::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageOptions {
    /// Log each observed unification, equality and builtin call.
    pub diagnostics: bool,
}

impl Default for CoverageOptions {
    fn default() -> Self {
        Self { diagnostics: true }
    }
}

/// Records which parts of a decorated input document a query read.
///
/// Attach to an evaluator as a [`QueryTracer`]. A document value counts as
/// covered when it shows up fully resolved (ground) in a unification, an
/// equality or as an argument to a builtin, and still carries the path its
/// node was tagged with by [`crate::decorate`].
pub struct CoverageTracer {
    paths: Mutex<PathTrie>,
    builtins: Box<dyn BuiltinRegistry + Send + Sync>,
    options: CoverageOptions,
}

impl Default for CoverageTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverageTracer {
    pub fn new() -> Self {
        Self::with_options(CoverageOptions::default())
    }

    pub fn with_options(options: CoverageOptions) -> Self {
        Self {
            paths: Mutex::new(PathTrie::new()),
            builtins: Box::new(OpaBuiltins),
            options,
        }
    }

    /// Use `registry` instead of the OPA builtin table to decide which calls
    /// have their arguments recorded.
    pub fn with_builtins(mut self, registry: impl BuiltinRegistry + Send + Sync + 'static) -> Self {
        self.builtins = Box::new(registry);
        self
    }

    pub fn set_diagnostics(&mut self, enable: bool) {
        self.options.diagnostics = enable;
    }

    pub fn options(&self) -> &CoverageOptions {
        &self.options
    }

    /// Paths of the document values observed so far, in no particular order.
    ///
    /// Before anything has been recorded this is the root path alone.
    pub fn covered(&self) -> Vec<Path> {
        self.paths.lock().list()
    }

    /// Forget everything recorded so the tracer can observe another query.
    pub fn clear(&self) {
        self.paths.lock().clear();
    }

    /// Summarize coverage of `document`, which must be the decorated input
    /// the query ran against.
    pub fn report(&self, document: &Term) -> CoverageReport {
        CoverageReport::from_trie(&self.paths.lock(), document)
    }

    fn record(&self, term: &Term) {
        if !term.is_ground() {
            return;
        }
        if let Some(path) = term.origin().and_then(codec::decode) {
            self.paths.lock().add(&path);
        }
    }

    fn trace_unify(&self, event: &Event<'_>, lhs: &Term, rhs: &Term) {
        let lhs = event.plug(lhs);
        let rhs = event.plug(rhs);
        if self.options.diagnostics {
            debug!("TraceUnify: {lhs} = {rhs}");
        }
        self.record(&lhs);
        self.record(&rhs);
    }

    fn trace_eval(&self, event: &Event<'_>, expr: &Expr) {
        if expr.is_equality() {
            let operands = expr.operands();
            let lhs = event.plug(&operands[0]);
            let rhs = event.plug(&operands[1]);
            if self.options.diagnostics {
                debug!("TraceEquality: {lhs} = {rhs}");
            }
            self.record(&lhs);
            self.record(&rhs);
        }

        let Some(name) = expr.operator_name() else {
            return;
        };
        if !self.builtins.is_builtin(&name) {
            return;
        }

        let operands: Vec<Term> = expr.operands().iter().map(|t| event.plug(t)).collect();
        if self.options.diagnostics {
            let args: Vec<String> = operands.iter().map(|t| t.to_string()).collect();
            debug!("TraceEval: {name}({})", args.join(", "));
        }
        for term in operands.iter() {
            self.record(term);
        }
    }
}

impl QueryTracer for CoverageTracer {
    fn enabled(&self) -> bool {
        true
    }

    fn config(&self) -> TraceConfig {
        TraceConfig {
            plug_local_vars: false,
        }
    }

    fn trace_event(&self, event: &Event<'_>) {
        match *event.kind() {
            EventKind::Unify { lhs, rhs } => self.trace_unify(event, lhs, rhs),
            EventKind::Eval(expr) => self.trace_eval(event, expr),
            _ => (),
        }
    }
}
