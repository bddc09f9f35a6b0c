// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Contract between an evaluator and the tracers observing it.

use crate::term::{Term, TermValue};

use core::fmt;

/// What a tracer asks of the evaluator before a query runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceConfig {
    /// Substitute every local variable into every term before delivering an
    /// event. Tracers that only look at a few terms should leave this off and
    /// call [`Event::plug`] on the terms they need.
    pub plug_local_vars: bool,
}

/// An expression as delivered in evaluation events.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bare term used as an expression, e.g. `input.enabled`.
    Term(Term),
    /// An operator applied to operands, e.g. `count(x)` or `x = y`.
    Call { operator: Term, operands: Vec<Term> },
}

impl Expr {
    pub fn call(operator: &str, operands: Vec<Term>) -> Expr {
        Expr::Call {
            operator: Term::reference(operator),
            operands,
        }
    }

    /// Unification expression `lhs = rhs`.
    pub fn equality(lhs: Term, rhs: Term) -> Expr {
        Expr::call("eq", vec![lhs, rhs])
    }

    pub fn operator(&self) -> Option<&Term> {
        match self {
            Expr::Call { operator, .. } => Some(operator),
            Expr::Term(_) => None,
        }
    }

    pub fn operands(&self) -> &[Term] {
        match self {
            Expr::Call { operands, .. } => operands,
            Expr::Term(_) => &[],
        }
    }

    /// Canonical name of the operator, e.g. `count` or `json.marshal`.
    pub fn operator_name(&self) -> Option<String> {
        self.operator().and_then(Term::ref_name)
    }

    pub fn is_equality(&self) -> bool {
        self.operands().len() == 2 && self.operator_name().as_deref() == Some("eq")
    }
}

impl From<Term> for Expr {
    fn from(term: Term) -> Self {
        match term.value {
            TermValue::Call(mut terms) if !terms.is_empty() => {
                let operator = terms.remove(0);
                Expr::Call {
                    operator,
                    operands: terms,
                }
            }
            value => Expr::Term(Term {
                value,
                location: term.location,
            }),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(t) => write!(f, "{t}"),
            Expr::Call { operands, .. } if self.is_equality() => {
                write!(f, "{} = {}", operands[0], operands[1])
            }
            Expr::Call { operator, operands } => {
                write!(f, "{operator}(")?;
                for (idx, o) in operands.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{o}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// The kind of step the evaluator took, with the node it applies to.
#[derive(Debug, Clone, Copy)]
pub enum EventKind<'a> {
    Enter,
    Exit,
    Eval(&'a Expr),
    Redo(&'a Expr),
    Fail(&'a Expr),
    Unify { lhs: &'a Term, rhs: &'a Term },
    Save,
    Index,
    Note(&'a str),
}

impl EventKind<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Enter => "Enter",
            EventKind::Exit => "Exit",
            EventKind::Eval(_) => "Eval",
            EventKind::Redo(_) => "Redo",
            EventKind::Fail(_) => "Fail",
            EventKind::Unify { .. } => "Unify",
            EventKind::Save => "Save",
            EventKind::Index => "Index",
            EventKind::Note(_) => "Note",
        }
    }
}

/// A single trace event.
///
/// Besides the event kind, the evaluator supplies a resolver that returns the
/// current fully substituted form of any term.
pub struct Event<'a> {
    kind: EventKind<'a>,
    resolver: &'a dyn Fn(&Term) -> Term,
}

impl<'a> Event<'a> {
    pub fn new(kind: EventKind<'a>, resolver: &'a dyn Fn(&Term) -> Term) -> Event<'a> {
        Event { kind, resolver }
    }

    pub fn kind(&self) -> &EventKind<'a> {
        &self.kind
    }

    /// Resolve `term` against the bindings in effect when the event fired.
    pub fn plug(&self, term: &Term) -> Term {
        (self.resolver)(term)
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event").field("kind", &self.kind).finish()
    }
}

/// Implemented by observers of query evaluation.
///
/// The evaluator consults `enabled` and `config` once before the query and then
/// calls `trace_event` synchronously for every step, in evaluation order.
pub trait QueryTracer {
    fn enabled(&self) -> bool;

    fn config(&self) -> TraceConfig;

    fn trace_event(&self, event: &Event<'_>);
}
