// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::path::PathSegment;
use crate::Rc;

use core::fmt;

use anyhow::Result;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

/// Where a term came from.
///
/// For policy terms this is a position in a source file. Terms of a decorated
/// document carry an encoded path in `file` instead (see [`crate::decorate`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: Rc<str>,
    pub row: u32,
    pub col: u32,
}

impl Location {
    pub fn new(file: impl Into<Rc<str>>, row: u32, col: u32) -> Location {
        Location {
            file: file.into(),
            row,
            col,
        }
    }

    /// A location that only carries an origin string.
    pub fn from_origin(origin: impl Into<Rc<str>>) -> Location {
        Location::new(origin, 0, 0)
    }

    pub fn origin(&self) -> &str {
        &self.file
    }
}

/// Values a term can hold, as seen by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum TermValue {
    // Json data types.
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(Rc<str>),
    Array(Vec<Term>),
    Object(Vec<(Term, Term)>),

    // Rego specific.
    Set(Vec<Term>),
    Var(Rc<str>),
    // Head term followed by the selected keys, e.g. input.servers[i].
    Ref(Vec<Term>),
    // Operator reference followed by the operands.
    Call(Vec<Term>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub value: TermValue,
    pub location: Option<Location>,
}

impl Term {
    pub fn new(value: TermValue) -> Term {
        Term {
            value,
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Term {
        self.location = Some(location);
        self
    }

    pub fn null() -> Term {
        Term::new(TermValue::Null)
    }

    pub fn boolean(b: bool) -> Term {
        Term::new(TermValue::Bool(b))
    }

    pub fn number(n: impl Into<serde_json::Number>) -> Term {
        Term::new(TermValue::Number(n.into()))
    }

    pub fn string(s: &str) -> Term {
        Term::new(TermValue::String(s.into()))
    }

    pub fn var(name: &str) -> Term {
        Term::new(TermValue::Var(name.into()))
    }

    pub fn array(items: Vec<Term>) -> Term {
        Term::new(TermValue::Array(items))
    }

    pub fn set(items: Vec<Term>) -> Term {
        Term::new(TermValue::Set(items))
    }

    pub fn object(fields: Vec<(Term, Term)>) -> Term {
        Term::new(TermValue::Object(fields))
    }

    /// Build a reference from a dotted name, e.g. `io.jwt.decode`.
    pub fn reference(name: &str) -> Term {
        let mut parts = name.split('.');
        let mut terms = vec![Term::var(parts.next().unwrap_or_default())];
        terms.extend(parts.map(Term::string));
        Term::new(TermValue::Ref(terms))
    }

    pub fn call(operator: &str, operands: Vec<Term>) -> Term {
        let mut terms = Vec::with_capacity(operands.len() + 1);
        terms.push(Term::reference(operator));
        terms.extend(operands);
        Term::new(TermValue::Call(terms))
    }

    pub fn from_json_str(json: &str) -> Result<Term> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Term> {
        Ok(Term::deserialize(value)?)
    }

    /// The origin string of this term's location, if any.
    pub fn origin(&self) -> Option<&str> {
        self.location.as_ref().map(Location::origin)
    }

    pub fn set_origin(&mut self, origin: impl Into<Rc<str>>) {
        self.location = Some(Location::from_origin(origin));
    }

    /// True if no variables remain anywhere in the term.
    pub fn is_ground(&self) -> bool {
        match &self.value {
            TermValue::Null | TermValue::Bool(_) | TermValue::Number(_) | TermValue::String(_) => {
                true
            }
            TermValue::Var(_) => false,
            // The head of a reference names a document or rule, not a binding.
            TermValue::Ref(terms) => terms.iter().skip(1).all(Term::is_ground),
            TermValue::Array(items) | TermValue::Set(items) | TermValue::Call(items) => {
                items.iter().all(Term::is_ground)
            }
            TermValue::Object(fields) => fields.iter().all(|(k, v)| k.is_ground() && v.is_ground()),
        }
    }

    /// Canonical dotted name of a reference made of a variable followed by
    /// string keys, e.g. `count` or `json.marshal`.
    pub fn ref_name(&self) -> Option<String> {
        match &self.value {
            TermValue::Var(v) => Some(v.to_string()),
            TermValue::Ref(terms) => {
                let (head, tail) = terms.split_first()?;
                let mut name = match &head.value {
                    TermValue::Var(v) => v.to_string(),
                    _ => return None,
                };
                for t in tail {
                    match &t.value {
                        TermValue::String(s) => {
                            name.push('.');
                            name.push_str(s);
                        }
                        _ => return None,
                    }
                }
                Some(name)
            }
            _ => None,
        }
    }

    /// Child term selected by a single path step.
    pub fn child(&self, segment: &PathSegment) -> Option<&Term> {
        match (&self.value, segment) {
            (TermValue::Array(items), PathSegment::Index(idx)) => {
                usize::try_from(*idx).ok().and_then(|i| items.get(i))
            }
            (TermValue::Object(fields), PathSegment::Key(key)) => {
                fields.iter().find_map(|(k, v)| match &k.value {
                    TermValue::String(s) if **s == **key => Some(v),
                    _ => None,
                })
            }
            _ => None,
        }
    }

    /// Descendant term at `path`.
    pub fn get_path(&self, path: &[PathSegment]) -> Option<&Term> {
        path.iter().try_fold(self, |term, segment| term.child(segment))
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::boolean(b)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::string(s)
    }
}

impl From<u64> for Term {
    fn from(n: u64) -> Self {
        Term::number(n)
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Term::number(n)
    }
}

struct TermVisitor;

impl<'de> Visitor<'de> for TermVisitor {
    type Value = Term;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a json value")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Term::null())
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Term::boolean(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Term::number(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Term::number(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match serde_json::Number::from_f64(v) {
            Some(n) => Ok(Term::number(n)),
            None => Err(de::Error::custom("non-finite numbers are not supported")),
        }
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Term::string(s))
    }

    fn visit_seq<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
    where
        V: SeqAccess<'de>,
    {
        let mut items = vec![];
        while let Some(v) = visitor.next_element()? {
            items.push(v);
        }
        Ok(Term::array(items))
    }

    fn visit_map<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
    where
        V: MapAccess<'de>,
    {
        let mut fields = vec![];
        while let Some((key, value)) = visitor.next_entry::<String, Term>()? {
            fields.push((Term::string(&key), value));
        }
        Ok(Term::object(fields))
    }
}

impl<'de> Deserialize<'de> for Term {
    fn deserialize<D>(deserializer: D) -> Result<Term, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TermVisitor)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Term]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Renders terms in policy syntax for diagnostics.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TermValue::Null => f.write_str("null"),
            TermValue::Bool(b) => write!(f, "{b}"),
            TermValue::Number(n) => write!(f, "{n}"),
            TermValue::String(s) => {
                let quoted = serde_json::to_string(&**s).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
            TermValue::Var(v) => f.write_str(v),
            TermValue::Ref(terms) => {
                let Some((head, tail)) = terms.split_first() else {
                    return Ok(());
                };
                write!(f, "{head}")?;
                for t in tail {
                    match &t.value {
                        TermValue::String(s)
                            if s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                                && !s.is_empty()
                                && !s.starts_with(|c: char| c.is_ascii_digit()) =>
                        {
                            write!(f, ".{s}")?
                        }
                        _ => write!(f, "[{t}]")?,
                    }
                }
                Ok(())
            }
            TermValue::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            TermValue::Set(items) if items.is_empty() => f.write_str("set()"),
            TermValue::Set(items) => {
                f.write_str("{")?;
                write_list(f, items)?;
                f.write_str("}")
            }
            TermValue::Object(fields) => {
                f.write_str("{")?;
                for (idx, (k, v)) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            TermValue::Call(terms) => {
                let Some((operator, operands)) = terms.split_first() else {
                    return Ok(());
                };
                write!(f, "{operator}(")?;
                write_list(f, operands)?;
                f.write_str(")")
            }
        }
    }
}
