// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structural paths into an input document.

use core::fmt;
use core::ops::Deref;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// One step into a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Position within an array.
    Index(u64),
    /// Key within a string-keyed object.
    Key(String),
}

impl PathSegment {
    /// Interpret a generic decoded value as a segment.
    ///
    /// Strings are keys. Non-negative numbers are indices; floats are truncated,
    /// so `2.0` and `2.7` both yield `Index(2)`. Anything else is not a segment.
    pub fn from_json(value: &serde_json::Value) -> Option<PathSegment> {
        match value {
            serde_json::Value::String(s) => Some(PathSegment::Key(s.clone())),
            serde_json::Value::Number(n) => Self::from_number(n),
            _ => None,
        }
    }

    pub fn from_number(n: &serde_json::Number) -> Option<PathSegment> {
        if let Some(u) = n.as_u64() {
            return Some(PathSegment::Index(u));
        }
        if n.is_i64() {
            return None;
        }
        n.as_f64().and_then(Self::from_f64)
    }

    fn from_f64(f: f64) -> Option<PathSegment> {
        // `u64::MAX as f64` rounds up to 2^64, which is already out of range.
        if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 {
            Some(PathSegment::Index(f.trunc() as u64))
        } else {
            None
        }
    }
}

impl From<u64> for PathSegment {
    fn from(idx: u64) -> Self {
        PathSegment::Index(idx)
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx as u64)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl Serialize for PathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PathSegment::Index(i) => serializer.serialize_u64(*i),
            PathSegment::Key(k) => serializer.serialize_str(k),
        }
    }
}

struct SegmentVisitor;

impl<'de> Visitor<'de> for SegmentVisitor {
    type Value = PathSegment;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative array index or an object key")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(PathSegment::Index(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u64::try_from(v)
            .map(PathSegment::Index)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        PathSegment::from_f64(v).ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(PathSegment::Key(s.to_string()))
    }

    fn visit_string<E>(self, s: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(PathSegment::Key(s))
    }
}

impl<'de> Deserialize<'de> for PathSegment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SegmentVisitor)
    }
}

/// Ordered sequence of segments. The empty path is the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root() -> Path {
        Path(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Return a copy of this path extended by `segment`.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Path {
        let mut p = self.clone();
        p.push(segment);
        p
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn into_segments(self) -> Vec<PathSegment> {
        self.0
    }

    /// True if `self` is `other` or an ancestor of it.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Path> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Deref for Path {
    type Target = [PathSegment];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Path(segments)
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => (),
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Renders the path the way it would be written after `input` in a policy,
/// e.g. `servers[0].ports` or `labels["app.kubernetes.io/name"]`.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Key(k) if is_identifier(k) => {
                    if idx > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(k)?;
                }
                PathSegment::Key(k) => {
                    let quoted = serde_json::to_string(k).map_err(|_| fmt::Error)?;
                    write!(f, "[{quoted}]")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn float_segments_truncate() {
        let seg = PathSegment::from_json(&serde_json::json!(2.0));
        assert_eq!(seg, Some(PathSegment::Index(2)));

        let seg = PathSegment::from_json(&serde_json::json!(2.9));
        assert_eq!(seg, Some(PathSegment::Index(2)));
    }

    #[test]
    fn rejects_non_segments() {
        assert_eq!(PathSegment::from_json(&serde_json::json!(-1)), None);
        assert_eq!(PathSegment::from_json(&serde_json::json!(-0.5)), None);
        assert_eq!(PathSegment::from_json(&serde_json::json!(true)), None);
        assert_eq!(PathSegment::from_json(&serde_json::json!(null)), None);
        assert_eq!(PathSegment::from_json(&serde_json::json!(["a"])), None);
    }

    #[test]
    fn out_of_range_floats() {
        assert_eq!(PathSegment::from_json(&serde_json::json!(1e20)), None);
        assert_eq!(PathSegment::from_json(&serde_json::json!(3e19)), None);
        assert_eq!(
            PathSegment::from_json(&serde_json::json!(1e19)),
            Some(PathSegment::Index(10_000_000_000_000_000_000))
        );
        assert!(Path::from_json_str("[1e20]").is_err());
    }

    #[test]
    fn deserialize_mixed() -> Result<()> {
        let path = Path::from_json_str(r#"["a", 1, 2.0, "b"]"#)?;
        let expected = Path::from(vec![
            PathSegment::from("a"),
            PathSegment::from(1u64),
            PathSegment::from(2u64),
            PathSegment::from("b"),
        ]);
        assert_eq!(path, expected);

        assert!(Path::from_json_str("[-1]").is_err());
        assert!(Path::from_json_str("[[0]]").is_err());
        assert!(Path::from_json_str(r#"{"a": 1}"#).is_err());
        Ok(())
    }

    #[test]
    fn display() -> Result<()> {
        let path = Path::from_json_str(r#"["servers", 0, "labels", "app.kubernetes.io/name"]"#)?;
        assert_eq!(
            path.to_string(),
            r#"servers[0].labels["app.kubernetes.io/name"]"#
        );
        assert_eq!(Path::from_json_str("[3]")?.to_string(), "[3]");
        assert_eq!(Path::root().to_string(), "");
        Ok(())
    }

    #[test]
    fn prefix() -> Result<()> {
        let a = Path::from_json_str(r#"["a"]"#)?;
        let a1 = a.child(1usize);
        assert!(a.is_prefix_of(&a1));
        assert!(a.is_prefix_of(&a));
        assert!(!a1.is_prefix_of(&a));
        assert!(Path::root().is_prefix_of(&a));
        Ok(())
    }
}
