// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::Value;

use super::{ExpressionBuilder, SQLBuilder, column_reference::ColumnReference, literal::LiteralValue};

/// An ordered list of JSON path segments. A single segment (`"age"`) and an explicit list
/// (`["address", "city"]`) normalize to the same representation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<String>,
}

impl JsonPath {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The single segment, if the path addresses a top-level key
    pub fn as_single_key(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [key] => Some(key.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for JsonPath {
    fn from(segment: &str) -> Self {
        Self::new([segment])
    }
}

impl From<String> for JsonPath {
    fn from(segment: String) -> Self {
        Self::new([segment])
    }
}

impl From<&[&str]> for JsonPath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for JsonPath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl From<Vec<&str>> for JsonPath {
    fn from(segments: Vec<&str>) -> Self {
        Self::new(segments)
    }
}

impl From<Vec<String>> for JsonPath {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl ExpressionBuilder for JsonPath {
    /// Build the path as an inlined text-array literal such as `'{address,city}'`
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_literal(LiteralValue::path(self.segments.as_slice()));
    }
}

/// How a JSON sub-value is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// `#>`: yields `jsonb`, so comparisons respect JSON types
    Structural,
    /// `#>>`: yields `text`, so comparisons are textual
    Text,
}

impl AccessMode {
    /// Pick the access mode for comparing against `value`.
    ///
    /// Objects and arrays need structural comparison, and numbers keep numeric semantics in
    /// structural mode. Strings, booleans and null compare as text.
    pub fn for_value(value: &Value) -> Self {
        match value {
            Value::Object(_) | Value::Array(_) | Value::Number(_) => AccessMode::Structural,
            Value::String(_) | Value::Bool(_) | Value::Null => AccessMode::Text,
        }
    }

    /// Pick the access mode for an ordering comparison: numbers order numerically in structural
    /// mode, everything else orders lexicographically in text mode.
    pub fn for_ordering(value: &Value) -> Self {
        if value.is_number() {
            AccessMode::Structural
        } else {
            AccessMode::Text
        }
    }

    pub fn operator(&self) -> &'static str {
        match self {
            AccessMode::Structural => "#>",
            AccessMode::Text => "#>>",
        }
    }

    /// The literal to compare the accessed value with: `jsonb` against `#>`, `text` against `#>>`
    pub(crate) fn comparison_literal(&self, value: &Value) -> LiteralValue {
        match self {
            AccessMode::Structural => LiteralValue::jsonb(value),
            AccessMode::Text => LiteralValue::text(value),
        }
    }
}

/// A JSON column accessed at a path, e.g. `"meta"#>'{address,city}'`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonAccess<'a> {
    pub column: &'a ColumnReference,
    pub path: &'a JsonPath,
    pub mode: AccessMode,
}

impl ExpressionBuilder for JsonAccess<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        self.column.build(builder);
        builder.push_str(self.mode.operator());
        self.path.build(builder);
    }
}
