// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Value classification and serialization.
//!
//! Every value that ends up in generated SQL goes through this module: either as a bound
//! parameter ([`LiteralValue::Bound`]) or as an escaped, quoted literal spliced into the SQL text
//! ([`LiteralValue::Inlined`]). Call sites never escape values themselves.

use std::fmt::Display;

use serde_json::Value;

use super::{ExpressionBuilder, SQLBuilder, SQLParamContainer, SQLText};

/// The element type used to cast array literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeHint {
    #[default]
    Text,
    Integer,
    Boolean,
}

impl TypeHint {
    /// The scalar type name, used in casts such as `$1::integer`
    pub fn sql_type(&self) -> &'static str {
        match self {
            TypeHint::Text => "text",
            TypeHint::Integer => "integer",
            TypeHint::Boolean => "boolean",
        }
    }

    /// The array type name, used in casts such as `ARRAY[$1]::integer[]`
    pub fn array_type(&self) -> &'static str {
        match self {
            TypeHint::Text => "text[]",
            TypeHint::Integer => "integer[]",
            TypeHint::Boolean => "boolean[]",
        }
    }
}

impl Display for TypeHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// Infer the type hint for a value.
///
/// For a non-empty array only the first element is inspected; heterogeneous arrays get the type
/// of element zero. Anything that isn't a number or a boolean (including empty arrays, nested
/// arrays, objects and null) is `Text`.
pub fn classify(value: &Value) -> TypeHint {
    match value {
        Value::Array(elems) => elems.first().map(classify_element).unwrap_or_default(),
        value => classify_element(value),
    }
}

/// Infer the type hint for a value used as a single array element. Unlike [`classify`], an array
/// is not looked into, so it is `Text`.
pub fn classify_element(value: &Value) -> TypeHint {
    match value {
        Value::Number(_) => TypeHint::Integer,
        Value::Bool(_) => TypeHint::Boolean,
        _ => TypeHint::Text,
    }
}

/// JSON-encode a value and double any single quotes, so that the result can be placed inside a
/// single-quoted SQL literal.
pub fn serialize_as_json(value: &Value) -> String {
    value.to_string().replace('\'', "''")
}

/// Render a value as the text Postgres' `#>>`/`->>` would produce for it.
pub fn serialize_as_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        value @ (Value::Array(_) | Value::Object(_)) => value.to_string(),
    }
}

/// Wrap text in single quotes, doubling any embedded single quote.
pub fn escape_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Render path segments as a Postgres text-array literal body, e.g. `{a,b}`.
///
/// Segments that would otherwise be misread by the array parser (empty, `NULL`, or containing
/// braces, commas, quotes, backslashes or whitespace) are double-quoted.
pub fn array_literal_body<S: AsRef<str>>(segments: &[S]) -> String {
    let mut body = String::from("{");
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            body.push(',');
        }
        let segment = segment.as_ref();
        if needs_array_quoting(segment) {
            body.push('"');
            for c in segment.chars() {
                if c == '"' || c == '\\' {
                    body.push('\\');
                }
                body.push(c);
            }
            body.push('"');
        } else {
            body.push_str(segment);
        }
    }
    body.push('}');
    body
}

fn needs_array_quoting(segment: &str) -> bool {
    segment.is_empty()
        || segment.eq_ignore_ascii_case("null")
        || segment
            .chars()
            .any(|c| matches!(c, '{' | '}' | ',' | '"' | '\\') || c.is_whitespace())
}

/// A value as it appears in generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Carried in the parameter list and referenced by a placeholder
    Bound(SQLParamContainer),
    /// Escaped and quoted text that is part of the SQL itself
    Inlined(String),
}

impl LiteralValue {
    /// Bind a value as `jsonb`, for comparisons and containment against `jsonb` operands.
    pub fn jsonb(value: &Value) -> Self {
        LiteralValue::Bound(SQLParamContainer::new(value.clone()))
    }

    /// Bind the text serialization of a value (see [`serialize_as_text`]) as `text`.
    pub fn text(value: &Value) -> Self {
        LiteralValue::Bound(SQLParamContainer::new(serialize_as_text(value)))
    }

    /// Bind an array element whose placeholder the surrounding cast types as `hint`
    /// (`ARRAY[$1]::integer[]`, `$1::boolean`).
    ///
    /// Values matching the hint bind as the corresponding Rust type (`i32`, `bool`, `String`).
    /// Anything else, such as a fractional number under an `integer` hint, is sent as text for
    /// the server to convert or reject.
    pub fn element(value: &Value, hint: TypeHint) -> Self {
        let param = match (hint, value) {
            (_, Value::Null) => SQLParamContainer::new(SQLText::null()),
            (TypeHint::Integer, Value::Number(n)) => {
                match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                    Some(i) => SQLParamContainer::new(i),
                    None => SQLParamContainer::new(SQLText::new(n.to_string())),
                }
            }
            (TypeHint::Boolean, Value::Bool(b)) => SQLParamContainer::new(*b),
            (TypeHint::Text, value) => SQLParamContainer::new(serialize_as_text(value)),
            (_, value) => SQLParamContainer::new(SQLText::new(serialize_as_text(value))),
        };
        LiteralValue::Bound(param)
    }

    /// Bind a value whose type only the server knows (the element type of an array column, the
    /// `numeric` of an arithmetic expression). It is sent as text and parsed by the server.
    pub fn untyped(value: &Value) -> Self {
        let param = match value {
            Value::Null => SQLText::null(),
            value => SQLText::new(serialize_as_text(value)),
        };
        LiteralValue::Bound(SQLParamContainer::new(param))
    }

    /// Inline the JSON serialization of a value as a single-quoted literal, e.g. `'{"a":1}'`.
    pub fn json(value: &Value) -> Self {
        LiteralValue::Inlined(format!("'{}'", serialize_as_json(value)))
    }

    /// Inline a path as a single-quoted text-array literal, e.g. `'{a,b}'`.
    pub fn path<S: AsRef<str>>(segments: &[S]) -> Self {
        LiteralValue::Inlined(escape_literal(&array_literal_body(segments)))
    }
}

impl ExpressionBuilder for LiteralValue {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_literal(self.clone());
    }
}
