// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::Value;
use tracing::debug;

use crate::sql::{
    ExpressionBuilder, SQLBuilder, SqlExpression,
    column_reference::ColumnReference,
    literal::{LiteralValue, TypeHint, classify, classify_element},
};

/// Expressions over a Postgres array column.
///
/// Operands are JSON values: an array operand means "these elements", any other value means
/// "this element". The element type of array literals is inferred from the first element.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayColumn {
    column: ColumnReference,
}

impl ArrayColumn {
    pub fn new(column: impl Into<ColumnReference>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &ColumnReference {
        &self.column
    }

    /// `array_append(C, $1::T)` for a single value, `C || ARRAY[...]::T[]` for several. Appending
    /// an empty list yields the bare column (a no-op update).
    pub fn append(&self, value: impl Into<Value>) -> SqlExpression {
        let value = value.into();
        let hint = classify(&value);

        match &value {
            Value::Array(elems) if elems.is_empty() => {
                debug!("Appending no elements; using the column unchanged");
                self.column.to_expression()
            }
            Value::Array(elems) => SqlExpression::build_with(|builder| {
                self.column.build(builder);
                builder.push_str(" || ");
                push_array_literal(elems, hint, builder);
            }),
            value => SqlExpression::build_with(|builder| {
                builder.push_str("array_append(");
                self.column.build(builder);
                builder.push_str(", ");
                push_cast_element(value, hint, builder);
                builder.push(')');
            }),
        }
    }

    /// `array_prepend($1::T, C)` for a single value, `ARRAY[...]::T[] || C` for several.
    /// Prepending an empty list yields the bare column.
    pub fn prepend(&self, value: impl Into<Value>) -> SqlExpression {
        let value = value.into();
        let hint = classify(&value);

        match &value {
            Value::Array(elems) if elems.is_empty() => {
                debug!("Prepending no elements; using the column unchanged");
                self.column.to_expression()
            }
            Value::Array(elems) => SqlExpression::build_with(|builder| {
                push_array_literal(elems, hint, builder);
                builder.push_str(" || ");
                self.column.build(builder);
            }),
            value => SqlExpression::build_with(|builder| {
                builder.push_str("array_prepend(");
                push_cast_element(value, hint, builder);
                builder.push_str(", ");
                self.column.build(builder);
                builder.push(')');
            }),
        }
    }

    /// `array_remove(C, $1)`: removes every occurrence of the value. The placeholder takes the
    /// column's element type, so the value is sent as text.
    pub fn remove(&self, value: impl Into<Value>) -> SqlExpression {
        let value = value.into();

        SqlExpression::build_with(|builder| {
            builder.push_str("array_remove(");
            self.column.build(builder);
            builder.push_str(", ");
            builder.push_literal(LiteralValue::untyped(&value));
            builder.push(')');
        })
    }

    /// `C[2:array_length(C, 1)]`
    pub fn remove_first(&self) -> SqlExpression {
        SqlExpression::build_with(|builder| {
            self.column.build(builder);
            builder.push_str("[2:");
            self.push_array_length(builder);
            builder.push(']');
        })
    }

    /// `C[1:array_length(C, 1) - 1]`
    pub fn remove_last(&self) -> SqlExpression {
        SqlExpression::build_with(|builder| {
            self.column.build(builder);
            builder.push_str("[1:");
            self.push_array_length(builder);
            builder.push_str(" - 1]");
        })
    }

    /// `C @> ARRAY[...]::T[]`. A single value is wrapped in a one-element array.
    ///
    /// An empty list renders `C @> ARRAY[]::text[]`, which holds for every non-null array.
    pub fn contains(&self, value: impl Into<Value>) -> SqlExpression {
        self.set_comparison("@>", &value.into())
    }

    /// `C @> ARRAY[$1]::T[]`, treating the value as one element even if it is a list (a list is
    /// then a `text` element holding its JSON form)
    pub fn includes(&self, value: impl Into<Value>) -> SqlExpression {
        let value = value.into();
        let hint = classify_element(&value);

        SqlExpression::build_with(|builder| {
            self.column.build(builder);
            builder.push_str(" @> ");
            push_array_literal(std::slice::from_ref(&value), hint, builder);
        })
    }

    /// `C && ARRAY[...]::T[]`. An empty list renders `C && ARRAY[]::text[]`, which holds for no
    /// array.
    pub fn overlaps(&self, value: impl Into<Value>) -> SqlExpression {
        self.set_comparison("&&", &value.into())
    }

    /// `C <@ ARRAY[...]::T[]`
    pub fn contained_by(&self, value: impl Into<Value>) -> SqlExpression {
        self.set_comparison("<@", &value.into())
    }

    /// `coalesce(array_length(C, 1), 0)`: an empty array has length `0`, not `NULL`
    pub fn length(&self) -> SqlExpression {
        SqlExpression::build_with(|builder| self.push_length(builder))
    }

    /// `coalesce(array_length(C, 1), 0) = 0`
    pub fn is_empty(&self) -> SqlExpression {
        SqlExpression::build_with(|builder| {
            self.push_length(builder);
            builder.push_str(" = 0");
        })
    }

    /// `ANY(C)`, for the right-hand side of a scalar comparison such as `$1 = ANY(C)`
    pub fn any(&self) -> SqlExpression {
        self.wrapped("ANY")
    }

    /// `ALL(C)`, for the right-hand side of a scalar comparison such as `$1 > ALL(C)`
    pub fn all(&self) -> SqlExpression {
        self.wrapped("ALL")
    }

    /// `C[1]` (arrays are 1-based; `NULL` for an empty array)
    pub fn first(&self) -> SqlExpression {
        SqlExpression::build_with(|builder| {
            self.column.build(builder);
            builder.push_str("[1]");
        })
    }

    /// `C[array_length(C, 1)]` (`NULL` for an empty array)
    pub fn last(&self) -> SqlExpression {
        SqlExpression::build_with(|builder| {
            self.column.build(builder);
            builder.push('[');
            self.push_array_length(builder);
            builder.push(']');
        })
    }

    fn set_comparison(&self, op: &'static str, value: &Value) -> SqlExpression {
        let hint = classify(value);
        let elems = match value {
            Value::Array(elems) => elems.as_slice(),
            value => std::slice::from_ref(value),
        };

        if elems.is_empty() {
            debug!("Comparing {} against an empty array", op);
        }

        SqlExpression::build_with(|builder| {
            self.column.build(builder);
            builder.push_space();
            builder.push_str(op);
            builder.push_space();
            push_array_literal(elems, hint, builder);
        })
    }

    fn wrapped(&self, wrapper: &'static str) -> SqlExpression {
        SqlExpression::build_with(|builder| {
            builder.push_str(wrapper);
            builder.push('(');
            self.column.build(builder);
            builder.push(')');
        })
    }

    fn push_array_length(&self, builder: &mut SQLBuilder) {
        builder.push_str("array_length(");
        self.column.build(builder);
        builder.push_str(", 1)");
    }

    fn push_length(&self, builder: &mut SQLBuilder) {
        builder.push_str("coalesce(");
        self.push_array_length(builder);
        builder.push_str(", 0)");
    }
}

/// `ARRAY[$1, $2]::T[]`
fn push_array_literal(elems: &[Value], hint: TypeHint, builder: &mut SQLBuilder) {
    builder.push_str("ARRAY[");
    builder.push_iter(elems.iter(), ", ", |builder, elem| {
        builder.push_literal(LiteralValue::element(elem, hint))
    });
    builder.push_str("]::");
    builder.push_str(hint.array_type());
}

/// `$1::T`
fn push_cast_element(value: &Value, hint: TypeHint, builder: &mut SQLBuilder) {
    builder.push_literal(LiteralValue::element(value, hint));
    builder.push_str("::");
    builder.push_str(hint.sql_type());
}
