// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, SQLParamContainer};

/// Whether an expression carries any value spliced directly into its SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionFlavor {
    /// Every value is carried as a bound parameter.
    Parameterized,
    /// At least one value was serialized into the SQL text through the literal escaper.
    Inlined,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlPart {
    /// Plain SQL text: identifiers, operators, function names and punctuation
    Sql(String),
    /// A value to be bound to a placeholder
    Param(SQLParamContainer),
    /// An escaped, quoted literal that is part of the SQL text
    Inlined(String),
}

/// The result of every builder operation: SQL text interleaved with parameters.
///
/// An expression is immutable once produced. Build it into a host [`SQLBuilder`] to splice it
/// into a larger statement (placeholders are numbered by that builder), or call
/// [`ExpressionBuilder::to_sql`] to render it standalone.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlExpression {
    parts: Vec<SqlPart>,
}

impl SqlExpression {
    pub(crate) fn from_parts(parts: Vec<SqlPart>) -> Self {
        Self { parts }
    }

    /// Build an expression by pushing into a fresh builder.
    pub(crate) fn build_with(push: impl FnOnce(&mut SQLBuilder)) -> Self {
        let mut builder = SQLBuilder::new();
        push(&mut builder);
        builder.into_expression()
    }

    /// An expression made of SQL text alone, such as the `true`/`false` short-circuits.
    pub(crate) fn raw(sql: &str) -> Self {
        Self {
            parts: vec![SqlPart::Sql(sql.to_string())],
        }
    }

    pub fn parts(&self) -> &[SqlPart] {
        &self.parts
    }

    pub fn params(&self) -> impl Iterator<Item = &SQLParamContainer> {
        self.parts.iter().filter_map(|part| match part {
            SqlPart::Param(param) => Some(param),
            _ => None,
        })
    }

    pub fn flavor(&self) -> ExpressionFlavor {
        if self
            .parts
            .iter()
            .any(|part| matches!(part, SqlPart::Inlined(_)))
        {
            ExpressionFlavor::Inlined
        } else {
            ExpressionFlavor::Parameterized
        }
    }
}

impl ExpressionBuilder for SqlExpression {
    fn build(&self, builder: &mut SQLBuilder) {
        for part in &self.parts {
            builder.push_part(part);
        }
    }
}
