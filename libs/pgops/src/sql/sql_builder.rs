// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{
    SQLParamContainer,
    expression::{SqlExpression, SqlPart},
    literal::LiteralValue,
};

/// Accumulates SQL text, bound parameters and inlined literals in the order they are pushed.
///
/// Placeholders (`$1`, `$2`, ...) are assigned only when the builder is rendered with
/// [`SQLBuilder::into_sql`], so an expression captured with [`SQLBuilder::into_expression`] can
/// later be built into another builder without renumbering.
#[derive(Default)]
pub struct SQLBuilder {
    parts: Vec<SqlPart>,
}

impl SQLBuilder {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Push a string
    pub fn push_str<T: AsRef<str>>(&mut self, s: T) {
        match self.parts.last_mut() {
            Some(SqlPart::Sql(sql)) => sql.push_str(s.as_ref()),
            _ => self.parts.push(SqlPart::Sql(s.as_ref().to_string())),
        }
    }

    /// Push a character
    pub fn push(&mut self, c: char) {
        match self.parts.last_mut() {
            Some(SqlPart::Sql(sql)) => sql.push(c),
            _ => self.parts.push(SqlPart::Sql(c.to_string())),
        }
    }

    /// Push a space. This is a common operation, so it is provided as a separate method.
    pub fn push_space(&mut self) {
        self.push(' ');
    }

    /// Push a parameter, which will be replaced with a placeholder in the SQL string
    /// and the parameter will be added to the list of parameters.
    pub fn push_param(&mut self, param: SQLParamContainer) {
        self.parts.push(SqlPart::Param(param));
    }

    /// Push a literal produced by the value serializer. Bound literals become parameters,
    /// inlined literals are spliced into the SQL text as-is (they are already escaped).
    pub fn push_literal(&mut self, literal: LiteralValue) {
        match literal {
            LiteralValue::Bound(param) => self.push_param(param),
            LiteralValue::Inlined(text) => self.parts.push(SqlPart::Inlined(text)),
        }
    }

    pub(crate) fn push_part(&mut self, part: &SqlPart) {
        match part {
            SqlPart::Sql(sql) => self.push_str(sql),
            part => self.parts.push(part.clone()),
        }
    }

    /// Push elements of an iterator, separated by `sep`, mapping each with `push_elem`.
    pub fn push_iter<T>(
        &mut self,
        iter: impl ExactSizeIterator<Item = T>,
        sep: &str,
        push_elem: impl Fn(&mut Self, T),
    ) {
        let len = iter.len();
        for (i, item) in iter.enumerate() {
            push_elem(self, item);

            if i < len - 1 {
                self.push_str(sep);
            }
        }
    }

    /// Capture what has been pushed so far as a reusable expression.
    pub fn into_expression(self) -> SqlExpression {
        SqlExpression::from_parts(self.parts)
    }

    /// Get the SQL string and the list of parameters. Calling this method should be the final step
    /// in building an SQL expression, and thus this builder consumes the `self`.
    pub fn into_sql(self) -> (String, Vec<SQLParamContainer>) {
        let mut sql = String::new();
        let mut params = Vec::new();

        for part in self.parts {
            match part {
                SqlPart::Sql(text) | SqlPart::Inlined(text) => sql.push_str(&text),
                SqlPart::Param(param) => {
                    params.push(param);
                    sql.push('$');
                    sql.push_str(&params.len().to_string());
                }
            }
        }

        (sql, params)
    }
}
