// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Column-scoped expression builders for Postgres array, `jsonb` and pgvector columns.
//!
//! A builder wraps a single column reference; each of its methods translates one semantic
//! operation ("this array contains that value", "this JSON path equals that value", "this vector
//! is similar to that vector") into a [`SqlExpression`]: SQL text plus the parameters to bind.
//! Expressions implement [`ExpressionBuilder`], so they can be built into the [`SQLBuilder`] of a
//! larger statement, which numbers the placeholders, or rendered standalone with
//! [`ExpressionBuilder::to_sql`].
//!
//! Values are mostly bound as parameters. Literals that must be part of the SQL text (JSON
//! documents passed to `jsonb_set`, paths such as `'{a,b}'`) are produced only by the
//! serializer in [`sql::literal`], which escapes them; [`SqlExpression::flavor`] tells the two
//! kinds of expression apart.
//!
//! Builders hold no state beyond the column reference and perform no I/O, so they can be used
//! from any number of threads.
//!
//! ```ignore
//! let (sql, params) = pgops::json("meta").path("age").equals(18).to_sql();
//! assert_eq!(sql, r##""meta"#>'{age}' = $1"##);
//! ```

#[macro_use]
pub mod sql;
pub mod builder;
pub mod config;
pub mod expression_error;

pub use builder::{
    array::ArrayColumn,
    json::{JsonColumn, JsonPathNavigator, JsonTextAccessor},
    vector::{SimilarityAlgorithm, VectorColumn, VectorLiteral, VectorOperand},
};
pub use config::{Environment, MapEnvironment, SystemEnvironment, VectorDefaults};
pub use expression_error::ExpressionError;
pub use sql::{
    ExpressionBuilder, ExpressionFlavor, SQLBuilder, SQLParam, SQLParamContainer, SQLText,
    SqlExpression,
    column_reference::ColumnReference,
    json_path::{AccessMode, JsonPath},
    literal::{LiteralValue, TypeHint},
};

/// Builder for an array column, e.g. `array("tags").contains("rust")`
pub fn array(column: impl Into<ColumnReference>) -> ArrayColumn {
    ArrayColumn::new(column)
}

/// Builder for a `jsonb` column, e.g. `json("meta").path("age").equals(18)`
pub fn json(column: impl Into<ColumnReference>) -> JsonColumn {
    JsonColumn::new(column)
}

/// Builder for a pgvector column, e.g. `vector("embedding").cosine_distance(&[0.1, 0.2])`
pub fn vector(column: impl Into<ColumnReference>) -> VectorColumn {
    VectorColumn::new(column)
}
