// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    config::VectorDefaults,
    expression_error::ExpressionError,
    sql::{
        ExpressionBuilder, SQLBuilder, SQLParamContainer, SQLText, SqlExpression,
        column_reference::ColumnReference,
    },
};

/// The similarity measure behind a distance operator.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Hash, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityAlgorithm {
    #[default]
    L2,
    Cosine,
    Inner,
}

impl SimilarityAlgorithm {
    pub fn model_string(&self) -> &'static str {
        match self {
            SimilarityAlgorithm::L2 => "l2",
            SimilarityAlgorithm::Cosine => "cosine",
            SimilarityAlgorithm::Inner => "inner",
        }
    }

    pub fn operator(&self) -> &'static str {
        match self {
            SimilarityAlgorithm::L2 => "<->",
            SimilarityAlgorithm::Cosine => "<=>",
            SimilarityAlgorithm::Inner => "<#>",
        }
    }

    /// Smaller distances are more similar for l2 and cosine; a larger inner product is more
    /// similar.
    fn comparator(&self) -> &'static str {
        match self {
            SimilarityAlgorithm::L2 | SimilarityAlgorithm::Cosine => "<",
            SimilarityAlgorithm::Inner => ">",
        }
    }

    /// Turn a 0-1 similarity threshold into the bound compared against the operator's result:
    /// `1 - threshold` as a distance bound for l2 and cosine, the threshold itself as a lower
    /// bound for inner product.
    pub fn bound(&self, threshold: f64) -> f64 {
        match self {
            SimilarityAlgorithm::L2 | SimilarityAlgorithm::Cosine => 1.0 - threshold,
            SimilarityAlgorithm::Inner => threshold,
        }
    }
}

impl FromStr for SimilarityAlgorithm {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "l2" => Ok(SimilarityAlgorithm::L2),
            "cosine" => Ok(SimilarityAlgorithm::Cosine),
            "inner" => Ok(SimilarityAlgorithm::Inner),
            _ => {
                warn!("Rejecting unsupported similarity algorithm: {}", s);
                Err(ExpressionError::UnsupportedAlgorithm(s.to_string()))
            }
        }
    }
}

impl Display for SimilarityAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.model_string())
    }
}

impl ExpressionBuilder for SimilarityAlgorithm {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str(self.operator());
    }
}

/// A vector bound as its text form with a `::vector` cast, e.g. `$1::vector` with `[1,2,3]`. The
/// `vector` type has no fixed OID, so the text is sent for the server to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLiteral(String);

impl VectorLiteral {
    pub fn new(values: &[f32]) -> Self {
        let elems = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self(format!("[{elems}]"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ExpressionBuilder for VectorLiteral {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_param(SQLParamContainer::new(SQLText::new(self.0.clone())));
        builder.push_str("::vector");
    }
}

pub struct VectorDistance<C1, C2>
where
    C1: ExpressionBuilder,
    C2: ExpressionBuilder,
{
    lhs: C1,
    rhs: C2,
    algorithm: SimilarityAlgorithm,
}

impl<C1: ExpressionBuilder, C2: ExpressionBuilder> VectorDistance<C1, C2> {
    pub fn new(lhs: C1, rhs: C2, algorithm: SimilarityAlgorithm) -> Self {
        Self {
            lhs,
            rhs,
            algorithm,
        }
    }
}

impl<C1: ExpressionBuilder, C2: ExpressionBuilder> ExpressionBuilder for VectorDistance<C1, C2> {
    fn build(&self, builder: &mut SQLBuilder) {
        self.lhs.build(builder);
        builder.push_space();
        self.algorithm.build(builder);
        builder.push_space();
        self.rhs.build(builder);
    }
}

/// The other side of [`VectorColumn::same_dimensions`]: a column name or an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorOperand {
    Column(ColumnReference),
    Expression(SqlExpression),
}

impl From<&str> for VectorOperand {
    fn from(name: &str) -> Self {
        VectorOperand::Column(ColumnReference::new(name))
    }
}

impl From<String> for VectorOperand {
    fn from(name: String) -> Self {
        VectorOperand::Column(ColumnReference::new(&name))
    }
}

impl From<ColumnReference> for VectorOperand {
    fn from(column: ColumnReference) -> Self {
        VectorOperand::Column(column)
    }
}

impl From<SqlExpression> for VectorOperand {
    fn from(expression: SqlExpression) -> Self {
        VectorOperand::Expression(expression)
    }
}

impl ExpressionBuilder for VectorOperand {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            VectorOperand::Column(column) => column.build(builder),
            VectorOperand::Expression(expression) => expression.build(builder),
        }
    }
}

/// Expressions over a pgvector `vector` column.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorColumn {
    column: ColumnReference,
    defaults: VectorDefaults,
}

impl VectorColumn {
    pub fn new(column: impl Into<ColumnReference>) -> Self {
        Self {
            column: column.into(),
            defaults: VectorDefaults::default(),
        }
    }

    /// Use these defaults for [`VectorColumn::similar`]
    pub fn with_defaults(self, defaults: VectorDefaults) -> Self {
        Self { defaults, ..self }
    }

    pub fn column(&self) -> &ColumnReference {
        &self.column
    }

    /// `C <-> $1::vector`
    pub fn distance(&self, vector: &[f32]) -> SqlExpression {
        self.distance_with(vector, SimilarityAlgorithm::L2)
    }

    /// Same as [`VectorColumn::distance`]
    pub fn l2_distance(&self, vector: &[f32]) -> SqlExpression {
        self.distance(vector)
    }

    /// `C <#> $1::vector`
    pub fn inner_product(&self, vector: &[f32]) -> SqlExpression {
        self.distance_with(vector, SimilarityAlgorithm::Inner)
    }

    /// `C <=> $1::vector`
    pub fn cosine_distance(&self, vector: &[f32]) -> SqlExpression {
        self.distance_with(vector, SimilarityAlgorithm::Cosine)
    }

    /// Like [`VectorColumn::similar_to_using`], with the algorithm given by name (`l2`, `cosine`
    /// or `inner`). Any other name is an error.
    pub fn similar_to(
        &self,
        vector: &[f32],
        threshold: f64,
        algorithm: &str,
    ) -> Result<SqlExpression, ExpressionError> {
        let algorithm = algorithm.parse::<SimilarityAlgorithm>()?;
        Ok(self.similar_to_using(vector, threshold, algorithm))
    }

    /// `C <op> $1::vector < $2` (l2, cosine; `$2 = 1 - threshold`) or
    /// `C <#> $1::vector > $2` (inner; `$2 = threshold`)
    pub fn similar_to_using(
        &self,
        vector: &[f32],
        threshold: f64,
        algorithm: SimilarityAlgorithm,
    ) -> SqlExpression {
        let literal = VectorLiteral::new(vector);

        SqlExpression::build_with(|builder| {
            VectorDistance::new(&self.column, &literal, algorithm).build(builder);
            builder.push_space();
            builder.push_str(algorithm.comparator());
            builder.push_space();
            builder.push_param(SQLParamContainer::new(algorithm.bound(threshold)));
        })
    }

    /// [`VectorColumn::similar_to_using`] with this column's defaults
    pub fn similar(&self, vector: &[f32]) -> SqlExpression {
        self.similar_to_using(vector, self.defaults.threshold, self.defaults.algorithm)
    }

    /// `vector_dims(C)`
    pub fn dimensions(&self) -> SqlExpression {
        SqlExpression::build_with(|builder| push_function("vector_dims", &self.column, builder))
    }

    /// `vector_norm(C)`
    pub fn norm(&self) -> SqlExpression {
        SqlExpression::build_with(|builder| push_function("vector_norm", &self.column, builder))
    }

    /// `vector_dims(C) = vector_dims(<other>)`
    pub fn same_dimensions(&self, other: impl Into<VectorOperand>) -> SqlExpression {
        let other = other.into();

        SqlExpression::build_with(|builder| {
            push_function("vector_dims", &self.column, builder);
            builder.push_str(" = ");
            push_function("vector_dims", &other, builder);
        })
    }

    fn distance_with(&self, vector: &[f32], algorithm: SimilarityAlgorithm) -> SqlExpression {
        VectorDistance::new(&self.column, VectorLiteral::new(vector), algorithm).to_expression()
    }
}

fn push_function(name: &str, arg: &impl ExpressionBuilder, builder: &mut SQLBuilder) {
    builder.push_str(name);
    builder.push('(');
    arg.build(builder);
    builder.push(')');
}
