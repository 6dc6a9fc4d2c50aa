// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::any::Any;

use tokio_postgres::types::ToSql;

#[macro_use]
#[cfg(test)]
mod test_util;

pub mod column_reference;
pub mod expression;
pub mod expression_builder;
pub mod json_path;
pub mod literal;
pub mod sql_builder;
pub mod sql_param_container;
pub mod sql_text;

pub use expression::{ExpressionFlavor, SqlExpression};
pub use expression_builder::ExpressionBuilder;
pub use sql_builder::SQLBuilder;
pub use sql_param_container::SQLParamContainer;
pub use sql_text::SQLText;

/// A value that can be bound to a placeholder in a prepared statement.
///
/// Any `ToSql` type that can be compared for equality qualifies. Equality is used by tests (and
/// by callers that want to inspect the generated parameters) through [`SQLParam::as_any`]
/// downcasting.
pub trait SQLParam: ToSql + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq(&self, other: &dyn SQLParam) -> bool;
}

impl<T: ToSql + Send + Sync + Any + PartialEq> SQLParam for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq(&self, other: &dyn SQLParam) -> bool {
        if let Some(other) = other.as_any().downcast_ref::<T>() {
            self == other
        } else {
            false
        }
    }
}
