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
    ExpressionBuilder, SQLBuilder, SQLParamContainer, SqlExpression,
    column_reference::ColumnReference,
    json_path::{AccessMode, JsonAccess, JsonPath},
    literal::LiteralValue,
};

/// Expressions over a `jsonb` column.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonColumn {
    column: ColumnReference,
}

impl JsonColumn {
    pub fn new(column: impl Into<ColumnReference>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &ColumnReference {
        &self.column
    }

    /// Navigate to a path inside the document
    pub fn path(&self, path: impl Into<JsonPath>) -> JsonPathNavigator {
        JsonPathNavigator {
            column: self.column.clone(),
            path: path.into(),
        }
    }

    /// `C->$1`: a top-level field as `jsonb`
    pub fn field(&self, key: impl Into<String>) -> SqlExpression {
        self.field_access("->", key.into())
    }

    /// `C->>$1`: a top-level field as `text`
    pub fn field_text(&self, key: impl Into<String>) -> SqlExpression {
        self.field_access("->>", key.into())
    }

    /// `C @> $1`: the document contains the given JSON value
    pub fn contains(&self, value: impl Into<Value>) -> SqlExpression {
        self.relational("@>", LiteralValue::jsonb(&value.into()))
    }

    /// `C <@ $1`: the document is contained in the given JSON value
    pub fn contained_by(&self, value: impl Into<Value>) -> SqlExpression {
        self.relational("<@", LiteralValue::jsonb(&value.into()))
    }

    /// `C ? $1`: the key exists at the top level
    pub fn has_key(&self, key: impl Into<String>) -> SqlExpression {
        let key: String = key.into();
        self.relational("?", LiteralValue::Bound(SQLParamContainer::new(key)))
    }

    /// `C ?& $1`: every key exists. An empty list is vacuously `true`.
    pub fn has_all_keys<K: Into<String>>(&self, keys: impl IntoIterator<Item = K>) -> SqlExpression {
        self.key_set("?&", keys.into_iter().map(Into::into).collect(), "true")
    }

    /// `C ?| $1`: at least one key exists. An empty list is vacuously `false`.
    pub fn has_any_key<K: Into<String>>(&self, keys: impl IntoIterator<Item = K>) -> SqlExpression {
        self.key_set("?|", keys.into_iter().map(Into::into).collect(), "false")
    }

    /// `jsonb_set(C, '{P}', '<json>')`
    pub fn set(&self, path: impl Into<JsonPath>, value: impl Into<Value>) -> SqlExpression {
        let path = path.into();
        let value = value.into();

        SqlExpression::build_with(|builder| {
            builder.push_str("jsonb_set(");
            self.column.build(builder);
            builder.push_str(", ");
            path.build(builder);
            builder.push_str(", ");
            builder.push_literal(LiteralValue::json(&value));
            builder.push(')');
        })
    }

    /// `jsonb_set(C, '{P}', ((C#>>'{P}')::numeric + $1)::text::jsonb)`
    ///
    /// `jsonb` has no arithmetic, so the current value is extracted as text, cast to `numeric`,
    /// incremented, and turned back into `jsonb` through `text`. The delta is sent as text for the
    /// server to parse as `numeric`.
    pub fn increment(&self, path: impl Into<JsonPath>, by: impl Into<Value>) -> SqlExpression {
        let path = path.into();
        let by = by.into();

        SqlExpression::build_with(|builder| {
            builder.push_str("jsonb_set(");
            self.column.build(builder);
            builder.push_str(", ");
            path.build(builder);
            builder.push_str(", ((");
            self.access(&path, AccessMode::Text).build(builder);
            builder.push_str(")::numeric + ");
            builder.push_literal(LiteralValue::untyped(&by));
            builder.push_str(")::text::jsonb)");
        })
    }

    /// `C - $1` for a top-level key, `C #- '{P}'` for any other path
    pub fn remove(&self, path: impl Into<JsonPath>) -> SqlExpression {
        let path = path.into();

        match path.as_single_key() {
            Some(key) => self.relational(
                "-",
                LiteralValue::Bound(SQLParamContainer::new(key.to_string())),
            ),
            None => SqlExpression::build_with(|builder| {
                self.column.build(builder);
                builder.push_str(" #- ");
                path.build(builder);
            }),
        }
    }

    /// `C || '<json>'::jsonb`: appends to a document holding a JSON array
    pub fn push(&self, value: impl Into<Value>) -> SqlExpression {
        let value = value.into();

        SqlExpression::build_with(|builder| {
            self.column.build(builder);
            builder.push_str(" || ");
            builder.push_literal(LiteralValue::json(&value));
            builder.push_str("::jsonb");
        })
    }

    fn access<'a>(&'a self, path: &'a JsonPath, mode: AccessMode) -> JsonAccess<'a> {
        JsonAccess {
            column: &self.column,
            path,
            mode,
        }
    }

    fn field_access(&self, op: &'static str, key: String) -> SqlExpression {
        SqlExpression::build_with(|builder| {
            self.column.build(builder);
            builder.push_str(op);
            builder.push_param(SQLParamContainer::new(key));
        })
    }

    fn relational(&self, op: &'static str, rhs: LiteralValue) -> SqlExpression {
        SqlExpression::build_with(|builder| {
            relational_combine(&self.column, &rhs, op, builder);
        })
    }

    fn key_set(&self, op: &'static str, keys: Vec<String>, vacuous: &str) -> SqlExpression {
        if keys.is_empty() {
            debug!("Empty key list for {}; rendering {}", op, vacuous);
            SqlExpression::raw(vacuous)
        } else {
            self.relational(op, LiteralValue::Bound(SQLParamContainer::new(keys)))
        }
    }
}

/// A JSON column at a fixed path. Comparisons choose between structural (`#>`) and text (`#>>`)
/// access from the shape of the value compared against.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPathNavigator {
    column: ColumnReference,
    path: JsonPath,
}

impl JsonPathNavigator {
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// `C#>'{P}'`
    pub fn value(&self) -> SqlExpression {
        self.access(AccessMode::Structural).to_expression()
    }

    /// `C#>>'{P}'`
    pub fn text(&self) -> SqlExpression {
        self.access(AccessMode::Text).to_expression()
    }

    /// Objects, arrays and numbers compare structurally; strings, booleans and null compare as
    /// text. Note that `42` and `"42"` therefore produce different SQL.
    pub fn equals(&self, value: impl Into<Value>) -> SqlExpression {
        let value = value.into();
        self.compare("=", AccessMode::for_value(&value), &value)
    }

    /// Numbers compare numerically (structural access), anything else lexicographically (text
    /// access).
    pub fn greater_than(&self, value: impl Into<Value>) -> SqlExpression {
        let value = value.into();
        self.compare(">", AccessMode::for_ordering(&value), &value)
    }

    /// See [`JsonPathNavigator::greater_than`]
    pub fn less_than(&self, value: impl Into<Value>) -> SqlExpression {
        let value = value.into();
        self.compare("<", AccessMode::for_ordering(&value), &value)
    }

    /// `C#>'{P}' IS NOT NULL`
    pub fn exists(&self) -> SqlExpression {
        SqlExpression::build_with(|builder| {
            self.access(AccessMode::Structural).build(builder);
            builder.push_str(" IS NOT NULL");
        })
    }

    /// `C#>'{P}' @> $1`
    pub fn contains(&self, value: impl Into<Value>) -> SqlExpression {
        let value = value.into();

        SqlExpression::build_with(|builder| {
            relational_combine(
                &self.access(AccessMode::Structural),
                &LiteralValue::jsonb(&value),
                "@>",
                builder,
            );
        })
    }

    /// Compare as text regardless of the value's shape
    pub fn as_text(&self) -> JsonTextAccessor {
        JsonTextAccessor {
            navigator: self.clone(),
        }
    }

    fn access(&self, mode: AccessMode) -> JsonAccess<'_> {
        JsonAccess {
            column: &self.column,
            path: &self.path,
            mode,
        }
    }

    fn compare(&self, op: &'static str, mode: AccessMode, value: &Value) -> SqlExpression {
        SqlExpression::build_with(|builder| {
            relational_combine(
                &self.access(mode),
                &mode.comparison_literal(value),
                op,
                builder,
            );
        })
    }
}

/// The text form of a path (`C#>>'{P}'`) with comparisons that never switch to structural access.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonTextAccessor {
    navigator: JsonPathNavigator,
}

impl JsonTextAccessor {
    pub fn equals(&self, value: impl Into<Value>) -> SqlExpression {
        self.navigator
            .compare("=", AccessMode::Text, &value.into())
    }

    pub fn greater_than(&self, value: impl Into<Value>) -> SqlExpression {
        self.navigator
            .compare(">", AccessMode::Text, &value.into())
    }

    pub fn less_than(&self, value: impl Into<Value>) -> SqlExpression {
        self.navigator
            .compare("<", AccessMode::Text, &value.into())
    }
}

impl ExpressionBuilder for JsonTextAccessor {
    fn build(&self, builder: &mut SQLBuilder) {
        self.navigator.access(AccessMode::Text).build(builder);
    }
}

/// Combine two expressions with a relational operator.
fn relational_combine<E1: ExpressionBuilder, E2: ExpressionBuilder>(
    left: &E1,
    right: &E2,
    op: &'static str,
    builder: &mut SQLBuilder,
) {
    left.build(builder);
    builder.push_space();
    builder.push_str(op);
    builder.push_space();
    right.build(builder);
}

#[cfg(test)]
mod tests {
    use multiplatform_test::multiplatform_test;
    use serde_json::json;

    use super::*;
    use crate::sql::{ExpressionFlavor, SQLText};

    fn meta() -> JsonColumn {
        JsonColumn::new("meta")
    }

    #[multiplatform_test]
    fn access_fragments() {
        let navigator = meta().path(["address", "city"]);
        assert_binding!(navigator.value().to_sql(), r##""meta"#>'{address,city}'"##);
        assert_binding!(navigator.text().to_sql(), r##""meta"#>>'{address,city}'"##);
        assert_binding!(
            navigator.as_text().to_sql(),
            r##""meta"#>>'{address,city}'"##
        );
    }

    #[multiplatform_test]
    fn equals_number_is_structural() {
        assert_binding!(
            meta().path("age").equals(18).to_sql(),
            r##""meta"#>'{age}' = $1"##,
            json!(18)
        );
    }

    #[multiplatform_test]
    fn equals_string_is_text() {
        assert_binding!(
            meta().path("name").equals("john").to_sql(),
            r##""meta"#>>'{name}' = $1"##,
            "john".to_string()
        );
    }

    #[multiplatform_test]
    fn equals_boolean_and_null_are_text() {
        assert_binding!(
            meta().path("active").equals(true).to_sql(),
            r##""meta"#>>'{active}' = $1"##,
            "true".to_string()
        );
        assert_binding!(
            meta().path("deleted").equals(Value::Null).to_sql(),
            r##""meta"#>>'{deleted}' = $1"##,
            "null".to_string()
        );
    }

    #[multiplatform_test]
    fn equals_object_is_structural() {
        let value = json!({"city": "Paris"});
        assert_binding!(
            meta().path("address").equals(value.clone()).to_sql(),
            r##""meta"#>'{address}' = $1"##,
            value
        );
    }

    #[multiplatform_test]
    fn number_and_its_string_form_differ() {
        let (number_sql, _) = meta().path("n").equals(42).to_sql();
        let (string_sql, _) = meta().path("n").equals("42").to_sql();

        assert_ne!(number_sql, string_sql);
        assert!(number_sql.contains("#>'"));
        assert!(string_sql.contains("#>>'"));
    }

    #[multiplatform_test]
    fn ordering() {
        assert_binding!(
            meta().path("age").greater_than(21).to_sql(),
            r##""meta"#>'{age}' > $1"##,
            json!(21)
        );
        assert_binding!(
            meta().path("score").less_than(9.5).to_sql(),
            r##""meta"#>'{score}' < $1"##,
            json!(9.5)
        );
        assert_binding!(
            meta().path("name").greater_than("m").to_sql(),
            r##""meta"#>>'{name}' > $1"##,
            "m".to_string()
        );
    }

    #[multiplatform_test]
    fn as_text_never_switches_mode() {
        let text = meta().path("zip").as_text();
        assert_binding!(
            text.equals(75001).to_sql(),
            r##""meta"#>>'{zip}' = $1"##,
            "75001".to_string()
        );
        assert_binding!(
            text.greater_than(1).to_sql(),
            r##""meta"#>>'{zip}' > $1"##,
            "1".to_string()
        );
        assert_binding!(
            text.less_than(json!({"a": 1})).to_sql(),
            r##""meta"#>>'{zip}' < $1"##,
            r#"{"a":1}"#.to_string()
        );
    }

    #[multiplatform_test]
    fn exists_and_path_contains() {
        assert_binding!(
            meta().path(["a", "b"]).exists().to_sql(),
            r##""meta"#>'{a,b}' IS NOT NULL"##
        );
        assert_binding!(
            meta().path("tags").contains(json!(["x"])).to_sql(),
            r##""meta"#>'{tags}' @> $1"##,
            json!(["x"])
        );
    }

    #[multiplatform_test]
    fn column_containment() {
        assert_binding!(
            meta().contains(json!({"a": 1})).to_sql(),
            r#""meta" @> $1"#,
            json!({"a": 1})
        );
        assert_binding!(
            meta().contained_by(json!({"a": 1, "b": 2})).to_sql(),
            r#""meta" <@ $1"#,
            json!({"a": 1, "b": 2})
        );
    }

    #[multiplatform_test]
    fn keys() {
        assert_binding!(
            meta().has_key("a").to_sql(),
            r#""meta" ? $1"#,
            "a".to_string()
        );
        assert_binding!(
            meta().has_all_keys(["a", "b"]).to_sql(),
            r#""meta" ?& $1"#,
            vec!["a".to_string(), "b".to_string()]
        );
        assert_binding!(
            meta().has_any_key(vec!["a".to_string()]).to_sql(),
            r#""meta" ?| $1"#,
            vec!["a".to_string()]
        );
    }

    #[multiplatform_test]
    fn vacuous_key_sets() {
        assert_binding!(meta().has_all_keys(Vec::<String>::new()).to_sql(), "true");
        assert_binding!(meta().has_any_key(Vec::<&str>::new()).to_sql(), "false");
    }

    #[multiplatform_test]
    fn fields() {
        assert_binding!(
            meta().field("a").to_sql(),
            r#""meta"->$1"#,
            "a".to_string()
        );
        assert_binding!(
            meta().field_text("a").to_sql(),
            r#""meta"->>$1"#,
            "a".to_string()
        );
    }

    #[multiplatform_test]
    fn set() {
        let expr = meta().set(["profile", "name"], "O'Brien");
        assert_eq!(expr.flavor(), ExpressionFlavor::Inlined);
        assert_binding!(
            expr.to_sql(),
            r#"jsonb_set("meta", '{profile,name}', '"O''Brien"')"#
        );
        assert_binding!(
            meta().set("flags", json!({"beta": true})).to_sql(),
            r#"jsonb_set("meta", '{flags}', '{"beta":true}')"#
        );
    }

    #[multiplatform_test]
    fn increment() {
        assert_binding!(
            meta().increment(["stats", "views"], 1).to_sql(),
            r##"jsonb_set("meta", '{stats,views}', (("meta"#>>'{stats,views}')::numeric + $1)::text::jsonb)"##,
            SQLText::new("1")
        );
    }

    #[multiplatform_test]
    fn remove() {
        assert_binding!(
            meta().remove("obsolete").to_sql(),
            r#""meta" - $1"#,
            "obsolete".to_string()
        );
        assert_binding!(
            meta().remove(["a", "b"]).to_sql(),
            r#""meta" #- '{a,b}'"#
        );
    }

    #[multiplatform_test]
    fn push() {
        assert_binding!(
            meta().push(json!({"id": 1})).to_sql(),
            r#""meta" || '{"id":1}'::jsonb"#
        );
    }

    #[multiplatform_test]
    fn empty_path_addresses_the_whole_document() {
        let root = meta().path(Vec::<&str>::new());

        assert_binding!(
            root.equals(1).to_sql(),
            r##""meta"#>'{}' = $1"##,
            json!(1)
        );
        assert_binding!(
            root.equals("x").to_sql(),
            r##""meta"#>>'{}' = $1"##,
            "x".to_string()
        );
        assert_binding!(root.exists().to_sql(), r##""meta"#>'{}' IS NOT NULL"##);
        assert_binding!(
            meta().remove(Vec::<&str>::new()).to_sql(),
            r#""meta" #- '{}'"#
        );
    }

    #[multiplatform_test]
    fn path_segments_are_escaped() {
        assert_binding!(
            meta().path(["it's", "a b"]).exists().to_sql(),
            r##""meta"#>'{it''s,"a b"}' IS NOT NULL"##
        );
    }
}
