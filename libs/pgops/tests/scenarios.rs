// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use multiplatform_test::multiplatform_test;
use pgops::{
    ExpressionBuilder, ExpressionFlavor, SQLBuilder, SQLParam, SQLParamContainer, SQLText,
};
use serde_json::json;

fn assert_param<T: SQLParam + 'static>(actual: &SQLParamContainer, expected: T) {
    assert_eq!(actual, &SQLParamContainer::new(expected));
}

#[multiplatform_test]
fn array_includes() {
    let (sql, params) = pgops::array("tags").includes("x").to_sql();

    assert_eq!(sql, r#""tags" @> ARRAY[$1]::text[]"#);
    assert_eq!(params.len(), 1);
    assert_param(&params[0], "x".to_string());
}

#[multiplatform_test]
fn array_contains_numbers() {
    let (sql, params) = pgops::array("scores").contains(vec![1, 2]).to_sql();

    assert!(sql.ends_with("::integer[]"), "{sql}");
    assert_eq!(params.len(), 2);
    assert_param(&params[0], 1i32);
    assert_param(&params[1], 2i32);
}

#[multiplatform_test]
fn array_type_inference() {
    let cast_of = |value: serde_json::Value| {
        let (sql, _) = pgops::array("c").contains(value).to_sql();
        sql.rsplit("::").next().unwrap_or_default().to_string()
    };

    assert_eq!(cast_of(json!([3, 4, 5])), "integer[]");
    assert_eq!(cast_of(json!([true])), "boolean[]");
    assert_eq!(cast_of(json!(["a", "b"])), "text[]");
    assert_eq!(cast_of(json!([])), "text[]");
}

#[multiplatform_test]
fn json_number_is_structural() {
    let (sql, params) = pgops::json("meta").path("age").equals(18).to_sql();

    assert_eq!(sql, r##""meta"#>'{age}' = $1"##);
    assert_eq!(params.len(), 1);
    assert_param(&params[0], json!(18));
}

#[multiplatform_test]
fn json_string_is_text() {
    let (sql, params) = pgops::json("meta").path("name").equals("john").to_sql();

    assert_eq!(sql, r##""meta"#>>'{name}' = $1"##);
    assert_eq!(params.len(), 1);
    assert_param(&params[0], "john".to_string());
}

#[multiplatform_test]
fn vector_cosine_similarity() {
    let expression = pgops::vector("embedding")
        .similar_to(&[0.0, 0.0, 0.0], 0.8, "cosine")
        .unwrap();
    let (sql, params) = expression.to_sql();

    assert!(sql.contains("<=>"), "{sql}");
    assert_eq!(params.len(), 2);
    let threshold = params[1].downcast_ref::<f64>().copied().unwrap();
    assert!((threshold - 0.2).abs() < 1e-9);
}

#[multiplatform_test]
fn vacuous_key_sets() {
    let (sql, params) = pgops::json("perm").has_all_keys(Vec::<String>::new()).to_sql();
    assert_eq!(sql, "true");
    assert!(params.is_empty());

    let (sql, params) = pgops::json("perm").has_any_key(Vec::<String>::new()).to_sql();
    assert_eq!(sql, "false");
    assert!(params.is_empty());
}

#[multiplatform_test]
fn unsupported_algorithm_is_an_error() {
    let err = pgops::vector("embedding")
        .similar_to(&[1.0], 0.5, "hamming")
        .unwrap_err();

    assert_eq!(err, pgops::ExpressionError::UnsupportedAlgorithm("hamming".into()));
    assert!(err.to_string().contains("hamming"));
}

#[multiplatform_test]
fn expressions_compose_into_a_host_statement() {
    let mut builder = SQLBuilder::new();
    builder.push_str("SELECT * FROM \"posts\" WHERE ");
    pgops::array("tags").includes("rust").build(&mut builder);
    builder.push_str(" AND ");
    pgops::json("meta").path("views").greater_than(100).build(&mut builder);
    builder.push_str(" ORDER BY ");
    pgops::vector("embedding")
        .cosine_distance(&[0.5, 0.5])
        .build(&mut builder);

    let (sql, params) = builder.into_sql();
    assert_eq!(
        sql,
        r##"SELECT * FROM "posts" WHERE "tags" @> ARRAY[$1]::text[] AND "meta"#>'{views}' > $2 ORDER BY "embedding" <=> $3::vector"##
    );
    assert_eq!(params.len(), 3);
    assert_param(&params[0], "rust".to_string());
    assert_param(&params[1], json!(100));
    assert_param(&params[2], SQLText::new("[0.5,0.5]"));
}

#[multiplatform_test]
fn mutations_report_inlined_flavor() {
    let json = pgops::json("meta");

    assert_eq!(json.set("a", 1).flavor(), ExpressionFlavor::Inlined);
    assert_eq!(json.push(json!([1])).flavor(), ExpressionFlavor::Inlined);
    assert_eq!(json.has_key("a").flavor(), ExpressionFlavor::Parameterized);
    assert_eq!(
        pgops::array("tags").append("a").flavor(),
        ExpressionFlavor::Parameterized
    );
}

#[cfg(not(target_family = "wasm"))]
#[test]
fn builders_are_shareable_across_threads() {
    let tags = std::sync::Arc::new(pgops::array("tags"));

    let handles = (0..4)
        .map(|i| {
            let tags = tags.clone();
            std::thread::spawn(move || tags.contains(vec![i]).to_sql().0)
        })
        .collect::<Vec<_>>();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), r#""tags" @> ARRAY[$1]::integer[]"#);
    }
}
