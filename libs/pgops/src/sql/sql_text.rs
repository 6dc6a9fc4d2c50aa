// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Display;

use tokio_postgres::types::{Format, IsNull, ToSql, Type, to_sql_checked};

/// A parameter sent in the text format, so the server parses it with the input function of
/// whatever type it inferred for the placeholder (`numeric`, `vector`, the element type of an
/// array column, ...). Used where no Rust type maps onto the type the surrounding SQL imposes.
///
/// `None` binds SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SQLText(Option<String>);

impl SQLText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(Some(text.into()))
    }

    pub fn null() -> Self {
        Self(None)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl Display for SQLText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(text) => f.write_str(text),
            None => f.write_str("NULL"),
        }
    }
}

impl ToSql for SQLText {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match &self.0 {
            Some(text) => {
                out.extend_from_slice(text.as_bytes());
                Ok(IsNull::No)
            }
            None => Ok(IsNull::Yes),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true // The server validates the text when it parses it
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use multiplatform_test::multiplatform_test;

    use super::*;

    #[multiplatform_test]
    fn encodes_text_for_any_type() {
        let mut out = BytesMut::new();
        let result = SQLText::new("12.5").to_sql_checked(&Type::NUMERIC, &mut out);

        assert!(matches!(result, Ok(IsNull::No)));
        assert_eq!(&out[..], b"12.5");
        assert!(matches!(
            SQLText::new("1").encode_format(&Type::INT4),
            Format::Text
        ));
    }

    #[multiplatform_test]
    fn null() {
        let mut out = BytesMut::new();
        let result = SQLText::null().to_sql_checked(&Type::INT4, &mut out);

        assert!(matches!(result, Ok(IsNull::Yes)));
        assert!(out.is_empty());
        assert_eq!(SQLText::null().to_string(), "NULL");
    }
}
