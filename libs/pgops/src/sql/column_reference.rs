// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder};

/// A column identifier, rendered with every segment double-quoted.
///
/// Accepts a bare name (`tags`), a dot-qualified name (`public.posts.tags`) or segments that are
/// already quoted (`"Post Data".tags`). Quoted segments are kept verbatim, so a dot inside them
/// does not split the name. Without the quotes, an identifier with uppercase letters would be
/// interpreted the same as its lowercase form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReference {
    segments: Vec<String>,
}

impl ColumnReference {
    pub fn new(name: &str) -> Self {
        Self {
            segments: split_segments(name)
                .into_iter()
                .map(|segment| quote_segment(&segment))
                .collect(),
        }
    }

    /// The rendered identifier, e.g. `"public"."posts"."tags"`
    pub fn identifier(&self) -> String {
        self.segments.join(".")
    }
}

impl From<&str> for ColumnReference {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ColumnReference {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl ExpressionBuilder for ColumnReference {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_iter(self.segments.iter(), ".", |builder, segment| {
            builder.push_str(segment)
        });
    }
}

/// Split on dots that are outside double quotes.
fn split_segments(name: &str) -> Vec<String> {
    let mut segments = vec![];
    let mut current = String::new();
    let mut in_quotes = false;

    for c in name.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '.' if !in_quotes => segments.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    segments.push(current);

    segments
}

fn quote_segment(segment: &str) -> String {
    let is_quoted = segment.len() >= 2 && segment.starts_with('"') && segment.ends_with('"');

    if is_quoted {
        segment.to_string()
    } else {
        format!("\"{}\"", segment.replace('"', "\"\""))
    }
}
