// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ExpressionError {
    #[error("Unsupported similarity algorithm '{0}'. Expected one of: l2, cosine, inner")]
    UnsupportedAlgorithm(String),

    #[error("Invalid value for {key}: {value}. {message}")]
    InvalidConfig {
        key: String,
        value: String,
        message: String,
    },
}
