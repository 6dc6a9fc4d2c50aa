// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{builder::vector::SimilarityAlgorithm, expression_error::ExpressionError};

pub const VECTOR_SIMILARITY_ALGORITHM_PARAM: &str = "PGOPS_VECTOR_SIMILARITY_ALGORITHM";
pub const VECTOR_SIMILARITY_THRESHOLD_PARAM: &str = "PGOPS_VECTOR_SIMILARITY_THRESHOLD";

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn get_or_else(&self, key: &str, default_value: &str) -> String {
        self.get(key).unwrap_or(default_value.to_string())
    }
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Default)]
pub struct MapEnvironment {
    values: HashMap<String, String>,
    fallback: Option<Arc<dyn Environment>>,
}

impl MapEnvironment {
    pub fn new_with_fallback(
        values: HashMap<String, String>,
        fallback: Arc<dyn Environment>,
    ) -> Self {
        Self {
            values,
            fallback: Some(fallback),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl Environment for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .cloned()
            .or_else(|| self.fallback.as_ref().and_then(|fb| fb.get(key)))
    }
}

impl From<HashMap<String, String>> for MapEnvironment {
    fn from(values: HashMap<String, String>) -> Self {
        Self {
            values,
            fallback: None,
        }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MapEnvironment {
    fn from(values: [(&str, &str); N]) -> Self {
        Self::from(
            values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }
}

/// Defaults used by [`VectorColumn::similar`](crate::VectorColumn::similar).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VectorDefaults {
    pub algorithm: SimilarityAlgorithm,
    pub threshold: f64,
}

impl Default for VectorDefaults {
    fn default() -> Self {
        Self {
            algorithm: SimilarityAlgorithm::default(),
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl VectorDefaults {
    /// Read the defaults from the environment. Unset keys keep the built-in defaults.
    pub fn from_env(env: &dyn Environment) -> Result<Self, ExpressionError> {
        let defaults = Self::default();

        let algorithm = match env.get(VECTOR_SIMILARITY_ALGORITHM_PARAM) {
            Some(value) => value.parse::<SimilarityAlgorithm>().map_err(|e: ExpressionError| {
                invalid_config(VECTOR_SIMILARITY_ALGORITHM_PARAM, &value, e.to_string())
            })?,
            None => defaults.algorithm,
        };

        let threshold = match env.get(VECTOR_SIMILARITY_THRESHOLD_PARAM) {
            Some(value) => match value.trim().parse::<f64>() {
                Ok(threshold) if threshold.is_finite() => threshold,
                _ => {
                    return Err(invalid_config(
                        VECTOR_SIMILARITY_THRESHOLD_PARAM,
                        &value,
                        "Expected a finite number".to_string(),
                    ));
                }
            },
            None => defaults.threshold,
        };

        Ok(Self {
            algorithm,
            threshold,
        })
    }
}

fn invalid_config(key: &str, value: &str, message: String) -> ExpressionError {
    tracing::warn!("Invalid configuration value for {}: {}", key, value);
    ExpressionError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
        message,
    }
}
