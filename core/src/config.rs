//! Engine configuration
//!
//! Parameters are typed fields, but can also be read and written by name
//! with string values so that front-ends can expose them generically.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::graph::max_flow::FlowStrategy;
use crate::data_structures::graph::Capacity;

/// Residual capacities at or below this value count as saturated
pub const DEFAULT_EPSILON: Capacity = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Run-time options for the matching and flow engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Augmentation strategy for flow runs
    pub strategy: FlowStrategy,
    /// Comparison tolerance for residual capacities and excess
    pub epsilon: Capacity,
    /// Push-relabel: global relabel after this many relabels; 0 disables
    pub global_relabel_frequency: usize,
    /// Keep every frame of a run for later inspection
    pub record_history: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: FlowStrategy::EdmondsKarp,
            epsilon: DEFAULT_EPSILON,
            global_relabel_frequency: 0,
            record_history: false,
        }
    }
}

impl EngineConfig {
    pub const PARAMETERS: [&'static str; 4] = [
        "strategy",
        "epsilon",
        "global_relabel_frequency",
        "record_history",
    ];

    pub fn with_strategy(mut self, strategy: FlowStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets a parameter from its string form
    pub fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidParameter {
            name: name.to_owned(),
            reason: reason.to_owned(),
        };

        match name {
            "strategy" => {
                self.strategy = value
                    .parse()
                    .map_err(|_| invalid("expected dfs, bfs or push-relabel"))?;
            }
            "epsilon" => {
                let epsilon = value
                    .parse::<f64>()
                    .map_err(|_| invalid("epsilon must be a number"))?;
                check_epsilon(epsilon)?;
                self.epsilon = epsilon;
            }
            "global_relabel_frequency" => {
                self.global_relabel_frequency = value.parse::<usize>().map_err(|_| {
                    invalid("global_relabel_frequency must be a non-negative integer")
                })?;
            }
            "record_history" => {
                self.record_history = value
                    .parse::<bool>()
                    .map_err(|_| invalid("record_history must be true or false"))?;
            }
            _ => return Err(ConfigError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }

    /// Rejects values that cannot come from `set_parameter`, e.g. from a JSON file
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_epsilon(self.epsilon)
    }

    pub fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "strategy" => Some(self.strategy.to_string()),
            "epsilon" => Some(self.epsilon.to_string()),
            "global_relabel_frequency" => Some(self.global_relabel_frequency.to_string()),
            "record_history" => Some(self.record_history.to_string()),
            _ => None,
        }
    }

    pub fn parameters(&self) -> HashMap<String, String> {
        Self::PARAMETERS
            .iter()
            .filter_map(|name| self.get_parameter(name).map(|v| (name.to_string(), v)))
            .collect()
    }
}

fn check_epsilon(epsilon: Capacity) -> Result<(), ConfigError> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(ConfigError::InvalidParameter {
            name: "epsilon".to_owned(),
            reason: "epsilon must be finite and non-negative".to_owned(),
        });
    }
    Ok(())
}
