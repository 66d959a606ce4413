//! JSON documents exchanged with the solver.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mode keyword for allocation requests.
pub const SPLITS: &str = "splits";
/// Mode keyword for probability requests.
pub const PROPAGATE: &str = "propagate";

/// Confidence function slot. Wire `i` owns slots `2i` (positive) and
/// `2i + 1` (negative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceEntry {
    pub index: usize,
    pub name: String,
    pub expression: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPointEntry {
    pub index: usize,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEntry {
    pub index: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitsRequest {
    pub ft: Value,
    pub conf_funcs: Vec<ConfidenceEntry>,
    pub point: Vec<NamedPointEntry>,
    pub resources: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagateRequest {
    pub ft: Value,
    pub point: Vec<PointEntry>,
}

/// Simulated-annealing hyperparameters.
///
/// Keys the solver understands but this crate does not model are carried
/// through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaHyperParams {
    pub max_step: u64,
    pub p_init: f64,
    pub lambda: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_constant: Option<f64>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Default for SaHyperParams {
    fn default() -> Self {
        Self {
            max_step: 10_000,
            p_init: 0.999,
            lambda: 1.0,
            function_constant: None,
            extra: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaSection {
    #[serde(flatten)]
    pub params: SaHyperParams,
    pub point: Vec<NamedPointEntry>,
}

/// Algorithm document passed next to a [`SplitsRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub sa: SaSection,
}

impl AlgorithmConfig {
    pub fn simulated_annealing(params: SaHyperParams, point: Vec<NamedPointEntry>) -> Self {
        Self {
            kind: "sa".to_string(),
            sa: SaSection { params, point },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn algorithm_config_flattens_hyperparameters() {
        let mut params = SaHyperParams {
            function_constant: Some(0.5),
            ..SaHyperParams::default()
        };
        params.extra.insert("seed".to_string(), json!(7));
        let point = vec![NamedPointEntry {
            index: 0,
            name: "a".to_string(),
            value: 0.1,
        }];
        let config = AlgorithmConfig::simulated_annealing(params, point);
        let encoded = serde_json::to_value(&config).unwrap();
        assert_eq!(
            encoded,
            json!({
                "type": "sa",
                "sa": {
                    "max_step": 10000,
                    "p_init": 0.999,
                    "lambda": 1.0,
                    "function_constant": 0.5,
                    "seed": 7,
                    "point": [{"index": 0, "name": "a", "value": 0.1}]
                }
            })
        );
        let decoded: AlgorithmConfig = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn absent_function_constant_is_omitted() {
        let encoded = serde_json::to_value(SaHyperParams::default()).unwrap();
        assert!(encoded.get("function_constant").is_none());
        assert_eq!(encoded["max_step"], json!(10000));
    }
}
