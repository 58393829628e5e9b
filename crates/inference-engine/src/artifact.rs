//! On-disk artifact formats
//!
//! Regressors and scalers are exported offline to JSON; ONNX regressors carry
//! a sidecar manifest with their declared feature order.

use serde::{Deserialize, Serialize};

/// Regressor exported as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressorArtifact {
    /// Version tag reported with each prediction
    pub version: String,
    /// Column order the model was fit on
    pub feature_names: Vec<String>,
    /// Optional preprocessing fitted together with the model (pipeline step)
    #[serde(default)]
    pub preprocess: Option<ScalerSpec>,
    pub model: RegressorSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegressorSpec {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    TreeEnsemble {
        #[serde(default)]
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        trees: Vec<TreeSpec>,
    },
}

/// How per-tree outputs are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Bagged forests (random forest, extra trees)
    #[default]
    Mean,
    /// Boosted ensembles
    Sum,
}

/// Flattened decision tree; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    /// Go `left` when `x[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Scaler exported as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub version: String,
    pub feature_names: Vec<String>,
    pub scaler: ScalerSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScalerSpec {
    /// `x * scale + min`
    MinMax { scale: Vec<f64>, min: Vec<f64> },
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

/// Sidecar for ONNX regressors (`<stem>.features.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureManifest {
    pub version: String,
    pub feature_names: Vec<String>,
}
