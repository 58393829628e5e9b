//! Native regressors

use crate::artifact::{Aggregation, NodeSpec, RegressorSpec, TreeSpec};
use crate::InferenceError;

/// A fitted regression model producing one scalar per row
pub trait Regressor: Send + Sync {
    /// Short model family name, for logs
    fn kind(&self) -> &'static str;

    /// Predict from a row whose width has already been checked
    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError>;
}

/// Build a regressor from its artifact spec, validating it against the feature count
pub fn build(spec: RegressorSpec, n_features: usize, file: &str) -> Result<Box<dyn Regressor>, InferenceError> {
    match spec {
        RegressorSpec::Linear { coefficients, intercept } => {
            if coefficients.len() != n_features {
                return Err(InferenceError::InvalidArtifact {
                    file: file.to_string(),
                    reason: format!("{} coefficients for {} features", coefficients.len(), n_features),
                });
            }
            Ok(Box::new(LinearRegressor { coefficients, intercept }))
        }
        RegressorSpec::TreeEnsemble { aggregation, base_score, trees } => {
            let ensemble = TreeEnsemble::new(trees, aggregation, base_score, n_features)
                .map_err(|reason| InferenceError::InvalidArtifact { file: file.to_string(), reason })?;
            Ok(Box::new(ensemble))
        }
    }
}

/// `intercept + sum(coefficients * x)`
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self { coefficients, intercept }
    }
}

impl Regressor for LinearRegressor {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }
}

/// Ensemble of flattened decision trees
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<TreeSpec>,
    aggregation: Aggregation,
    base_score: f64,
}

impl TreeEnsemble {
    /// Validate structure: non-empty trees, children after their parent, features in range
    pub fn new(trees: Vec<TreeSpec>, aggregation: Aggregation, base_score: f64, n_features: usize) -> Result<Self, String> {
        if trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }

        for (t, tree) in trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {} has no nodes", t));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                if let NodeSpec::Split { feature, left, right, .. } = *node {
                    if feature >= n_features {
                        return Err(format!("tree {} node {}: feature {} out of range", t, i, feature));
                    }
                    if left <= i || right <= i || left >= tree.nodes.len() || right >= tree.nodes.len() {
                        return Err(format!("tree {} node {}: invalid children ({}, {})", t, i, left, right));
                    }
                }
            }
        }

        Ok(Self { trees, aggregation, base_score })
    }

    fn eval(tree: &TreeSpec, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match tree.nodes[idx] {
                NodeSpec::Leaf { value } => return value,
                NodeSpec::Split { feature, threshold, left, right } => {
                    idx = if features[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

impl Regressor for TreeEnsemble {
    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let total: f64 = self.trees.iter().map(|tree| Self::eval(tree, features)).sum();
        Ok(match self.aggregation {
            Aggregation::Mean => self.base_score + total / self.trees.len() as f64,
            Aggregation::Sum => self.base_score + total,
        })
    }
}
