//! ONNX regressors executed with tract

use tract_onnx::prelude::*;

use crate::regressor::Regressor;
use crate::InferenceError;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// Single-output ONNX regression graph with input shape `[1, n_features]`
pub struct OnnxRegressor {
    plan: OnnxPlan,
    n_features: usize,
}

impl OnnxRegressor {
    /// Parse and optimize an ONNX graph held in memory
    pub fn from_bytes(bytes: &[u8], n_features: usize) -> Result<Self, InferenceError> {
        let mut reader = std::io::Cursor::new(bytes);
        let plan = tract_onnx::onnx()
            .model_for_read(&mut reader)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, n_features]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("ONNX: {}", e)))?;

        Ok(Self { plan, n_features })
    }
}

impl Regressor for OnnxRegressor {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let row: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.n_features), row)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let view = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        view.iter()
            .next()
            .map(|&v| f64::from(v))
            .ok_or_else(|| InferenceError::InferenceFailed("ONNX graph produced no output".to_string()))
    }
}
