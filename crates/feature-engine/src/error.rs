//! Feature Assembly Errors

use thiserror::Error;

/// Errors during feature vector assembly
#[derive(Debug, Clone, Error)]
pub enum FeatureError {
    /// The row transform (scaler) rejected the row
    #[error("Row transform failed: {0}")]
    Transform(String),

    /// A transform returned a row of the wrong width
    #[error("Assembled {schema} vector has {actual} values, schema declares {expected}")]
    LengthMismatch {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Hydraulics defaults disagree with the declared feature order
    #[error("Hydraulics defaults do not match declared order: missing {missing:?}, unexpected {unexpected:?}")]
    OrderMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}
