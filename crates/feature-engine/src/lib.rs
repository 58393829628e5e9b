//! Feature Engineering Engine
//!
//! Turns partial request payloads into the exact numeric vectors the trained
//! RUL models expect: schema registry, imputation, and one assembler per
//! subsystem.

mod engine;
mod error;
mod features;
mod hydraulics;
mod impute;
mod jitter;
mod landing_gear;
pub mod schema;

pub use engine::{assemble_engine, impute_engine, EngineReadings};
pub use error::FeatureError;
pub use features::{FeaturePayload, FeatureVector, RowTransform};
pub use hydraulics::{assemble_hydraulics, validate_hydraulics_defaults, HydraulicsReadings, HYDRAULICS_POST_SCALE};
pub use impute::{impute_row, impute_value, to_finite, NEG_INF_SENTINEL, POS_INF_SENTINEL};
pub use jitter::{Jitter, NoJitter, NoiseMode, RandomJitter};
pub use landing_gear::{assemble_landing_gear, LandingGearReadings};
pub use schema::FeatureSchema;
