//! Route handlers

pub mod predict;
pub mod predictions;
