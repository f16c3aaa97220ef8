//! HTTP surface for the RTW check workflow.

pub mod api;
pub mod metrics;
pub mod state;
