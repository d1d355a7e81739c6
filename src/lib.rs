//! Monte Carlo estimation of annual loss exposure.
//!
//! A [`config::Scenario`] lists risk events, business assets, and defense
//! systems. [`report::analyse`] simulates many independent years, summarises
//! the loss distribution, and derives security ROI and a 0–100 risk score.

pub mod analysis;
pub mod config;
pub mod error;
pub mod metrics;
pub mod mitigation;
pub mod report;
pub mod sampler;
pub mod simulation;
pub mod types;

pub use error::{Result, SimError};
