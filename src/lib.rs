//! Market snapshot aggregation, indicator computation and AI-assisted
//! recommendations for crypto and equity instruments.

pub mod cache;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod prediction;
pub mod realtime;
pub mod services;

pub use error::{Error, Result};
