//! Domain types used throughout the pipelines.
//!
//! This module defines:
//!
//! - physical constants and fixed defaults
//! - cleaned observations (`Measurement`)
//! - fit outputs (`DecayConstants`, `DecayFit`, `HalfLife`)
//! - run configuration (`DecayConfig`, `SimulateConfig`)

pub mod types;

pub use types::*;
