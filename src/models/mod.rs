//! Decay-chain activity model.
//!
//! The model is implemented as small, pure functions so that the fitter and the
//! plot/report code can share it without any state.

pub mod model;

pub use model::*;
