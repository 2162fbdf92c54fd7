//! Mathematical utilities: stable exponentials and least-squares solves.

pub mod basis;
pub mod ols;

pub use basis::*;
pub use ols::*;
