//! `phys-fit` library crate.
//!
//! The binary (`physfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the decay fit and the bounce calculator share one error/config/report stack
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod bounce;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
