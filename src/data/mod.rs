//! Synthetic input data.

pub mod sample;

pub use sample::{RawRow, SampleData, generate_sample, write_sample};
