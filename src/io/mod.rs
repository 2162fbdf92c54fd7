//! Input/output helpers.
//!
//! - CSV ingest + cleaning (`ingest`)
//! - filtered dataset export (`export`)
//! - fit summary JSON read/write (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
