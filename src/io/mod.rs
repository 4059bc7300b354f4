//! Input/output helpers.
//!
//! - titration sheet ingest (`ingest`)
//! - peak CSV and sheet exports (`export`)
//! - spectrum JSON read/write (`spectrum`)

pub mod export;
pub mod ingest;
pub mod spectrum;

pub use export::*;
pub use ingest::*;
pub use spectrum::*;
