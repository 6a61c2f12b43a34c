//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod csv_io;
pub mod di;
pub mod error;
pub mod traits;

pub use csv_io::{CsvRows, LineEnding};
pub use error::InfraError;
