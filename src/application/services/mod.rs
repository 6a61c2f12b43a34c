//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, HttpClient)
//! but are themselves concrete structs, not traits.

mod convert;
mod remote;

pub use convert::{ConversionService, FileOutcome, Projection};
pub use remote::RemoteService;
