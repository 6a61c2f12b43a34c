//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod header;
pub mod naming;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::{FormatResultExt, IoResultExt};
pub use header::HeaderFilter;
