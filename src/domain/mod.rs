//! Domain layer: entities and the CSV <-> tree mapping
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod classifier;
pub mod codec;
pub mod entities;
pub mod error;
pub mod lang;

pub use classifier::RowClassifier;
pub use codec::TreeCodec;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use lang::{LangColumns, LangEntity, LangHeaderNames, LangProjection};
