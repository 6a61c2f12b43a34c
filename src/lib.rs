//! clubcodes: convert hierarchical club/branch code sheets between
//! indented CSV and nested JSON.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
