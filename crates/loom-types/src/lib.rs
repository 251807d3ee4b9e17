//! Loom Types - Pure type definitions
//!
//! Data model shared by the synthesis engine, the provider adapters and the
//! CLI. Nothing in here performs I/O.

pub mod chat;
pub mod file;
pub mod metrics;
pub mod operation;
pub mod project;
pub mod settings;

pub use chat::*;
pub use file::*;
pub use metrics::*;
pub use operation::*;
pub use project::*;
pub use settings::*;
