//! Loom - Core Library
//!
//! Turns model-authored text into a consistent in-memory project and renders
//! a single-document preview of it. The pieces, leaves first:
//!
//! - [`parser`]: directive protocol parser
//! - [`transform`]: best-effort type-annotation stripper
//! - [`store`]: virtual project store
//! - [`preview`]: preview bundler
//! - [`provider`]: chat backend trait and provider resolution
//! - [`prompt`]: system prompts and message assembly
//! - [`metrics`]: generation counters
//! - [`orchestrator`]: two-phase generation rounds
//! - [`publish`]: publish payload preparation

pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod preview;
pub mod prompt;
pub mod provider;
pub mod publish;
pub mod store;
pub mod transform;

pub use error::*;
pub use metrics::MetricsRecorder;
pub use orchestrator::*;
pub use parser::{parse, parse_plan, strip_directives, ParsedPlan};
pub use preview::build_preview;
pub use provider::*;
pub use publish::*;
pub use store::ProjectStore;
pub use transform::strip_types;

pub use loom_types as types;
