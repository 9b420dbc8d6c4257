//! Co-Pilot core - natural-language command orchestration for an
//! instructor-facing course platform
//!
//! One free-text instruction becomes an ordered list of typed tasks,
//! executed sequentially against the domain store with fuzzy entity
//! resolution and intra-command context threading, then reported as a
//! single aggregated result with a durable audit record.

pub mod command;
pub mod core;
pub mod llm;
pub mod model;
pub mod store;
