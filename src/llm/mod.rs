//! Language understanding layer
//!
//! The model is used for exactly two things: splitting a free-text command
//! into ordered tasks, and optionally drafting quiz questions. It never
//! executes anything itself; its output is defensively parsed and the
//! pipeline degrades rather than fails when the text is malformed.

pub mod client;
pub mod context;
pub mod extractor;
pub mod questions;

pub use client::LlmClient;
pub use context::PlatformContext;
pub use extractor::{extract_tasks, Extraction, RawTask};

use crate::core::error::Result;
use async_trait::async_trait;

/// The language understanding service, reduced to a pure text function
///
/// Implemented by [`LlmClient`] for real APIs and by scripted fakes in
/// tests. Stateless by contract: every call carries its full context.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String>;
}
