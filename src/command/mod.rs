//! The command pipeline: validated intents, entity resolution, context
//! threading, dispatch, and top-level orchestration

pub mod chain;
pub mod dispatcher;
pub mod intent;
pub mod orchestrator;
pub mod resolver;

pub use chain::CommandContext;
pub use dispatcher::TaskDispatcher;
pub use intent::{Intent, Task, TaskParams};
pub use orchestrator::{CommandOrchestrator, CommandOutcome};
pub use resolver::EntityResolver;
