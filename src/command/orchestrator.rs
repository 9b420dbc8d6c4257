//! Top-level command orchestration and audit lifecycle
//!
//! One submission runs the full pipeline: persist the audit record,
//! extract tasks with a single model call, execute them sequentially with
//! context injection, aggregate, finalize. Individual task failures are
//! absorbed into the aggregate; only a failure of the extraction call
//! itself (or an unreachable store) aborts the whole command.

use crate::command::chain::CommandContext;
use crate::command::dispatcher::TaskDispatcher;
use crate::command::intent::{Intent, Task};
use crate::core::error::{CopilotError, Result};
use crate::core::types::{Actor, EntityKind};
use crate::llm::{extract_tasks, LanguageModel, PlatformContext};
use crate::model::command::{AggregatedResult, Command, CommandStatus, TaskOutcome, TaskResult};
use crate::store::DomainStore;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

const EXTRACTION_FAILED_MESSAGE: &str =
    "The assistant couldn't process that command right now. Please try again in a moment.";

/// What the caller gets back for one submitted command
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// The finalized audit record
    pub command: Command,
    pub result: AggregatedResult,
    /// One-sentence description of what was done, from extraction
    pub summary: String,
}

/// Coordinates extraction, dispatch, aggregation, and the audit record
pub struct CommandOrchestrator {
    store: Arc<dyn DomainStore>,
    model: Arc<dyn LanguageModel>,
}

impl CommandOrchestrator {
    pub fn new(store: Arc<dyn DomainStore>, model: Arc<dyn LanguageModel>) -> Self {
        Self { store, model }
    }

    /// Execute one natural-language command for `actor`
    pub async fn submit(&self, actor: Actor, text: &str) -> Result<CommandOutcome> {
        // Snapshot first so the in-flight command is not part of its own
        // recent-history context
        let context = PlatformContext::from_store(self.store.as_ref(), &actor).await?;

        let mut command = Command::new(actor.id, text.trim());
        tracing::info!(command_id = %command.id, user_id = %actor.id, "command submitted");
        self.store.save_command(command.clone()).await?;

        self.advance(&mut command, CommandStatus::Executing).await?;
        let extraction = match extract_tasks(self.model.as_ref(), text, &context).await {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::error!(command_id = %command.id, error = %e, "extraction call failed");
                command.status = CommandStatus::Failed;
                command.completed_at = Some(Utc::now());
                if let Err(persist) = self.store.update_command(command.clone()).await {
                    tracing::error!(error = %persist, "failed to persist aborted command");
                }
                return Err(CopilotError::ModelError(EXTRACTION_FAILED_MESSAGE.into()));
            }
        };

        command.intent = extraction
            .tasks
            .iter()
            .map(|t| Intent::parse(&t.intent).as_str())
            .collect::<Vec<_>>()
            .join(", ");
        command.parameters = extraction.tasks.iter().map(|t| t.parameters.clone()).collect();

        let dispatcher = TaskDispatcher::new(self.store.as_ref(), self.model.as_ref(), &actor);
        let mut chain = CommandContext::new();
        let mut outcomes = Vec::with_capacity(extraction.tasks.len());

        for raw in &extraction.tasks {
            let intent = Intent::parse(&raw.intent);
            let result = match Task::from_raw(raw) {
                Ok(mut task) => {
                    chain.inject(&mut task);
                    dispatcher.execute(&task).await
                }
                Err(e) => {
                    tracing::warn!(intent = intent.as_str(), error = %e, "invalid task parameters");
                    TaskResult::fail(format!(
                        "I couldn't make sense of the details for the {} step.",
                        intent.as_str().replace('_', " ")
                    ))
                }
            };

            if result.success {
                record_creations(&mut chain, intent, &result);
            }
            outcomes.push(TaskOutcome {
                intent: intent.as_str().to_string(),
                result,
            });
        }

        let aggregated = AggregatedResult::from_outcomes(outcomes);
        let final_status = if aggregated.success {
            CommandStatus::Completed
        } else {
            CommandStatus::Failed
        };
        command.result = Some(aggregated.clone());
        command.completed_at = Some(Utc::now());
        self.advance(&mut command, final_status).await?;

        let summary = if extraction.summary.is_empty() {
            aggregated.message.clone()
        } else {
            extraction.summary
        };
        tracing::info!(
            command_id = %command.id,
            status = ?command.status,
            tasks = aggregated.task_outcomes.len(),
            "command finished"
        );
        Ok(CommandOutcome {
            command,
            result: aggregated,
            summary,
        })
    }

    /// All commands submitted by the actor, most recent first
    pub async fn history(&self, actor: &Actor) -> Result<Vec<Command>> {
        self.store.get_commands(actor.id).await
    }

    /// Move the audit record along its lifecycle and persist it
    async fn advance(&self, command: &mut Command, next: CommandStatus) -> Result<()> {
        debug_assert!(
            command.status.can_transition_to(next),
            "illegal status transition {:?} -> {:?}",
            command.status,
            next
        );
        command.status = next;
        self.store.update_command(command.clone()).await
    }
}

/// Record created entities into the chain so later tasks can reference them
fn record_creations(chain: &mut CommandContext, intent: Intent, result: &TaskResult) {
    let Some(data) = &result.data else { return };
    let name_of = |key: &str| {
        data.get(key)
            .and_then(|v| v.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    match intent {
        Intent::CreateCourse => {
            if let Some(name) = name_of("course") {
                chain.record(EntityKind::Course, name);
            }
        }
        Intent::CreateQuiz => {
            if let Some(name) = name_of("quiz") {
                chain.record(EntityKind::Quiz, name);
            }
        }
        Intent::CreateAssignment => {
            if let Some(name) = name_of("assignment") {
                chain.record(EntityKind::Assignment, name);
            }
        }
        Intent::CreateLecture => {
            if let Some(name) = name_of("lecture") {
                chain.record(EntityKind::Lecture, name);
            }
        }
        _ => {}
    }
}
