//! Command audit records and execution results
//!
//! A Command is the durable trail of one natural-language instruction:
//! what the user typed, which tasks were extracted, and what each did.
//! It is written by the orchestrator and read-only everywhere else
//! (the chat history view renders these records verbatim).

use crate::core::types::{CommandId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loosely-typed payload attached to task and aggregated results
pub type DataMap = Map<String, Value>;

/// Lifecycle of a command audit record
///
/// Transitions are monotonic: Pending -> Executing -> {Completed, Failed}.
/// A finalized command is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Pending,
    Executing,
    Completed,
    Failed,
}

impl CommandStatus {
    /// Whether moving to `next` respects the monotonic lifecycle
    pub fn can_transition_to(&self, next: CommandStatus) -> bool {
        matches!(
            (self, next),
            (CommandStatus::Pending, CommandStatus::Executing)
                | (CommandStatus::Executing, CommandStatus::Completed)
                | (CommandStatus::Executing, CommandStatus::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CommandStatus::Completed | CommandStatus::Failed)
    }
}

/// One user-submitted instruction and its full audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub user_id: UserId,
    pub raw_text: String,
    /// Derived label: comma-joined intents of the extracted tasks
    pub intent: String,
    /// One parameter map per extracted task, in extraction order
    pub parameters: Vec<DataMap>,
    pub status: CommandStatus,
    pub result: Option<AggregatedResult>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Command {
    /// New pending command for `user_id`, not yet persisted
    pub fn new(user_id: UserId, raw_text: impl Into<String>) -> Self {
        Self {
            id: CommandId::new(),
            user_id,
            raw_text: raw_text.into(),
            intent: String::new(),
            parameters: Vec::new(),
            status: CommandStatus::Pending,
            result: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Outcome of a single dispatched task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DataMap>,
}

impl TaskResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok_with(message: impl Into<String>, data: DataMap) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Per-task entry in the aggregated result, preserving extraction order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub intent: String,
    pub result: TaskResult,
}

/// The single result returned to the caller after all tasks have run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// True when any task succeeded; per-task outcomes are always listed
    pub success: bool,
    /// One numbered line per task when more than one task ran
    pub message: String,
    /// Merged task data; later tasks overwrite same-named keys
    pub data: DataMap,
    pub task_outcomes: Vec<TaskOutcome>,
}

impl AggregatedResult {
    /// Fold task outcomes into the single caller-facing result
    pub fn from_outcomes(outcomes: Vec<TaskOutcome>) -> Self {
        let success = outcomes.iter().any(|o| o.result.success);
        let message = if outcomes.len() == 1 {
            outcomes[0].result.message.clone()
        } else {
            outcomes
                .iter()
                .enumerate()
                .map(|(i, o)| format!("{}. {}", i + 1, o.result.message))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let mut data = DataMap::new();
        for outcome in &outcomes {
            if let Some(task_data) = &outcome.result.data {
                for (k, v) in task_data {
                    data.insert(k.clone(), v.clone());
                }
            }
        }

        Self {
            success,
            message,
            data,
            task_outcomes: outcomes,
        }
    }
}
