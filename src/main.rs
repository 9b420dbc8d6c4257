//! Co-Pilot shell - entry point
//!
//! A minimal interactive shell over the command core: each line you type
//! is submitted as a natural-language command for a demo instructor
//! account against an in-memory store. Useful for poking at the pipeline
//! with a real model configured through the environment. Without a
//! configured model the shell still runs: built-ins like `history` work,
//! and free text gets a pointer to the configuration instead of an exit.

use copilot_core::command::CommandOrchestrator;
use copilot_core::core::error::Result;
use copilot_core::core::types::{Actor, Role, UserId};
use copilot_core::llm::LlmClient;
use copilot_core::model::User;
use copilot_core::store::{DomainStore, MemoryStore};

use std::io::{self, Write};
use std::sync::Arc;

const NO_MODEL_TEXT: &str =
    "No language model is configured. Set LLM_API_KEY (and optionally \
     LLM_API_URL, LLM_MODEL) to enable natural-language commands.";

/// One line of shell input, routed before any model is involved
enum ShellInput<'a> {
    Empty,
    Quit,
    History,
    Command(&'a str),
}

fn parse_input(line: &str) -> ShellInput<'_> {
    match line.trim() {
        "" => ShellInput::Empty,
        "quit" | "q" => ShellInput::Quit,
        "history" => ShellInput::History,
        other => ShellInput::Command(other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("copilot_core=info")
        .init();

    tracing::info!("Co-Pilot shell starting...");

    let store = Arc::new(MemoryStore::new());
    let orchestrator = match LlmClient::from_env() {
        Ok(client) => Some(CommandOrchestrator::new(store.clone(), Arc::new(client))),
        Err(_) => {
            tracing::warn!("LLM_API_KEY not set - running without natural language commands");
            None
        }
    };

    let instructor = User {
        id: UserId::new(),
        name: "Demo Instructor".into(),
        email: "demo@example.edu".into(),
        role: Role::Instructor,
    };
    let actor = Actor::new(instructor.id, instructor.role);

    println!("\n=== CO-PILOT SHELL ===");
    println!("Signed in as {} ({:?})", instructor.name, instructor.role);
    println!();
    if orchestrator.is_some() {
        println!("Type a command in plain English, e.g.:");
        println!("  Create a course called Biology 101 and add a quiz on Cell Division");
    } else {
        println!("{}", NO_MODEL_TEXT);
    }
    println!();
    println!("Built-ins:");
    println!("  history    - Show your command history");
    println!("  quit / q   - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            ShellInput::Empty => continue,
            ShellInput::Quit => break,
            ShellInput::History => {
                for command in store.get_commands(actor.id).await? {
                    let status = format!("{:?}", command.status).to_lowercase();
                    println!(
                        "[{}] ({}) {}",
                        command.created_at.format("%H:%M:%S"),
                        status,
                        command.raw_text
                    );
                }
            }
            ShellInput::Command(text) => match &orchestrator {
                Some(orchestrator) => match orchestrator.submit(actor, text).await {
                    Ok(outcome) => {
                        println!("{}", outcome.result.message);
                        if !outcome.summary.is_empty() && outcome.summary != outcome.result.message
                        {
                            println!("({})", outcome.summary);
                        }
                    }
                    Err(e) => println!("{}", e),
                },
                None => println!("{}", NO_MODEL_TEXT),
            },
        }
    }

    println!("Goodbye.");
    Ok(())
}
