//! `agentura chat` — Interactive or single-message chat mode.

use agentura_agent::OrchestrationOutcome;
use agentura_config::AppConfig;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub async fn run(
    message: Option<String>,
    session: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let orchestrator = agentura_agent::build_from_config(&config)?;
    debug!(provider = %config.default_provider, session = ?session, "Chat starting");

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let outcome = orchestrator.run(session.as_deref(), &msg).await;
        eprint!("\r              \r");
        let outcome = outcome?;
        if let Some(tool) = &outcome.tool {
            eprintln!("  [tool: {}]", tool.name);
        }
        println!("{}", outcome.response);
        eprintln!("  session: {}", outcome.session_id);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Agentura — Interactive Mode");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", orchestrator.model().model_name());
    println!("  Tools:     {}", orchestrator.tools().names().join(", "));
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut session_id = session;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt_marker()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt_marker()?;
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        eprint!("  ...");
        let result = orchestrator.run(session_id.as_deref(), input).await;
        eprint!("\r     \r");
        match result {
            Ok(outcome) => {
                print_outcome(&outcome);
                session_id = Some(outcome.session_id);
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        prompt_marker()?;
    }

    println!();
    if let Some(id) = session_id {
        println!("  Session saved as {id}");
    }
    println!("  Goodbye!");
    println!();

    Ok(())
}

fn print_outcome(outcome: &OrchestrationOutcome) {
    println!();
    if let Some(tool) = &outcome.tool {
        let status = if tool.success { "ok" } else { "failed" };
        println!("  [tool: {} ({status})]", tool.name);
    }
    for line in outcome.response.lines() {
        println!("  Assistant > {line}");
    }
    println!("  ({:.2}s)", outcome.elapsed.as_secs_f64());
    println!();
}

fn prompt_marker() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
