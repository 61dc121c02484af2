//! `agentura sessions` — Session management commands.

use agentura_config::AppConfig;
use agentura_core::message::Role;
use agentura_core::session::SessionStore;
use std::sync::Arc;

fn open_store() -> Result<(AppConfig, Arc<dyn SessionStore>), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = agentura_sessions::build_from_config(&config);
    Ok((config, store))
}

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let (config, store) = open_store()?;
    let sessions = store.list_sessions().await?;

    println!("Sessions ({})", config.sessions_dir().display());
    println!("========");
    if sessions.is_empty() {
        println!("  No sessions yet. Start one with `agentura chat`.");
        return Ok(());
    }
    for s in sessions {
        println!("  {:<24} {:>4} turns  {}", s.id, s.turn_count, s.title);
    }

    Ok(())
}

pub async fn show(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (_, store) = open_store()?;
    let turns = store.load(id).await?;

    if turns.is_empty() {
        println!("  Session '{id}' has no turns.");
        return Ok(());
    }

    for (index, turn) in turns.iter().enumerate() {
        let who = match turn.role {
            Role::User => "You".to_string(),
            Role::Assistant => turn.model.clone().unwrap_or_else(|| "Assistant".into()),
        };
        println!(
            "[{index}] {who} @ {}",
            turn.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
        if let Some(tool) = &turn.tool {
            let status = if tool.success { "ok" } else { "failed" };
            println!("    tool: {} ({status})", tool.name);
        }
        for line in turn.message.lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}

pub async fn delete(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (_, store) = open_store()?;
    if store.delete_session(id).await? {
        println!("Session '{id}' cleared");
    } else {
        println!("Session '{id}' not found");
    }
    Ok(())
}

pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let (_, store) = open_store()?;
    let deleted = store.clear().await?;
    println!("Cleared {deleted} session(s)");
    Ok(())
}
