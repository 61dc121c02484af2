//! `agentura tools` — Inspect the tool registry.

use agentura_config::AppConfig;

pub fn list(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = agentura_tools::default_registry(&config.tools)?;

    println!("Registered tools ({})", registry.len());
    println!("=====================");
    for tool in registry.list() {
        println!("\n  {} — {}", tool.name, tool.description);
        if json {
            let schema = serde_json::to_string_pretty(&tool.parameters.to_json_schema())?;
            for line in schema.lines() {
                println!("    {line}");
            }
            continue;
        }
        for param in tool.parameters.params() {
            let required = if param.required { "required" } else { "optional" };
            println!(
                "    - {} ({}, {required}): {}",
                param.name,
                param.kind.as_str(),
                param.description
            );
        }
    }

    Ok(())
}
