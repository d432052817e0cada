//! System status dashboard command.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde_json::json;

use saathi_infra::secret::env::GOOGLE_API_KEY;

use crate::state::AppState;

/// Display the system status: registered agents, configuration, and paths.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let system = state.orchestrator.system_status();
    let ctx = state.context();
    let config = &state.settings.config;
    let config_found = tokio::fs::try_exists(&state.settings.config_path)
        .await
        .unwrap_or(false);

    if json {
        let status = json!({
            "system": system,
            "credential_present": state.agents_ready,
            "model": config.model,
            "data_dir": state.settings.data_dir.display().to_string(),
            "config_path": state.settings.config_path.display().to_string(),
            "config_found": config_found,
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Agent Saathi v{} ({})",
        style("⚡").bold(),
        system.version,
        style(&system.status).green()
    );
    println!();

    println!("  {}", style("── Agents ──").dim());
    if state.agents_ready {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Name").fg(Color::White),
            Cell::new("Type").fg(Color::White),
            Cell::new("Handles").fg(Color::White),
        ]);
        for name in &system.agents_available {
            let Some(agent) = ctx.registry.lookup(name) else {
                continue;
            };
            let handles = agent
                .capabilities()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![
                Cell::new(name).fg(Color::Cyan),
                Cell::new(agent.kind().to_string()),
                Cell::new(handles),
            ]);
        }
        println!("{table}");
    } else {
        println!(
            "  {} {} is not set; agents are unavailable",
            style("!").yellow(),
            GOOGLE_API_KEY
        );
    }
    println!();

    println!("  {}", style("── Configuration ──").dim());
    println!("  Model:        {}", style(&config.model).bold());
    println!("  Memory cap:   {} records per user", config.memory.max_entries);
    println!(
        "  Parallelism:  {} tasks, {}s deadline",
        config.parallel.max_concurrency, config.parallel.task_timeout_secs
    );
    println!(
        "  Retries:      {} attempts, {}ms base delay ({:?})",
        config.retry.max_attempts, config.retry.base_delay_ms, config.retry.backoff
    );
    println!();

    println!("  {}", style("── System ──").dim());
    println!(
        "  Data dir: {}",
        style(state.settings.data_dir.display()).dim()
    );
    println!("  Results:  {}", style(state.results_dir().display()).dim());
    let config_note = if config_found { "" } else { " (not found, using defaults)" };
    println!(
        "  Config:   {}{}",
        style(state.settings.config_path.display()).dim(),
        config_note
    );
    println!();

    Ok(())
}
