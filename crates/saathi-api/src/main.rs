//! Agent Saathi command-line entry point.
//!
//! Binary name: `saathi`
//!
//! Parses CLI arguments, sets up tracing, resolves configuration and the
//! generation credential, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use console::style;

use saathi_infra::llm::create_generator;
use saathi_infra::secret::google_api_key;
use saathi_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use saathi_types::agent::StoryTask;

use cli::{Cli, Commands};
use state::{AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref()).await;

    let generator = if cli.command.needs_credentials() {
        match google_api_key() {
            Ok(api_key) => Some(create_generator(api_key, &settings.config)?),
            Err(e) => {
                // Not fatal: report and exit cleanly.
                tracing::warn!(error = %e, "credential missing");
                eprintln!();
                eprintln!("  {} {e}", style("!").yellow().bold());
                eprintln!(
                    "  Set it with: {}",
                    style("export GOOGLE_API_KEY=<your key>").cyan()
                );
                eprintln!();
                return Ok(());
            }
        }
    } else {
        google_api_key()
            .ok()
            .map(|api_key| create_generator(api_key, &settings.config))
            .transpose()?
    };

    let state = AppState::new(settings, generator);

    match cli.command {
        Commands::Demo { user } => {
            cli::demo::demo(&state, &user, cli.json).await?;
        }

        Commands::Status => {
            cli::status::status(&state, cli.json).await?;
        }

        Commands::Journal {
            entry,
            emotions,
            user,
        } => {
            cli::request::journal(&state, user, entry, emotions, cli.json).await?;
        }

        Commands::Study {
            subjects,
            hours,
            deadline,
            style,
            user,
        } => {
            cli::request::study(&state, user, subjects, hours, deadline, style, cli.json).await?;
        }

        Commands::Project {
            issue,
            resources,
            volunteers,
            timeline,
            user,
        } => {
            cli::request::project(&state, user, issue, resources, volunteers, timeline, cli.json)
                .await?;
        }

        Commands::Story {
            experience,
            transformation,
            lesson,
            tone,
            user,
        } => {
            let task = StoryTask {
                experience,
                transformation,
                lesson_learned: lesson,
                emotional_tone: tone,
            };
            cli::request::story(&state, user, task, cli.json).await?;
        }
    }

    Ok(())
}
