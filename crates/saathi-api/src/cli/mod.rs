//! CLI command definitions for the `saathi` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod demo;
pub mod render;
pub mod request;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Agent Saathi: emotional support, study planning, community, and
/// storytelling agents.
#[derive(Parser)]
#[command(name = "saathi", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config.toml (defaults to <data dir>/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the canned walkthrough across all agents.
    Demo {
        /// User whose memory log the demo writes to.
        #[arg(long, default_value = "demo_user")]
        user: String,
    },

    /// Show system status and configuration.
    Status,

    /// Reflect on a journal entry with the emotional support agent.
    Journal {
        /// The journal entry text.
        entry: String,

        /// Emotion tags (repeatable).
        #[arg(long = "emotion", short = 'e')]
        emotions: Vec<String>,

        #[arg(long, default_value = "cli_user")]
        user: String,
    },

    /// Build a weekly study plan.
    Study {
        /// Subjects to plan for.
        #[arg(required = true)]
        subjects: Vec<String>,

        /// Hours available per week.
        #[arg(long, default_value_t = 10)]
        hours: u32,

        #[arg(long, default_value = "4 weeks")]
        deadline: String,

        /// Learning style (visual, auditory, kinesthetic, ...).
        #[arg(long, default_value = "visual")]
        style: String,

        #[arg(long, default_value = "cli_user")]
        user: String,
    },

    /// Plan a volunteer community project around one issue.
    Project {
        /// The issue the project addresses.
        issue: String,

        /// Resources already available (repeatable).
        #[arg(long = "resource", short = 'r')]
        resources: Vec<String>,

        #[arg(long, default_value_t = 0)]
        volunteers: u32,

        #[arg(long, default_value = "1 month")]
        timeline: String,

        #[arg(long, default_value = "cli_user")]
        user: String,
    },

    /// Turn a personal experience into an inspirational story.
    Story {
        /// The experience or challenge.
        experience: String,

        /// How it changed you.
        #[arg(long, default_value = "")]
        transformation: String,

        /// The key takeaway.
        #[arg(long, default_value = "")]
        lesson: String,

        #[arg(long, default_value = "hopeful")]
        tone: String,

        #[arg(long, default_value = "cli_user")]
        user: String,
    },
}

impl Commands {
    /// Whether the command needs the generation credential.
    pub fn needs_credentials(&self) -> bool {
        !matches!(self, Commands::Status)
    }
}
