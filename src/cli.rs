// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mcp-infra",
    about = "Resolve MCP service access profiles into prompts and client configs",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Installation root holding registry/ and profiles/
    #[arg(long, short = 'b', global = true, env = "MCP_INFRA_BASE")]
    pub base_path: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every service in the registry
    Services {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List access profiles and their service references
    Profiles {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the services a profile grants, in order
    Resolve {
        profile: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the prompt section for a profile
    Prompt {
        profile: String,
        /// List services without category headings
        #[arg(long)]
        flat: bool,
        /// Emit categories outside the built-in order after the known ones
        #[arg(long)]
        append_unknown: bool,
    },
    /// Print the desktop-client `mcpServers` document for a profile
    ClientConfig {
        profile: String,
        /// Write to this file instead of stdout
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Pick a profile for a task using the selection rules
    Select {
        /// Task description matched against `task_contains` keywords
        #[arg(long, short = 't')]
        task: String,
        /// Project path matched against `project_path_contains`
        #[arg(long, short = 'p')]
        project_path: Option<String>,
        /// Extra context entry in KEY=VALUE form.
        /// May be repeated: --context language=rust --context client=zed
        #[arg(long = "context", value_name = "KEY=VALUE")]
        context: Vec<String>,
        /// Print the chosen profile's prompt section instead of its name
        #[arg(long)]
        prompt: bool,
    },
    /// Ask the service manager whether a service is running
    Status {
        service: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the service manager to start a service
    Start { service: String },
    /// Print the effective configuration and exit
    ShowConfig,
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "mcp-infra", &mut std::io::stdout());
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
