// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use indexmap::IndexMap;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use mcp_infra_catalog::{parse_context_var, ServiceRef, TaskContext, UnknownCategories};
use mcp_infra_client::InfraClient;
use mcp_infra_config::Config;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Handle subcommands that never touch the installation first
    match &cli.command {
        Commands::Completions { shell } => {
            cli::print_completions(*shell);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::ShowConfig => {
            let config = load_config(&cli)?;
            println!("{}", serde_yaml::to_string(&config).unwrap_or_default());
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let config = load_config(&cli)?;
    let client = InfraClient::open(&config)?;

    match cli.command {
        Commands::Services { json } => list_services(&client, json)?,
        Commands::Profiles { json } => list_profiles(&client, json)?,
        Commands::Resolve { profile, json } => resolve_cmd(&client, &profile, json)?,
        Commands::Prompt {
            profile,
            flat,
            append_unknown,
        } => {
            let mut opts = mcp_infra_catalog::PromptOptions::from_config(&config.prompt);
            if flat {
                opts.group_by_category = false;
            }
            if append_unknown {
                opts.unknown_categories = UnknownCategories::Append;
            }
            println!("{}", client.catalog().prompt_section(&profile, &opts)?);
        }
        Commands::ClientConfig { profile, output } => {
            let json = client.client_config(&profile)?.to_json_pretty()?;
            match output {
                Some(path) => {
                    write_output(&path, &json)?;
                    eprintln!("Wrote client config for '{profile}' to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Select {
            task,
            project_path,
            context,
            prompt,
        } => {
            let ctx = build_context(project_path, &context)?;
            if prompt {
                println!("{}", client.prompt_for_task(&task, &ctx)?);
            } else {
                println!("{}", client.determine_profile(&task, &ctx));
            }
        }
        Commands::Status { service, json } => {
            let status = client.check_service_status(&service);
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                let state = if status.running { "running" } else { "not running" };
                println!("{service}: {state}");
                if !status.output.trim().is_empty() {
                    println!("{}", status.output.trim_end());
                }
                if let Some(err) = &status.error {
                    eprintln!("error: {err}");
                }
            }
            if !status.running {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Start { service } => {
            if !client.start_service(&service) {
                bail!("failed to start service '{service}'");
            }
            info!(%service, "service started");
            println!("Started {service}");
        }
        Commands::ShowConfig | Commands::Completions { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// Layered config, with `--base-path` taking precedence over any file.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = mcp_infra_config::load(cli.config.as_deref())?;
    if let Some(base) = &cli.base_path {
        config.base_path = Some(base.display().to_string());
    }
    Ok(config)
}

/// Assemble the selection context from `--project-path` and `--context`.
fn build_context(project_path: Option<String>, vars: &[String]) -> anyhow::Result<TaskContext> {
    let mut ctx = TaskContext::new();
    if let Some(path) = project_path {
        ctx.insert(TaskContext::PROJECT_PATH, path);
    }
    for raw in vars {
        let Some((key, value)) = parse_context_var(raw) else {
            bail!("invalid --context value '{raw}', expected KEY=VALUE");
        };
        ctx.insert(key, value);
    }
    Ok(ctx)
}

fn list_services(client: &InfraClient, as_json: bool) -> anyhow::Result<()> {
    let services = client.list_services();

    if as_json {
        let by_id: IndexMap<&str, _> = services.iter().map(|s| (s.id.as_str(), s)).collect();
        println!("{}", serde_json::to_string_pretty(&by_id)?);
        return Ok(());
    }

    if services.is_empty() {
        println!("No services registered.");
        return Ok(());
    }

    let id_w = services.iter().map(|s| s.id.len()).max().unwrap_or(2).max(2);
    let cat_w = services.iter().map(|s| s.category.len()).max().unwrap_or(8).max(8);
    println!(
        "{:<id_w$}  {:<9}  {:>5}  {:<cat_w$}  {:<4}  NAME",
        "ID", "LOCATION", "PORT", "CATEGORY", "AUTH"
    );
    println!("{}", "-".repeat(id_w + cat_w + 40));
    for s in &services {
        let auth = if s.requires_auth { "yes" } else { "no" };
        println!(
            "{:<id_w$}  {:<9}  {:>5}  {:<cat_w$}  {:<4}  {}",
            s.id, s.location, s.port, s.category, auth, s.name,
        );
    }
    println!("\nTotal: {} service(s)", services.len());
    Ok(())
}

fn list_profiles(client: &InfraClient, as_json: bool) -> anyhow::Result<()> {
    let profiles = client.list_profiles();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    for (name, profile) in &profiles {
        match &profile.description {
            Some(desc) => println!("{name}: {desc}"),
            None => println!("{name}"),
        }
        let refs: Vec<&str> = profile.services.iter().map(ServiceRef::as_str).collect();
        println!("  services: {}", refs.join(", "));
    }
    println!("\nTotal: {} profile(s)", profiles.len());
    Ok(())
}

fn resolve_cmd(client: &InfraClient, profile: &str, as_json: bool) -> anyhow::Result<()> {
    let services = client.services_for_profile(profile)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&services)?);
        return Ok(());
    }

    if services.is_empty() {
        println!("Profile '{profile}' grants no services.");
        return Ok(());
    }
    let id_w = services.iter().map(|s| s.id.len()).max().unwrap_or(2).max(2);
    for s in &services {
        let auth = if s.requires_auth { "  (auth)" } else { "" };
        println!("{:<id_w$}  {}{auth}", s.id, s.url);
    }
    Ok(())
}

fn write_output(path: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, format!("{text}\n"))
        .with_context(|| format!("failed to write {}", path.display()))
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
