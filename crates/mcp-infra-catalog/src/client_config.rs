// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Desktop-client configuration (`mcpServers` document).
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "filesystem": {
//!       "command": "npx",
//!       "args": ["-y", "@modelcontextprotocol/server-filesystem"],
//!       "env": { "FS_ROOT": "${FS_ROOT}" }
//!     },
//!     "memory": {
//!       "command": "node",
//!       "args": ["/usr/local/bin/mcp-proxy", "http://10.0.0.2:8120"]
//!     }
//!   }
//! }
//! ```

use indexmap::IndexMap;
use mcp_infra_config::DEFAULT_PROXY_PATH;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::registry::{Location, Registry};
use crate::resolve::ResolvedService;

/// Interpreter used to run the proxy for workhorse services.
pub const PROXY_COMMAND: &str = "node";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(rename = "mcpServers")]
    pub mcp_servers: IndexMap<String, LaunchSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSpec {
    pub command: String,
    pub args: Vec<String>,
    /// Variable name → `${NAME}` placeholder, expanded by the client.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
}

impl ClientConfig {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the client document with the default proxy path.
pub fn render_client_config(services: &[ResolvedService], registry: &Registry) -> ClientConfig {
    render_client_config_with(services, registry, DEFAULT_PROXY_PATH)
}

/// Build the client document.
///
/// Workhorse services launch through `node <proxy_path> <url>`.  Local
/// services use their registry command split on whitespace; a service with
/// an empty command gets no entry at all.
pub fn render_client_config_with(
    services: &[ResolvedService],
    registry: &Registry,
    proxy_path: &str,
) -> ClientConfig {
    let mut config = ClientConfig::default();

    for svc in services {
        let spec = match svc.location {
            Location::Workhorse => Some(LaunchSpec {
                command: PROXY_COMMAND.to_string(),
                args: vec![proxy_path.to_string(), svc.url.clone()],
                env: IndexMap::new(),
            }),
            Location::Local => registry
                .get(&svc.id)
                .and_then(|entry| split_command(&entry.command)),
        };

        let Some(mut spec) = spec else {
            debug!(service = %svc.id, "no launch command, leaving service out of client config");
            continue;
        };

        spec.env = svc
            .env_vars
            .iter()
            .map(|var| (var.clone(), placeholder(var)))
            .collect();

        config.mcp_servers.insert(svc.id.clone(), spec);
    }

    config
}

fn split_command(command: &str) -> Option<LaunchSpec> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some(LaunchSpec {
        command: program,
        args: parts.collect(),
        env: IndexMap::new(),
    })
}

fn placeholder(var: &str) -> String {
    format!("${{{var}}}")
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
