// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Service registry and access profiles for MCP infrastructure.
//!
//! ```text
//! registry/services.yaml ─┐
//!                         ├─► Catalog ─► resolve(profile) ─► [ResolvedService]
//! profiles/*.yaml ────────┘                                      │
//!          │                                    ┌────────────────┴───────────┐
//!          ▼                                    ▼                            ▼
//!   select_profile(task, ctx)            render_prompt()          render_client_config()
//! ```
//!
//! Everything after loading is a pure, synchronous transformation of the
//! loaded documents.

mod catalog;
pub mod client_config;
mod error;
pub mod profiles;
pub mod prompt;
pub mod registry;
mod resolve;
pub mod select;
mod shared;

pub use catalog::Catalog;
pub use client_config::{
    render_client_config, render_client_config_with, ClientConfig, LaunchSpec,
};
pub use error::{CatalogError, DocumentKind};
pub use mcp_infra_config::UnknownCategories;
pub use profiles::{
    Profile, ProfileRule, ProfileSet, RuleCondition, ServiceRef, DEFAULT_PROFILE, WILDCARD,
};
pub use prompt::{
    render_prompt, render_prompt_with, PromptOptions, CATEGORY_ORDER, NO_SERVICES,
};
pub use registry::{Location, Registry, ServiceDescriptor};
pub use resolve::{resolve, ResolvedService};
pub use select::{parse_context_var, select_profile, TaskContext};
pub use shared::SharedCatalog;
