// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Prompt section listing the services an agent may use.
//!
//! Grouped output looks like:
//!
//! ```text
//!
//! You have access to the following MCP services:
//!
//! ### Core Services
//!
//! **Filesystem** (`filesystem`)
//! - URL: http://localhost:8101
//! - Purpose: Read and write project files
//!
//! ### Ai Context Services
//!
//! **Memory** (`memory`)
//! - URL: http://10.0.0.2:8120
//! - Purpose: Long-term notes
//! - Note: Requires authentication token
//!
//! Only use the MCP services listed above. Do not attempt to access any other services.
//! ```

use std::fmt::Write as _;

use indexmap::IndexMap;
use mcp_infra_config::{PromptConfig, UnknownCategories};

use crate::resolve::ResolvedService;

/// Category headings are emitted in this order; anything else is unknown.
pub const CATEGORY_ORDER: &[&str] = &[
    "core",
    "search",
    "ai-context",
    "project",
    "development",
    "other",
];

/// Whole output when a profile resolves to no services.
pub const NO_SERVICES: &str = "\nNo MCP services are available for this task.";

const HEADER: &str = "\nYou have access to the following MCP services:\n\n";
const FOOTER: &str =
    "Only use the MCP services listed above. Do not attempt to access any other services.\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptOptions {
    pub group_by_category: bool,
    pub unknown_categories: UnknownCategories,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self::from_config(&PromptConfig::default())
    }
}

impl PromptOptions {
    pub fn from_config(cfg: &PromptConfig) -> Self {
        Self {
            group_by_category: cfg.group_by_category,
            unknown_categories: cfg.unknown_categories,
        }
    }
}

/// Render with default handling of unknown categories (dropped).
pub fn render_prompt(services: &[ResolvedService], group_by_category: bool) -> String {
    render_prompt_with(
        services,
        &PromptOptions {
            group_by_category,
            ..PromptOptions::default()
        },
    )
}

pub fn render_prompt_with(services: &[ResolvedService], opts: &PromptOptions) -> String {
    if services.is_empty() {
        return NO_SERVICES.to_string();
    }

    let mut out = String::from(HEADER);

    if opts.group_by_category {
        let mut groups: IndexMap<&str, Vec<&ResolvedService>> = IndexMap::new();
        for svc in services {
            groups.entry(svc.category.as_str()).or_default().push(svc);
        }

        for category in CATEGORY_ORDER {
            if let Some(members) = groups.get(category) {
                push_group(&mut out, category, members);
            }
        }

        if opts.unknown_categories == UnknownCategories::Append {
            for (category, members) in &groups {
                if !CATEGORY_ORDER.contains(category) {
                    push_group(&mut out, category, members);
                }
            }
        }
    } else {
        for svc in services {
            push_service(&mut out, svc);
        }
    }

    out.push_str(FOOTER);
    out
}

/// `### <Title> Services` heading text for a category tag.
pub fn category_heading(category: &str) -> String {
    format!("### {} Services", title_case(&category.replace('-', " ")))
}

fn push_group(out: &mut String, category: &str, members: &[&ResolvedService]) {
    let _ = write!(out, "{}\n\n", category_heading(category));
    for svc in members {
        push_service(out, svc);
    }
}

fn push_service(out: &mut String, svc: &ResolvedService) {
    let _ = writeln!(out, "**{}** (`{}`)", svc.name, svc.id);
    let _ = writeln!(out, "- URL: {}", svc.url);
    let _ = writeln!(out, "- Purpose: {}", svc.description);
    if svc.requires_auth {
        out.push_str("- Note: Requires authentication token\n");
    }
    out.push('\n');
}

/// Upper-case the first letter of every word, lower-case the rest.  A word
/// starts after any non-alphabetic character.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for ch in s.chars() {
        if in_word {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        in_word = ch.is_alphabetic();
    }
    out
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
