// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Access profiles and the rules that pick one for a task.
//!
//! ```yaml
//! profiles:
//!   default:
//!     services: ["*"]
//!   research:
//!     description: Read-only lookups
//!     services: [search, docs]
//! selection_rules:
//!   - condition: { project_path_contains: /work/client-x }
//!     profile: client-x
//!   - condition: { task_contains: [research, investigate] }
//!     profile: research
//!   - condition: { default: true }
//!     profile: default
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, DocumentKind};
use crate::registry::read_document;

/// Token in a profile's service list that stands for every non-auth service.
pub const WILDCARD: &str = "*";
/// Profile name returned when no selection rule matches.
pub const DEFAULT_PROFILE: &str = "default";

/// One entry of a profile's `services` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceRef {
    /// `*`
    Wildcard,
    /// A literal registry id.
    Id(String),
}

impl From<String> for ServiceRef {
    fn from(s: String) -> Self {
        if s == WILDCARD {
            ServiceRef::Wildcard
        } else {
            ServiceRef::Id(s)
        }
    }
}

impl From<&str> for ServiceRef {
    fn from(s: &str) -> Self {
        ServiceRef::from(s.to_string())
    }
}

impl From<ServiceRef> for String {
    fn from(r: ServiceRef) -> Self {
        match r {
            ServiceRef::Wildcard => WILDCARD.to_string(),
            ServiceRef::Id(id) => id,
        }
    }
}

impl ServiceRef {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceRef::Wildcard => WILDCARD,
            ServiceRef::Id(id) => id,
        }
    }
}

impl std::fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed services, in the order they are resolved.
    pub services: Vec<ServiceRef>,
}

/// Condition half of a selection rule.  Every field that is present is
/// checked on its own; any one of them matching fires the rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_contains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_contains: Option<Vec<String>>,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRule {
    pub condition: RuleCondition,
    pub profile: String,
}

/// The parsed access-profile document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSet {
    pub profiles: IndexMap<String, Profile>,
    #[serde(default)]
    pub selection_rules: Vec<ProfileRule>,
}

impl ProfileSet {
    pub fn from_yaml(text: &str) -> Result<Self, CatalogError> {
        Self::parse(text, "<inline>")
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        debug!(path = %path.display(), "loading access profiles");
        let text = read_document(DocumentKind::Profiles, path)?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, origin: &str) -> Result<Self, CatalogError> {
        let set: ProfileSet = serde_yaml::from_str(text).map_err(|source| CatalogError::Parse {
            kind: DocumentKind::Profiles,
            origin: origin.to_string(),
            source,
        })?;
        debug!(
            profiles = set.profiles.len(),
            rules = set.selection_rules.len(),
            "profiles parsed"
        );
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Like [`get`][Self::get] but unknown names are an error.
    pub fn require(&self, name: &str) -> Result<&Profile, CatalogError> {
        self.get(name)
            .ok_or_else(|| CatalogError::ProfileNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn has_default(&self) -> bool {
        self.profiles.contains_key(DEFAULT_PROFILE)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
