// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Service registry: the static catalog of every known MCP service.
//!
//! The registry document is a YAML mapping keyed by service id:
//!
//! ```yaml
//! services:
//!   filesystem:
//!     name: Filesystem
//!     description: Read and write project files
//!     port: 8101
//!     category: core          # default: other
//!     location: local         # local | workhorse, default: local
//!     requires_auth: false    # default: false
//!     command: npx -y @modelcontextprotocol/server-filesystem
//!     env_vars: [FS_ROOT]     # default: []
//! ```
//!
//! Iteration order is the order services appear in the document; wildcard
//! expansion and every rendered output depend on it.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{CatalogError, DocumentKind};

/// Host used for services on the shared workhorse machine.
pub const WORKHORSE_HOST: &str = "10.0.0.2";
/// Host used for services running on this machine.
pub const LOCAL_HOST: &str = "localhost";
/// Category assigned when the document leaves it out.
pub const DEFAULT_CATEGORY: &str = "other";

/// Where a service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Local,
    Workhorse,
}

impl Location {
    pub fn host(self) -> &'static str {
        match self {
            Location::Local => LOCAL_HOST,
            Location::Workhorse => WORKHORSE_HOST,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Location::Local => "local",
            Location::Workhorse => "workhorse",
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.into()
}

/// Treat an explicit YAML `null` the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Registry key; filled in from the mapping key at load time.
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub port: u16,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub requires_auth: bool,
    /// Launch command line for local services; may be empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub command: String,
    /// Names of environment variables the service needs at launch.
    #[serde(default, deserialize_with = "null_as_default")]
    pub env_vars: Vec<String>,
}

impl ServiceDescriptor {
    /// Access URL derived from location and port.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.location.host(), self.port)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    services: IndexMap<String, ServiceDescriptor>,
}

/// Insertion-ordered mapping from service id to descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    services: IndexMap<String, ServiceDescriptor>,
}

impl Registry {
    /// Parse a registry document held in memory.
    pub fn from_yaml(text: &str) -> Result<Self, CatalogError> {
        Self::parse(text, "<inline>")
    }

    /// Read and parse the registry document at `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        debug!(path = %path.display(), "loading service registry");
        let text = read_document(DocumentKind::Registry, path)?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, origin: &str) -> Result<Self, CatalogError> {
        let doc: RegistryDocument =
            serde_yaml::from_str(text).map_err(|source| CatalogError::Parse {
                kind: DocumentKind::Registry,
                origin: origin.to_string(),
                source,
            })?;

        let mut services = doc.services;
        for (id, svc) in services.iter_mut() {
            svc.id = id.clone();
        }
        debug!(count = services.len(), "registry parsed");
        Ok(Self { services })
    }

    pub fn get(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.services.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    /// Services in document order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl FromIterator<ServiceDescriptor> for Registry {
    fn from_iter<I: IntoIterator<Item = ServiceDescriptor>>(iter: I) -> Self {
        Self {
            services: iter.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }
}

pub(crate) fn read_document(kind: DocumentKind, path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
