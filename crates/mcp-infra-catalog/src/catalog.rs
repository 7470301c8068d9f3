// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::Path;

use tracing::{info, warn};

use crate::client_config::{render_client_config_with, ClientConfig};
use crate::error::CatalogError;
use crate::profiles::{ProfileSet, ServiceRef, DEFAULT_PROFILE};
use crate::prompt::{render_prompt_with, PromptOptions};
use crate::registry::Registry;
use crate::resolve::{resolve, ResolvedService};
use crate::select::TaskContext;

/// A registry and a profile set loaded together.  Immutable once built;
/// reloading produces a new `Catalog`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    registry: Registry,
    profiles: ProfileSet,
}

impl Catalog {
    pub fn new(registry: Registry, profiles: ProfileSet) -> Self {
        let catalog = Self { registry, profiles };
        catalog.report_inconsistencies();
        catalog
    }

    /// Load both documents; either failing fails the whole load.
    pub fn load(registry_path: &Path, profiles_path: &Path) -> Result<Self, CatalogError> {
        let registry = Registry::load(registry_path)?;
        let profiles = ProfileSet::load(profiles_path)?;
        info!(
            services = registry.len(),
            profiles = profiles.profiles.len(),
            "catalog loaded"
        );
        Ok(Self::new(registry, profiles))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    pub fn resolve(&self, profile: &str) -> Result<Vec<ResolvedService>, CatalogError> {
        resolve(profile, &self.registry, &self.profiles)
    }

    pub fn select_profile(&self, task: &str, context: &TaskContext) -> &str {
        self.profiles.select(task, context)
    }

    pub fn prompt_section(
        &self,
        profile: &str,
        opts: &PromptOptions,
    ) -> Result<String, CatalogError> {
        Ok(render_prompt_with(&self.resolve(profile)?, opts))
    }

    pub fn client_config(
        &self,
        profile: &str,
        proxy_path: &str,
    ) -> Result<ClientConfig, CatalogError> {
        let services = self.resolve(profile)?;
        Ok(render_client_config_with(&services, &self.registry, proxy_path))
    }

    /// Log references that will silently resolve to nothing.  None of these
    /// stop the catalog from loading.
    fn report_inconsistencies(&self) {
        if !self.profiles.has_default() {
            warn!(
                profile = DEFAULT_PROFILE,
                "profile document has no fallback profile; unmatched tasks will fail to resolve"
            );
        }
        for (name, profile) in &self.profiles.profiles {
            for entry in &profile.services {
                if let ServiceRef::Id(id) = entry {
                    if !self.registry.contains(id) {
                        warn!(profile = %name, service = %id, "profile references unknown service");
                    }
                }
            }
        }
        for rule in &self.profiles.selection_rules {
            if rule.profile != DEFAULT_PROFILE && self.profiles.get(&rule.profile).is_none() {
                warn!(profile = %rule.profile, "selection rule targets unknown profile");
            }
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
