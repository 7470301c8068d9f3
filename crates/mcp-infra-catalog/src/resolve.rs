// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;
use crate::profiles::{ProfileSet, ServiceRef};
use crate::registry::{Location, Registry, ServiceDescriptor};

/// A registry entry as seen through a profile, with its access URL derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedService {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub port: u16,
    pub category: String,
    pub location: Location,
    pub requires_auth: bool,
    pub env_vars: Vec<String>,
}

impl From<&ServiceDescriptor> for ResolvedService {
    fn from(svc: &ServiceDescriptor) -> Self {
        Self {
            id: svc.id.clone(),
            name: svc.name.clone(),
            description: svc.description.clone(),
            url: svc.url(),
            port: svc.port,
            category: svc.category.clone(),
            location: svc.location,
            requires_auth: svc.requires_auth,
            env_vars: svc.env_vars.clone(),
        }
    }
}

/// Expand `profile_name` into the ordered list of services it may use.
///
/// `*` splices in every registry service without `requires_auth`, in registry
/// order, at its position in the list.  Literal ids missing from the registry
/// are skipped.  Duplicates are kept: a service named twice, or named and
/// also covered by `*`, appears twice.
pub fn resolve(
    profile_name: &str,
    registry: &Registry,
    profiles: &ProfileSet,
) -> Result<Vec<ResolvedService>, CatalogError> {
    let profile = profiles.require(profile_name)?;

    let mut out = Vec::new();
    for entry in &profile.services {
        match entry {
            ServiceRef::Wildcard => {
                out.extend(
                    registry
                        .iter()
                        .filter(|svc| !svc.requires_auth)
                        .map(ResolvedService::from),
                );
            }
            ServiceRef::Id(id) => match registry.get(id) {
                Some(svc) => out.push(ResolvedService::from(svc)),
                None => debug!(profile = profile_name, service = %id, "skipping unknown service"),
            },
        }
    }

    debug!(profile = profile_name, count = out.len(), "profile resolved");
    Ok(out)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
