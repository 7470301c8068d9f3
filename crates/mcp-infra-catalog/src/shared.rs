// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Reloadable handle to the current [`Catalog`].
//!
//! [`SharedCatalog`] wraps `Arc<RwLock<Arc<Catalog>>>`: readers take a cheap
//! snapshot with [`get`][SharedCatalog::get] and keep a consistent view for
//! as long as they hold it, while [`reload`][SharedCatalog::reload] swaps in a
//! completely new catalog.  Documents are never merged into the old one.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::catalog::Catalog;
use crate::error::CatalogError;

#[derive(Clone, Default)]
pub struct SharedCatalog(Arc<RwLock<Arc<Catalog>>>);

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(catalog))))
    }

    /// Snapshot of the catalog installed right now.
    #[must_use]
    pub fn get(&self) -> Arc<Catalog> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically replace the catalog.
    pub fn set(&self, catalog: Catalog) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(catalog);
    }

    /// Load both documents again and install the result.  On failure the
    /// previous catalog stays in place.
    pub fn reload(&self, registry_path: &Path, profiles_path: &Path) -> Result<(), CatalogError> {
        let fresh = Catalog::load(registry_path, profiles_path)?;
        self.set(fresh);
        info!("catalog reloaded");
        Ok(())
    }
}

impl std::fmt::Debug for SharedCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snap = self.get();
        write!(
            f,
            "SharedCatalog({} services, {} profiles)",
            snap.registry().len(),
            snap.profiles().profiles.len()
        )
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn write_docs(
        dir: &Path,
        registry: &str,
        profiles: &str,
    ) -> (std::path::PathBuf, std::path::PathBuf) {
        let r = dir.join("services.yaml");
        let p = dir.join("profiles.yaml");
        std::fs::write(&r, registry).unwrap();
        std::fs::write(&p, profiles).unwrap();
        (r, p)
    }

    #[test]
    fn reload_replaces_whole_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let (r, p) = write_docs(
            dir.path(),
            "services:\n  a: {name: A, description: d, port: 1}\n  b: {name: B, description: d, port: 2}\n",
            "profiles:\n  default: {services: ['*']}\n",
        );
        let shared = SharedCatalog::new(Catalog::load(&r, &p).unwrap());
        let before = shared.get();
        assert_eq!(before.registry().len(), 2);

        write_docs(
            dir.path(),
            "services:\n  c: {name: C, description: d, port: 3}\n",
            "profiles:\n  default: {services: ['*']}\n",
        );
        shared.reload(&r, &p).unwrap();

        let after = shared.get();
        let ids: Vec<&str> = after.registry().ids().collect();
        assert_eq!(ids, vec!["c"], "reload must replace, not merge");
        assert_eq!(before.registry().len(), 2, "old snapshot stays intact");
    }

    #[test]
    fn failed_reload_keeps_previous_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let (r, p) = write_docs(
            dir.path(),
            "services:\n  a: {name: A, description: d, port: 1}\n",
            "profiles:\n  default: {services: ['*']}\n",
        );
        let shared = SharedCatalog::new(Catalog::load(&r, &p).unwrap());

        std::fs::write(&p, "profiles: [broken\n").unwrap();
        assert!(shared.reload(&r, &p).is_err());
        assert_eq!(shared.get().registry().len(), 1);
        assert!(shared.get().profiles().has_default());
    }

    #[test]
    fn clones_observe_the_same_catalog() {
        let shared = SharedCatalog::default();
        let other = shared.clone();
        assert!(other.get().registry().is_empty());
        shared.set(Catalog::new(
            crate::Registry::from_yaml("services:\n  a: {name: A, description: d, port: 1}\n")
                .unwrap(),
            crate::ProfileSet::default(),
        ));
        assert_eq!(other.get().registry().len(), 1);
    }
}
