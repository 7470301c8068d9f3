// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! High-level access to an mcp-infra-manager installation.
//!
//! [`InfraClient`] locates the installation, loads its catalog into a
//! reloadable [`SharedCatalog`] and exposes every catalog query plus the
//! service manager script behind one handle.

mod manager;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use indexmap::IndexMap;
use mcp_infra_catalog::{
    Catalog, CatalogError, ClientConfig, Profile, PromptOptions, ResolvedService,
    ServiceDescriptor, SharedCatalog, TaskContext,
};
use mcp_infra_config::Config;
use tracing::{debug, info};

pub use manager::{ServiceManager, ServiceStatus};

/// Directories probed, in order, when no base path is configured.  The last
/// one is the installation holding the running binary.
pub fn install_candidates() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join("mcp-infra-manager"));
    }
    paths.push(PathBuf::from("/opt/mcp-infra-manager"));
    if let Some(own) = std::env::current_exe().ok().and_then(|exe| install_root_of(&exe)) {
        paths.push(own);
    }
    paths
}

/// `<install>` for an executable at `<install>/bin/<exe>`.
fn install_root_of(exe: &Path) -> Option<PathBuf> {
    exe.parent()?.parent().map(Path::to_path_buf)
}

/// First candidate that holds a registry document at `registry_file`.
pub fn find_installation(candidates: &[PathBuf], registry_file: &str) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|dir| dir.join(registry_file).is_file())
        .cloned()
}

pub struct InfraClient {
    base_path: PathBuf,
    registry_path: PathBuf,
    profiles_path: PathBuf,
    proxy_path: String,
    prompt: PromptOptions,
    catalog: SharedCatalog,
    manager: ServiceManager,
}

impl InfraClient {
    /// Open the installation named by `config.base_path`, or the first
    /// discovered one.
    pub fn open(config: &Config) -> anyhow::Result<Self> {
        let base = match config.base_path() {
            Some(base) => base,
            None => match find_installation(&install_candidates(), &config.registry_file) {
                Some(found) => found,
                None => bail!("could not find an mcp-infra-manager installation"),
            },
        };
        Self::open_at(&base, config)
    }

    /// Open the installation rooted at `base`.
    pub fn open_at(base: &Path, config: &Config) -> anyhow::Result<Self> {
        let registry_path = config.registry_path(base);
        let profiles_path = config.profiles_path(base);
        debug!(base = %base.display(), "opening installation");

        let catalog = Catalog::load(&registry_path, &profiles_path)
            .with_context(|| format!("failed to load catalog from {}", base.display()))?;

        info!(base = %base.display(), "installation opened");
        Ok(Self {
            base_path: base.to_path_buf(),
            registry_path,
            profiles_path,
            proxy_path: config.proxy_path.clone(),
            prompt: PromptOptions::from_config(&config.prompt),
            catalog: SharedCatalog::new(catalog),
            manager: ServiceManager::new(config.manager_path(base)),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn profiles_path(&self) -> &Path {
        &self.profiles_path
    }

    pub fn manager(&self) -> &ServiceManager {
        &self.manager
    }

    /// Snapshot of the loaded catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.get()
    }

    /// Re-read both documents.  The current catalog is kept when either fails.
    pub fn reload(&self) -> Result<(), CatalogError> {
        self.catalog.reload(&self.registry_path, &self.profiles_path)
    }

    /// Every registry entry in document order.
    pub fn list_services(&self) -> Vec<ServiceDescriptor> {
        self.catalog().registry().iter().cloned().collect()
    }

    pub fn list_profiles(&self) -> IndexMap<String, Profile> {
        self.catalog().profiles().profiles.clone()
    }

    pub fn services_for_profile(
        &self,
        profile: &str,
    ) -> Result<Vec<ResolvedService>, CatalogError> {
        self.catalog().resolve(profile)
    }

    /// Prompt section for `profile`; unknown categories follow configuration.
    pub fn prompt_section(
        &self,
        profile: &str,
        group_by_category: bool,
    ) -> Result<String, CatalogError> {
        let opts = PromptOptions {
            group_by_category,
            ..self.prompt
        };
        self.catalog().prompt_section(profile, &opts)
    }

    pub fn determine_profile(&self, task: &str, context: &TaskContext) -> String {
        self.catalog().select_profile(task, context).to_string()
    }

    pub fn client_config(&self, profile: &str) -> Result<ClientConfig, CatalogError> {
        self.catalog().client_config(profile, &self.proxy_path)
    }

    pub fn check_service_status(&self, service: &str) -> ServiceStatus {
        self.manager.status(service)
    }

    pub fn start_service(&self, service: &str) -> bool {
        self.manager.start(service)
    }

    /// Pick a profile for the task and render its grouped prompt section.
    pub fn prompt_for_task(
        &self,
        task: &str,
        context: &TaskContext,
    ) -> Result<String, CatalogError> {
        let profile = self.determine_profile(task, context);
        debug!(%profile, "prompt for task");
        self.prompt_section(&profile, true)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = "\
services:
  files:
    name: Files
    description: Project files
    port: 8101
    category: core
    command: run-files --root /srv
  notes:
    name: Notes
    description: Shared notes
    port: 8120
    category: ai-context
    location: workhorse
    requires_auth: true
";

    const PROFILES: &str = "\
profiles:
  default:
    services: ['*']
  writer:
    services: [notes, files]
selection_rules:
  - condition: {task_contains: [essay]}
    profile: writer
";

    fn install(dir: &Path) {
        std::fs::create_dir_all(dir.join("registry")).unwrap();
        std::fs::create_dir_all(dir.join("profiles")).unwrap();
        std::fs::write(dir.join("registry/services.yaml"), REGISTRY).unwrap();
        std::fs::write(dir.join("profiles/access-profiles.yaml"), PROFILES).unwrap();
    }

    fn open(dir: &Path) -> InfraClient {
        InfraClient::open_at(dir, &Config::default()).unwrap()
    }

    #[test]
    fn find_installation_requires_registry_file() {
        let empty = tempfile::tempdir().unwrap();
        let real = tempfile::tempdir().unwrap();
        install(real.path());
        let candidates = vec![empty.path().to_path_buf(), real.path().to_path_buf()];
        assert_eq!(
            find_installation(&candidates, mcp_infra_config::DEFAULT_REGISTRY_FILE),
            Some(real.path().to_path_buf())
        );
        assert_eq!(find_installation(&candidates[..1], "registry/services.yaml"), None);
    }

    #[test]
    fn candidates_end_with_executable_install_root() {
        let exe = std::env::current_exe().unwrap();
        let expected = exe.parent().unwrap().parent().unwrap().to_path_buf();
        assert_eq!(install_candidates().last(), Some(&expected));
    }

    #[test]
    fn installation_next_to_binary_is_found() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path());
        let exe = dir.path().join("bin").join("mcp-infra");
        let own = install_root_of(&exe).unwrap();
        assert_eq!(own, dir.path());

        let missing = tempfile::tempdir().unwrap();
        let candidates = vec![missing.path().join("mcp-infra-manager"), own];
        assert_eq!(
            find_installation(&candidates, mcp_infra_config::DEFAULT_REGISTRY_FILE),
            Some(dir.path().to_path_buf())
        );
    }

    #[test]
    fn open_uses_configured_base_path() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path());
        let config = Config {
            base_path: Some(dir.path().display().to_string()),
            ..Config::default()
        };
        let client = InfraClient::open(&config).unwrap();
        assert_eq!(client.base_path(), dir.path());
        assert_eq!(client.manager().script(), dir.path().join("bin/mcp-manager"));
    }

    #[test]
    fn open_fails_without_documents() {
        let dir = tempfile::tempdir().unwrap();
        let err = InfraClient::open_at(dir.path(), &Config::default()).err().unwrap();
        assert!(format!("{err:#}").contains("failed to load catalog"));
    }

    #[test]
    fn queries_go_through_the_catalog() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path());
        let client = open(dir.path());

        let ids: Vec<String> = client.list_services().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["files", "notes"]);
        let names: Vec<String> = client.list_profiles().into_keys().collect();
        assert_eq!(names, vec!["default", "writer"]);

        let default: Vec<String> = client
            .services_for_profile("default")
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(default, vec!["files"]);

        assert_eq!(client.determine_profile("Write an ESSAY", &TaskContext::new()), "writer");
        assert_eq!(client.determine_profile("other", &TaskContext::new()), "default");

        let prompt = client.prompt_for_task("essay draft", &TaskContext::new()).unwrap();
        assert!(prompt.contains("### Core Services"));
        assert!(prompt.contains("### Ai Context Services"));

        let flat = client.prompt_section("writer", false).unwrap();
        assert!(!flat.contains("###"));

        let cfg = client.client_config("writer").unwrap();
        assert_eq!(cfg.mcp_servers["notes"].args[0], mcp_infra_config::DEFAULT_PROXY_PATH);
        assert_eq!(cfg.mcp_servers["files"].args, vec!["--root", "/srv"]);

        assert!(client.services_for_profile("ghost").unwrap_err().is_profile_not_found());
    }

    #[test]
    fn reload_picks_up_changes_and_survives_errors() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path());
        let client = open(dir.path());

        std::fs::write(
            dir.path().join("profiles/access-profiles.yaml"),
            "profiles:\n  default: {services: [notes]}\n",
        )
        .unwrap();
        client.reload().unwrap();
        assert_eq!(client.list_profiles().len(), 1);

        std::fs::write(dir.path().join("registry/services.yaml"), "services: [").unwrap();
        assert!(client.reload().is_err());
        assert_eq!(client.list_services().len(), 2);
    }

    #[test]
    fn status_without_manager_script_is_not_running() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path());
        let client = open(dir.path());
        let status = client.check_service_status("files");
        assert!(!status.running);
        assert!(status.error.is_some());
        assert!(!client.start_service("files"));
    }
}
