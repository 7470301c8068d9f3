// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Registry document location, relative to the installation root.
pub const DEFAULT_REGISTRY_FILE: &str = "registry/services.yaml";
/// Access-profile document location, relative to the installation root.
pub const DEFAULT_PROFILES_FILE: &str = "profiles/access-profiles.yaml";
/// Service-manager executable, relative to the installation root.
pub const DEFAULT_MANAGER_SCRIPT: &str = "bin/mcp-manager";
/// Proxy binary launched (through `node`) for services on the workhorse host.
pub const DEFAULT_PROXY_PATH: &str = "/usr/local/bin/mcp-proxy";

fn default_true() -> bool {
    true
}
fn default_registry_file() -> String {
    DEFAULT_REGISTRY_FILE.into()
}
fn default_profiles_file() -> String {
    DEFAULT_PROFILES_FILE.into()
}
fn default_manager_script() -> String {
    DEFAULT_MANAGER_SCRIPT.into()
}
fn default_proxy_path() -> String {
    DEFAULT_PROXY_PATH.into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Installation root holding the registry and profile documents.
    ///
    /// When unset, `~/mcp-infra-manager` and then `/opt/mcp-infra-manager`
    /// are probed.  `~` and `$VARS` expand.
    #[serde(default)]
    pub base_path: Option<String>,
    /// Registry document, relative to `base_path` unless absolute.
    #[serde(default = "default_registry_file")]
    pub registry_file: String,
    /// Access-profile document, relative to `base_path` unless absolute.
    #[serde(default = "default_profiles_file")]
    pub profiles_file: String,
    /// Executable accepting `status <id>` / `start <id>`.
    #[serde(default = "default_manager_script")]
    pub manager_script: String,
    /// Proxy binary written into client configs for workhorse services.
    #[serde(default = "default_proxy_path")]
    pub proxy_path: String,
    #[serde(default)]
    pub prompt: PromptConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: None,
            registry_file: default_registry_file(),
            profiles_file: default_profiles_file(),
            manager_script: default_manager_script(),
            proxy_path: default_proxy_path(),
            prompt: PromptConfig::default(),
        }
    }
}

impl Config {
    /// Expanded `base_path`, if one is configured.
    pub fn base_path(&self) -> Option<PathBuf> {
        self.base_path.as_deref().map(|p| PathBuf::from(expand(p)))
    }

    pub fn registry_path(&self, base: &Path) -> PathBuf {
        join_expanded(base, &self.registry_file)
    }

    pub fn profiles_path(&self, base: &Path) -> PathBuf {
        join_expanded(base, &self.profiles_file)
    }

    pub fn manager_path(&self, base: &Path) -> PathBuf {
        join_expanded(base, &self.manager_script)
    }
}

/// How the prompt renderer treats categories outside the built-in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategories {
    /// Leave them out of the grouped prompt entirely
    #[default]
    Drop,
    /// Emit them after the built-in categories, in first-seen order
    Append,
}

impl std::fmt::Display for UnknownCategories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownCategories::Drop => write!(f, "drop"),
            UnknownCategories::Append => write!(f, "append"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Group services under `### <Category> Services` headings
    #[serde(default = "default_true")]
    pub group_by_category: bool,
    #[serde(default)]
    pub unknown_categories: UnknownCategories,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            group_by_category: true,
            unknown_categories: UnknownCategories::Drop,
        }
    }
}

/// Expand `~` and environment variables; unresolvable variables leave the
/// input untouched apart from the tilde.
pub fn expand(raw: &str) -> String {
    match shellexpand::full(raw) {
        Ok(s) => s.into_owned(),
        Err(_) => shellexpand::tilde(raw).into_owned(),
    }
}

fn join_expanded(base: &Path, rel: &str) -> PathBuf {
    let p = PathBuf::from(expand(rel));
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_paths_match_installation_layout() {
        let c = Config::default();
        assert_eq!(c.registry_file, "registry/services.yaml");
        assert_eq!(c.profiles_file, "profiles/access-profiles.yaml");
        assert_eq!(c.manager_script, "bin/mcp-manager");
        assert!(c.base_path.is_none());
    }

    #[test]
    fn config_default_proxy_path() {
        assert_eq!(Config::default().proxy_path, "/usr/local/bin/mcp-proxy");
    }

    #[test]
    fn config_default_prompt_groups_and_drops_unknown() {
        let c = Config::default();
        assert!(c.prompt.group_by_category);
        assert_eq!(c.prompt.unknown_categories, UnknownCategories::Drop);
    }

    #[test]
    fn relative_paths_join_base() {
        let c = Config::default();
        let base = Path::new("/srv/infra");
        assert_eq!(
            c.registry_path(base),
            PathBuf::from("/srv/infra/registry/services.yaml")
        );
        assert_eq!(
            c.manager_path(base),
            PathBuf::from("/srv/infra/bin/mcp-manager")
        );
    }

    #[test]
    fn absolute_paths_ignore_base() {
        let c = Config {
            profiles_file: "/etc/profiles.yaml".into(),
            ..Config::default()
        };
        assert_eq!(
            c.profiles_path(Path::new("/srv/infra")),
            PathBuf::from("/etc/profiles.yaml")
        );
    }

    #[test]
    fn base_path_tilde_expands() {
        let c = Config {
            base_path: Some("~/mcp-infra-manager".into()),
            ..Config::default()
        };
        let p = c.base_path().unwrap();
        assert!(!p.to_string_lossy().starts_with('~'));
        assert!(p.ends_with("mcp-infra-manager"));
    }

    #[test]
    fn unknown_variable_is_left_verbatim() {
        let out = expand("$MCP_INFRA_SURELY_UNSET_VAR/x");
        assert_eq!(out, "$MCP_INFRA_SURELY_UNSET_VAR/x");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let c: Config = toml::from_str("proxy_path = \"/opt/proxy\"\n").unwrap();
        assert_eq!(c.proxy_path, "/opt/proxy");
        assert_eq!(c.registry_file, DEFAULT_REGISTRY_FILE);
        assert!(c.prompt.group_by_category);
    }

    #[test]
    fn prompt_section_parses_unknown_category_mode() {
        let c: Config =
            toml::from_str("[prompt]\nunknown_categories = \"append\"\n").unwrap();
        assert_eq!(c.prompt.unknown_categories, UnknownCategories::Append);
        assert!(c.prompt.group_by_category, "omitted flag keeps its default");
    }

    #[test]
    fn config_serialises_to_valid_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("registry_file"));
        assert!(yaml.contains("unknown_categories: drop"));
    }

    #[test]
    fn unknown_categories_display() {
        assert_eq!(UnknownCategories::Drop.to_string(), "drop");
        assert_eq!(UnknownCategories::Append.to_string(), "append");
    }
}
