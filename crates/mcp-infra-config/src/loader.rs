// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Ordered list of config file locations searched from lowest to highest priority.
/// Later files override earlier ones.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("/etc/mcp-infra/config.toml"));

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/mcp-infra/config.toml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("mcp-infra/config.toml"));
    }

    paths.push(PathBuf::from(".mcp-infra/config.toml"));
    paths.push(PathBuf::from("mcp-infra.toml"));

    paths
}

/// Load configuration by merging all discovered TOML files.
/// The `extra` argument may provide an explicit path (e.g. `--config` CLI flag).
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in config_search_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            merge_toml(&mut merged, read_layer(&path)?);
        }
    }

    if let Some(p) = extra {
        debug!(path = %p.display(), "loading explicit config");
        merge_toml(&mut merged, read_layer(p)?);
    }

    let config: Config = merged.try_into().context("invalid configuration")?;
    Ok(config)
}

fn read_layer(path: &Path) -> anyhow::Result<toml::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Deep-merge `src` into `dst`; src wins on scalar conflicts.
fn merge_toml(dst: &mut toml::Value, src: toml::Value) {
    match (dst, src) {
        (toml::Value::Table(d), toml::Value::Table(s)) => {
            for (k, v) in s {
                let entry = d.entry(k).or_insert(toml::Value::Table(toml::map::Map::new()));
                merge_toml(entry, v);
            }
        }
        (dst, src) => *dst = src,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnknownCategories;

    fn val(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn search_order_is_system_then_user_then_project() {
        let paths = config_search_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("/etc/mcp-infra/config.toml")));
        assert_eq!(paths.last(), Some(&PathBuf::from("mcp-infra.toml")));

        let project = paths
            .iter()
            .position(|p| p == Path::new(".mcp-infra/config.toml"))
            .unwrap();
        assert_eq!(project, paths.len() - 2);
        assert!(paths[..project]
            .iter()
            .skip(1)
            .all(|p| p.is_absolute() && p.ends_with("mcp-infra/config.toml")));
    }

    #[test]
    fn merge_scalar_src_wins() {
        let mut dst = val(r#"proxy_path = "/a""#);
        merge_toml(&mut dst, val(r#"proxy_path = "/b""#));
        assert_eq!(dst["proxy_path"].as_str(), Some("/b"));
    }

    #[test]
    fn merge_preserves_keys_not_in_src() {
        let mut dst = val("base_path = \"/srv\"\nproxy_path = \"/a\"");
        merge_toml(&mut dst, val(r#"proxy_path = "/b""#));
        assert_eq!(dst["base_path"].as_str(), Some("/srv"));
        assert_eq!(dst["proxy_path"].as_str(), Some("/b"));
    }

    #[test]
    fn merge_nested_tables() {
        let mut dst = val("[prompt]\ngroup_by_category = false\nunknown_categories = \"drop\"");
        merge_toml(&mut dst, val("[prompt]\nunknown_categories = \"append\""));
        assert_eq!(dst["prompt"]["group_by_category"].as_bool(), Some(false));
        assert_eq!(dst["prompt"]["unknown_categories"].as_str(), Some("append"));
    }

    #[test]
    fn load_fails_for_missing_explicit_path() {
        let result = load(Some(Path::new("/tmp/mcp_infra_nonexistent_config_xyz.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn load_explicit_file_overrides_defaults() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            "base_path = \"/srv/mcp\"\n[prompt]\nunknown_categories = \"append\""
        )
        .unwrap();
        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.base_path.as_deref(), Some("/srv/mcp"));
        assert_eq!(cfg.prompt.unknown_categories, UnknownCategories::Append);
        assert_eq!(cfg.registry_file, crate::DEFAULT_REGISTRY_FILE);
    }

    #[test]
    fn load_rejects_wrongly_typed_values() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[prompt]\ngroup_by_category = \"yes please\"").unwrap();
        assert!(load(Some(f.path())).is_err());
    }
}
