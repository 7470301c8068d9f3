// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{debug, warn};

/// Result of asking the manager script whether a service runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub running: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Thin wrapper around the installation's `mcp-manager` script.
///
/// Exit status 0 means success for every sub-command; stdout is passed
/// through untouched.
#[derive(Debug, Clone)]
pub struct ServiceManager {
    script: PathBuf,
}

impl ServiceManager {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self { script: script.into() }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// `mcp-manager status <id>`.  A script that cannot be spawned is
    /// reported as not running with the spawn error attached.
    pub fn status(&self, service: &str) -> ServiceStatus {
        match self.run("status", service) {
            Ok(output) => ServiceStatus {
                service: service.to_string(),
                running: output.status.success(),
                output: String::from_utf8_lossy(&output.stdout).into_owned(),
                error: None,
            },
            Err(e) => ServiceStatus {
                service: service.to_string(),
                running: false,
                output: String::new(),
                error: Some(e.to_string()),
            },
        }
    }

    /// `mcp-manager start <id>`; true when the script exits with status 0.
    pub fn start(&self, service: &str) -> bool {
        match self.run("start", service) {
            Ok(output) => output.status.success(),
            Err(e) => {
                warn!(service, script = %self.script.display(), "could not run manager: {e}");
                false
            }
        }
    }

    fn run(&self, action: &str, service: &str) -> std::io::Result<std::process::Output> {
        debug!(script = %self.script.display(), action, service, "invoking service manager");
        Command::new(&self.script).arg(action).arg(service).output()
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_script_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = ServiceManager::new(dir.path().join("no-such-manager"));
        let status = mgr.status("memory");
        assert_eq!(status.service, "memory");
        assert!(!status.running);
        assert!(status.error.is_some());
        assert!(!mgr.start("memory"));
    }

    #[test]
    fn status_serializes_without_empty_fields() {
        let status = ServiceStatus {
            service: "git".into(),
            running: true,
            output: String::new(),
            error: None,
        };
        let v = serde_json::to_value(&status).unwrap();
        assert_eq!(v, serde_json::json!({"service": "git", "running": true}));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_drives_the_result() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("mcp-manager");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             case \"$1\" in\n\
               status) if [ \"$2\" = up ]; then echo \"$2 running\"; exit 0; fi; echo \"$2 stopped\"; exit 3 ;;\n\
               start) [ \"$2\" = up ] ;;\n\
               *) exit 64 ;;\n\
             esac\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mgr = ServiceManager::new(&script);
        let up = mgr.status("up");
        assert!(up.running);
        assert_eq!(up.output, "up running\n");
        assert!(up.error.is_none());

        let down = mgr.status("down");
        assert!(!down.running);
        assert_eq!(down.output, "down stopped\n");

        assert!(mgr.start("up"));
        assert!(!mgr.start("down"));
    }
}
