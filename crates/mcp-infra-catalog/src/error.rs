// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use thiserror::Error;

/// Which of the two declarative documents an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Registry,
    Profiles,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Registry => write!(f, "registry"),
            DocumentKind::Profiles => write!(f, "profiles"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("could not read {kind} document '{}': {source}", .path.display())]
    Io {
        kind: DocumentKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {kind} document ({origin}): {source}")]
    Parse {
        kind: DocumentKind,
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl CatalogError {
    pub fn is_profile_not_found(&self) -> bool {
        matches!(self, CatalogError::ProfileNotFound(_))
    }
}
