// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::profiles::{ProfileRule, ProfileSet, RuleCondition, DEFAULT_PROFILE};

/// Free-form facts about the caller's project (path, language, client, ...).
///
/// Only `project_path` has a fixed meaning; everything else is matched as
/// text through the context's rendered form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskContext(IndexMap<String, Value>);

impl TaskContext {
    pub const PROJECT_PATH: &'static str = "project_path";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// `project_path` when it is present and a string, else `""`.
    pub fn project_path(&self) -> &str {
        self.get(Self::PROJECT_PATH)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<IndexMap<String, Value>> for TaskContext {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for TaskContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Compact JSON rendering of every key and value; this is the text
/// `context_contains` keywords are searched in.
///
/// This differs from Python's `str(dict)` form: strings are quoted with `"`
/// rather than `'`, there is no space after `:` or `,`, and a missing value
/// renders as `null` rather than `None` (`none` once lower-cased).  Keywords
/// containing quotes, spaced separators or `none` match differently.
impl fmt::Display for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Pre-lowered inputs shared by every rule check.
struct Subject<'a> {
    project_path: &'a str,
    task: String,
    context: String,
}

impl RuleCondition {
    fn matches(&self, subject: &Subject<'_>) -> bool {
        if let Some(needle) = &self.project_path_contains {
            if subject.project_path.contains(needle.as_str()) {
                return true;
            }
        }
        if let Some(keywords) = &self.task_contains {
            if keywords.iter().any(|k| subject.task.contains(k.as_str())) {
                return true;
            }
        }
        if let Some(keywords) = &self.context_contains {
            if keywords.iter().any(|k| subject.context.contains(k.as_str())) {
                return true;
            }
        }
        self.default
    }
}

/// Pick a profile for `task` by walking `rules` in order; the first rule with
/// a matching condition wins.  Falls back to `"default"` without checking
/// that such a profile exists.
///
/// Keywords are compared against the lower-cased task and context as written,
/// so keywords containing upper-case letters never match.
pub fn select_profile<'a>(rules: &'a [ProfileRule], task: &str, context: &TaskContext) -> &'a str {
    let subject = Subject {
        project_path: context.project_path(),
        task: task.to_lowercase(),
        context: context.to_string().to_lowercase(),
    };

    for (index, rule) in rules.iter().enumerate() {
        if rule.condition.matches(&subject) {
            debug!(rule = index, profile = %rule.profile, "selection rule matched");
            return &rule.profile;
        }
    }

    debug!("no selection rule matched, using default profile");
    DEFAULT_PROFILE
}

impl ProfileSet {
    pub fn select(&self, task: &str, context: &TaskContext) -> &str {
        select_profile(&self.selection_rules, task, context)
    }
}

/// Parse a `KEY=VALUE` string into a context entry.
/// The key is trimmed; the value is kept verbatim after the first `=`.
pub fn parse_context_var(raw: &str) -> Option<(String, String)> {
    let (k, v) = raw.split_once('=')?;
    if k.trim().is_empty() {
        return None;
    }
    Some((k.trim().to_string(), v.to_string()))
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
