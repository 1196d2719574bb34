// crates/core/src/onboarding.rs
//! Project onboarding: path validation and status derivation.
//!
//! Onboarding registers a filesystem path as a tracked project. The checks
//! are plain stat calls; what matters is the derivation table:
//!
//! | path valid | .claude exists | project status |
//! |------------|----------------|----------------|
//! | true       | true           | active         |
//! | true       | false          | onboarding     |
//! | false      | *              | pending        |

use crate::types::ProjectStatus;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use ts_rs::TS;

/// Marker subdirectory that identifies a managed codebase.
pub const CLAUDE_MARKER_DIR: &str = ".claude";

/// Result of validating a proposed project path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct PathValidation {
    pub path_validated: bool,
    pub claude_dir_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_error: Option<String>,
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Lexically normalize a path: drop `.` components and fold `..` where a
/// parent component is available. No filesystem access.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Validate a proposed project path: tilde-expand, normalize, check that it
/// exists and is a directory, and probe for the `.claude` marker.
pub fn validate_project_path(raw_path: &str) -> (PathBuf, PathValidation) {
    let path = normalize_path(&expand_tilde(raw_path));

    let path_validated = path.is_dir();
    let path_error = if path_validated {
        None
    } else if !path.exists() {
        Some("Path does not exist".to_string())
    } else {
        Some("Path is not a directory".to_string())
    };

    let claude_dir_exists = path_validated && path.join(CLAUDE_MARKER_DIR).is_dir();

    (
        path,
        PathValidation {
            path_validated,
            claude_dir_exists,
            path_error,
        },
    )
}

/// Derive the initial project status from path validation results.
pub fn derive_project_status(validation: &PathValidation) -> ProjectStatus {
    match (validation.path_validated, validation.claude_dir_exists) {
        (true, true) => ProjectStatus::Active,
        (true, false) => ProjectStatus::Onboarding,
        (false, _) => ProjectStatus::Pending,
    }
}

/// Derive a URL-safe slug from a project name: lowercase, spaces and
/// underscores become hyphens, everything else non-alphanumeric is dropped,
/// runs of hyphens collapse.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress leading hyphens
    for c in name.to_lowercase().chars() {
        let mapped = match c {
            ' ' | '_' | '-' => Some('-'),
            c if c.is_ascii_alphanumeric() => Some(c),
            _ => None,
        };
        match mapped {
            Some('-') => {
                if !last_was_hyphen {
                    slug.push('-');
                    last_was_hyphen = true;
                }
            }
            Some(c) => {
                slug.push(c);
                last_was_hyphen = false;
            }
            None => {}
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
