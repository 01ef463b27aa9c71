//! Failure kinds surfaced by resolution and transactions.
//!
//! Per-package kinds are collected as warnings by the planner and engine;
//! only `EnvironmentNotInitialized`, `UnsupportedCore` and
//! `NoResolvablePackages` end the process.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PacmineError {
    #[error("Environment not initialized ({path:?} is missing). Run `pacmine init` first.")]
    EnvironmentNotInitialized { path: PathBuf },

    #[error("Unsupported core '{0}'. Expected one of: {1}")]
    UnsupportedCore(String, String),

    #[error("Registry unavailable for '{query}': {reason}")]
    CatalogUnavailable { query: String, reason: String },

    #[error("No package matches '{query}'")]
    CatalogEmpty { query: String },

    #[error("'{name}' has no release compatible with {runtime_version}")]
    NoCompatibleVersion {
        name: String,
        runtime_version: String,
    },

    #[error("A required dependency of '{parent}' has no project id, skipping it")]
    DependencyUnidentified { parent: String },

    #[error("No installed package matches '{query}'")]
    NotInstalled { query: String },

    /// Every request was skipped; `reasons` holds why, in request order.
    #[error("No package could be resolved{}", skip_summary(.reasons))]
    NoResolvablePackages { reasons: Vec<PacmineError> },

    #[error("'{name}' has an unusable artifact: {reason}")]
    InvalidArtifact { name: String, reason: String },

    #[error("Failed to write {filename}: {reason}")]
    ArtifactWriteFailed { filename: String, reason: String },
}

fn skip_summary(reasons: &[PacmineError]) -> String {
    if reasons.is_empty() {
        return String::new();
    }
    let reasons: Vec<String> = reasons.iter().map(|r| r.to_string()).collect();
    format!(": {}", reasons.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_subject() {
        let err = PacmineError::NoCompatibleVersion {
            name: "LuminaCore".into(),
            runtime_version: "1.20.1".into(),
        };
        assert_eq!(
            err.to_string(),
            "'LuminaCore' has no release compatible with 1.20.1"
        );

        let err = PacmineError::EnvironmentNotInitialized {
            path: PathBuf::from(".pacmine/env"),
        };
        assert!(err.to_string().contains("pacmine init"));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = PacmineError::NoResolvablePackages { reasons: vec![] }.into();
        assert!(matches!(
            err.downcast_ref::<PacmineError>(),
            Some(PacmineError::NoResolvablePackages { .. })
        ));
        assert_eq!(err.to_string(), "No package could be resolved");
    }

    #[test]
    fn test_no_resolvable_packages_lists_reasons() {
        let err = PacmineError::NoResolvablePackages {
            reasons: vec![
                PacmineError::CatalogEmpty {
                    query: "ghost".into(),
                },
                PacmineError::NoCompatibleVersion {
                    name: "LuminaCore".into(),
                    runtime_version: "1.20.1".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "No package could be resolved: No package matches 'ghost'; \
             'LuminaCore' has no release compatible with 1.20.1"
        );
    }
}
