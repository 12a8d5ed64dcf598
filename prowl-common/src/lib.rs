//! Common types and utilities shared across Prowl crates.
//!
//! This crate defines the runtime settings, the identity types, observability
//! helpers, and the shared error taxonomy used throughout the Prowl
//! workspace. It stays dependency‑light so every crate can depend on it.
//!
//! # Overview
//!
//! - [`settings`]: Browser, session and site settings (timeouts, locale)
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`ProwlError`] and [`Result`]: Hard errors surfaced to callers
//! - [`Identity`] and [`Credentials`]: Who a browser session belongs to
//!
//! # Examples
//!
//! ```rust
//! use prowl_common::{Identity, settings::SiteSettings};
//!
//! let identity = Identity::new("someone@example.com");
//! let site = SiteSettings::default();
//! assert_eq!(identity.username(), "someone@example.com");
//! assert_eq!(site.max_pages, 100);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod observability;
pub mod settings;

/// Lookup key into the session store. Carries no authentication by itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// Login credentials. `Debug` never prints the password.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.username.clone())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Top-level operations exposed to callers; named in every hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Login,
    SearchJobs,
    GetJobPosting,
    GetCompany,
    GetRecruiter,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Login => "login",
            Operation::SearchJobs => "search_jobs",
            Operation::GetJobPosting => "get_job_posting",
            Operation::GetCompany => "get_company",
            Operation::GetRecruiter => "get_recruiter",
        };
        f.write_str(name)
    }
}

/// Hard errors. A missing optional field is never one of these.
#[derive(thiserror::Error, Debug)]
pub enum ProwlError {
    /// The browser process (or WebDriver session) could not be started.
    #[error("browser launch failed for {identity}: {source}")]
    Launch {
        identity: Identity,
        #[source]
        source: anyhow::Error,
    },

    /// A page could not be reached or a required container never appeared.
    #[error("{operation} for {identity} failed at {stage}: {source}")]
    Navigation {
        operation: Operation,
        identity: Identity,
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A search-result card had no usable job id.
    #[error("{operation} for {identity}: unusable listing card id ({detail})")]
    JoinKey {
        operation: Operation,
        identity: Identity,
        detail: String,
    },

    /// The login sequence did not complete; nothing was persisted.
    #[error("login for {identity} failed at {stage}: {source}")]
    Login {
        identity: Identity,
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A session file could not be written.
    #[error("session store write failed for {path}: {source}")]
    Store {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProwlError {
    /// Adapter for `map_err` that wraps a driver error as a navigation failure.
    pub fn navigation(
        operation: Operation,
        identity: &Identity,
        stage: &'static str,
    ) -> impl FnOnce(anyhow::Error) -> ProwlError {
        let identity = identity.clone();
        move |source| ProwlError::Navigation {
            operation,
            identity,
            stage,
            source,
        }
    }

    /// Adapter for `map_err` that wraps a driver error as a login failure.
    pub fn login(identity: &Identity, stage: &'static str) -> impl FnOnce(anyhow::Error) -> ProwlError {
        let identity = identity.clone();
        move |source| ProwlError::Login {
            identity,
            stage,
            source,
        }
    }

    /// Name of the stage that failed, when the variant carries one.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            ProwlError::Navigation { stage, .. } | ProwlError::Login { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

/// Convenient alias for results that use [`ProwlError`].
pub type Result<T> = std::result::Result<T, ProwlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("a@b.c", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("a@b.c"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn navigation_error_names_operation_identity_and_stage() {
        let err = ProwlError::Navigation {
            operation: Operation::GetCompany,
            identity: Identity::new("someone"),
            stage: "open company page",
            source: anyhow::anyhow!("net::ERR_NAME_NOT_RESOLVED"),
        };
        let msg = err.to_string();
        assert!(msg.contains("get_company"));
        assert!(msg.contains("someone"));
        assert!(msg.contains("open company page"));
        assert_eq!(err.stage(), Some("open company page"));
    }
}
