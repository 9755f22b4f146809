//! CLI error types with miette diagnostics.
//!
//! Maps SDK and config errors into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use clustermgr_config::ConfigError;
use clustermgr_core::{Error as CoreError, ErrorKind};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Cluster Manager")]
    #[diagnostic(
        code(cmctl::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Ports default to 7180 (HTTP) and 7183 (--tls)."
        )
    )]
    ConnectionFailed {
        #[source]
        source: CoreError,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(cmctl::auth_failed),
        help(
            "Verify the username and password for this profile.\n\
             The password can also be supplied through CMCTL_PASSWORD."
        )
    )]
    AuthFailed {
        #[source]
        source: CoreError,
    },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(cmctl::no_credentials),
        help("Set password_env or password in the profile, or export CMCTL_PASSWORD.")
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(code(cmctl::not_found))]
    NotFound { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(cmctl::api_error))]
    Api(#[source] CoreError),

    // ── Version gate ─────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(
        code(cmctl::version),
        help("Pass a newer --api-version, or set `version` in the profile.")
    )]
    Version(#[source] CoreError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(
        code(cmctl::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout(#[source] CoreError),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(cmctl::profile_not_found),
        help("Expected in: {path}\nOr pass --host to connect without a profile.")
    )]
    ProfileNotFound { name: String, path: String },

    #[error(transparent)]
    #[diagnostic(code(cmctl::config))]
    Config(ConfigError),

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cmctl::validation))]
    Validation { field: String, reason: String },

    // ── Command outcome ──────────────────────────────────────────────
    #[error("Command {id} failed: {message}")]
    #[diagnostic(code(cmctl::command_failed))]
    CommandFailed { id: i64, message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        if matches!(err, CoreError::VersionMismatch { .. }) {
            return Self::Version(err);
        }
        if err.is_not_found() {
            return Self::NotFound {
                message: err
                    .api_message()
                    .map_or_else(|| err.to_string(), str::to_owned),
            };
        }
        match err.kind() {
            ErrorKind::Authentication => Self::AuthFailed { source: err },
            ErrorKind::Connectivity => Self::ConnectionFailed { source: err },
            ErrorKind::Timeout => Self::Timeout(err),
            ErrorKind::Configuration => Self::Validation {
                field: "request".into(),
                reason: err.to_string(),
            },
            ErrorKind::Api | ErrorKind::Protocol => Self::Api(err),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::UnknownProfile(name) => Self::ProfileNotFound {
                name,
                path: clustermgr_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout(_) => exit_code::TIMEOUT,
            Self::Version(_)
            | Self::ProfileNotFound { .. }
            | Self::Config(_)
            | Self::Validation { .. } => exit_code::USAGE,
            Self::Api(_) | Self::CommandFailed { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn version_gate_is_a_usage_error() {
        let err: CliError = CoreError::VersionMismatch {
            operation: "get_cluster_hosts".into(),
            required: 3,
            actual: 1,
        }
        .into();
        assert!(matches!(err, CliError::Version(_)));
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn not_found_carries_server_message() {
        let err: CliError = CoreError::Api {
            status: 404,
            message: "Cluster 'x' not found.".into(),
            method: "GET".into(),
            url: "http://cm:7180/api/v19/clusters/x".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "Not found: Cluster 'x' not found.");
    }

    #[test]
    fn auth_and_timeout_codes() {
        let auth: CliError = CoreError::Authentication {
            method: "GET".into(),
            url: "u".into(),
            realm: Some("Cluster Manager".into()),
            message: "Unauthorized".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let timeout: CliError = CoreError::Timeout {
            method: "GET".into(),
            url: "u".into(),
            elapsed: Duration::from_secs(30),
        }
        .into();
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn missing_password_maps_to_auth() {
        let err: CliError = ConfigError::NoCredentials {
            profile: "lab".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
