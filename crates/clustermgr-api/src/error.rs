use std::time::Duration;

use thiserror::Error;

/// Coarse classification of an [`Error`].
///
/// Callers that only care about *what went wrong* (and not the exact
/// variant) branch on this instead of matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments, schema violations, version gate. Raised before I/O.
    Configuration,
    /// DNS, connect, TLS handshake, read/write failure.
    Connectivity,
    /// HTTP 401 from the server.
    Authentication,
    /// 4xx/5xx carrying a server message (or an undecodable error body).
    Api,
    /// 2xx whose body does not match what was expected.
    Protocol,
    /// A per-call deadline expired.
    Timeout,
}

/// Top-level error type for the Cluster Manager SDK.
///
/// Covers every failure mode of the transport and of the serialization
/// framework layered on top of it. `clustermgr-core` returns this type
/// unchanged.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Invalid constructor arguments.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Trust roots could not be loaded or the HTTP client could not be built.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Attribute name not declared in the entity's schema.
    #[error("Invalid property {attribute} for {entity}")]
    UnknownAttribute {
        entity: &'static str,
        attribute: String,
    },

    /// Attempt to assign a read-only attribute.
    #[error("Attribute {attribute} of {entity} is read only")]
    ReadOnlyAttribute {
        entity: &'static str,
        attribute: String,
    },

    /// Value does not match the attribute's declared kind.
    #[error("Attribute {attribute} of {entity} expects {expected}")]
    InvalidValue {
        entity: &'static str,
        attribute: String,
        expected: String,
    },

    /// No reference type is registered under the derived name.
    #[error("Unknown reference type {name} (from field {field})")]
    UnknownReference { name: String, field: String },

    /// Entity has no live transport to navigate with.
    #[error("{entity} is not bound to a live API client")]
    Detached { entity: &'static str },

    /// Operation requires a newer server API than the client speaks.
    #[error(
        "{operation} requires API version {required}, but the client is using version {actual}"
    )]
    VersionMismatch {
        operation: String,
        required: u32,
        actual: u32,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, TLS handshake, broken pipe, ...
    #[error("{method} {url}: connection failed: {source}")]
    Connectivity {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request deadline expired.
    #[error("{method} {url}: timed out after {elapsed:?}")]
    Timeout {
        method: String,
        url: String,
        elapsed: Duration,
    },

    // ── Server responses ────────────────────────────────────────────
    /// HTTP 401. Surfaced verbatim, never retried.
    #[error("{method} {url}: authentication failed: {message}")]
    Authentication {
        method: String,
        url: String,
        realm: Option<String>,
        message: String,
    },

    /// Error body with a decodable `message` field.
    #[error("{method} {url}: API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        method: String,
        url: String,
    },

    /// Error status whose body is not the standard error envelope.
    #[error("{method} {url}: HTTP {status}: {body}")]
    Http {
        status: u16,
        body: String,
        method: String,
        url: String,
    },

    /// Successful status whose body could not be decoded as expected.
    #[error("Protocol error: {message}")]
    Protocol { message: String, body: String },
}

impl Error {
    /// Which of the SDK's error kinds this variant belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig { .. }
            | Self::InvalidUrl(_)
            | Self::Tls(_)
            | Self::UnknownAttribute { .. }
            | Self::ReadOnlyAttribute { .. }
            | Self::InvalidValue { .. }
            | Self::UnknownReference { .. }
            | Self::Detached { .. }
            | Self::VersionMismatch { .. } => ErrorKind::Configuration,
            Self::Connectivity { .. } => ErrorKind::Connectivity,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Api { .. } | Self::Http { .. } => ErrorKind::Api,
            Self::Protocol { .. } => ErrorKind::Protocol,
        }
    }

    /// The HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Authentication { .. } => Some(401),
            _ => None,
        }
    }

    /// Server-provided message for API errors.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns `true` for HTTP 401.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the failure happened below HTTP and a retry by the
    /// caller might succeed. The SDK itself never retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connectivity { source, .. } => source.is_connect() || source.is_timeout(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } | Self::Http { status, .. } => {
                matches!(status, 502..=504)
            }
            _ => false,
        }
    }
}
