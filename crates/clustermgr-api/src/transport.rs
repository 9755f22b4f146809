// Transport configuration for building the reqwest::Client and base URL.
//
// `ConnectionConfig` carries the knobs a caller supplies (host, port,
// credentials, TLS flag, API version); `TransportConfig` carries the
// HTTP-level settings (trust roots, timeout, cookie jar).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;

/// Newest API version this SDK knows how to speak.
pub const API_CURRENT_VERSION: u32 = 19;

/// Default plaintext port.
pub const DEFAULT_HTTP_PORT: u16 = 7180;

/// Default TLS port.
pub const DEFAULT_HTTPS_PORT: u16 = 7183;

const USER_AGENT: &str = concat!("clustermgr/", env!("CARGO_PKG_VERSION"));

/// Trust roots used when TLS is enabled.
///
/// Certificate validation is always on; there is no "accept anything" mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the built-in root store.
    #[default]
    System,
    /// Trust only the certificates in the given PEM bundle file.
    CustomCa(PathBuf),
    /// Trust only the certificates in the given in-memory PEM bundle.
    CustomCaPem(Vec<u8>),
}

/// HTTP-level settings shared by every request on a transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Default per-request deadline. Individual calls may override it.
    pub timeout: Duration,
    /// Session cookie store. Created on demand if absent.
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        let bundle = match &self.tls {
            TlsMode::System => None,
            TlsMode::CustomCa(path) => Some(
                std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA bundle: {e}")))?,
            ),
            TlsMode::CustomCaPem(pem) => Some(pem.clone()),
        };

        if let Some(pem) = bundle {
            let certs = reqwest::Certificate::from_pem_bundle(&pem)
                .map_err(|e| Error::Tls(format!("invalid CA bundle: {e}")))?;
            if certs.is_empty() {
                return Err(Error::Tls("CA bundle contains no certificates".into()));
            }
            builder = builder.tls_built_in_root_certs(false);
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }
}

/// Everything needed to reach one Cluster Manager server.
///
/// The resulting base URL is `<scheme>://<host>:<port>/api/v<version>`
/// and never changes for the life of the transport built from it.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    /// Explicit port; `None` selects 7180 or 7183 depending on `use_tls`.
    pub port: Option<u16>,
    pub credentials: Credentials,
    pub use_tls: bool,
    pub version: u32,
    pub transport: TransportConfig,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            credentials: Credentials::default(),
            use_tls: false,
            version: API_CURRENT_VERSION,
            transport: TransportConfig::default(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Credentials::new(username, password);
        self
    }

    pub fn use_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn tls(mut self, tls: TlsMode) -> Self {
        self.transport.tls = tls;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }

    /// The port actually used: explicit, or the scheme default.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.use_tls {
            DEFAULT_HTTPS_PORT
        } else {
            DEFAULT_HTTP_PORT
        })
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_tls { "https" } else { "http" }
    }

    /// Assemble `<scheme>://<host>:<port>/api/v<version>/`.
    ///
    /// The trailing slash lets relative paths be joined onto it.
    pub fn base_url(&self) -> Result<Url, Error> {
        if self.version == 0 {
            return Err(Error::InvalidConfig {
                message: "API version must be a positive integer".into(),
            });
        }
        let host = self.host.trim();
        if host.is_empty() {
            return Err(Error::InvalidConfig {
                message: "server host must not be empty".into(),
            });
        }
        // Bare IPv6 literals need brackets inside a URL authority.
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_owned()
        };
        let raw = format!(
            "{}://{host}:{}/api/v{}/",
            self.scheme(),
            self.effective_port(),
            self.version
        );
        Ok(Url::parse(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_defaults_to_7180() {
        let cfg = ConnectionConfig::new("cm.example.com");
        assert_eq!(
            cfg.base_url().map(String::from).ok().as_deref(),
            Some("http://cm.example.com:7180/api/v19/")
        );
    }

    #[test]
    fn tls_defaults_to_7183() {
        let cfg = ConnectionConfig::new("cm.example.com")
            .use_tls(true)
            .version(6);
        assert_eq!(cfg.effective_port(), DEFAULT_HTTPS_PORT);
        assert_eq!(
            cfg.base_url().map(String::from).ok().as_deref(),
            Some("https://cm.example.com:7183/api/v6/")
        );
    }

    #[test]
    fn explicit_port_wins() {
        let cfg = ConnectionConfig::new("10.0.0.5").use_tls(true).port(8443);
        assert_eq!(cfg.effective_port(), 8443);
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let cfg = ConnectionConfig::new("::1").version(3);
        assert_eq!(
            cfg.base_url().map(String::from).ok().as_deref(),
            Some("http://[::1]:7180/api/v3/")
        );
    }

    #[test]
    fn version_zero_is_rejected() {
        let err = ConnectionConfig::new("cm").version(0).base_url();
        assert!(matches!(err, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn empty_ca_bundle_is_rejected() {
        let cfg = TransportConfig {
            tls: TlsMode::CustomCaPem(b"not a certificate".to_vec()),
            ..TransportConfig::default()
        };
        assert!(matches!(cfg.build_client(), Err(Error::Tls(_))));
    }
}
