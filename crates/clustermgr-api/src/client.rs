// Cluster Manager HTTP client
//
// Wraps `reqwest::Client` with base-URL construction, preemptive basic
// auth, a shared cookie jar, and translation of HTTP failures into typed
// errors. Resource paths and JSON shapes are handled a layer up.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::Method;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, trace};
use url::Url;

use crate::auth::{Credentials, challenge_realm};
use crate::body::{Body, Params};
use crate::error::Error;
use crate::transport::ConnectionConfig;

/// Error envelope returned by the server on 4xx/5xx.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// One fully-specified HTTP exchange, relative to the API base URL.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Path below `/api/v<N>/`, without a leading separator.
    pub path: String,
    pub params: Params,
    pub body: Option<Body>,
    pub headers: HeaderMap,
    /// Overrides the transport's default deadline for this call only.
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::new(),
            body: None,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }
}

/// Authenticated HTTP transport for one Cluster Manager server.
///
/// Holds the immutable base URL and API version, the credentials, and a
/// cookie jar shared by every request so session cookies issued after the
/// first authenticated call are replayed. Safe to share behind an `Arc`.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    version: u32,
    credentials: Credentials,
    cookie_jar: Arc<Jar>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("version", &self.version)
            .field("username", &self.credentials.username)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Build a transport from a connection config. Performs no I/O.
    pub fn new(config: &ConnectionConfig) -> Result<Self, Error> {
        let base_url = config.base_url()?;
        let transport = if config.transport.cookie_jar.is_some() {
            config.transport.clone()
        } else {
            config.transport.clone().with_cookie_jar()
        };
        let cookie_jar = transport
            .cookie_jar
            .clone()
            .unwrap_or_else(|| Arc::new(Jar::default()));
        let http = transport.build_client()?;
        debug!(%base_url, "created API client");
        Ok(Self {
            http,
            base_url,
            version: config.version,
            credentials: config.credentials.clone(),
            cookie_jar,
        })
    }

    /// `<scheme>://<host>:<port>/api/v<version>/`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// API version baked into the base URL.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// The `Cookie` header the next request will carry, if any.
    pub fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookie_jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    /// Join a relative path onto the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Perform the exchange and return the response if its status is 2xx.
    pub async fn execute(&self, spec: RequestSpec) -> Result<reqwest::Response, Error> {
        let url = self.url(&spec.path)?;
        let method = spec.method.clone();
        debug!("{method} {url}");

        let mut builder = self.http.request(spec.method, url.clone());
        if !spec.params.is_empty() {
            builder = builder.query(spec.params.as_slice());
        }
        builder = self.credentials.apply(builder).headers(spec.headers);
        if let Some(timeout) = spec.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = spec.body {
            let content_type = body.content_type();
            let bytes = body.into_bytes().map_err(|e| Error::InvalidConfig {
                message: format!("failed to encode request body: {e}"),
            })?;
            let header = HeaderValue::from_str(&content_type).map_err(|e| Error::InvalidConfig {
                message: format!("invalid content type {content_type:?}: {e}"),
            })?;
            builder = builder.header(CONTENT_TYPE, header).body(bytes);
        }

        let started = Instant::now();
        let resp = builder
            .send()
            .await
            .map_err(|e| transport_error(&method, &url, started, e))?;

        if resp.headers().contains_key(reqwest::header::SET_COOKIE) {
            trace!("server issued session cookie");
        }

        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(Self::parse_error(&method, &url, started, resp).await)
        }
    }

    /// Perform the exchange and decode the body as JSON.
    ///
    /// An empty 2xx body yields `Value::Null`.
    pub async fn execute_json(&self, spec: RequestSpec) -> Result<serde_json::Value, Error> {
        let method = spec.method.clone();
        let started = Instant::now();
        let resp = self.execute(spec).await?;
        let url = resp.url().clone();
        let body = resp
            .text()
            .await
            .map_err(|e| transport_error(&method, &url, started, e))?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Protocol {
                message: format!("{method} {url}: invalid JSON: {e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Perform the exchange and return the body as text (logs, downloads).
    pub async fn execute_text(&self, spec: RequestSpec) -> Result<String, Error> {
        let method = spec.method.clone();
        let started = Instant::now();
        let resp = self.execute(spec).await?;
        let url = resp.url().clone();
        resp.text()
            .await
            .map_err(|e| transport_error(&method, &url, started, e))
    }

    /// Perform the exchange and return the raw body bytes.
    pub async fn execute_bytes(&self, spec: RequestSpec) -> Result<Bytes, Error> {
        let method = spec.method.clone();
        let started = Instant::now();
        let resp = self.execute(spec).await?;
        let url = resp.url().clone();
        resp.bytes()
            .await
            .map_err(|e| transport_error(&method, &url, started, e))
    }

    // ── Response handling ────────────────────────────────────────────

    async fn parse_error(
        method: &Method,
        url: &Url,
        started: Instant,
        resp: reqwest::Response,
    ) -> Error {
        let status = resp.status();
        let realm = challenge_realm(resp.headers());
        let raw = match resp.text().await {
            Ok(text) => text,
            Err(e) => return transport_error(method, url, started, e),
        };

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                method: method.to_string(),
                url: url.to_string(),
                realm,
                message: if raw.trim().is_empty() {
                    status.to_string()
                } else {
                    raw
                },
            };
        }

        match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(ErrorResponse {
                message: Some(message),
            }) => Error::Api {
                status: status.as_u16(),
                message,
                method: method.to_string(),
                url: url.to_string(),
            },
            _ => Error::Http {
                status: status.as_u16(),
                body: raw,
                method: method.to_string(),
                url: url.to_string(),
            },
        }
    }
}

/// Map a reqwest failure to a timeout or connectivity error.
fn transport_error(method: &Method, url: &Url, started: Instant, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            method: method.to_string(),
            url: url.to_string(),
            elapsed: started.elapsed(),
        }
    } else {
        Error::Connectivity {
            method: method.to_string(),
            url: url.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new(&ConnectionConfig::new("cm.example.com").version(10)).unwrap()
    }

    #[test]
    fn joins_relative_paths_onto_versioned_base() {
        let c = client();
        assert_eq!(
            c.url("clusters/c1").unwrap().as_str(),
            "http://cm.example.com:7180/api/v10/clusters/c1"
        );
        assert_eq!(
            c.url("/tools/echo").unwrap().as_str(),
            "http://cm.example.com:7180/api/v10/tools/echo"
        );
    }

    #[test]
    fn debug_never_prints_password() {
        let c = HttpClient::new(&ConnectionConfig::new("cm").credentials("ops", "s3cret")).unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("ops"));
        assert!(!dbg.contains("s3cret"));
    }

    #[test]
    fn fresh_client_has_no_cookies() {
        assert_eq!(client().cookie_header(), None);
    }
}
