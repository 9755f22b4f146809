// A URL prefix bound to a transport.
//
// Every verb takes a path relative to the prefix; composition strips
// separators on both sides and rejoins with exactly one.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};

use crate::body::{Body, Params};
use crate::client::{HttpClient, RequestSpec};
use crate::error::Error;

/// Join a normalized prefix with a relative path.
///
/// Leading and trailing `/` are stripped from both parts; an absent or
/// empty relative path yields the prefix itself.
pub fn compose_path(prefix: &str, relpath: Option<&str>) -> String {
    let prefix = prefix.trim_matches('/');
    let rel = relpath.map_or("", |p| p.trim_matches('/'));
    match (prefix.is_empty(), rel.is_empty()) {
        (_, true) => prefix.to_owned(),
        (true, false) => rel.to_owned(),
        (false, false) => format!("{prefix}/{rel}"),
    }
}

/// A path prefix plus the transport used to reach it.
///
/// Immutable after construction; cloning is cheap.
#[derive(Debug, Clone)]
pub struct Resource {
    client: Arc<HttpClient>,
    prefix: String,
}

impl Resource {
    pub fn new(client: Arc<HttpClient>, prefix: &str) -> Self {
        Self {
            client,
            prefix: prefix.trim_matches('/').to_owned(),
        }
    }

    /// The API root: an empty prefix directly under `/api/v<N>/`.
    pub fn root(client: Arc<HttpClient>) -> Self {
        Self::new(client, "")
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// API version of the underlying transport.
    pub fn version(&self) -> u32 {
        self.client.version()
    }

    /// A resource one or more segments below this one.
    pub fn child(&self, relpath: &str) -> Self {
        Self {
            client: Arc::clone(&self.client),
            prefix: compose_path(&self.prefix, Some(relpath)),
        }
    }

    /// Full path (below the API base) for `relpath`.
    pub fn path(&self, relpath: Option<&str>) -> String {
        compose_path(&self.prefix, relpath)
    }

    /// Start building a request with full control over options.
    pub fn request(&self, method: Method, relpath: Option<&str>) -> Request<'_> {
        Request {
            resource: self,
            spec: RequestSpec::new(method, self.path(relpath)),
        }
    }

    // ── Verbs ────────────────────────────────────────────────────────

    pub async fn get(
        &self,
        relpath: Option<&str>,
        params: Params,
    ) -> Result<serde_json::Value, Error> {
        self.request(Method::GET, relpath).params(params).send().await
    }

    pub async fn post(
        &self,
        relpath: Option<&str>,
        params: Params,
        data: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, Error> {
        self.request(Method::POST, relpath)
            .params(params)
            .maybe_json(data)
            .send()
            .await
    }

    pub async fn put(
        &self,
        relpath: Option<&str>,
        params: Params,
        data: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, Error> {
        self.request(Method::PUT, relpath)
            .params(params)
            .maybe_json(data)
            .send()
            .await
    }

    pub async fn delete(
        &self,
        relpath: Option<&str>,
        params: Params,
    ) -> Result<serde_json::Value, Error> {
        self.request(Method::DELETE, relpath)
            .params(params)
            .send()
            .await
    }
}

/// Builder for a single call through a [`Resource`].
#[derive(Debug)]
pub struct Request<'a> {
    resource: &'a Resource,
    spec: RequestSpec,
}

impl Request<'_> {
    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.spec.params = self.spec.params.add(name, value);
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        for (k, v) in params.as_slice() {
            self.spec.params = self.spec.params.add(k.as_str(), v);
        }
        self
    }

    pub fn json(self, value: serde_json::Value) -> Self {
        self.body(Body::Json(value))
    }

    pub fn maybe_json(self, value: Option<serde_json::Value>) -> Self {
        match value {
            Some(v) => self.json(v),
            None => self,
        }
    }

    pub fn body(mut self, body: Body) -> Self {
        self.spec.body = Some(body);
        self
    }

    /// Add an extra header. Invalid names or values are rejected at send time.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.spec.headers.insert(name, value);
        self
    }

    /// Per-call deadline; on expiry the request is aborted with a timeout error.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.spec.timeout = Some(timeout);
        self
    }

    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    /// Send and decode the response as JSON (`Null` for an empty body).
    pub async fn send(self) -> Result<serde_json::Value, Error> {
        self.resource.client.execute_json(self.spec).await
    }

    /// Send and return the response body as text.
    pub async fn text(self) -> Result<String, Error> {
        self.resource.client.execute_text(self.spec).await
    }

    /// Send and return the raw response body.
    pub async fn bytes(self) -> Result<Bytes, Error> {
        self.resource.client.execute_bytes(self.spec).await
    }
}
