// clustermgr-api: async HTTP transport for the Cluster Manager REST API.
//
// Base URL assembly, basic auth with a persistent cookie jar, optional TLS
// with caller-supplied trust roots, JSON/multipart bodies, and mapping of
// HTTP failures to the SDK error taxonomy.

pub mod auth;
pub mod body;
pub mod client;
pub mod error;
pub mod resource;
pub mod transport;

pub use auth::{API_AUTH_REALM, Credentials};
pub use body::{Body, MULTIPART_BOUNDARY, MultipartForm, Params};
pub use client::{HttpClient, RequestSpec};
pub use error::{Error, ErrorKind};
pub use reqwest::Method;
pub use resource::{Request, Resource, compose_path};
pub use transport::{
    API_CURRENT_VERSION, ConnectionConfig, DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, TlsMode,
    TransportConfig,
};
