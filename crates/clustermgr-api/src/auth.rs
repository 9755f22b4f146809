use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};
use secrecy::{ExposeSecret, SecretString};

/// Realm the server uses for its HTTP Basic challenge.
pub const API_AUTH_REALM: &str = "Cluster Manager";

/// Default account name on a fresh installation.
pub const DEFAULT_USERNAME: &str = "admin";

/// Default password on a fresh installation.
pub const DEFAULT_PASSWORD: &str = "admin";

/// HTTP Basic credentials for the Cluster Manager API.
///
/// Sent preemptively on every request. The password never appears in
/// `Debug` output or in error messages.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

/// Extract the realm from a `WWW-Authenticate: Basic realm="..."` challenge.
pub(crate) fn challenge_realm(headers: &HeaderMap) -> Option<String> {
    let challenge = headers.get(WWW_AUTHENTICATE)?.to_str().ok()?;
    let (_, rest) = challenge.split_once("realm=")?;
    let rest = rest.trim_start();
    let realm = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next()?,
        None => rest.split([',', ' ']).next()?,
    };
    Some(realm.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(WWW_AUTHENTICATE, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn parses_quoted_realm() {
        let realm = challenge_realm(&headers(r#"Basic realm="Cluster Manager""#));
        assert_eq!(realm.as_deref(), Some(API_AUTH_REALM));
    }

    #[test]
    fn parses_bare_realm() {
        let realm = challenge_realm(&headers("Basic realm=cm, charset=UTF-8"));
        assert_eq!(realm.as_deref(), Some("cm"));
    }

    #[test]
    fn missing_challenge_yields_none() {
        assert_eq!(challenge_realm(&HeaderMap::new()), None);
    }

    #[test]
    fn debug_output_redacts_password() {
        let creds = Credentials::new("admin", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
