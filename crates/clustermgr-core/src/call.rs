// Typed call builder used by the endpoint layer.
//
// Wraps a `Resource` request with the version gate and decodes the JSON
// response into `ApiObject`s bound to the calling transport. The gate is
// evaluated before any I/O.

use std::time::Duration;

use clustermgr_api::{Body, Error, Method, Params, Resource};
use serde_json::json;
use strum::{AsRefStr, Display, EnumString};

use crate::entity::{ApiObject, SerializeOptions, list_items};
use crate::version;

/// Level of detail requested from list and read endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum View {
    #[default]
    Summary,
    Full,
    Export,
}

/// One endpoint invocation.
#[derive(Debug)]
pub struct Call {
    resource: Resource,
    method: Method,
    relpath: String,
    params: Params,
    body: Option<Body>,
    gate: Option<(u32, String)>,
    timeout: Option<Duration>,
}

impl Call {
    pub fn new(resource: &Resource, method: Method, relpath: impl Into<String>) -> Self {
        Self {
            resource: resource.clone(),
            method,
            relpath: relpath.into(),
            params: Params::new(),
            body: None,
            gate: None,
            timeout: None,
        }
    }

    pub fn get(resource: &Resource, relpath: impl Into<String>) -> Self {
        Self::new(resource, Method::GET, relpath)
    }

    pub fn post(resource: &Resource, relpath: impl Into<String>) -> Self {
        Self::new(resource, Method::POST, relpath)
    }

    pub fn put(resource: &Resource, relpath: impl Into<String>) -> Self {
        Self::new(resource, Method::PUT, relpath)
    }

    pub fn delete(resource: &Resource, relpath: impl Into<String>) -> Self {
        Self::new(resource, Method::DELETE, relpath)
    }

    // ── Options ──────────────────────────────────────────────────────

    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params = self.params.add(name, value);
        self
    }

    pub fn param_opt<V: ToString>(mut self, name: &str, value: Option<V>) -> Self {
        self.params = self.params.add_opt(name, value);
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        for (k, v) in params.as_slice() {
            self.params = self.params.add(k.as_str(), v);
        }
        self
    }

    /// `?view=` when a non-default view is requested.
    pub fn view(self, view: Option<View>) -> Self {
        self.param_opt("view", view)
    }

    pub fn json(self, body: serde_json::Value) -> Self {
        self.body(Body::Json(body))
    }

    pub fn maybe_json(mut self, body: Option<serde_json::Value>) -> Self {
        self.body = body.map(Body::Json);
        self
    }

    /// Non-JSON body, e.g. a multipart upload.
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Body of a single object in write form.
    pub fn object<T: ApiObject>(self, object: &T) -> Self {
        let opts = self.write_options();
        self.json(object.entity().to_json_with(&opts))
    }

    /// Body `{"items": [...]}` of objects in write form.
    pub fn objects<T: ApiObject>(self, objects: &[T]) -> Self {
        let opts = self.write_options();
        let items: Vec<_> = objects
            .iter()
            .map(|o| o.entity().to_json_with(&opts))
            .collect();
        self.json(json!({ "items": items }))
    }

    /// Require at least API version `min` for `operation`.
    pub fn since(mut self, min: u32, operation: &str) -> Self {
        self.gate = Some((min, operation.to_owned()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn write_options(&self) -> SerializeOptions {
        SerializeOptions::for_version(self.resource.version())
    }

    // ── Execution ────────────────────────────────────────────────────

    fn check_gate(&self) -> Result<(), Error> {
        match &self.gate {
            Some((min, operation)) => version::require(self.resource.client(), *min, operation),
            None => Ok(()),
        }
    }

    fn request(&self) -> clustermgr_api::Request<'_> {
        let relpath = (!self.relpath.is_empty()).then_some(self.relpath.as_str());
        let mut request = self
            .resource
            .request(self.method.clone(), relpath)
            .params(self.params.clone());
        if let Some(body) = &self.body {
            request = request.body(body.clone());
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    /// Gate, send and return the raw JSON response.
    pub async fn send(self) -> Result<serde_json::Value, Error> {
        self.check_gate()?;
        self.request().send().await
    }

    /// Response body as text (log endpoints).
    pub async fn text(self) -> Result<String, Error> {
        self.check_gate()?;
        self.request().text().await
    }

    /// Discard the response body.
    pub async fn unit(self) -> Result<(), Error> {
        self.send().await.map(|_| ())
    }

    /// Decode a single object.
    pub async fn one<T: ApiObject>(self) -> Result<T, Error> {
        let client = self.resource.client().clone();
        let json = self.send().await?;
        T::from_json(Some(&client), &json)
    }

    /// Decode a list envelope (or bare array) of objects.
    pub async fn list<T: ApiObject>(self) -> Result<Vec<T>, Error> {
        let client = self.resource.client().clone();
        let json = self.send().await?;
        decode_list(&client, &json)
    }

    /// Decode a list and return its first element; for endpoints that
    /// take and return envelopes but act on a single object.
    pub async fn first<T: ApiObject>(self) -> Result<T, Error> {
        let client = self.resource.client().clone();
        let json = self.send().await?;
        let items: Vec<T> = decode_list(&client, &json)?;
        items.into_iter().next().ok_or_else(|| Error::Protocol {
            message: format!("expected at least one {} in response", T::schema().name),
            body: json.to_string(),
        })
    }
}

pub(crate) fn decode_list<T: ApiObject>(
    client: &std::sync::Arc<clustermgr_api::HttpClient>,
    json: &serde_json::Value,
) -> Result<Vec<T>, Error> {
    let items = list_items(json).ok_or_else(|| Error::Protocol {
        message: format!("expected a list of {}", T::schema().name),
        body: json.to_string(),
    })?;
    items.iter().map(|item| T::from_json(Some(client), item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_renders_lowercase() {
        assert_eq!(View::Full.to_string(), "full");
        assert_eq!(View::Export.as_ref(), "export");
        assert_eq!("summary".parse::<View>().ok(), Some(View::Summary));
    }
}
