// Request payloads and query parameters.

/// Boundary token used for multipart uploads (license files).
pub const MULTIPART_BOUNDARY: &str = "MULTI_PART_BOUNDARY";

/// Ordered query parameters. Repeated names are sent as repeated pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single `name=value` pair.
    pub fn add(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.0.push((name.into(), value.to_string()));
        self
    }

    /// Append `name=value` only when `value` is present.
    pub fn add_opt<V: ToString>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.add(name, v),
            None => self,
        }
    }

    /// Append one `name=value` pair per element.
    pub fn add_all<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        for v in values {
            self.0.push((name.to_owned(), v.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

/// A `multipart/form-data` body with text fields and a fixed boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    fields: Vec<(String, String)>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self {
            boundary: MULTIPART_BOUNDARY.to_owned(),
            fields: Vec::new(),
        }
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encode as CRLF-delimited parts closed by `--<boundary>--`.
    pub fn encode(&self) -> Vec<u8> {
        let mut lines: Vec<String> = Vec::with_capacity(self.fields.len() * 4 + 2);
        for (name, value) in &self.fields {
            lines.push(format!("--{}", self.boundary));
            lines.push(format!("Content-Disposition: form-data; name=\"{name}\""));
            lines.push(String::new());
            lines.push(value.clone());
        }
        lines.push(format!("--{}--", self.boundary));
        lines.push(String::new());
        lines.join("\r\n").into_bytes()
    }
}

/// Request body with its declared content type.
#[derive(Debug, Clone)]
pub enum Body {
    /// `application/json`.
    Json(serde_json::Value),
    /// `multipart/form-data`.
    Multipart(MultipartForm),
    /// Arbitrary bytes with an explicit content type.
    Raw { content_type: String, bytes: Vec<u8> },
}

impl Body {
    pub fn content_type(&self) -> String {
        match self {
            Self::Json(_) => "application/json".to_owned(),
            Self::Multipart(form) => form.content_type(),
            Self::Raw { content_type, .. } => content_type.clone(),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Self::Json(value) => serde_json::to_vec(&value),
            Self::Multipart(form) => Ok(form.encode()),
            Self::Raw { bytes, .. } => Ok(bytes),
        }
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn repeated_params_keep_order() {
        let params = Params::new()
            .add("view", "full")
            .add_all("hostId", ["h1", "h2"])
            .add_opt("from", None::<&str>);
        assert_eq!(
            params.as_slice(),
            &[
                ("view".to_owned(), "full".to_owned()),
                ("hostId".to_owned(), "h1".to_owned()),
                ("hostId".to_owned(), "h2".to_owned()),
            ]
        );
        assert_eq!(params.get("hostId"), Some("h1"));
    }

    #[test]
    fn license_form_layout() {
        let form = MultipartForm::new().text("license", "LICENSE-TEXT");
        let encoded = String::from_utf8(form.encode()).unwrap();
        assert_eq!(
            encoded,
            "--MULTI_PART_BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"license\"\r\n\
             \r\n\
             LICENSE-TEXT\r\n\
             --MULTI_PART_BOUNDARY--\r\n"
        );
        assert_eq!(
            form.content_type(),
            "multipart/form-data; boundary=MULTI_PART_BOUNDARY"
        );
    }

    #[test]
    fn json_body_encodes() {
        let body = Body::from(serde_json::json!({"items": []}));
        assert_eq!(body.content_type(), "application/json");
        assert_eq!(body.into_bytes().unwrap(), br#"{"items":[]}"#.to_vec());
    }
}
