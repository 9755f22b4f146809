// ── Batch ──
//
// `POST /batch` executes an ordered list of sub-requests atomically on
// the server. The client only packs the request and unpacks the per-item
// results; interpreting status codes is the caller's job.

use clustermgr_api::{Error, Method};
use tracing::{debug, warn};

use crate::api_object;
use crate::call::Call;
use crate::entity::Entity;
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

pub static BATCH_REQUEST_ELEMENT: Schema = Schema {
    name: "ApiBatchRequestElement",
    attrs: &[
        Attr::rw("method", Kind::String),
        Attr::rw("url", Kind::String),
        Attr::rw("body", Kind::Json),
        Attr::rw("contentType", Kind::String),
        Attr::rw("acceptType", Kind::String),
    ],
};

pub static BATCH_RESPONSE_ELEMENT: Schema = Schema {
    name: "ApiBatchResponseElement",
    attrs: &[
        Attr::ro("statusCode", Kind::Int),
        Attr::ro("response", Kind::Json),
    ],
};

pub static BATCH_RESPONSE: Schema = Schema {
    name: "ApiBatchResponse",
    attrs: &[
        Attr::ro("success", Kind::Bool),
        Attr::ro("items", Kind::Entity(&BATCH_RESPONSE_ELEMENT)).list(),
    ],
};

api_object! {
    /// One sub-request of a batch.
    pub struct ApiBatchRequestElement => BATCH_REQUEST_ELEMENT;
}

api_object! {
    pub struct ApiBatchResponseElement => BATCH_RESPONSE_ELEMENT;
}

api_object! {
    pub struct ApiBatchResponse => BATCH_RESPONSE;
}

impl ApiBatchRequestElement {
    /// `url` is relative to the server root, e.g. `/api/v6/clusters`.
    pub fn new(method: &Method, url: &str) -> Self {
        Self(
            Entity::new(&BATCH_REQUEST_ELEMENT)
                .fill("method", method.as_str())
                .fill("url", url),
        )
    }

    /// Attach a JSON body; content type defaults to `application/json`.
    pub fn body(self, body: serde_json::Value) -> Self {
        let entity = self.0.fill("body", body);
        if entity.str_attr("contentType").is_some() {
            Self(entity)
        } else {
            Self(entity.fill("contentType", "application/json"))
        }
    }

    pub fn content_type(self, content_type: &str) -> Self {
        Self(self.0.fill("contentType", content_type))
    }

    pub fn accept_type(self, accept_type: &str) -> Self {
        Self(self.0.fill("acceptType", accept_type))
    }
}

impl ApiBatchResponseElement {
    pub fn status_code(&self) -> Option<i64> {
        self.i64_attr("statusCode")
    }

    pub fn response(&self) -> Option<&serde_json::Value> {
        self.json_attr("response")
    }

    pub fn is_success(&self) -> bool {
        self.status_code().is_some_and(|c| (200..300).contains(&c))
    }
}

impl ApiBatchResponse {
    pub fn success(&self) -> bool {
        self.bool_attr("success").unwrap_or(false)
    }

    /// Per-element results in request order.
    pub fn items(&self) -> Vec<ApiBatchResponseElement> {
        self.objects("items")
    }

    /// Index and result of every element that did not return 2xx.
    pub fn failures(&self) -> Vec<(usize, ApiBatchResponseElement)> {
        self.items()
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_success())
            .collect()
    }
}

impl ApiRoot {
    /// Execute `elements` as one atomic server-side batch.
    ///
    /// `POST /batch` (API v6)
    pub async fn do_batch(
        &self,
        elements: &[ApiBatchRequestElement],
    ) -> Result<ApiBatchResponse, Error> {
        debug!(count = elements.len(), "submitting batch");
        let response: ApiBatchResponse = Call::post(self.resource(), "batch")
            .since(6, "do_batch")
            .objects(elements)
            .one()
            .await?;
        let returned = response.items().len();
        if returned != elements.len() {
            warn!(
                sent = elements.len(),
                returned, "batch response item count differs from request"
            );
        }
        Ok(response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::ApiObject;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_element_write_form() {
        let element = ApiBatchRequestElement::new(&Method::POST, "/api/v6/clusters")
            .body(json!({"items": [{"name": "c1"}]}));
        assert_eq!(
            element.to_json(),
            json!({
                "method": "POST",
                "url": "/api/v6/clusters",
                "body": {"items": [{"name": "c1"}]},
                "contentType": "application/json"
            })
        );
    }

    #[test]
    fn failures_keep_original_index() {
        let response = ApiBatchResponse::from_json(
            None,
            &json!({"success": false, "items": [{"statusCode": 200}, {"statusCode": 400}]}),
        )
        .unwrap();
        assert!(!response.success());
        let failures = response.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 1);
        assert_eq!(failures[0].1.status_code(), Some(400));
    }
}
