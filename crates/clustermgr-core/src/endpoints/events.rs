// Event endpoints: `/events`.

use clustermgr_api::Error;

use crate::api_object;
use crate::call::Call;
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

pub static EVENT_ATTRIBUTE: Schema = Schema {
    name: "ApiEventAttribute",
    attrs: &[
        Attr::ro("name", Kind::String),
        Attr::ro("values", Kind::String).bare_list(),
    ],
};

pub static EVENT: Schema = Schema {
    name: "ApiEvent",
    attrs: &[
        Attr::ro("id", Kind::String),
        Attr::ro("content", Kind::String),
        Attr::ro("timeOccurred", Kind::DateTime),
        Attr::ro("timeReceived", Kind::DateTime),
        Attr::ro("category", Kind::String),
        Attr::ro("severity", Kind::String),
        Attr::ro("alert", Kind::Bool),
        Attr::ro("attributes", Kind::Entity(&EVENT_ATTRIBUTE)).bare_list(),
    ],
};

pub static EVENT_QUERY_RESULT: Schema = Schema {
    name: "ApiEventQueryResult",
    attrs: &[
        Attr::ro("totalResults", Kind::Int),
        Attr::ro("items", Kind::Entity(&EVENT)).list(),
    ],
};

api_object! {
    pub struct ApiEventAttribute => EVENT_ATTRIBUTE;
}

api_object! {
    /// An event or alert recorded by the server.
    pub struct ApiEvent => EVENT;
}

api_object! {
    pub struct ApiEventQueryResult => EVENT_QUERY_RESULT;
}

impl ApiEventAttribute {
    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn values(&self) -> Vec<&str> {
        self.str_list_attr("values")
    }
}

impl ApiEvent {
    pub fn id(&self) -> Option<&str> {
        self.str_attr("id")
    }

    pub fn content(&self) -> Option<&str> {
        self.str_attr("content")
    }

    pub fn time_occurred(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.time_attr("timeOccurred")
    }

    pub fn category(&self) -> Option<&str> {
        self.str_attr("category")
    }

    pub fn severity(&self) -> Option<&str> {
        self.str_attr("severity")
    }

    pub fn is_alert(&self) -> bool {
        self.bool_attr("alert").unwrap_or(false)
    }

    pub fn attributes(&self) -> Vec<ApiEventAttribute> {
        self.objects("attributes")
    }

    /// Values of one named attribute; empty when absent.
    pub fn attribute(&self, name: &str) -> Vec<String> {
        self.attributes()
            .iter()
            .filter(|a| a.name() == Some(name))
            .flat_map(ApiEventAttribute::values)
            .map(str::to_owned)
            .collect()
    }
}

impl ApiEventQueryResult {
    pub fn total_results(&self) -> Option<i64> {
        self.i64_attr("totalResults")
    }

    pub fn events(&self) -> Vec<ApiEvent> {
        self.objects("items")
    }
}

impl ApiRoot {
    /// Search events with an FIQL query, e.g. `severity==CRITICAL`.
    ///
    /// `GET /events?query=...`
    pub async fn query_events(&self, query: Option<&str>) -> Result<ApiEventQueryResult, Error> {
        Call::get(self.resource(), "events")
            .param_opt("query", query)
            .one()
            .await
    }

    /// `GET /events/{id}`
    pub async fn get_event(&self, id: &str) -> Result<ApiEvent, Error> {
        Call::get(self.resource(), format!("events/{id}")).one().await
    }
}
