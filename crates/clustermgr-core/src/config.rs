// ── Config bags ──
//
// The server exchanges configuration as `{"items": [{"name", "value", ...}]}`.
// Callers see either a summary map (name -> value) or a full map
// (name -> `ApiConfig` with metadata). A `None` value in the summary map
// means "unset"; sending it resets the key to its default.

use std::collections::BTreeMap;
use std::sync::Arc;

use clustermgr_api::{Error, HttpClient, Resource};
use serde_json::json;

use crate::api_object;
use crate::call::{Call, View};
use crate::entity::{ApiObject, list_items};
use crate::schema::{Attr, Kind, Schema};

pub static CONFIG: Schema = Schema {
    name: "ApiConfig",
    attrs: &[
        Attr::rw("name", Kind::String),
        Attr::rw("value", Kind::String),
        Attr::ro("required", Kind::Bool),
        Attr::ro("default", Kind::String),
        Attr::ro("displayName", Kind::String),
        Attr::ro("description", Kind::String),
        Attr::ro("relatedName", Kind::String),
        Attr::ro("validationState", Kind::String),
        Attr::ro("validationMessage", Kind::String),
        Attr::ro("validationWarningsSuppressed", Kind::Bool).since(7),
        Attr::ro("sensitive", Kind::Bool).since(12),
    ],
};

api_object! {
    /// One configuration entry with its metadata.
    pub struct ApiConfig => CONFIG;
}

impl ApiConfig {
    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn value(&self) -> Option<&str> {
        self.str_attr("value")
    }

    pub fn default_value(&self) -> Option<&str> {
        self.str_attr("default")
    }

    pub fn is_required(&self) -> bool {
        self.bool_attr("required").unwrap_or(false)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.str_attr("displayName")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_attr("description")
    }

    pub fn validation_state(&self) -> Option<&str> {
        self.str_attr("validationState")
    }

    /// The value in effect: explicit value, else the default.
    pub fn effective_value(&self) -> Option<&str> {
        self.value().or_else(|| self.default_value())
    }
}

/// Summary view: name -> value (`None` when unset).
pub type ConfigMap = BTreeMap<String, Option<String>>;

/// Full view: name -> entry with metadata.
pub type FullConfigMap = BTreeMap<String, ApiConfig>;

/// `{"items": [{"name": k, "value": v}, ...]}`; unset values are sent as
/// `null`.
pub fn config_to_api_list(map: &ConfigMap) -> serde_json::Value {
    let items: Vec<_> = map
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();
    json!({ "items": items })
}

fn entries(json: &serde_json::Value) -> Result<&Vec<serde_json::Value>, Error> {
    list_items(json).ok_or_else(|| Error::Protocol {
        message: "expected a config list".into(),
        body: json.to_string(),
    })
}

fn entry_name(entry: &serde_json::Value) -> Result<String, Error> {
    entry
        .get("name")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| Error::Protocol {
            message: "config entry without a name".into(),
            body: entry.to_string(),
        })
}

/// Summary map from a config envelope.
pub fn json_to_config(json: &serde_json::Value) -> Result<ConfigMap, Error> {
    entries(json)?
        .iter()
        .map(|entry| {
            let value = entry
                .get("value")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned);
            entry_name(entry).map(|name| (name, value))
        })
        .collect()
}

/// Full map from a config envelope; entries keep every metadata field.
pub fn json_to_full_config(
    json: &serde_json::Value,
    client: Option<&Arc<HttpClient>>,
) -> Result<FullConfigMap, Error> {
    entries(json)?
        .iter()
        .map(|entry| {
            let name = entry_name(entry)?;
            ApiConfig::from_json(client, entry).map(|cfg| (name, cfg))
        })
        .collect()
}

// ── Helpers for endpoint modules ────────────────────────────────────

/// `GET <resource>/<relpath>` in summary view.
pub(crate) async fn get_summary(resource: &Resource, relpath: &str) -> Result<ConfigMap, Error> {
    let json = Call::get(resource, relpath).send().await?;
    json_to_config(&json)
}

/// `GET <resource>/<relpath>?view=full`.
pub(crate) async fn get_full(resource: &Resource, relpath: &str) -> Result<FullConfigMap, Error> {
    let json = Call::get(resource, relpath)
        .view(Some(View::Full))
        .send()
        .await?;
    json_to_full_config(&json, Some(resource.client()))
}

/// `PUT <resource>/<relpath>`; returns the resulting summary config.
pub(crate) async fn put_summary(
    resource: &Resource,
    relpath: &str,
    config: &ConfigMap,
) -> Result<ConfigMap, Error> {
    let json = Call::put(resource, relpath)
        .json(config_to_api_list(config))
        .send()
        .await?;
    json_to_config(&json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(pairs: &[(&str, Option<&str>)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.map(str::to_owned)))
            .collect()
    }

    #[test]
    fn map_to_envelope() {
        let m = map(&[("dfs_replication", Some("3")), ("reset_me", None)]);
        assert_eq!(
            config_to_api_list(&m),
            json!({"items": [
                {"name": "dfs_replication", "value": "3"},
                {"name": "reset_me", "value": null}
            ]})
        );
    }

    #[test]
    fn summary_round_trip_is_identity() {
        let m = map(&[("a", Some("1")), ("b", Some("")), ("c", None)]);
        assert_eq!(json_to_config(&config_to_api_list(&m)).unwrap(), m);
        assert_eq!(json_to_config(&json!({"items": []})).unwrap(), ConfigMap::new());
    }

    #[test]
    fn full_view_keeps_metadata() {
        let full = json_to_full_config(
            &json!({"items": [{
                "name": "heap",
                "required": true,
                "default": "1024",
                "displayName": "Heap Size",
                "validationState": "OK"
            }]}),
            None,
        )
        .unwrap();
        let heap = &full["heap"];
        assert!(heap.is_required());
        assert_eq!(heap.value(), None);
        assert_eq!(heap.effective_value(), Some("1024"));
        assert_eq!(heap.display_name(), Some("Heap Size"));
    }

    #[test]
    fn nameless_entry_is_protocol_error() {
        let err = json_to_config(&json!({"items": [{"value": "x"}]})).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }
}
