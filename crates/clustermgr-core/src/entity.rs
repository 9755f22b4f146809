// ── Schema-driven entities ──
//
// An `Entity` is a bag of attribute values checked against a static
// `Schema`. Deserialization walks the schema (unknown keys are skipped),
// serialization emits only non-null attributes and, unless asked
// otherwise, only read-write ones. Typed wrappers generated with
// `api_object!` add accessors and endpoint helpers on top.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use clustermgr_api::{Error, HttpClient};
use serde_json::{Map, json};
use tracing::{debug, warn};

use crate::datetime::{format_api_time, parse_api_time};
use crate::registry;
use crate::schema::{Attr, Kind, ListForm, Schema, Shape};
use crate::value::Value;

static NULL: Value = Value::Null;

/// Controls which attributes [`Entity::to_json_with`] emits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    /// Include read-only attributes (normally stripped before writing).
    pub preserve_ro: bool,
    /// Drop attributes introduced after this API version.
    pub api_version: Option<u32>,
}

impl SerializeOptions {
    /// Write form for a server speaking `version`.
    pub fn for_version(version: u32) -> Self {
        Self {
            preserve_ro: false,
            api_version: Some(version),
        }
    }

    /// Everything known, read-only included.
    pub fn full() -> Self {
        Self {
            preserve_ro: true,
            api_version: None,
        }
    }
}

/// A typed record described by a [`Schema`].
#[derive(Clone)]
pub struct Entity {
    schema: &'static Schema,
    values: BTreeMap<&'static str, Value>,
    client: Option<Weak<HttpClient>>,
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.schema.name)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.schema.is(other.schema) && self.values == other.values
    }
}

impl Entity {
    /// An empty, unbound entity for building outgoing requests.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
            client: None,
        }
    }

    pub(crate) fn bound(schema: &'static Schema, client: Option<&Arc<HttpClient>>) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
            client: client.map(Arc::downgrade),
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn type_name(&self) -> &'static str {
        self.schema.name
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// The transport this entity was loaded through, if still alive.
    pub fn client(&self) -> Option<Arc<HttpClient>> {
        self.client.as_ref().and_then(Weak::upgrade)
    }

    /// Like [`client`](Self::client) but fails with `Detached`.
    pub fn require_client(&self) -> Result<Arc<HttpClient>, Error> {
        self.client().ok_or(Error::Detached {
            entity: self.schema.name,
        })
    }

    /// Attach this entity (not its children) to a transport.
    pub fn bind(&mut self, client: &Arc<HttpClient>) {
        self.client = Some(Arc::downgrade(client));
    }

    // ── Reading ──────────────────────────────────────────────────────

    /// Checked read: fails for names outside the schema.
    pub fn get(&self, name: &str) -> Result<&Value, Error> {
        let attr = self.declared(name)?;
        Ok(self.values.get(attr.name).unwrap_or(&NULL))
    }

    /// Unchecked read: `Null` for unset or unknown names.
    pub fn value(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&NULL)
    }

    pub fn str_attr(&self, name: &str) -> Option<&str> {
        self.value(name).as_str()
    }

    /// A string attribute that identifies the entity on the server (its
    /// name or id); fails when unset.
    pub fn require_str(&self, name: &str) -> Result<&str, Error> {
        self.str_attr(name).ok_or_else(|| Error::InvalidConfig {
            message: format!("{} has no {name}", self.schema.name),
        })
    }

    pub fn i64_attr(&self, name: &str) -> Option<i64> {
        self.value(name).as_i64()
    }

    pub fn f64_attr(&self, name: &str) -> Option<f64> {
        self.value(name).as_f64()
    }

    pub fn bool_attr(&self, name: &str) -> Option<bool> {
        self.value(name).as_bool()
    }

    pub fn time_attr(&self, name: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        self.value(name).as_datetime()
    }

    pub fn json_attr(&self, name: &str) -> Option<&serde_json::Value> {
        self.value(name).as_json()
    }

    /// String elements of a list attribute; empty when unset.
    pub fn str_list_attr(&self, name: &str) -> Vec<&str> {
        self.value(name)
            .as_list()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// A nested entity attribute as its typed wrapper.
    pub fn object<T: ApiObject>(&self, name: &str) -> Option<T> {
        self.value(name)
            .as_entity()
            .filter(|e| e.schema.is(T::schema()))
            .map(|e| T::from_entity(e.clone()))
    }

    /// A list-of-entity attribute as typed wrappers; empty when unset.
    pub fn objects<T: ApiObject>(&self, name: &str) -> Vec<T> {
        self.value(name)
            .as_list()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_entity)
                    .filter(|e| e.schema.is(T::schema()))
                    .map(|e| T::from_entity(e.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Non-null attributes in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static Attr, &Value)> {
        self.schema
            .attrs
            .iter()
            .filter_map(|attr| self.values.get(attr.name).map(|v| (attr, v)))
            .filter(|(_, v)| !v.is_null())
    }

    // ── Writing ──────────────────────────────────────────────────────

    /// Assign a read-write attribute.
    ///
    /// Fails for names outside the schema, for read-only attributes, and
    /// for values that do not match the declared kind.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let attr = self.declared(name)?;
        if !attr.is_writable() {
            return Err(Error::ReadOnlyAttribute {
                entity: self.schema.name,
                attribute: name.to_owned(),
            });
        }
        self.store(attr, value.into())
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, Error> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Reset an attribute to null. Same access rules as `set`.
    pub fn clear(&mut self, name: &str) -> Result<(), Error> {
        self.set(name, Value::Null)
    }

    /// Assign bypassing the read-only check (hydration, in-place refresh).
    pub(crate) fn set_any(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let attr = self.declared(name)?;
        self.store(attr, value.into())
    }

    /// Builder for statically known attribute names; mismatches are logged
    /// and dropped.
    pub(crate) fn fill(mut self, name: &str, value: impl Into<Value>) -> Self {
        if let Err(err) = self.set_any(name, value) {
            warn!(entity = self.schema.name, %err, "invalid attribute in builder");
        }
        self
    }

    /// Copy every attribute, read-only included, from a freshly loaded peer.
    ///
    /// Used after server-mutating calls so the caller's object reflects new
    /// identifiers and timestamps.
    pub fn refresh_from(&mut self, other: &Entity) -> Result<(), Error> {
        if !self.schema.is(other.schema) {
            return Err(Error::InvalidValue {
                entity: self.schema.name,
                attribute: "<self>".into(),
                expected: format!("an {} (got {})", self.schema.name, other.schema.name),
            });
        }
        self.values.clone_from(&other.values);
        if other.client.is_some() {
            self.client.clone_from(&other.client);
        }
        Ok(())
    }

    fn declared(&self, name: &str) -> Result<&'static Attr, Error> {
        self.schema.attr(name).ok_or_else(|| Error::UnknownAttribute {
            entity: self.schema.name,
            attribute: name.to_owned(),
        })
    }

    fn store(&mut self, attr: &'static Attr, value: Value) -> Result<(), Error> {
        if !value.fits(&attr.kind, attr.shape) {
            return Err(Error::InvalidValue {
                entity: self.schema.name,
                attribute: attr.name.to_owned(),
                expected: describe(attr),
            });
        }
        if matches!(attr.kind, Kind::Ref) && !value.is_null() {
            let target = registry::resolve(attr.name)?;
            if !value.entities_are(target) {
                return Err(Error::InvalidValue {
                    entity: self.schema.name,
                    attribute: attr.name.to_owned(),
                    expected: target.name.to_owned(),
                });
            }
        }
        if value.is_null() {
            self.values.remove(attr.name);
        } else {
            self.values.insert(attr.name, value);
        }
        Ok(())
    }

    // ── JSON ─────────────────────────────────────────────────────────

    /// Hydrate from a JSON object. Absent keys stay null; unknown keys are
    /// logged and skipped.
    pub fn from_json(
        schema: &'static Schema,
        client: Option<&Arc<HttpClient>>,
        json: &serde_json::Value,
    ) -> Result<Self, Error> {
        let Some(object) = json.as_object() else {
            return Err(protocol(schema, None, "a JSON object", json));
        };
        let mut entity = Self::bound(schema, client);
        for (key, raw) in object {
            let Some(attr) = schema.attr(key) else {
                debug!(entity = schema.name, key, "ignoring unknown attribute");
                continue;
            };
            let value = decode_attr(schema, attr, raw, client)?;
            if !value.is_null() {
                entity.values.insert(attr.name, value);
            }
        }
        Ok(entity)
    }

    /// Write form: read-write, non-null attributes only.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_with(&SerializeOptions::default())
    }

    pub fn to_json_with(&self, opts: &SerializeOptions) -> serde_json::Value {
        let mut out = Map::new();
        for attr in self.schema.attrs {
            let Some(value) = self.values.get(attr.name) else {
                continue;
            };
            if value.is_null() || !(opts.preserve_ro || attr.is_writable()) {
                continue;
            }
            if let Some(version) = opts.api_version {
                if !attr.available_in(version) {
                    debug!(
                        entity = self.schema.name,
                        attribute = attr.name,
                        version,
                        "dropping attribute unknown to server version"
                    );
                    continue;
                }
            }
            out.insert(attr.name.to_owned(), encode_attr(attr, value, opts));
        }
        serde_json::Value::Object(out)
    }
}

fn describe(attr: &Attr) -> String {
    match attr.shape {
        Shape::One => attr.kind.describe(),
        Shape::List(_) => format!("a list of {}", attr.kind.describe()),
        Shape::Map => format!("a map of {}", attr.kind.describe()),
    }
}

fn protocol(
    schema: &Schema,
    attr: Option<&str>,
    expected: &str,
    got: &serde_json::Value,
) -> Error {
    let location = match attr {
        Some(name) => format!("{}.{name}", schema.name),
        None => schema.name.to_owned(),
    };
    Error::Protocol {
        message: format!("{location}: expected {expected}, got {}", json_type(got)),
        body: got.to_string(),
    }
}

fn json_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ── Decoding ────────────────────────────────────────────────────────

fn decode_attr(
    schema: &'static Schema,
    attr: &'static Attr,
    raw: &serde_json::Value,
    client: Option<&Arc<HttpClient>>,
) -> Result<Value, Error> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    match attr.shape {
        Shape::One => decode_one(schema, attr, raw, client),
        Shape::List(_) => {
            let items = list_items(raw)
                .ok_or_else(|| protocol(schema, Some(attr.name), "a list", raw))?;
            items
                .iter()
                .map(|item| decode_one(schema, attr, item, client))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
        Shape::Map => {
            let object = raw
                .as_object()
                .ok_or_else(|| protocol(schema, Some(attr.name), "an object", raw))?;
            object
                .iter()
                .map(|(k, v)| decode_one(schema, attr, v, client).map(|v| (k.clone(), v)))
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(Value::Map)
        }
    }
}

/// Accept a bare array or an `{"items": [...]}` envelope.
pub(crate) fn list_items(raw: &serde_json::Value) -> Option<&Vec<serde_json::Value>> {
    match raw {
        serde_json::Value::Array(items) => Some(items),
        serde_json::Value::Object(object) => object.get("items").and_then(|v| v.as_array()),
        _ => None,
    }
}

fn decode_one(
    schema: &'static Schema,
    attr: &'static Attr,
    raw: &serde_json::Value,
    client: Option<&Arc<HttpClient>>,
) -> Result<Value, Error> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let mismatch = || protocol(schema, Some(attr.name), &attr.kind.describe(), raw);
    let value = match attr.kind {
        Kind::String => Value::String(raw.as_str().ok_or_else(mismatch)?.to_owned()),
        Kind::Int => {
            let int = raw
                .as_i64()
                .or_else(|| raw.as_u64().and_then(|u| i64::try_from(u).ok()))
                .ok_or_else(mismatch)?;
            Value::Int(int)
        }
        Kind::Float => Value::Float(raw.as_f64().ok_or_else(mismatch)?),
        Kind::Bool => Value::Bool(raw.as_bool().ok_or_else(mismatch)?),
        Kind::DateTime => {
            let text = raw.as_str().ok_or_else(mismatch)?;
            Value::DateTime(parse_api_time(text).ok_or_else(mismatch)?)
        }
        Kind::Json => Value::Json(raw.clone()),
        Kind::Entity(nested) => Value::from(Entity::from_json(nested, client, raw)?),
        Kind::Ref => {
            let nested = registry::resolve(attr.name)?;
            Value::from(Entity::from_json(nested, client, raw)?)
        }
    };
    Ok(value)
}

// ── Encoding ────────────────────────────────────────────────────────

fn encode_attr(attr: &Attr, value: &Value, opts: &SerializeOptions) -> serde_json::Value {
    match (attr.shape, value) {
        (Shape::List(form), Value::List(items)) => {
            let encoded: Vec<_> = items.iter().map(|v| encode_one(v, opts)).collect();
            match form {
                ListForm::Envelope => json!({ "items": encoded }),
                ListForm::Bare => serde_json::Value::Array(encoded),
            }
        }
        _ => encode_one(value, opts),
    }
}

fn encode_one(value: &Value, opts: &SerializeOptions) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::String(s) => json!(s),
        Value::DateTime(dt) => json!(format_api_time(dt)),
        Value::Json(v) => v.clone(),
        Value::Entity(e) => e.to_json_with(opts),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(|v| encode_one(v, opts)).collect())
        }
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), encode_one(v, opts)))
                .collect(),
        ),
    }
}

// ── Typed wrappers ──────────────────────────────────────────────────

/// A typed view over an [`Entity`] with a fixed schema.
pub trait ApiObject: Sized {
    fn schema() -> &'static Schema;
    fn from_entity(entity: Entity) -> Self;
    fn entity(&self) -> &Entity;
    fn entity_mut(&mut self) -> &mut Entity;
    fn into_entity(self) -> Entity;

    /// An empty, unbound instance for building requests.
    fn empty() -> Self {
        Self::from_entity(Entity::new(Self::schema()))
    }

    fn from_json(
        client: Option<&Arc<HttpClient>>,
        json: &serde_json::Value,
    ) -> Result<Self, Error> {
        Entity::from_json(Self::schema(), client, json).map(Self::from_entity)
    }

    /// Wrap an untyped entity, checking that the schema matches.
    fn try_from_entity(entity: Entity) -> Result<Self, Error> {
        if entity.schema().is(Self::schema()) {
            Ok(Self::from_entity(entity))
        } else {
            Err(Error::InvalidValue {
                entity: Self::schema().name,
                attribute: "<self>".into(),
                expected: format!("an {} (got {})", Self::schema().name, entity.type_name()),
            })
        }
    }

    /// In-place refresh from a newer copy of the same object.
    fn update_from(&mut self, other: &Self) -> Result<(), Error> {
        self.entity_mut().refresh_from(other.entity())
    }
}

/// Declare a newtype over [`Entity`] bound to a static schema.
#[macro_export]
macro_rules! api_object {
    ($(#[$meta:meta])* $vis:vis struct $name:ident => $schema:path;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name($crate::entity::Entity);

        impl $crate::entity::ApiObject for $name {
            fn schema() -> &'static $crate::schema::Schema {
                &$schema
            }
            fn from_entity(entity: $crate::entity::Entity) -> Self {
                Self(entity)
            }
            fn entity(&self) -> &$crate::entity::Entity {
                &self.0
            }
            fn entity_mut(&mut self) -> &mut $crate::entity::Entity {
                &mut self.0
            }
            fn into_entity(self) -> $crate::entity::Entity {
                self.0
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::entity::Entity;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<$name> for $crate::value::Value {
            fn from(v: $name) -> Self {
                $crate::value::Value::Entity(Box::new(v.0))
            }
        }
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static WIDGET: Schema = Schema {
        name: "ApiWidget",
        attrs: &[
            Attr::rw("name", Kind::String),
            Attr::rw("size", Kind::Int),
            Attr::ro("createdAt", Kind::DateTime),
            Attr::ro("healthy", Kind::Bool),
            Attr::rw("tags", Kind::String).bare_list(),
            Attr::rw("parts", Kind::Entity(&PART)).list(),
            Attr::rw("labels", Kind::String).map(),
            Attr::rw("hostRef", Kind::Ref),
            Attr::rw("color", Kind::String).since(6),
        ],
    };

    static PART: Schema = Schema {
        name: "ApiPart",
        attrs: &[Attr::rw("id", Kind::String), Attr::ro("serial", Kind::Int)],
    };

    static GADGET: Schema = Schema {
        name: "ApiGadget",
        attrs: &[Attr::rw("widgetRef", Kind::Ref)],
    };

    fn sample() -> serde_json::Value {
        json!({
            "name": "w1",
            "size": 3,
            "createdAt": "2014-03-26T21:02:01.000100Z",
            "healthy": true,
            "tags": ["a", "b"],
            "parts": {"items": [{"id": "p1", "serial": 7}]},
            "labels": {"env": "prod"},
            "hostRef": {"hostId": "h-1"},
            "color": "red",
            "futureField": {"whatever": 1}
        })
    }

    #[test]
    fn full_round_trip_drops_only_unknown_keys() {
        let entity = Entity::from_json(&WIDGET, None, &sample()).unwrap();
        let mut expected = sample();
        expected.as_object_mut().unwrap().remove("futureField");
        assert_eq!(entity.to_json_with(&SerializeOptions::full()), expected);
    }

    #[test]
    fn write_form_strips_read_only_and_gated() {
        let entity = Entity::from_json(&WIDGET, None, &sample()).unwrap();
        let out = entity.to_json_with(&SerializeOptions::for_version(5));
        assert_eq!(
            out,
            json!({
                "name": "w1",
                "size": 3,
                "tags": ["a", "b"],
                "parts": {"items": [{"id": "p1"}]},
                "labels": {"env": "prod"},
                "hostRef": {"hostId": "h-1"}
            })
        );
    }

    #[test]
    fn absent_and_null_fields_read_as_null() {
        let entity = Entity::from_json(&WIDGET, None, &json!({"name": null})).unwrap();
        assert!(entity.get("name").unwrap().is_null());
        assert!(entity.get("size").unwrap().is_null());
        assert_eq!(entity.to_json_with(&SerializeOptions::full()), json!({}));
    }

    #[test]
    fn empty_envelope_is_empty_list_not_null() {
        let entity = Entity::from_json(&WIDGET, None, &json!({"parts": {"items": []}})).unwrap();
        assert_eq!(entity.get("parts").unwrap().as_list().map(<[Value]>::len), Some(0));
    }

    #[test]
    fn datetime_without_micros_parses() {
        let entity =
            Entity::from_json(&WIDGET, None, &json!({"createdAt": "2014-03-26T21:02:01Z"}))
                .unwrap();
        assert_eq!(
            entity.time_attr("createdAt").map(|d| format_api_time(&d)).as_deref(),
            Some("2014-03-26T21:02:01.000000Z")
        );
    }

    #[test]
    fn reference_fields_instantiate_companion_type() {
        let entity = Entity::from_json(&WIDGET, None, &sample()).unwrap();
        let host = entity.value("hostRef").as_entity().unwrap();
        assert_eq!(host.type_name(), "ApiHostRef");
        assert_eq!(host.str_attr("hostId"), Some("h-1"));

        let null_ref = Entity::from_json(&WIDGET, None, &json!({"hostRef": null})).unwrap();
        assert!(null_ref.value("hostRef").is_null());
    }

    #[test]
    fn unknown_reference_fails_fast() {
        let err = Entity::from_json(&GADGET, None, &json!({"widgetRef": {"id": "x"}})).unwrap_err();
        match err {
            Error::UnknownReference { name, field } => {
                assert_eq!(name, "ApiWidgetRef");
                assert_eq!(field, "widgetRef");
            }
            other => panic!("expected UnknownReference, got {other:?}"),
        }
    }

    #[test]
    fn shape_violations_are_protocol_errors() {
        let err = Entity::from_json(&WIDGET, None, &json!({"healthy": "yes"})).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
        let err = Entity::from_json(&WIDGET, None, &json!({"tags": "a"})).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
        let err = Entity::from_json(&WIDGET, None, &json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn read_only_assignment_fails() {
        let mut entity = Entity::from_json(&WIDGET, None, &sample()).unwrap();
        let err = entity.set("healthy", false).unwrap_err();
        assert!(matches!(err, Error::ReadOnlyAttribute { .. }));
        assert_eq!(entity.bool_attr("healthy"), Some(true));
    }

    #[test]
    fn unknown_assignment_fails() {
        let mut entity = Entity::new(&WIDGET);
        let err = entity.set("nope", "x").unwrap_err();
        assert!(matches!(err, Error::UnknownAttribute { .. }));
        assert!(entity.get("nope").is_err());
    }

    #[test]
    fn kind_mismatch_on_assignment_fails() {
        let mut entity = Entity::new(&WIDGET);
        let err = entity.set("size", "big").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        entity.set("size", 4_i64).unwrap();
        entity.set("tags", vec!["x"]).unwrap();
        assert_eq!(entity.str_list_attr("tags"), vec!["x"]);
    }

    #[test]
    fn reference_assignment_checks_target_type() {
        use crate::endpoints::types::{ApiClusterRef, ApiHostRef};

        let mut entity = Entity::new(&WIDGET);
        let err = entity.set("hostRef", ApiClusterRef::new("c1")).unwrap_err();
        match err {
            Error::InvalidValue {
                attribute,
                expected,
                ..
            } => {
                assert_eq!(attribute, "hostRef");
                assert_eq!(expected, "ApiHostRef");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
        assert!(entity.value("hostRef").is_null());

        entity.set("hostRef", ApiHostRef::new("h-1")).unwrap();
        assert_eq!(entity.to_json(), json!({"hostRef": {"hostId": "h-1"}}));
    }

    #[test]
    fn clearing_removes_value() {
        let mut entity = Entity::new(&WIDGET).with("name", "w").unwrap();
        entity.clear("name").unwrap();
        assert_eq!(entity.to_json(), json!({}));
    }

    #[test]
    fn refresh_copies_read_only_fields() {
        let mut local = Entity::new(&WIDGET).with("name", "w1").unwrap();
        let server = Entity::from_json(&WIDGET, None, &sample()).unwrap();
        local.refresh_from(&server).unwrap();
        assert_eq!(local.bool_attr("healthy"), Some(true));
        assert_eq!(local, server);

        let part = Entity::new(&PART);
        assert!(local.refresh_from(&part).is_err());
    }

    #[test]
    fn unbound_entity_is_detached() {
        let entity = Entity::new(&WIDGET);
        assert!(matches!(
            entity.require_client(),
            Err(Error::Detached { entity: "ApiWidget" })
        ));
    }
}
