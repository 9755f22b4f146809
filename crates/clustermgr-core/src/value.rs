// ── Attribute values ──
//
// In-memory representation of a single attribute on an `Entity`.
// `Null` stands for "absent"; it is never sent to the server.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::entity::Entity;
use crate::schema::{Kind, Schema, Shape};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Json(serde_json::Value),
    Entity(Box<Entity>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this value may be stored in an attribute of the given kind
    /// and shape. `Null` always fits.
    pub fn fits(&self, kind: &Kind, shape: Shape) -> bool {
        match (self, shape) {
            (Self::Null, _) => true,
            (_, Shape::One) => self.fits_kind(kind),
            (Self::List(items), Shape::List(_)) => items.iter().all(|v| v.fits_kind(kind)),
            (Self::Map(map), Shape::Map) => map.values().all(|v| v.fits_kind(kind)),
            _ => false,
        }
    }

    /// Whether every entity held by this value, at any depth, uses `schema`.
    pub fn entities_are(&self, schema: &Schema) -> bool {
        match self {
            Self::Entity(e) => e.schema().is(schema),
            Self::List(items) => items.iter().all(|v| v.entities_are(schema)),
            Self::Map(map) => map.values().all(|v| v.entities_are(schema)),
            _ => true,
        }
    }

    fn fits_kind(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Self::Null, _)
            | (Self::String(_), Kind::String)
            | (Self::Int(_), Kind::Int | Kind::Float)
            | (Self::Float(_), Kind::Float)
            | (Self::Bool(_), Kind::Bool)
            | (Self::DateTime(_), Kind::DateTime)
            | (_, Kind::Json) => true,
            (Self::Entity(e), Kind::Entity(schema)) => e.schema().is(schema),
            (Self::Entity(e), Kind::Ref) => e.schema().name.ends_with("Ref"),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<Entity> for Value {
    fn from(e: Entity) -> Self {
        Self::Entity(Box::new(e))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ListForm;

    #[test]
    fn null_fits_everything() {
        assert!(Value::Null.fits(&Kind::Bool, Shape::One));
        assert!(Value::Null.fits(&Kind::String, Shape::List(ListForm::Bare)));
    }

    #[test]
    fn scalar_kinds_are_checked() {
        assert!(Value::from("x").fits(&Kind::String, Shape::One));
        assert!(!Value::from("x").fits(&Kind::Bool, Shape::One));
        assert!(Value::from(3_i64).fits(&Kind::Float, Shape::One));
        assert!(!Value::from(1.5).fits(&Kind::Int, Shape::One));
    }

    #[test]
    fn list_shape_checks_every_element() {
        let ok = Value::from(vec!["a", "b"]);
        assert!(ok.fits(&Kind::String, Shape::List(ListForm::Bare)));
        let mixed = Value::List(vec![Value::from("a"), Value::from(true)]);
        assert!(!mixed.fits(&Kind::String, Shape::List(ListForm::Bare)));
        assert!(!ok.fits(&Kind::String, Shape::One));
    }

    #[test]
    fn option_converts_to_null() {
        assert!(Value::from(None::<String>).is_null());
        assert_eq!(Value::from(Some("v")).as_str(), Some("v"));
    }
}
