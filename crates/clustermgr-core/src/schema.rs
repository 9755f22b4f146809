// ── Attribute descriptors ──
//
// Each entity type declares a static `Schema`: one `Attr` per JSON field
// with its value kind, container shape, mutability and, when gated, the
// first API version that knows the field. The serializer and the
// assignment checks are driven entirely by these tables.

use std::fmt;

/// Whether callers may assign the attribute and send it back to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
    ReadOnly,
}

/// How a list attribute is written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListForm {
    /// `{"items": [...]}`
    Envelope,
    /// `[...]`
    Bare,
}

/// Element kind of an attribute.
#[derive(Clone, Copy)]
pub enum Kind {
    String,
    Int,
    Float,
    Bool,
    /// `YYYY-MM-DDThh:mm:ss.ffffffZ` on the wire.
    DateTime,
    /// Opaque JSON kept verbatim.
    Json,
    /// Nested entity with a statically known schema.
    Entity(&'static Schema),
    /// Reference entity resolved from the field name through the registry.
    Ref,
}

impl Kind {
    pub fn describe(&self) -> String {
        match self {
            Self::String => "a string".into(),
            Self::Int => "an integer".into(),
            Self::Float => "a number".into(),
            Self::Bool => "a boolean".into(),
            Self::DateTime => "a datetime".into(),
            Self::Json => "JSON".into(),
            Self::Entity(schema) => format!("an {}", schema.name),
            Self::Ref => "a reference".into(),
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Int => f.write_str("Int"),
            Self::Float => f.write_str("Float"),
            Self::Bool => f.write_str("Bool"),
            Self::DateTime => f.write_str("DateTime"),
            Self::Json => f.write_str("Json"),
            // Schemas can be self-referential (command children); print the name only.
            Self::Entity(schema) => write!(f, "Entity({})", schema.name),
            Self::Ref => f.write_str("Ref"),
        }
    }
}

/// Container shape of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    One,
    List(ListForm),
    /// JSON object keyed by string.
    Map,
}

/// Descriptor for one field of an entity.
#[derive(Debug, Clone, Copy)]
pub struct Attr {
    /// JSON field name.
    pub name: &'static str,
    pub kind: Kind,
    pub shape: Shape,
    pub access: Access,
    /// First API version that understands this field.
    pub since: Option<u32>,
}

impl Attr {
    pub const fn rw(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            shape: Shape::One,
            access: Access::ReadWrite,
            since: None,
        }
    }

    pub const fn ro(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            shape: Shape::One,
            access: Access::ReadOnly,
            since: None,
        }
    }

    /// List written as `{"items": [...]}`.
    pub const fn list(mut self) -> Self {
        self.shape = Shape::List(ListForm::Envelope);
        self
    }

    /// List written as a bare array.
    pub const fn bare_list(mut self) -> Self {
        self.shape = Shape::List(ListForm::Bare);
        self
    }

    pub const fn map(mut self) -> Self {
        self.shape = Shape::Map;
        self
    }

    pub const fn since(mut self, version: u32) -> Self {
        self.since = Some(version);
        self
    }

    pub fn is_writable(&self) -> bool {
        self.access == Access::ReadWrite
    }

    /// Whether a server speaking `version` understands this field.
    pub fn available_in(&self, version: u32) -> bool {
        self.since.is_none_or(|min| version >= min)
    }
}

/// Attribute table for one entity type.
#[derive(Debug)]
pub struct Schema {
    /// Type name, e.g. `ApiCluster`. Reference schemas are registered by it.
    pub name: &'static str,
    pub attrs: &'static [Attr],
}

impl Schema {
    pub fn attr(&self, name: &str) -> Option<&'static Attr> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn is(&self, other: &Schema) -> bool {
        std::ptr::eq(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static NODE: Schema = Schema {
        name: "Node",
        attrs: &[
            Attr::rw("name", Kind::String),
            Attr::ro("children", Kind::Entity(&NODE)).list(),
            Attr::rw("label", Kind::String).since(6),
        ],
    };

    #[test]
    fn lookup_by_json_name() {
        let attr = NODE.attr("children").map(|a| (a.shape, a.access));
        assert_eq!(
            attr,
            Some((Shape::List(ListForm::Envelope), Access::ReadOnly))
        );
        assert!(NODE.attr("missing").is_none());
    }

    #[test]
    fn self_referential_schema_debugs_without_recursing() {
        let rendered = format!("{:?}", NODE.attr("children"));
        assert!(rendered.contains("Entity(Node)"));
    }

    #[test]
    fn version_gate_on_attributes() {
        let label = NODE.attr("label").map(|a| (a.available_in(5), a.available_in(6)));
        assert_eq!(label, Some((false, true)));
        assert!(NODE.attr("name").is_some_and(|a| a.available_in(1)));
    }
}
