// Reference-type registry.
//
// Attributes of kind `Ref` are resolved from their JSON field name:
// `hostRef` -> `ApiHostRef`, `roleRefs` -> `ApiRoleRef`. The table is
// built once from the reference schemas declared in `endpoints::types`.

use std::collections::HashMap;
use std::sync::LazyLock;

use clustermgr_api::Error;

use crate::endpoints::types::REFERENCE_SCHEMAS;
use crate::schema::Schema;

const TYPE_PREFIX: &str = "Api";

static REGISTRY: LazyLock<HashMap<&'static str, &'static Schema>> = LazyLock::new(|| {
    REFERENCE_SCHEMAS
        .iter()
        .map(|schema| (schema.name, *schema))
        .collect()
});

/// Derive the reference type name for a field, or `None` if the field
/// does not follow the `...Ref` / `...Refs` convention.
pub fn reference_type_name(field: &str) -> Option<String> {
    let stem = field
        .strip_suffix("Refs")
        .or_else(|| field.strip_suffix("Ref"))?;
    let mut chars = stem.chars();
    let first = chars.next()?;
    Some(format!(
        "{TYPE_PREFIX}{}{}Ref",
        first.to_uppercase(),
        chars.as_str()
    ))
}

/// Look a reference schema up by its type name.
pub fn lookup(type_name: &str) -> Option<&'static Schema> {
    REGISTRY.get(type_name).copied()
}

/// Resolve the schema for a reference-typed field.
pub fn resolve(field: &str) -> Result<&'static Schema, Error> {
    let name = reference_type_name(field).ok_or_else(|| Error::UnknownReference {
        name: field.to_owned(),
        field: field.to_owned(),
    })?;
    lookup(&name).ok_or(Error::UnknownReference {
        name,
        field: field.to_owned(),
    })
}
