//! Property bags, the backend-neutral wire form of an entity.

use crate::schema::EntitySchema;
use crate::value::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// An untyped map from field name to value.
pub type PropertyBag = HashMap<String, Value>;

/// Extracts the identifier of a bag as a string, per its schema.
///
/// Returns `None` when the identifier field is absent, null, or holds the
/// empty string / nil UUID (an "empty identifier" signals a construction bug
/// in the caller and is treated distinctly by the store).
#[must_use]
pub fn identifier(bag: &PropertyBag, schema: &EntitySchema) -> Option<String> {
    match bag.get(schema.id_field()) {
        Some(Value::Guid(g)) if *g != Uuid::nil() => Some(g.to_string()),
        Some(Value::Text(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Sets the identifier field of a bag.
pub fn set_identifier(bag: &mut PropertyBag, schema: &EntitySchema, id: &str) {
    let value = match id.parse::<Uuid>() {
        Ok(g) => Value::Guid(g),
        Err(_) => Value::Text(id.to_string()),
    };
    bag.insert(schema.id_field().to_string(), value);
}
