//! Flat string-map codec shared by the string-typed layouts.
//!
//! The file backend persists one `{propertyName: stringValue}` map per
//! entity; the table backend stores the same shape as a row. Both use the
//! value codec from `unistore_model` (null sentinel, ISO-8601 datetimes,
//! base64 bytes) so null comparisons and datetime precision survive a round
//! trip through either layout.

use std::collections::HashMap;
use tracing::warn;
use unistore_model::{EntitySchema, PropertyBag, Value};

/// Encodes a bag into a flat string map.
///
/// Only schema-declared fields are written; anything else in the bag is a
/// caller artifact and does not persist.
pub(crate) fn encode_bag(schema: &EntitySchema, bag: &PropertyBag) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(bag.len());
    for field in schema.fields() {
        if let Some(value) = bag.get(&field.name) {
            map.insert(field.name.clone(), value.encode_field());
        }
    }
    map
}

/// Decodes a flat string map back into a bag.
///
/// Stored fields the schema no longer declares are skipped. A value that
/// fails to decode (a malformed complex JSON string, for instance) recovers
/// as null rather than failing the whole read.
pub(crate) fn decode_bag(schema: &EntitySchema, map: &HashMap<String, String>) -> PropertyBag {
    let mut bag = PropertyBag::with_capacity(map.len());
    for (name, raw) in map {
        let Some(field) = schema.field(name) else {
            continue;
        };
        let value = match Value::decode_field(raw, field.kind) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    entity = schema.entity(),
                    field = name.as_str(),
                    %err,
                    "stored value failed to decode; recovering as null"
                );
                Value::Null
            }
        };
        bag.insert(name.clone(), value);
    }
    bag
}
