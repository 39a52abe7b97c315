//! In-process document-store emulator.
//!
//! Stands at the wire-client boundary: a real deployment would talk to a
//! cloud document store through its SDK, which is out of scope here. The
//! emulator keeps the same observable contract - documents stored as typed
//! JSON, queried with the SQL-like dialect - so the engine's translation and
//! equivalence properties exercise this layout's encode/decode path.

use crate::backend::{FilterDialect, RowFilter, StoreBackend};
use crate::error::{StorageError, StorageResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use parking_lot::RwLock;
use serde_json::Value as Json;
use std::collections::HashMap;
use tracing::{debug, warn};
use unistore_model::{identifier, EntitySchema, FieldKind, PropertyBag, Value};

/// An in-process document-store backend.
///
/// Documents are `serde_json::Value` objects held per container in creation
/// order. Speaks the [`FilterDialect::DocumentSql`] dialect and logs the
/// `SELECT` text it receives at the query boundary.
#[derive(Debug, Default)]
pub struct DocumentBackend {
    containers: RwLock<HashMap<String, Vec<Json>>>,
}

impl DocumentBackend {
    /// Creates a new empty document backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn doc_id(doc: &Json, schema: &EntitySchema) -> Option<String> {
        doc.get(schema.id_field())
            .and_then(Json::as_str)
            .map(str::to_string)
    }

    fn encode_doc(schema: &EntitySchema, bag: &PropertyBag) -> Json {
        let mut doc = serde_json::Map::new();
        for field in schema.fields() {
            let Some(value) = bag.get(&field.name) else {
                continue;
            };
            doc.insert(field.name.clone(), encode_json(schema, &field.name, value));
        }
        Json::Object(doc)
    }

    fn decode_doc(schema: &EntitySchema, doc: &Json) -> PropertyBag {
        let mut bag = PropertyBag::new();
        let Some(object) = doc.as_object() else {
            return bag;
        };
        for (name, json) in object {
            let Some(field) = schema.field(name) else {
                continue;
            };
            bag.insert(name.clone(), decode_json(schema, name, json, field.kind));
        }
        bag
    }
}

/// Maps a model value to its typed JSON document form.
fn encode_json(schema: &EntitySchema, field: &str, value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(n) => Json::from(*n),
        Value::Long(n) => Json::from(*n),
        Value::Double(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Text(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(BASE64.encode(b)),
        Value::Guid(g) => Json::String(g.to_string()),
        Value::DateTime(_) | Value::DateTimeOffset(_) => Json::String(value.encode_field()),
        Value::Complex(s) => match serde_json::from_str(s) {
            Ok(json) => json,
            Err(err) => {
                warn!(
                    entity = schema.entity(),
                    field,
                    %err,
                    "complex value is not valid JSON; storing null"
                );
                Json::Null
            }
        },
    }
}

/// Maps a stored JSON value back to the declared kind; anything that does
/// not fit recovers as null.
fn decode_json(schema: &EntitySchema, field: &str, json: &Json, kind: FieldKind) -> Value {
    if json.is_null() {
        return Value::Null;
    }
    let decoded = match kind {
        FieldKind::Text => json.as_str().map(|s| Value::Text(s.to_string())),
        FieldKind::Bool => json.as_bool().map(Value::Bool),
        FieldKind::Int => json
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Value::Int),
        FieldKind::Long => json.as_i64().map(Value::Long),
        FieldKind::Double => json.as_f64().map(Value::Double),
        FieldKind::Bytes => json
            .as_str()
            .and_then(|s| BASE64.decode(s).ok())
            .map(Value::Bytes),
        FieldKind::Guid => json
            .as_str()
            .and_then(|s| s.parse().ok())
            .map(Value::Guid),
        FieldKind::DateTime | FieldKind::DateTimeOffset => json
            .as_str()
            .and_then(|s| Value::decode_field(s, kind).ok()),
        FieldKind::Complex => serde_json::to_string(json).ok().map(Value::Complex),
    };
    decoded.unwrap_or_else(|| {
        warn!(
            entity = schema.entity(),
            field, "stored document value does not fit its declared kind; recovering as null"
        );
        Value::Null
    })
}

impl StoreBackend for DocumentBackend {
    fn add(&self, schema: &EntitySchema, bag: &PropertyBag) -> StorageResult<String> {
        let id = identifier(bag, schema).ok_or_else(|| StorageError::MissingIdentifier {
            container: schema.container().to_string(),
        })?;
        let doc = Self::encode_doc(schema, bag);
        self.containers
            .write()
            .entry(schema.container().to_string())
            .or_default()
            .push(doc);
        Ok(id)
    }

    fn remove(&self, schema: &EntitySchema, id: &str) -> StorageResult<()> {
        let mut containers = self.containers.write();
        let docs = containers
            .get_mut(schema.container())
            .ok_or_else(|| StorageError::not_found(schema.container(), id))?;
        match docs
            .iter()
            .position(|d| Self::doc_id(d, schema).as_deref() == Some(id))
        {
            Some(index) => {
                docs.remove(index);
                Ok(())
            }
            None => Err(StorageError::not_found(schema.container(), id)),
        }
    }

    fn retrieve(&self, schema: &EntitySchema, id: &str) -> StorageResult<Option<PropertyBag>> {
        let containers = self.containers.read();
        let Some(docs) = containers.get(schema.container()) else {
            return Ok(None);
        };
        Ok(docs
            .iter()
            .find(|d| Self::doc_id(d, schema).as_deref() == Some(id))
            .map(|d| Self::decode_doc(schema, d)))
    }

    fn replace(
        &self,
        schema: &EntitySchema,
        id: &str,
        bag: &PropertyBag,
    ) -> StorageResult<PropertyBag> {
        let mut containers = self.containers.write();
        let docs = containers
            .get_mut(schema.container())
            .ok_or_else(|| StorageError::not_found(schema.container(), id))?;
        match docs
            .iter()
            .position(|d| Self::doc_id(d, schema).as_deref() == Some(id))
        {
            Some(index) => {
                docs[index] = Self::encode_doc(schema, bag);
                Ok(Self::decode_doc(schema, &docs[index]))
            }
            None => Err(StorageError::not_found(schema.container(), id)),
        }
    }

    fn count(&self, schema: &EntitySchema) -> StorageResult<usize> {
        Ok(self
            .containers
            .read()
            .get(schema.container())
            .map_or(0, Vec::len))
    }

    fn query(
        &self,
        schema: &EntitySchema,
        filter: &dyn RowFilter,
    ) -> StorageResult<Vec<PropertyBag>> {
        debug!(
            container = schema.container(),
            query = filter.native_text(),
            "executing document query"
        );
        let containers = self.containers.read();
        let Some(docs) = containers.get(schema.container()) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .map(|d| Self::decode_doc(schema, d))
            .filter(|bag| filter.matches(bag))
            .collect())
    }

    fn destroy_all(&self, schema: &EntitySchema) -> StorageResult<()> {
        self.containers.write().remove(schema.container());
        Ok(())
    }

    fn dialect(&self) -> FilterDialect {
        FilterDialect::DocumentSql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistore_model::{set_identifier, FieldDef};

    struct MatchAll;

    impl RowFilter for MatchAll {
        fn matches(&self, _bag: &PropertyBag) -> bool {
            true
        }

        fn native_text(&self) -> &str {
            "SELECT * FROM instruments t"
        }
    }

    fn schema() -> EntitySchema {
        EntitySchema::new(
            "Instrument",
            vec![
                FieldDef::new("name", FieldKind::Text),
                FieldDef::new("rank", FieldKind::Int),
                FieldDef::new("spec", FieldKind::Complex),
            ],
        )
    }

    #[test]
    fn complex_fields_store_as_real_json() {
        let backend = DocumentBackend::new();
        let schema = schema();
        let mut bag = PropertyBag::new();
        let id = uuid::Uuid::new_v4().to_string();
        set_identifier(&mut bag, &schema, &id);
        bag.insert("spec".into(), Value::Complex(r#"{"strings":4}"#.into()));

        backend.add(&schema, &bag).unwrap();
        let loaded = backend.retrieve(&schema, &id).unwrap().unwrap();
        match loaded.get("spec") {
            Some(Value::Complex(s)) => {
                let json: Json = serde_json::from_str(s).unwrap();
                assert_eq!(json["strings"], 4);
            }
            other => panic!("expected complex, got {other:?}"),
        }
    }

    #[test]
    fn typed_round_trip() {
        let backend = DocumentBackend::new();
        let schema = schema();
        let mut bag = PropertyBag::new();
        let id = uuid::Uuid::new_v4().to_string();
        set_identifier(&mut bag, &schema, &id);
        bag.insert("name".into(), Value::Text("cello".into()));
        bag.insert("rank".into(), Value::Int(3));

        backend.add(&schema, &bag).unwrap();
        let loaded = backend.retrieve(&schema, &id).unwrap().unwrap();
        assert_eq!(loaded.get("name"), Some(&Value::Text("cello".into())));
        assert_eq!(loaded.get("rank"), Some(&Value::Int(3)));
    }

    #[test]
    fn null_round_trip() {
        let backend = DocumentBackend::new();
        let schema = schema();
        let mut bag = PropertyBag::new();
        let id = uuid::Uuid::new_v4().to_string();
        set_identifier(&mut bag, &schema, &id);
        bag.insert("name".into(), Value::Null);

        backend.add(&schema, &bag).unwrap();
        let loaded = backend.retrieve(&schema, &id).unwrap().unwrap();
        assert_eq!(loaded.get("name"), Some(&Value::Null));
    }

    #[test]
    fn query_missing_container_is_empty() {
        let backend = DocumentBackend::new();
        let schema = schema();
        assert!(backend.query(&schema, &MatchAll).unwrap().is_empty());
    }
}
