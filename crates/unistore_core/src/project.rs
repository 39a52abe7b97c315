//! Result projector.
//!
//! Trims rows to the selected fields. Consumers always receive a fully
//! shaped record: every schema-declared field is present, with unselected
//! (or never-stored) fields holding their kind's zero value rather than
//! being omitted.

use std::collections::HashSet;
use unistore_model::{EntitySchema, PropertyBag, QueryClause};

/// Applies the clause's selection list to the rows.
///
/// With no selections, the full property set is returned. With selections,
/// exactly the selected fields plus the mandatory identifier field keep
/// their values; every other declared field is zero-filled.
pub(crate) fn project(
    rows: Vec<PropertyBag>,
    clause: &QueryClause,
    schema: &EntitySchema,
) -> Vec<PropertyBag> {
    let selected: Option<HashSet<&str>> = if clause.selects().is_empty() {
        None
    } else {
        let mut set: HashSet<&str> = clause.selects().iter().map(|s| s.field.as_str()).collect();
        set.insert(schema.id_field());
        Some(set)
    };

    rows.into_iter()
        .map(|row| shape_row(row, schema, selected.as_ref()))
        .collect()
}

fn shape_row(
    row: PropertyBag,
    schema: &EntitySchema,
    selected: Option<&HashSet<&str>>,
) -> PropertyBag {
    let mut shaped = PropertyBag::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let keep = selected.is_none_or(|set| set.contains(field.name.as_str()));
        let value = if keep {
            row.get(&field.name)
                .cloned()
                .unwrap_or_else(|| field.kind.zero_value())
        } else {
            field.kind.zero_value()
        };
        shaped.insert(field.name.clone(), value);
    }
    shaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistore_model::{
        EntitySchema, FieldDef, FieldKind, QueryBuilder, SchemaRegistry, Value,
    };
    use uuid::Uuid;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register(EntitySchema::new(
                "Instrument",
                vec![
                    FieldDef::new("name", FieldKind::Text),
                    FieldDef::new("rank", FieldKind::Int),
                ],
            ))
            .unwrap();
        registry
    }

    fn row(name: &str, rank: i32) -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert("id".into(), Value::Guid(Uuid::new_v4()));
        bag.insert("name".into(), Value::Text(name.into()));
        bag.insert("rank".into(), Value::Int(rank));
        bag
    }

    #[test]
    fn no_selection_returns_full_shape() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .build(&registry)
            .unwrap();

        let rows = project(vec![row("cello", 3)], &clause, schema);
        assert_eq!(rows[0].get("name"), Some(&Value::Text("cello".into())));
        assert_eq!(rows[0].get("rank"), Some(&Value::Int(3)));
        // Never-stored declared fields materialize at their zero value.
        assert!(rows[0].contains_key("created_at"));
    }

    #[test]
    fn selection_zero_fills_the_rest() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .select("name")
            .build(&registry)
            .unwrap();

        let rows = project(vec![row("cello", 3)], &clause, schema);
        assert_eq!(rows[0].get("name"), Some(&Value::Text("cello".into())));
        // Unselected field present at zero value, not omitted.
        assert_eq!(rows[0].get("rank"), Some(&Value::Int(0)));
    }

    #[test]
    fn identifier_always_survives_selection() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .select("name")
            .build(&registry)
            .unwrap();

        let input = row("cello", 3);
        let id = input.get("id").cloned().unwrap();
        let rows = project(vec![input], &clause, schema);
        assert_eq!(rows[0].get("id"), Some(&id));
    }
}
