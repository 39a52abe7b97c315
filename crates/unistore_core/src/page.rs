//! Paging and ordering.
//!
//! Ordering applies before offset/limit. The default order is ascending by
//! the reserved creation timestamp; when the explicit ordering field was
//! zero-filled by an active selection list, the sort falls back to creation
//! order as well. Sorting is stable, so equal keys keep the backend's
//! creation order.

use unistore_model::{
    Direction, EntitySchema, PropertyBag, QueryClause, Value, CREATED_AT_FIELD,
};

/// Orders the rows and applies offset/limit. `cap` is the backend's row cap,
/// used when the clause sets no limit.
pub(crate) fn order_and_page(
    mut rows: Vec<PropertyBag>,
    clause: &QueryClause,
    schema: &EntitySchema,
    cap: usize,
) -> Vec<PropertyBag> {
    let (field, direction) = effective_order(clause, schema);

    rows.sort_by(|a, b| {
        let null = Value::Null;
        let va = a.get(field).unwrap_or(&null);
        let vb = b.get(field).unwrap_or(&null);
        match direction {
            Direction::Ascending => va.cmp_sort(vb),
            Direction::Descending => vb.cmp_sort(va),
        }
    });

    let offset = clause.options().offset;
    let limit = clause.options().limit.unwrap_or(cap);
    rows.into_iter().skip(offset).take(limit).collect()
}

/// Picks the ordering field and direction.
///
/// Explicit `order_by` wins unless an active selection list excluded its
/// field (the projected rows then carry only a zero value, so ordering by
/// it would be meaningless); both that case and the no-`order_by` case use
/// creation order.
fn effective_order<'a>(
    clause: &'a QueryClause,
    schema: &'a EntitySchema,
) -> (&'a str, Direction) {
    if let Some(order) = &clause.options().order_by {
        let selection_active = !clause.selects().is_empty();
        let excluded = selection_active
            && order.field != schema.id_field()
            && !clause.selects().iter().any(|s| s.field == order.field);
        if !excluded {
            return (order.field.as_str(), order.direction);
        }
    }
    (CREATED_AT_FIELD, Direction::Ascending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistore_model::{
        ComparisonOperator as Op, EntitySchema, FieldDef, FieldKind, QueryBuilder, SchemaRegistry,
    };

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
        bag.insert("name".into(), Value::Text(name.into()));
        bag.insert("rank".into(), Value::Int(rank));
        bag
    }

    #[test]
    fn orders_before_paging() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .order_by("rank", Direction::Ascending)
            .skip(1)
            .take(1)
            .build(&registry)
            .unwrap();

        let rows = order_and_page(
            vec![row("c", 3), row("a", 1), row("b", 2)],
            &clause,
            schema,
            usize::MAX,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("rank"), Some(&Value::Int(2)));
    }

    #[test]
    fn descending_reverses() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .order_by("rank", Direction::Descending)
            .build(&registry)
            .unwrap();

        let rows = order_and_page(
            vec![row("a", 1), row("c", 3), row("b", 2)],
            &clause,
            schema,
            usize::MAX,
        );
        let ranks: Vec<_> = rows.iter().map(|r| r.get("rank").cloned().unwrap()).collect();
        assert_eq!(ranks, vec![Value::Int(3), Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn skip_beyond_rows_is_empty() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .skip(10)
            .build(&registry)
            .unwrap();

        let rows = order_and_page(vec![row("a", 1)], &clause, schema, usize::MAX);
        assert!(rows.is_empty());
    }

    #[test]
    fn take_zero_is_empty() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .take(0)
            .build(&registry)
            .unwrap();

        let rows = order_and_page(vec![row("a", 1)], &clause, schema, usize::MAX);
        assert!(rows.is_empty());
    }

    #[test]
    fn unset_take_uses_the_backend_cap() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .build(&registry)
            .unwrap();

        let rows = order_and_page(
            vec![row("a", 1), row("b", 2), row("c", 3)],
            &clause,
            schema,
            2,
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn excluded_order_field_falls_back_to_creation_order() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .select("name")
            .order_by("rank", Direction::Descending)
            .build(&registry)
            .unwrap();

        let (field, direction) = effective_order(&clause, schema);
        assert_eq!(field, CREATED_AT_FIELD);
        assert_eq!(direction, Direction::Ascending);
    }

    #[test]
    fn selected_order_field_is_honored() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .filter("rank", Op::GreaterThan, 0)
            .select("rank")
            .order_by("rank", Direction::Descending)
            .build(&registry)
            .unwrap();

        let (field, direction) = effective_order(&clause, schema);
        assert_eq!(field, "rank");
        assert_eq!(direction, Direction::Descending);
    }

    #[test]
    fn stable_sort_keeps_arrival_order_on_ties() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .order_by("rank", Direction::Ascending)
            .build(&registry)
            .unwrap();

        let rows = order_and_page(
            vec![row("first", 1), row("second", 1), row("third", 1)],
            &clause,
            schema,
            usize::MAX,
        );
        let names: Vec<_> = rows
            .iter()
            .map(|r| r.get("name").cloned().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                Value::Text("first".into()),
                Value::Text("second".into()),
                Value::Text("third".into())
            ]
        );
    }
}
