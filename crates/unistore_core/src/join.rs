//! Join resolver.
//!
//! Merges joined-container rows into the primary result set after the
//! backend has evaluated the where predicate. Joins process in declaration
//! order and compose left-to-right: each join filters (inner) or annotates
//! (left) the surviving primary rows independently.

use crate::error::CoreResult;
use unistore_model::{
    EntitySchema, JoinType, PropertyBag, QueryClause, SchemaRegistry, Value,
};

/// Applies every join of the clause to the primary rows.
///
/// `load_joined` scans a joined entity's container in full; it is called
/// once per join, in declaration order.
pub(crate) fn resolve(
    primary: Vec<PropertyBag>,
    clause: &QueryClause,
    registry: &SchemaRegistry,
    load_joined: &mut dyn FnMut(&EntitySchema) -> CoreResult<Vec<PropertyBag>>,
) -> CoreResult<Vec<PropertyBag>> {
    let mut rows = primary;
    for join in clause.joins() {
        let joined_schema = registry.get(&join.entity)?;
        let joined_rows = load_joined(joined_schema)?;

        // Projections sourced from this join's entity.
        let copies: Vec<(&str, &str)> = clause
            .selects()
            .iter()
            .filter_map(|select| {
                select
                    .join_source
                    .as_ref()
                    .filter(|source| source.entity == join.entity)
                    .map(|source| (source.field.as_str(), select.field.as_str()))
            })
            .collect();

        let mut next = Vec::with_capacity(rows.len());
        for mut row in rows {
            let left = row.get(&join.left_field).cloned().unwrap_or(Value::Null);
            let matched = joined_rows.iter().find(|candidate| {
                candidate
                    .get(&join.right_field)
                    .is_some_and(|right| !left.is_null() && left.query_eq(right))
            });

            match matched {
                Some(joined_row) => {
                    for (joined_field, target_field) in &copies {
                        let value = joined_row
                            .get(*joined_field)
                            .cloned()
                            .unwrap_or(Value::Null);
                        row.insert((*target_field).to_string(), value);
                    }
                    next.push(row);
                }
                None => match join.join_type {
                    // Inner join drops unmatched primary rows.
                    JoinType::Inner => {}
                    // Left join keeps the row; join-sourced fields retain
                    // their pre-join values.
                    JoinType::Left => next.push(row),
                },
            }
        }
        rows = next;
    }
    Ok(rows)
}
