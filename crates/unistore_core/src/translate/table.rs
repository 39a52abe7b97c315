//! Table-store filter renderer.
//!
//! Builds filter strings the way a cloud table SDK's condition generators
//! do: one typed generator per value kind (`string`, `date`, `bool`,
//! `double`, `int`, `long`, `binary`, `guid`), combined with lowercase
//! `and`/`or` and comparison mnemonics (`eq ne gt ge lt le`). The entity's
//! identifier field maps onto the native `RowKey` column. The table store
//! is string-typed, so null comparisons use the reserved sentinel token;
//! complex values fall back to their JSON-serialized string form.

use unistore_model::{
    ComparisonOperator, EntitySchema, LogicalOperator, QueryClause, Value, WhereExpression,
    WhereTerm, NULL_SENTINEL,
};
use unistore_storage::ROW_KEY_COLUMN;

/// Renders the clause as a table filter string.
///
/// A `scan_all` clause renders as an unfiltered row-key presence check.
#[must_use]
pub fn render(clause: &QueryClause, schema: &EntitySchema) -> String {
    if clause.wheres().is_empty() {
        return format!("({ROW_KEY_COLUMN} ne '')");
    }
    format!("({})", render_sequence(clause.wheres(), schema))
}

fn render_sequence(wheres: &[WhereExpression], schema: &EntitySchema) -> String {
    let mut out = String::new();
    for (index, expr) in wheres.iter().enumerate() {
        if index > 0 {
            out.push_str(connector(expr.connector));
        }
        match &expr.term {
            WhereTerm::Condition(cond) => {
                let column = if cond.field == schema.id_field() {
                    ROW_KEY_COLUMN
                } else {
                    &cond.field
                };
                out.push_str(&condition(column, cond.op, &cond.value));
            }
            WhereTerm::Group(items) => {
                out.push('(');
                out.push_str(&render_sequence(items, schema));
                out.push(')');
            }
        }
    }
    out
}

fn connector(op: LogicalOperator) -> &'static str {
    match op {
        LogicalOperator::And | LogicalOperator::None => " and ",
        LogicalOperator::Or => " or ",
    }
}

fn mnemonic(op: ComparisonOperator) -> &'static str {
    match op {
        ComparisonOperator::Equal => "eq",
        ComparisonOperator::NotEqual => "ne",
        ComparisonOperator::GreaterThan => "gt",
        ComparisonOperator::GreaterThanOrEqual => "ge",
        ComparisonOperator::LessThan => "lt",
        ComparisonOperator::LessThanOrEqual => "le",
    }
}

/// Routes a value to its typed condition generator.
fn condition(column: &str, op: ComparisonOperator, value: &Value) -> String {
    let op = mnemonic(op);
    match value {
        // String-typed storage: null is the sentinel token.
        Value::Null => format!("{column} {op} {}", quote(NULL_SENTINEL)),
        Value::Bool(b) => format!("{column} {op} {b}"),
        Value::Int(n) => format!("{column} {op} {n}"),
        Value::Long(n) => format!("{column} {op} {n}L"),
        Value::Double(n) => format!("{column} {op} {n}"),
        Value::Text(s) => format!("{column} {op} {}", quote(s)),
        Value::Bytes(b) => format!("{column} {op} X'{}'", hex(b)),
        Value::Guid(g) => format!("{column} {op} guid'{g}'"),
        Value::DateTime(_) | Value::DateTimeOffset(_) => {
            format!("{column} {op} datetime'{}'", value.encode_field())
        }
        Value::Complex(s) => format!("{column} {op} {}", quote(s)),
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistore_model::{
        ComparisonOperator as Op, EntitySchema, FieldDef, FieldKind, QueryBuilder, SchemaRegistry,
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
                    FieldDef::new("weight", FieldKind::Long),
                    FieldDef::new("photo", FieldKind::Bytes),
                ],
            ))
            .unwrap();
        registry
    }

    #[test]
    fn identifier_maps_to_row_key() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let id = Uuid::nil();
        let clause = QueryBuilder::from_schema(schema)
            .filter("id", Op::Equal, id)
            .build(&registry)
            .unwrap();
        assert_eq!(
            render(&clause, schema),
            format!("(RowKey eq guid'{id}')")
        );
    }

    #[test]
    fn typed_generators_per_kind() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .filter("weight", Op::GreaterThan, 12_i64)
            .filter("photo", Op::Equal, vec![0xde_u8, 0xad])
            .or_filter("name", Op::NotEqual, "o'boe")
            .build(&registry)
            .unwrap();
        assert_eq!(
            render(&clause, schema),
            "(weight gt 12L and photo eq X'dead' or name ne 'o''boe')"
        );
    }

    #[test]
    fn null_uses_the_sentinel() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .filter("name", Op::Equal, Value::Null)
            .build(&registry)
            .unwrap();
        assert_eq!(
            render(&clause, schema),
            format!("(name eq '{NULL_SENTINEL}')")
        );
    }

    #[test]
    fn scan_all_is_a_presence_check() {
        let registry = registry();
        let schema = registry.get("Instrument").unwrap();
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .build(&registry)
            .unwrap();
        assert_eq!(render(&clause, schema), "(RowKey ne '')");
    }
}
