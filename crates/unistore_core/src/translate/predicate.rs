//! In-memory predicate renderer.
//!
//! Produces the parenthesized boolean expression form of a where tree, e.g.
//! `(rank > 5 and (name == "cello" or in_stock == true))`. Null comparisons
//! render as explicit `null` checks, never as a `"null"` string literal.

use unistore_model::{
    ComparisonOperator, LogicalOperator, QueryClause, Value, WhereExpression, WhereTerm,
};

/// Renders the clause's where tree as a boolean expression string.
///
/// A `scan_all` clause renders as `(true)`.
#[must_use]
pub fn render(clause: &QueryClause) -> String {
    if clause.wheres().is_empty() {
        return "(true)".to_string();
    }
    format!("({})", render_sequence(clause.wheres()))
}

fn render_sequence(wheres: &[WhereExpression]) -> String {
    let mut out = String::new();
    for (index, expr) in wheres.iter().enumerate() {
        if index > 0 {
            out.push_str(connector(expr.connector));
        }
        match &expr.term {
            WhereTerm::Condition(cond) => {
                out.push_str(&cond.field);
                out.push(' ');
                out.push_str(operator(cond.op));
                out.push(' ');
                out.push_str(&literal(&cond.value));
            }
            WhereTerm::Group(items) => {
                out.push('(');
                out.push_str(&render_sequence(items));
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

fn operator(op: ComparisonOperator) -> &'static str {
    match op {
        ComparisonOperator::Equal => "==",
        ComparisonOperator::NotEqual => "!=",
        ComparisonOperator::GreaterThan => ">",
        ComparisonOperator::GreaterThanOrEqual => ">=",
        ComparisonOperator::LessThan => "<",
        ComparisonOperator::LessThanOrEqual => "<=",
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Long(n) => n.to_string(),
        Value::Double(n) => n.to_string(),
        Value::Text(s) => quote(s),
        Value::Bytes(_) => quote(&value.encode_field()),
        Value::Guid(g) => quote(&g.to_string()),
        Value::DateTime(_) | Value::DateTimeOffset(_) => quote(&value.encode_field()),
        Value::Complex(s) => quote(s),
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
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
                    FieldDef::new("in_stock", FieldKind::Bool),
                ],
            ))
            .unwrap();
        registry
    }

    #[test]
    fn renders_nested_groups_with_parentheses() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .filter("rank", Op::GreaterThan, 5)
            .or_group(|g| {
                g.filter("name", Op::Equal, "cello")
                    .filter("in_stock", Op::Equal, true)
            })
            .build(&registry)
            .unwrap();

        assert_eq!(
            render(&clause),
            r#"(rank > 5 or (name == "cello" and in_stock == true))"#
        );
    }

    #[test]
    fn null_renders_as_null_check() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .filter("name", Op::Equal, Value::Null)
            .build(&registry)
            .unwrap();
        assert_eq!(render(&clause), "(name == null)");
    }

    #[test]
    fn scan_all_renders_true() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .scan_all()
            .build(&registry)
            .unwrap();
        assert_eq!(render(&clause), "(true)");
    }

    #[test]
    fn internal_quotes_are_escaped() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .filter("name", Op::Equal, r#"5'8" cello"#)
            .build(&registry)
            .unwrap();
        assert_eq!(render(&clause), r#"(name == "5'8\" cello")"#);
    }
}
