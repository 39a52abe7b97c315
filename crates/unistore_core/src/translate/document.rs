//! Document-store SQL renderer.
//!
//! Produces the SQL-like query a cloud document store executes:
//! `SELECT * FROM <container> t WHERE t.rank > 5 AND (t.name = "cello" ...)`.
//! Datetimes render with full round-trip precision, booleans lowercase,
//! bytes as base64; text, Guid, and complex literals are quoted with
//! internal quotes escaped.

use unistore_model::{
    ComparisonOperator, LogicalOperator, QueryClause, Value, WhereExpression, WhereTerm,
};

/// Renders the clause as a document-store query.
///
/// A `scan_all` clause renders with no WHERE section.
#[must_use]
pub fn render(clause: &QueryClause) -> String {
    let head = format!("SELECT * FROM {} t", clause.container());
    if clause.wheres().is_empty() {
        return head;
    }
    format!("{head} WHERE {}", render_sequence(clause.wheres()))
}

fn render_sequence(wheres: &[WhereExpression]) -> String {
    let mut out = String::new();
    for (index, expr) in wheres.iter().enumerate() {
        if index > 0 {
            out.push_str(connector(expr.connector));
        }
        match &expr.term {
            WhereTerm::Condition(cond) => {
                out.push_str("t.");
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
        LogicalOperator::And | LogicalOperator::None => " AND ",
        LogicalOperator::Or => " OR ",
    }
}

fn operator(op: ComparisonOperator) -> &'static str {
    match op {
        ComparisonOperator::Equal => "=",
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
