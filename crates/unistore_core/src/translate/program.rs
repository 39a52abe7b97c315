//! Compiled row-matching program.
//!
//! The schema-resolved, evaluable form of a where tree. All in-process
//! backends evaluate the same program against rows decoded from their own
//! storage layout, which is what makes the cross-backend equivalence
//! property hold by construction.

use unistore_model::{
    ComparisonOperator, LogicalOperator, PropertyBag, QueryClause, Value, WhereExpression,
    WhereTerm,
};

/// One node of the compiled program.
#[derive(Debug, Clone)]
enum MatchNode {
    /// A leaf comparison.
    Leaf {
        field: String,
        op: ComparisonOperator,
        value: Value,
    },
    /// A parenthesized group.
    Group(Vec<(LogicalOperator, MatchNode)>),
}

/// A compiled predicate over property bags.
///
/// An empty program (a `scan_all` query) matches every row. Connectors fold
/// left-to-right with no precedence of their own; grouping is the only
/// binding rule, exactly as in the rendered filter texts.
#[derive(Debug, Clone)]
pub struct MatchProgram {
    items: Vec<(LogicalOperator, MatchNode)>,
}

impl MatchProgram {
    /// Compiles the where tree of a clause.
    #[must_use]
    pub fn compile(clause: &QueryClause) -> Self {
        Self {
            items: compile_sequence(clause.wheres()),
        }
    }

    /// Tests one row against the program.
    #[must_use]
    pub fn matches(&self, bag: &PropertyBag) -> bool {
        if self.items.is_empty() {
            return true;
        }
        eval_sequence(&self.items, bag)
    }
}

fn compile_sequence(wheres: &[WhereExpression]) -> Vec<(LogicalOperator, MatchNode)> {
    wheres
        .iter()
        .map(|expr| {
            let node = match &expr.term {
                WhereTerm::Condition(cond) => MatchNode::Leaf {
                    field: cond.field.clone(),
                    op: cond.op,
                    value: cond.value.clone(),
                },
                WhereTerm::Group(items) => MatchNode::Group(compile_sequence(items)),
            };
            (expr.connector, node)
        })
        .collect()
}

fn eval_sequence(items: &[(LogicalOperator, MatchNode)], bag: &PropertyBag) -> bool {
    let mut acc = false;
    for (index, (connector, node)) in items.iter().enumerate() {
        let hit = eval_node(node, bag);
        if index == 0 {
            acc = hit;
            continue;
        }
        acc = match connector {
            LogicalOperator::Or => acc || hit,
            // A missing connector mid-sequence behaves as a conjunction.
            LogicalOperator::And | LogicalOperator::None => acc && hit,
        };
    }
    acc
}

fn eval_node(node: &MatchNode, bag: &PropertyBag) -> bool {
    match node {
        MatchNode::Leaf { field, op, value } => {
            let stored = bag.get(field).unwrap_or(&Value::Null);
            eval_leaf(stored, *op, value)
        }
        MatchNode::Group(items) => eval_sequence(items, bag),
    }
}

/// Evaluates one typed comparison.
///
/// Equality operators apply to null (an absent field counts as null); range
/// operators never match when either side is null or the kinds are not
/// comparable.
fn eval_leaf(stored: &Value, op: ComparisonOperator, literal: &Value) -> bool {
    match op {
        ComparisonOperator::Equal => stored.query_eq(literal),
        ComparisonOperator::NotEqual => !stored.query_eq(literal),
        ComparisonOperator::GreaterThan => {
            stored.query_cmp(literal) == Some(std::cmp::Ordering::Greater)
        }
        ComparisonOperator::GreaterThanOrEqual => matches!(
            stored.query_cmp(literal),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        ),
        ComparisonOperator::LessThan => {
            stored.query_cmp(literal) == Some(std::cmp::Ordering::Less)
        }
        ComparisonOperator::LessThanOrEqual => matches!(
            stored.query_cmp(literal),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ),
    }
}
