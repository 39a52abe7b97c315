//! The backend-agnostic query model.
//!
//! A [`QueryClause`] is an immutable value tree describing one query over a
//! primary entity: where-conditions (nested with AND/OR), joins to other
//! containers, field selections, ordering, and paging. Clauses are built
//! with the fluent [`QueryBuilder`] and validated against the schema
//! registry before execution.

mod builder;
mod clause;

pub use builder::{GroupBuilder, QueryBuilder};
pub use clause::{
    ComparisonOperator, Direction, JoinDefinition, JoinSource, JoinType, LogicalOperator, OrderBy,
    QueryClause, ResultOptions, SelectDefinition, WhereCondition, WhereExpression, WhereTerm,
};
