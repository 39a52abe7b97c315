//! Query clause value types.

use crate::value::Value;

/// Comparison operator of a where-condition leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
}

impl ComparisonOperator {
    /// True for `Equal`/`NotEqual`, the only operators that apply to null.
    #[must_use]
    pub fn is_equality(self) -> bool {
        matches!(self, ComparisonOperator::Equal | ComparisonOperator::NotEqual)
    }
}

/// How a where-expression attaches to the expression before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicalOperator {
    /// First expression in a sequence; attaches to nothing.
    #[default]
    None,
    /// Conjunction with the preceding expression.
    And,
    /// Disjunction with the preceding expression.
    Or,
}

/// A leaf comparison: field, operator, literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    /// Field on the primary entity.
    pub field: String,
    /// Comparison operator.
    pub op: ComparisonOperator,
    /// Literal to compare against; null compares with explicit null checks.
    pub value: Value,
}

/// Either a leaf condition or a parenthesized group.
///
/// The sum type replaces the source model's "condition XOR nested list"
/// null-invariant with a compiler-checked one.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereTerm {
    /// A leaf comparison.
    Condition(WhereCondition),
    /// A nested, parenthesized group of expressions.
    Group(Vec<WhereExpression>),
}

/// One element of a where sequence: connector plus term.
///
/// The engine has no precedence rules of its own; grouping is the only way
/// AND binds tighter than OR.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereExpression {
    /// Connector to the preceding expression (`None` for the first).
    pub connector: LogicalOperator,
    /// The condition or group.
    pub term: WhereTerm,
}

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// Primary rows without a match are dropped.
    Inner,
    /// Every primary row survives.
    Left,
}

/// A join from the primary entity to another container.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinDefinition {
    /// Join flavor.
    pub join_type: JoinType,
    /// Joined entity type name.
    pub entity: String,
    /// Joined container name.
    pub container: String,
    /// Field on the primary entity.
    pub left_field: String,
    /// Field on the joined entity.
    pub right_field: String,
}

/// Source of a join-backed projection.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSource {
    /// Joined entity type name.
    pub entity: String,
    /// Field on the joined entity whose value is copied over.
    pub field: String,
}

/// A projection target.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectDefinition {
    /// Target field name on the primary entity.
    pub field: String,
    /// When set, the value comes from a joined entity's field.
    pub join_source: Option<JoinSource>,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending (the default).
    #[default]
    Ascending,
    /// Descending.
    Descending,
}

/// The single ordering field of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Field to order by.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

/// Paging and ordering options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultOptions {
    /// Rows to skip before returning results.
    pub offset: usize,
    /// Maximum rows to return; `None` means the backend's row cap.
    pub limit: Option<usize>,
    /// At most one ordering field; `None` means creation order.
    pub order_by: Option<OrderBy>,
}

/// The root query for one primary entity type.
///
/// Immutable once built; safe to share across threads for repeated
/// execution.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryClause {
    pub(crate) entity: String,
    pub(crate) container: String,
    pub(crate) scan_all: bool,
    pub(crate) wheres: Vec<WhereExpression>,
    pub(crate) joins: Vec<JoinDefinition>,
    pub(crate) selects: Vec<SelectDefinition>,
    pub(crate) options: ResultOptions,
}

impl QueryClause {
    /// Primary entity type name.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Primary container name.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// True when the query explicitly opted into matching everything.
    #[must_use]
    pub fn is_scan_all(&self) -> bool {
        self.scan_all
    }

    /// The where sequence (empty for `scan_all` queries).
    #[must_use]
    pub fn wheres(&self) -> &[WhereExpression] {
        &self.wheres
    }

    /// Joins in declaration order.
    #[must_use]
    pub fn joins(&self) -> &[JoinDefinition] {
        &self.joins
    }

    /// Projection targets; empty means the full property set.
    #[must_use]
    pub fn selects(&self) -> &[SelectDefinition] {
        &self.selects
    }

    /// Paging and ordering options.
    #[must_use]
    pub fn options(&self) -> &ResultOptions {
        &self.options
    }

    /// True for the no-op query: no conditions and no explicit scan-all.
    ///
    /// Executing a no-op query returns zero results. This is a deliberate
    /// guard against accidental full-container scans.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !self.scan_all && self.wheres.is_empty()
    }
}
