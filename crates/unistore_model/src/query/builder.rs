//! Fluent query builder.

use crate::error::{ModelError, ModelResult};
use crate::query::clause::{
    ComparisonOperator, Direction, JoinDefinition, JoinSource, JoinType, LogicalOperator, OrderBy,
    QueryClause, ResultOptions, SelectDefinition, WhereCondition, WhereExpression, WhereTerm,
};
use crate::schema::{EntitySchema, SchemaRegistry};
use crate::value::Value;

/// Builds nested where groups inside [`QueryBuilder::and_group`] /
/// [`QueryBuilder::or_group`].
#[derive(Debug, Default)]
pub struct GroupBuilder {
    items: Vec<WhereExpression>,
}

impl GroupBuilder {
    /// Appends a condition, AND-connected to the preceding one.
    #[must_use]
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: ComparisonOperator,
        value: impl Into<Value>,
    ) -> Self {
        let connector = self.next_connector(LogicalOperator::And);
        self.items.push(condition(connector, field, op, value));
        self
    }

    /// Appends a condition, OR-connected to the preceding one.
    #[must_use]
    pub fn or_filter(
        mut self,
        field: impl Into<String>,
        op: ComparisonOperator,
        value: impl Into<Value>,
    ) -> Self {
        let connector = self.next_connector(LogicalOperator::Or);
        self.items.push(condition(connector, field, op, value));
        self
    }

    /// Appends a nested group, AND-connected to the preceding expression.
    #[must_use]
    pub fn and_group(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        let connector = self.next_connector(LogicalOperator::And);
        let group = f(GroupBuilder::default());
        self.items.push(WhereExpression {
            connector,
            term: WhereTerm::Group(group.items),
        });
        self
    }

    /// Appends a nested group, OR-connected to the preceding expression.
    #[must_use]
    pub fn or_group(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        let connector = self.next_connector(LogicalOperator::Or);
        let group = f(GroupBuilder::default());
        self.items.push(WhereExpression {
            connector,
            term: WhereTerm::Group(group.items),
        });
        self
    }

    fn next_connector(&self, wanted: LogicalOperator) -> LogicalOperator {
        if self.items.is_empty() {
            LogicalOperator::None
        } else {
            wanted
        }
    }
}

fn condition(
    connector: LogicalOperator,
    field: impl Into<String>,
    op: ComparisonOperator,
    value: impl Into<Value>,
) -> WhereExpression {
    WhereExpression {
        connector,
        term: WhereTerm::Condition(WhereCondition {
            field: field.into(),
            op,
            // Complex literals must match the canonical form the store
            // writes, whatever formatting the caller used.
            value: value.into().canonical(),
        }),
    }
}

/// Fluent builder for [`QueryClause`].
///
/// Construction is deferred-validating: combinators only collect, and
/// [`QueryBuilder::build`] checks every field reference against the schema
/// registry before freezing the immutable clause.
///
/// ```rust,ignore
/// let clause = QueryBuilder::from_schema(registry.get("Instrument")?)
///     .filter("rank", ComparisonOperator::GreaterThan, 10)
///     .or_group(|g| {
///         g.filter("name", ComparisonOperator::Equal, "cello")
///             .filter("in_stock", ComparisonOperator::Equal, true)
///     })
///     .order_by("name", Direction::Ascending)
///     .skip(10)
///     .take(10)
///     .build(&registry)?;
/// ```
#[derive(Debug)]
pub struct QueryBuilder {
    entity: String,
    container: String,
    scan_all: bool,
    wheres: Vec<WhereExpression>,
    joins: Vec<JoinDefinition>,
    selects: Vec<SelectDefinition>,
    options: ResultOptions,
}

impl QueryBuilder {
    /// Starts an empty query over the given entity schema.
    ///
    /// A query with no conditions at all is the no-op query and returns
    /// zero results; call [`QueryBuilder::scan_all`] to opt into matching
    /// everything.
    #[must_use]
    pub fn from_schema(schema: &EntitySchema) -> Self {
        Self {
            entity: schema.entity().to_string(),
            container: schema.container().to_string(),
            scan_all: false,
            wheres: Vec::new(),
            joins: Vec::new(),
            selects: Vec::new(),
            options: ResultOptions::default(),
        }
    }

    /// Opts into matching every row of the container.
    #[must_use]
    pub fn scan_all(mut self) -> Self {
        self.scan_all = true;
        self
    }

    /// Appends a condition, AND-connected to the preceding one.
    ///
    /// A null value with `Equal`/`NotEqual` translates to proper
    /// null-comparison semantics in every backend dialect.
    #[must_use]
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: ComparisonOperator,
        value: impl Into<Value>,
    ) -> Self {
        let connector = self.next_connector(LogicalOperator::And);
        self.wheres.push(condition(connector, field, op, value));
        self
    }

    /// Appends a condition, OR-connected to the preceding one.
    #[must_use]
    pub fn or_filter(
        mut self,
        field: impl Into<String>,
        op: ComparisonOperator,
        value: impl Into<Value>,
    ) -> Self {
        let connector = self.next_connector(LogicalOperator::Or);
        self.wheres.push(condition(connector, field, op, value));
        self
    }

    /// Appends a parenthesized group, AND-connected to the preceding
    /// expression.
    #[must_use]
    pub fn and_group(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        let connector = self.next_connector(LogicalOperator::And);
        let group = f(GroupBuilder::default());
        self.wheres.push(WhereExpression {
            connector,
            term: WhereTerm::Group(group.items),
        });
        self
    }

    /// Appends a parenthesized group, OR-connected to the preceding
    /// expression.
    #[must_use]
    pub fn or_group(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        let connector = self.next_connector(LogicalOperator::Or);
        let group = f(GroupBuilder::default());
        self.wheres.push(WhereExpression {
            connector,
            term: WhereTerm::Group(group.items),
        });
        self
    }

    /// Appends an inner join to another entity's container.
    ///
    /// Joins are unlimited and compose left-to-right in declaration order.
    #[must_use]
    pub fn join(
        mut self,
        other: &EntitySchema,
        left_field: impl Into<String>,
        right_field: impl Into<String>,
    ) -> Self {
        self.joins.push(JoinDefinition {
            join_type: JoinType::Inner,
            entity: other.entity().to_string(),
            container: other.container().to_string(),
            left_field: left_field.into(),
            right_field: right_field.into(),
        });
        self
    }

    /// Appends a left join to another entity's container.
    #[must_use]
    pub fn left_join(
        mut self,
        other: &EntitySchema,
        left_field: impl Into<String>,
        right_field: impl Into<String>,
    ) -> Self {
        self.joins.push(JoinDefinition {
            join_type: JoinType::Left,
            entity: other.entity().to_string(),
            container: other.container().to_string(),
            left_field: left_field.into(),
            right_field: right_field.into(),
        });
        self
    }

    /// Selects a field of the primary entity.
    #[must_use]
    pub fn select(mut self, field: impl Into<String>) -> Self {
        self.selects.push(SelectDefinition {
            field: field.into(),
            join_source: None,
        });
        self
    }

    /// Selects several fields of the primary entity.
    #[must_use]
    pub fn select_many<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.selects.push(SelectDefinition {
                field: field.into(),
                join_source: None,
            });
        }
        self
    }

    /// Projects a joined entity's field onto the primary entity under
    /// `target_field`, overwriting any existing value of that name.
    #[must_use]
    pub fn select_from_join(
        mut self,
        other: &EntitySchema,
        joined_field: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        self.selects.push(SelectDefinition {
            field: target_field.into(),
            join_source: Some(JoinSource {
                entity: other.entity().to_string(),
                field: joined_field.into(),
            }),
        });
        self
    }

    /// Sets the single ordering field and direction; last call wins.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.options.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Skips the first `n` matching rows.
    #[must_use]
    pub fn skip(mut self, n: usize) -> Self {
        self.options.offset = n;
        self
    }

    /// Caps the result at `n` rows. `take(0)` is valid and yields zero
    /// results.
    #[must_use]
    pub fn take(mut self, n: usize) -> Self {
        self.options.limit = Some(n);
        self
    }

    /// Validates the collected query against the registry and freezes it.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] when a referenced entity is unregistered, a
    /// field is undeclared, a condition value's kind conflicts with the
    /// declared field kind, or a join-backed selection names an entity that
    /// is not joined.
    pub fn build(self, registry: &SchemaRegistry) -> ModelResult<QueryClause> {
        let primary = registry.get(&self.entity)?;

        validate_wheres(&self.wheres, primary)?;

        for join in &self.joins {
            let joined = registry.get(&join.entity)?;
            primary.kind_of(&join.left_field)?;
            joined.kind_of(&join.right_field)?;
        }

        for select in &self.selects {
            primary.kind_of(&select.field)?;
            if let Some(source) = &select.join_source {
                if !self.joins.iter().any(|j| j.entity == source.entity) {
                    return Err(ModelError::invalid_query(format!(
                        "selection sources entity `{}` which is not joined",
                        source.entity
                    )));
                }
                registry.get(&source.entity)?.kind_of(&source.field)?;
            }
        }

        if let Some(order) = &self.options.order_by {
            primary.kind_of(&order.field)?;
        }

        Ok(QueryClause {
            entity: self.entity,
            container: self.container,
            scan_all: self.scan_all,
            wheres: self.wheres,
            joins: self.joins,
            selects: self.selects,
            options: self.options,
        })
    }

    fn next_connector(&self, wanted: LogicalOperator) -> LogicalOperator {
        if self.wheres.is_empty() {
            LogicalOperator::None
        } else {
            wanted
        }
    }
}

fn validate_wheres(wheres: &[WhereExpression], schema: &EntitySchema) -> ModelResult<()> {
    for expr in wheres {
        match &expr.term {
            WhereTerm::Condition(cond) => {
                let kind = schema.kind_of(&cond.field)?;
                if !cond.value.fits_kind(kind) {
                    return Err(ModelError::KindMismatch {
                        field: cond.field.clone(),
                        declared: kind.to_string(),
                        actual: cond
                            .value
                            .kind()
                            .map(|k| k.to_string())
                            .unwrap_or_else(|| "null".to_string()),
                    });
                }
            }
            WhereTerm::Group(items) => {
                if items.is_empty() {
                    return Err(ModelError::invalid_query("empty where group"));
                }
                validate_wheres(items, schema)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, SchemaRegistry};
    use crate::value::FieldKind;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register(EntitySchema::new(
                "Instrument",
                vec![
                    FieldDef::new("name", FieldKind::Text),
                    FieldDef::new("rank", FieldKind::Int),
                    FieldDef::new("tags", FieldKind::Complex),
                    FieldDef::new("maker_id", FieldKind::Guid),
                ],
            ))
            .unwrap();
        registry
            .register(EntitySchema::new(
                "Maker",
                vec![FieldDef::new("country", FieldKind::Text)],
            ))
            .unwrap();
        registry
    }

    #[test]
    fn empty_query_is_noop() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .build(&registry)
            .unwrap();
        assert!(clause.is_noop());
    }

    #[test]
    fn scan_all_opts_out_of_noop() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .scan_all()
            .build(&registry)
            .unwrap();
        assert!(!clause.is_noop());
        assert!(clause.is_scan_all());
    }

    #[test]
    fn connectors_default_to_and() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .filter("rank", ComparisonOperator::GreaterThan, 1)
            .filter("name", ComparisonOperator::Equal, "cello")
            .or_filter("rank", ComparisonOperator::Equal, 0)
            .build(&registry)
            .unwrap();

        let connectors: Vec<_> = clause.wheres().iter().map(|w| w.connector).collect();
        assert_eq!(
            connectors,
            vec![
                LogicalOperator::None,
                LogicalOperator::And,
                LogicalOperator::Or
            ]
        );
    }

    #[test]
    fn nested_groups_are_collected() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .filter("rank", ComparisonOperator::GreaterThan, 1)
            .or_group(|g| {
                g.filter("name", ComparisonOperator::Equal, "cello")
                    .filter("rank", ComparisonOperator::LessThan, 10)
            })
            .build(&registry)
            .unwrap();

        assert_eq!(clause.wheres().len(), 2);
        match &clause.wheres()[1].term {
            WhereTerm::Group(items) => assert_eq!(items.len(), 2),
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn unknown_field_fails_build() {
        let registry = registry();
        let err = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .filter("nope", ComparisonOperator::Equal, 1)
            .build(&registry);
        assert!(matches!(err, Err(ModelError::UnknownField { .. })));
    }

    #[test]
    fn kind_mismatch_fails_build() {
        let registry = registry();
        let err = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .filter("rank", ComparisonOperator::Equal, "not a number")
            .build(&registry);
        assert!(matches!(err, Err(ModelError::KindMismatch { .. })));
    }

    #[test]
    fn null_fits_any_kind() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .filter("name", ComparisonOperator::Equal, Value::Null)
            .build(&registry)
            .unwrap();
        assert_eq!(clause.wheres().len(), 1);
    }

    #[test]
    fn complex_condition_values_are_canonicalized() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .filter(
                "tags",
                ComparisonOperator::Equal,
                Value::Complex("{ \"solo\" : true , \"era\" : 1 }".into()),
            )
            .build(&registry)
            .unwrap();

        match &clause.wheres()[0].term {
            WhereTerm::Condition(cond) => assert_eq!(
                cond.value,
                Value::Complex(r#"{"era":1,"solo":true}"#.into())
            ),
            other => panic!("expected condition, got {other:?}"),
        }
    }

    #[test]
    fn select_from_unjoined_entity_fails() {
        let registry = registry();
        let maker = registry.get("Maker").unwrap().clone();
        let err = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .scan_all()
            .select_from_join(&maker, "country", "name")
            .build(&registry);
        assert!(matches!(err, Err(ModelError::InvalidQuery { .. })));
    }

    #[test]
    fn last_order_by_wins() {
        let registry = registry();
        let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .scan_all()
            .order_by("name", Direction::Ascending)
            .order_by("rank", Direction::Descending)
            .build(&registry)
            .unwrap();
        let order = clause.options().order_by.as_ref().unwrap();
        assert_eq!(order.field, "rank");
        assert_eq!(order.direction, Direction::Descending);
    }

    #[test]
    fn join_fields_are_validated() {
        let registry = registry();
        let maker = registry.get("Maker").unwrap().clone();
        let err = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
            .scan_all()
            .join(&maker, "maker_id", "missing_field")
            .build(&registry);
        assert!(matches!(err, Err(ModelError::UnknownField { .. })));
    }
}
