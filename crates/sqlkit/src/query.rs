//! SELECT query descriptors.
//!
//! [`SelectQuery`] accumulates select targets, sources, predicates, grouping,
//! ordering, and paging through fluent setters, then [`SelectQuery::validate`]
//! checks the result (resolving raw name references against a frozen
//! [`Model`]). Dialects refuse to render an unvalidated query.

use std::sync::Arc;

use crate::condition::Condition;
use crate::dialect::FunctionCall;
use crate::error::{SqlError, SqlResult};
use crate::ident::validate_identifier;
use crate::schema::{Field, Model, Table};

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ordering {
    #[default]
    None,
    Asc,
    Desc,
}

impl Ordering {
    pub fn token(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One selected expression.
#[derive(Debug, Clone)]
pub enum SelectTarget {
    /// A plain field
    Field(Arc<Field>),
    /// A field with an alias: `name AS alias`
    FieldAs(Arc<Field>, String),
    /// A scalar function call
    Function(FunctionCall),
    /// Raw textual expression (resolved against the model when it names a field)
    Raw(String),
}

/// A SELECT statement descriptor built through fluent accumulation.
///
/// Append-only until [`validate`](Self::validate); treated as read-only once
/// handed to a dialect.
#[derive(Debug, Default)]
pub struct SelectQuery {
    distinct: bool,
    targets: Vec<SelectTarget>,
    tables: Vec<Arc<Table>>,
    raw_sources: Vec<String>,
    joins: Vec<(Arc<Field>, Arc<Field>)>,
    pks: Vec<i64>,
    conditions: Vec<Condition>,
    raw_conditions: Vec<String>,
    equal_pairs: Vec<(Arc<Field>, Arc<Field>)>,
    group_by: Vec<Arc<Field>>,
    having: Option<Condition>,
    limit: Option<i64>,
    offset: Option<i64>,
    order_by: Vec<(Arc<Field>, Ordering)>,
    ordering: Ordering,
    validated: bool,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Select a plain field.
    pub fn select(&mut self, field: &Arc<Field>) -> &mut Self {
        self.targets.push(SelectTarget::Field(Arc::clone(field)));
        self
    }

    /// Select a field under an alias.
    pub fn select_as(&mut self, field: &Arc<Field>, alias: impl Into<String>) -> &mut Self {
        self.targets
            .push(SelectTarget::FieldAs(Arc::clone(field), alias.into()));
        self
    }

    /// Select a scalar function call.
    pub fn select_function(&mut self, call: FunctionCall) -> &mut Self {
        self.targets.push(SelectTarget::Function(call));
        self
    }

    /// Select a raw textual expression.
    pub fn select_raw(&mut self, expr: impl Into<String>) -> &mut Self {
        self.targets.push(SelectTarget::Raw(expr.into()));
        self
    }

    /// Add a source table.
    pub fn from(&mut self, table: &Arc<Table>) -> &mut Self {
        self.tables.push(Arc::clone(table));
        self
    }

    /// Add raw source text.
    pub fn from_raw(&mut self, source: impl Into<String>) -> &mut Self {
        self.raw_sources.push(source.into());
        self
    }

    /// Add an equi-join pair: the two fields are required to be equal.
    pub fn join(&mut self, left: &Arc<Field>, right: &Arc<Field>) -> &mut Self {
        self.joins.push((Arc::clone(left), Arc::clone(right)));
        self
    }

    /// Select directly by primary-key values, bypassing WHERE.
    pub fn by_ids(&mut self, ids: impl IntoIterator<Item = i64>) -> &mut Self {
        self.pks.extend(ids);
        self
    }

    /// Add a structured WHERE condition (ANDed with the others).
    pub fn where_cond(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// Add a raw WHERE fragment (ANDed with the others).
    pub fn where_raw(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.raw_conditions.push(fragment.into());
        self
    }

    /// Require two fields to be equal in WHERE.
    pub fn where_equals(&mut self, left: &Arc<Field>, right: &Arc<Field>) -> &mut Self {
        self.equal_pairs.push((Arc::clone(left), Arc::clone(right)));
        self
    }

    pub fn group_by(&mut self, field: &Arc<Field>) -> &mut Self {
        self.group_by.push(Arc::clone(field));
        self
    }

    pub fn having(&mut self, condition: Condition) -> &mut Self {
        self.having = Some(condition);
        self
    }

    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Add an ORDER BY field with a per-field direction.
    pub fn order_by(&mut self, field: &Arc<Field>, direction: Ordering) -> &mut Self {
        self.order_by.push((Arc::clone(field), direction));
        self
    }

    /// Set the overall ordering direction appended after the ORDER BY list.
    pub fn ordering(&mut self, ordering: Ordering) -> &mut Self {
        self.ordering = ordering;
        self
    }

    // ==================== Validation ====================

    /// Check the descriptor and mark it renderable.
    ///
    /// Fails `Structural` when no select target is present. Given a frozen
    /// model, every raw select name and raw source that looks like an
    /// identifier must resolve against it (`NotFound` otherwise); raw text
    /// that is not a bare or dotted identifier is passed through untouched.
    pub fn validate(&mut self, model: Option<&Model>) -> SqlResult<()> {
        if self.targets.is_empty() {
            return Err(SqlError::structural("Select query has no select targets"));
        }

        if let Some(model) = model {
            for target in &self.targets {
                if let SelectTarget::Raw(raw) = target {
                    self.resolve_raw_field(model, raw)?;
                }
            }
            for source in &self.raw_sources {
                if validate_identifier(source).is_ok() && model.table_by_name(source).is_none() {
                    return Err(SqlError::not_found(format!(
                        "Source table {source} is not in the model"
                    )));
                }
            }
        }

        self.validated = true;
        Ok(())
    }

    fn resolve_raw_field(&self, model: &Model, raw: &str) -> SqlResult<()> {
        if let Some((table, field)) = raw.split_once('.') {
            // Dotted: must be a known table.field if both halves are identifiers.
            if validate_identifier(table).is_ok()
                && validate_identifier(field).is_ok()
                && model.field(raw).is_none()
            {
                return Err(SqlError::not_found(format!(
                    "Field {raw} is not in the model"
                )));
            }
            return Ok(());
        }
        if validate_identifier(raw).is_ok() {
            // Bare name: must exist in one of the source tables.
            let found = self.tables.iter().any(|t| t.field(raw).is_some());
            if !found {
                return Err(SqlError::not_found(format!(
                    "Field {raw} is not in any source table"
                )));
            }
        }
        Ok(())
    }

    // ==================== Read-only access (for dialects) ====================

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn targets(&self) -> &[SelectTarget] {
        &self.targets
    }

    pub fn source_tables(&self) -> &[Arc<Table>] {
        &self.tables
    }

    pub fn raw_sources(&self) -> &[String] {
        &self.raw_sources
    }

    pub fn joins(&self) -> &[(Arc<Field>, Arc<Field>)] {
        &self.joins
    }

    pub fn pks(&self) -> &[i64] {
        &self.pks
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn raw_conditions(&self) -> &[String] {
        &self.raw_conditions
    }

    pub fn equal_pairs(&self) -> &[(Arc<Field>, Arc<Field>)] {
        &self.equal_pairs
    }

    pub fn group_by_fields(&self) -> &[Arc<Field>] {
        &self.group_by
    }

    pub fn having_condition(&self) -> Option<&Condition> {
        self.having.as_ref()
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }

    pub fn order_by_fields(&self) -> &[(Arc<Field>, Ordering)] {
        &self.order_by
    }

    pub fn global_ordering(&self) -> Ordering {
        self.ordering
    }
}
