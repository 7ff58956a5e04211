//! Dialect rendering contract.
//!
//! A [`Dialect`] turns schema, record, condition, and query objects into one
//! backend's literal SQL text. It is the single seam between the model/query
//! core and SQL-text concerns; additional backends implement this trait
//! without touching the core.

pub mod sqlite;

pub use sqlite::SqliteDialect;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::condition::Term;
use crate::error::SqlResult;
use crate::query::SelectQuery;
use crate::record::Record;
use crate::schema::{Field, Index, Table};

/// Scalar SQL functions with their permitted argument counts.
///
/// `Count` with zero arguments renders `COUNT(*)`; `Coalesce` and `Max`
/// are variadic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum SqlFunction {
    Avg,
    Count,
    Coalesce,
    Max,
    Random,
}

impl SqlFunction {
    pub fn sql_name(&self) -> &'static str {
        match self {
            Self::Avg => "AVG",
            Self::Count => "COUNT",
            Self::Coalesce => "COALESCE",
            Self::Max => "MAX",
            Self::Random => "RANDOM",
        }
    }

    /// Permitted `(min, max)` argument count.
    pub fn arg_bounds(&self) -> (usize, usize) {
        match self {
            Self::Avg => (1, 1),
            Self::Count => (0, 1),
            Self::Coalesce => (2, 99),
            Self::Max => (1, 99),
            Self::Random => (0, 0),
        }
    }
}

/// A scalar function applied to schema fields, usable as a select target.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    function: SqlFunction,
    args: Vec<Arc<Field>>,
    alias: Option<String>,
}

impl FunctionCall {
    pub fn new(function: SqlFunction, args: impl IntoIterator<Item = Arc<Field>>) -> Self {
        Self {
            function,
            args: args.into_iter().collect(),
            alias: None,
        }
    }

    /// Attach an output alias: `FUNC(...) AS alias`.
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn function(&self) -> SqlFunction {
        self.function
    }

    pub fn args(&self) -> &[Arc<Field>] {
        &self.args
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// Per-column metadata returned by live-schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    /// Declared column type as the backend reports it (e.g. `varchar(80)`).
    pub declared_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

/// Opaque I/O collaborator supplying column metadata for an existing table.
///
/// Implementations wrap whatever execution handle the caller owns; the
/// dialect only interprets the returned metadata.
pub trait SchemaProbe {
    /// Column metadata for `table`, in column order. An empty result means
    /// the table does not exist.
    fn table_columns(&mut self, table: &str) -> SqlResult<Vec<ColumnMeta>>;
}

/// The rendering contract consumed by every model/condition/query object.
///
/// Every method returns a typed error on invalid input; implementations
/// never abort the process, and unfinished features surface as
/// [`crate::SqlError::NotImplemented`].
pub trait Dialect {
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Reject empty names and names using the backend's reserved prefixes.
    fn valid_table_name(&self, name: &str) -> SqlResult<()>;

    /// Render a table reference with the backend's quoting.
    fn quote_table(&self, table: &Table) -> SqlResult<String>;

    /// `CREATE TABLE IF NOT EXISTS ...` DDL, including foreign key clauses.
    fn create_table_sql(&self, table: &Table) -> SqlResult<String>;

    /// `DROP TABLE IF EXISTS ...` DDL.
    fn drop_table_sql(&self, table: &Table) -> SqlResult<String>;

    /// `CREATE [UNIQUE] INDEX ...` DDL.
    fn create_index_sql(&self, index: &Index) -> SqlResult<String>;

    /// INSERT over the record's set fields with positional placeholders.
    fn insert_sql(&self, record: &Record) -> SqlResult<String>;

    /// Fetch-by-id SELECT over the record's wanted fields.
    fn select_record_sql(&self, record: &Record, id: i64) -> SqlResult<String>;

    /// DELETE-by-id against the table's primary key.
    fn delete_sql(&self, table: &Table, id: i64) -> SqlResult<String>;

    /// Full SELECT assembly from a validated [`SelectQuery`].
    fn select_sql(&self, query: &SelectQuery) -> SqlResult<String>;

    /// Render a catalogued scalar function call, checking its arity.
    fn function_sql(&self, call: &FunctionCall) -> SqlResult<String>;

    /// Escape hatch: render an arbitrary function over literal terms.
    fn arbitrary_function_sql(&self, name: &str, args: &[Term]) -> SqlResult<String>;

    /// Reverse-engineer a [`Table`] from a live database via a probe.
    fn extract_table(&self, probe: &mut dyn SchemaProbe, table: &str) -> SqlResult<Table>;
}
