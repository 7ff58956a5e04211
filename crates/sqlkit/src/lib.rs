//! # sqlkit
//!
//! A typed SQL schema and query construction layer for SQLite.
//!
//! ## Features
//!
//! - **Typed schemas**: tables, fields, indexes, and foreign keys built through
//!   a two-phase [`ModelBuilder`] that freezes into an immutable [`Model`]
//! - **Record marshalling**: per-row [`Record`] values with set/wanted
//!   tracking and typed getters
//! - **Condition trees**: a closed [`Operator`] catalog composed with
//!   [`Condition::and`] / [`Condition::or`] / [`Condition::not`], rendered with
//!   full arity and type checking
//! - **Query builders**: fluent [`SelectQuery`] accumulation validated against
//!   the frozen model before rendering
//! - **Dialect seam**: all SQL text goes through the [`Dialect`] trait; the
//!   [`SqliteDialect`] backend covers DDL, DML, SELECT assembly, scalar
//!   functions, and live-schema introspection via [`SchemaProbe`]
//!
//! ## Example
//!
//! ```ignore
//! use sqlkit::{Condition, Field, FieldType, ModelBuilder, Operator,
//!              SelectQuery, SqliteDialect, Table, Dialect};
//!
//! let mut people = Table::new("people")?;
//! people.add_fields([
//!     Field::new("id", FieldType::Int).primary_key(),
//!     Field::new("name", FieldType::Text).not_null(),
//!     Field::new("age", FieldType::Int),
//! ])?;
//!
//! let mut builder = ModelBuilder::new();
//! builder.add_table("person", people)?;
//! let model = builder.freeze()?;
//!
//! let table = model.table_by_key("person").unwrap();
//! let age = table.field("age").unwrap();
//!
//! let mut query = SelectQuery::new();
//! query
//!     .select(table.field("name").unwrap())
//!     .from(table)
//!     .where_cond(Condition::cmp(age, Operator::Ge, vec![18i64.into()]))
//!     .limit(10);
//! query.validate(Some(&model))?;
//!
//! let sql = SqliteDialect.select_sql(&query)?;
//! assert_eq!(sql, "SELECT name FROM people WHERE people.age >= 18 LIMIT 10");
//! ```

pub mod condition;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod query;
pub mod record;
pub mod schema;

pub use condition::{Condition, LeftOperand, MAX_IN_LIST, Operator, Term};
pub use dialect::{
    ColumnMeta, Dialect, FunctionCall, SchemaProbe, SqlFunction, SqliteDialect,
};
pub use error::{SqlError, SqlResult};
pub use ident::validate_identifier;
pub use query::{Ordering, SelectQuery, SelectTarget};
pub use record::{Record, SqlValue, Value};
pub use schema::{Field, FieldType, ForeignKey, Index, Model, ModelBuilder, Table};
