//! Schema model: tables, fields, indexes, foreign keys, and the two-phase
//! (builder → frozen) registry.

pub mod field;
pub mod model;
pub mod table;

pub use field::{Field, FieldType};
pub use model::{Model, ModelBuilder};
pub use table::{ForeignKey, Index, Table};
