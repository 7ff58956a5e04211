//! Field definitions: a named, typed column with its constraint flags.

use strum::{Display, EnumIter};

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum FieldType {
    /// 64-bit signed integer
    Int,
    /// UTF-8 text, optionally length-limited
    Text,
    /// Boolean
    Bool,
    /// 64-bit float
    Float,
    /// Raw byte array
    Bytes,
    /// Computed/function-backed pseudo field (never stored)
    Function,
}

/// A single field (column) definition.
///
/// Construct with [`Field::new`] and chain flag setters, then hand the field
/// to [`Table::add_field`](crate::schema::Table::add_field), which fills in
/// the owning-table back-reference.
///
/// # Example
/// ```ignore
/// use sqlkit::{Field, FieldType};
///
/// let id = Field::new("id", FieldType::Int).primary_key();
/// let name = Field::new("name", FieldType::Text).not_null().length(80);
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    field_type: FieldType,
    primary_key: bool,
    unique: bool,
    not_null: bool,
    indexed: bool,
    length: Option<u32>,
    default: Option<String>,
    /// Owning table name, filled in by `Table::add_field`.
    table: String,
}

impl Field {
    /// Create a new field definition with every flag off.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            primary_key: false,
            unique: false,
            not_null: false,
            indexed: false,
            length: None,
            default: None,
            table: String::new(),
        }
    }

    /// Mark this field as the table's primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark this field UNIQUE.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark this field NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark this field as indexed.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Set a fixed length (text fields render as `varchar(n)` instead of `TEXT`).
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Set a raw-text default value.
    ///
    /// The text is type-checked against the field type at DDL render time,
    /// not here.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn fixed_length(&self) -> Option<u32> {
        self.length
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Name of the owning table (empty until added to a table).
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Qualified `table.field` name used in rendered conditions.
    pub fn qualified_name(&self) -> String {
        if self.table.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.table, self.name)
        }
    }

    pub(crate) fn attach_to(&mut self, table: &str) {
        self.table = table.to_string();
    }
}
