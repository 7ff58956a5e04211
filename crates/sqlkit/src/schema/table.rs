//! Table definitions: ordered fields, indexes, and foreign keys.
//!
//! A [`Table`] is mutable while its owning
//! [`ModelBuilder`](crate::schema::ModelBuilder) is still open; freezing the
//! model hands out only shared references, closing the table structurally.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{SqlError, SqlResult};
use crate::ident::validate_identifier;
use crate::schema::Field;

/// A table definition: name, ordered fields, indexes, foreign keys.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    fields: Vec<Arc<Field>>,
    by_name: HashMap<String, usize>,
    primary_key: Option<usize>,
    indexes: Vec<Index>,
    foreign_keys: Vec<ForeignKey>,
}

/// A multi-field index over one table.
///
/// Holds the resolved [`Field`] objects rather than names, so the index can
/// never silently desynchronize from the fields it covers. Its SQL name is
/// derived deterministically: `idx_<table>_<field1>_<field2>...`.
#[derive(Debug, Clone)]
pub struct Index {
    table: String,
    fields: Vec<Arc<Field>>,
    unique: bool,
}

/// A foreign key: `(table, field)` references `(foreign_table, foreign_field)`.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    table: String,
    field: Arc<Field>,
    foreign_table: String,
    foreign_field: Arc<Field>,
}

impl Table {
    /// Create a new table with no fields.
    ///
    /// Fails if the name is empty or not a valid bare identifier.
    pub fn new(name: impl Into<String>) -> SqlResult<Self> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self {
            name,
            fields: Vec::new(),
            by_name: HashMap::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add one field, returning a shared handle to it.
    ///
    /// Fails if the field name is invalid, already present, or declares a
    /// second primary key.
    pub fn add_field(&mut self, mut field: Field) -> SqlResult<Arc<Field>> {
        validate_identifier(field.name())?;

        if self.by_name.contains_key(field.name()) {
            return Err(SqlError::structural(format!(
                "Field already in table {}: {}",
                self.name,
                field.name()
            )));
        }

        if field.is_primary_key() {
            if let Some(pk) = self.primary_key() {
                return Err(SqlError::structural(format!(
                    "Primary key collision in table {}: already assigned to field {}",
                    self.name,
                    pk.name()
                )));
            }
        }

        field.attach_to(&self.name);
        let field = Arc::new(field);
        if field.is_primary_key() {
            self.primary_key = Some(self.fields.len());
        }
        self.by_name.insert(field.name().to_string(), self.fields.len());
        self.fields.push(Arc::clone(&field));
        Ok(field)
    }

    /// Add several fields at once.
    pub fn add_fields(&mut self, fields: impl IntoIterator<Item = Field>) -> SqlResult<()> {
        let mut added = 0;
        for field in fields {
            self.add_field(field)?;
            added += 1;
        }
        if added == 0 {
            return Err(SqlError::structural(format!(
                "No fields given for table {}",
                self.name
            )));
        }
        Ok(())
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Arc<Field>> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    /// The primary-key field, if one was declared.
    pub fn primary_key(&self) -> Option<&Arc<Field>> {
        self.primary_key.map(|i| &self.fields[i])
    }

    /// Comma-joined field-name list in declaration order.
    pub fn all_fields(&self) -> String {
        let names: Vec<&str> = self.fields.iter().map(|f| f.name()).collect();
        names.join(", ")
    }

    /// Add an index over the named fields.
    ///
    /// Fails with `NotFound` if any named field is absent from this table.
    pub fn add_index(&mut self, unique: bool, field_names: &[&str]) -> SqlResult<()> {
        if field_names.is_empty() {
            return Err(SqlError::structural(format!(
                "Index on table {} has no fields",
                self.name
            )));
        }
        let mut fields = Vec::with_capacity(field_names.len());
        for name in field_names {
            let field = self.field(name).ok_or_else(|| {
                SqlError::not_found(format!(
                    "Index field {} does not exist in table {}",
                    name, self.name
                ))
            })?;
            fields.push(Arc::clone(field));
        }
        self.indexes.push(Index {
            table: self.name.clone(),
            fields,
            unique,
        });
        Ok(())
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub(crate) fn push_foreign_key(
        &mut self,
        field: Arc<Field>,
        foreign_table: String,
        foreign_field: Arc<Field>,
    ) {
        self.foreign_keys.push(ForeignKey {
            table: self.name.clone(),
            field,
            foreign_table,
            foreign_field,
        });
    }
}

impl Index {
    /// Deterministic SQL name: `idx_<table>_<field1>_<field2>...`
    pub fn name(&self) -> String {
        let mut name = format!("idx_{}", self.table);
        for field in &self.fields {
            name.push('_');
            name.push_str(field.name());
        }
        name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

impl ForeignKey {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn field(&self) -> &Arc<Field> {
        &self.field
    }

    pub fn foreign_table(&self) -> &str {
        &self.foreign_table
    }

    pub fn foreign_field(&self) -> &Arc<Field> {
        &self.foreign_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn people() -> Table {
        let mut t = Table::new("people").unwrap();
        t.add_fields([
            Field::new("id", FieldType::Int).primary_key(),
            Field::new("name", FieldType::Text).not_null(),
            Field::new("age", FieldType::Int),
        ])
        .unwrap();
        t
    }

    #[test]
    fn empty_table_name_rejected() {
        assert!(Table::new("").is_err());
    }

    #[test]
    fn duplicate_field_rejected() {
        let mut t = people();
        let err = t.add_field(Field::new("name", FieldType::Text)).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn second_primary_key_rejected() {
        let mut t = people();
        let err = t
            .add_field(Field::new("other_id", FieldType::Int).primary_key())
            .unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn fields_attach_owning_table() {
        let t = people();
        let name = t.field("name").unwrap();
        assert_eq!(name.table(), "people");
        assert_eq!(name.qualified_name(), "people.name");
    }

    #[test]
    fn index_resolves_fields() {
        let mut t = people();
        t.add_index(true, &["name", "age"]).unwrap();
        let idx = &t.indexes()[0];
        assert_eq!(idx.name(), "idx_people_name_age");
        assert!(idx.is_unique());
    }

    #[test]
    fn index_unknown_field_rejected() {
        let mut t = people();
        let err = t.add_index(false, &["missing"]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn all_fields_joined() {
        assert_eq!(people().all_fields(), "id, name, age");
    }
}
