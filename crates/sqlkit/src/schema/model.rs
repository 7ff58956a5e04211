//! Two-phase schema registry: a mutable [`ModelBuilder`] frozen into an
//! immutable [`Model`].
//!
//! The builder is consumed by [`ModelBuilder::freeze`], so structural
//! mutation after freezing (and freezing twice) is unrepresentable rather
//! than a runtime check. The frozen model exposes O(1) lookups by mnemonic
//! key, SQL table name, and qualified `table.field` name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{SqlError, SqlResult};
use crate::schema::{Field, Table};

/// Mutable registry of tables under construction.
///
/// Tables are registered under a caller-chosen mnemonic key, independent of
/// the SQL table name.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    tables: Vec<Table>,
    keys: HashMap<String, usize>,
}

/// Immutable, frozen schema registry.
#[derive(Debug)]
pub struct Model {
    tables: Vec<Arc<Table>>,
    by_key: HashMap<String, Arc<Table>>,
    by_name: HashMap<String, Arc<Table>>,
    fields: HashMap<String, Arc<Field>>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under a mnemonic key.
    ///
    /// Fails if the key is empty, the key is taken, or another registered
    /// table already uses the same SQL name.
    pub fn add_table(&mut self, key: impl Into<String>, table: Table) -> SqlResult<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(SqlError::structural("Table key is empty"));
        }
        if let Some(&idx) = self.keys.get(&key) {
            return Err(SqlError::structural(format!(
                "Key {} already occupied by table {}",
                key,
                self.tables[idx].name()
            )));
        }
        if self.tables.iter().any(|t| t.name() == table.name()) {
            return Err(SqlError::structural(format!(
                "Table name {} already registered",
                table.name()
            )));
        }
        self.keys.insert(key, self.tables.len());
        self.tables.push(table);
        Ok(())
    }

    /// Mutable access to a registered table, for adding fields or indexes
    /// before the freeze.
    pub fn table_mut(&mut self, key: &str) -> Option<&mut Table> {
        self.keys.get(key).map(|&i| &mut self.tables[i])
    }

    /// Declare `(key, field)` references `(foreign_key, foreign_field)`.
    ///
    /// Both fields must already exist in their respective tables.
    pub fn add_foreign_key(
        &mut self,
        key: &str,
        field: &str,
        foreign_key: &str,
        foreign_field: &str,
    ) -> SqlResult<()> {
        let &local_idx = self
            .keys
            .get(key)
            .ok_or_else(|| SqlError::not_found(format!("Table key {key} not registered")))?;
        let &foreign_idx = self
            .keys
            .get(foreign_key)
            .ok_or_else(|| SqlError::not_found(format!("Table key {foreign_key} not registered")))?;

        let local_field = self.tables[local_idx]
            .field(field)
            .cloned()
            .ok_or_else(|| {
                SqlError::not_found(format!(
                    "Field {} does not exist in table {}",
                    field,
                    self.tables[local_idx].name()
                ))
            })?;
        let foreign = self.tables[foreign_idx]
            .field(foreign_field)
            .cloned()
            .ok_or_else(|| {
                SqlError::not_found(format!(
                    "Foreign key field {} does not exist in table {}",
                    foreign_field,
                    self.tables[foreign_idx].name()
                ))
            })?;

        let foreign_table = self.tables[foreign_idx].name().to_string();
        self.tables[local_idx].push_foreign_key(local_field, foreign_table, foreign);
        Ok(())
    }

    /// Consume the builder and produce the immutable [`Model`], building the
    /// flattened `table.field` index.
    pub fn freeze(self) -> SqlResult<Model> {
        let mut by_key = HashMap::with_capacity(self.keys.len());
        let mut by_name = HashMap::with_capacity(self.tables.len());
        let mut fields = HashMap::new();

        let tables: Vec<Arc<Table>> = self.tables.into_iter().map(Arc::new).collect();

        for (key, idx) in self.keys {
            by_key.insert(key, Arc::clone(&tables[idx]));
        }
        for table in &tables {
            by_name.insert(table.name().to_string(), Arc::clone(table));
            for field in table.fields() {
                fields.insert(field.qualified_name(), Arc::clone(field));
            }
        }

        tracing::debug!(
            tables = tables.len(),
            fields = fields.len(),
            "model frozen"
        );

        Ok(Model {
            tables,
            by_key,
            by_name,
            fields,
        })
    }
}

impl Model {
    /// Look up a table by its mnemonic key.
    pub fn table_by_key(&self, key: &str) -> Option<&Arc<Table>> {
        self.by_key.get(key)
    }

    /// Look up a table by its SQL name.
    pub fn table_by_name(&self, name: &str) -> Option<&Arc<Table>> {
        self.by_name.get(name)
    }

    /// Look up a field by qualified `table.field` name.
    pub fn field(&self, qualified: &str) -> Option<&Arc<Field>> {
        self.fields.get(qualified)
    }

    /// All tables, in registration order.
    pub fn tables(&self) -> &[Arc<Table>] {
        &self.tables
    }
}
