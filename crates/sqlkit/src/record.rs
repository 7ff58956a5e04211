//! Per-operation record marshalling.
//!
//! A [`Record`] is an ephemeral set of typed slots bound to one table: one
//! [`Value`] per field, in declaration order. Slots a caller populates for a
//! write are "set"; slots requested for a read are "wanted" (the default).
//! Records are single-owner and live only for the duration of one
//! read/write operation.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{SqlError, SqlResult};
use crate::schema::{Field, FieldType, Table};

/// A concrete value held in a record slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Whether this value's variant matches a declared field type.
    pub fn matches_type(&self, field_type: FieldType) -> bool {
        matches!(
            (self, field_type),
            (Self::Int(_), FieldType::Int)
                | (Self::Float(_), FieldType::Float)
                | (Self::Text(_), FieldType::Text)
                | (Self::Bool(_), FieldType::Bool)
                | (Self::Bytes(_), FieldType::Bytes)
        )
    }

    /// A zero/empty placeholder value for a field type, used to receive
    /// scanned results.
    pub fn placeholder_for(field_type: FieldType) -> SqlResult<Self> {
        match field_type {
            FieldType::Int => Ok(Self::Int(0)),
            FieldType::Float => Ok(Self::Float(0.0)),
            FieldType::Text => Ok(Self::Text(String::new())),
            FieldType::Bool => Ok(Self::Bool(false)),
            FieldType::Bytes => Ok(Self::Bytes(Vec::new())),
            FieldType::Function => Err(SqlError::structural(
                "Function fields have no scan placeholder",
            )),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Bytes(_) => "bytes",
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

/// One record slot: a field plus its populated/requested state.
#[derive(Debug, Clone)]
pub struct Value {
    field: Arc<Field>,
    value: Option<SqlValue>,
    is_set: bool,
    is_wanted: bool,
}

impl Value {
    pub fn field(&self) -> &Arc<Field> {
        &self.field
    }

    pub fn value(&self) -> Option<&SqlValue> {
        self.value.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn is_wanted(&self) -> bool {
        self.is_wanted
    }
}

/// An ephemeral row container bound to one table.
#[derive(Debug)]
pub struct Record {
    table: Arc<Table>,
    values: Vec<Value>,
    by_name: HashMap<String, usize>,
}

impl Table {
    /// Allocate a fresh record: one slot per field in declaration order,
    /// all wanted, none set.
    pub fn new_record(self: &Arc<Self>) -> Record {
        let mut values = Vec::with_capacity(self.fields().len());
        let mut by_name = HashMap::with_capacity(self.fields().len());
        for field in self.fields() {
            by_name.insert(field.name().to_string(), values.len());
            values.push(Value {
                field: Arc::clone(field),
                value: None,
                is_set: false,
                is_wanted: true,
            });
        }
        Record {
            table: Arc::clone(self),
            values,
            by_name,
        }
    }
}

impl Record {
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// All slots in field declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn slot(&self, name: &str) -> SqlResult<&Value> {
        self.by_name
            .get(name)
            .map(|&i| &self.values[i])
            .ok_or_else(|| {
                SqlError::not_found(format!(
                    "Field {} is not in table {}",
                    name,
                    self.table.name()
                ))
            })
    }

    fn slot_mut(&mut self, name: &str) -> SqlResult<&mut Value> {
        let table = self.table.name().to_string();
        let idx = *self.by_name.get(name).ok_or_else(|| {
            SqlError::not_found(format!("Field {name} is not in table {table}"))
        })?;
        Ok(&mut self.values[idx])
    }

    /// Populate a slot for a write, marking it "set".
    ///
    /// Fails with `NotFound` for an unknown field name and `TypeMismatch`
    /// when the value's type does not match the field's declared type.
    pub fn set_value(&mut self, name: &str, value: impl Into<SqlValue>) -> SqlResult<()> {
        let table = self.table.name().to_string();
        let slot = self.slot_mut(name)?;
        let value = value.into();
        if !value.matches_type(slot.field.field_type()) {
            return Err(SqlError::type_mismatch(format!(
                "Table {} field {}: value is {}; field type is {}",
                table,
                name,
                value.type_name(),
                slot.field.field_type()
            )));
        }
        slot.value = Some(value);
        slot.is_set = true;
        Ok(())
    }

    /// Mark whether a slot is requested for reads.
    pub fn set_wanted(&mut self, name: &str, wanted: bool) -> SqlResult<()> {
        self.slot_mut(name)?.is_wanted = wanted;
        Ok(())
    }

    /// Extract the ordered "insert set": every set slot with its value.
    ///
    /// Fails with `Structural` (naming the offending field) if a not-null or
    /// primary-key field is unset, or if no field is set at all.
    pub fn insert_values(&self) -> SqlResult<Vec<(&Arc<Field>, &SqlValue)>> {
        let mut out = Vec::new();
        for slot in &self.values {
            if slot.is_set {
                let value = slot.value.as_ref().ok_or_else(|| {
                    SqlError::structural(format!(
                        "Field {} marked set without a value",
                        slot.field.name()
                    ))
                })?;
                out.push((&slot.field, value));
            } else if slot.field.is_not_null() {
                return Err(SqlError::structural(format!(
                    "Field {} must be set: not null",
                    slot.field.name()
                )));
            } else if slot.field.is_primary_key() {
                return Err(SqlError::structural(format!(
                    "Field {} must be set: primary key",
                    slot.field.name()
                )));
            }
        }
        if out.is_empty() {
            return Err(SqlError::structural(format!(
                "No fields set in record for table {}",
                self.table.name()
            )));
        }
        Ok(out)
    }

    /// Typed placeholder containers for every wanted slot, in declaration
    /// order, ready to receive scanned results.
    pub fn wanted_slots(&self) -> SqlResult<Vec<(Arc<Field>, SqlValue)>> {
        let mut out = Vec::new();
        for slot in &self.values {
            if slot.is_wanted {
                out.push((
                    Arc::clone(&slot.field),
                    SqlValue::placeholder_for(slot.field.field_type())?,
                ));
            }
        }
        if out.is_empty() {
            return Err(SqlError::structural(format!(
                "No fields wanted in record for table {}",
                self.table.name()
            )));
        }
        Ok(out)
    }

    /// Write scanned results back into the wanted slots, in order.
    pub fn fill_wanted(&mut self, scanned: Vec<SqlValue>) -> SqlResult<()> {
        let wanted: Vec<usize> = self
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_wanted)
            .map(|(i, _)| i)
            .collect();
        if wanted.len() != scanned.len() {
            return Err(SqlError::structural(format!(
                "Scanned {} values for {} wanted fields",
                scanned.len(),
                wanted.len()
            )));
        }
        for (idx, value) in wanted.into_iter().zip(scanned) {
            let slot = &mut self.values[idx];
            if !value.matches_type(slot.field.field_type()) {
                return Err(SqlError::type_mismatch(format!(
                    "Scanned {} into field {} of type {}",
                    value.type_name(),
                    slot.field.name(),
                    slot.field.field_type()
                )));
            }
            slot.value = Some(value);
        }
        Ok(())
    }

    /// Read an integer slot.
    pub fn get_int(&self, name: &str) -> SqlResult<i64> {
        match self.present(name)? {
            SqlValue::Int(v) => Ok(*v),
            other => Err(self.wrong_type(name, "int", other)),
        }
    }

    /// Read a text slot.
    pub fn get_str(&self, name: &str) -> SqlResult<&str> {
        match self.present(name)? {
            SqlValue::Text(v) => Ok(v),
            other => Err(self.wrong_type(name, "text", other)),
        }
    }

    /// Read a boolean slot.
    pub fn get_bool(&self, name: &str) -> SqlResult<bool> {
        match self.present(name)? {
            SqlValue::Bool(v) => Ok(*v),
            other => Err(self.wrong_type(name, "bool", other)),
        }
    }

    /// Read a float slot.
    pub fn get_float(&self, name: &str) -> SqlResult<f64> {
        match self.present(name)? {
            SqlValue::Float(v) => Ok(*v),
            other => Err(self.wrong_type(name, "float", other)),
        }
    }

    fn present(&self, name: &str) -> SqlResult<&SqlValue> {
        self.slot(name)?.value.as_ref().ok_or_else(|| {
            SqlError::state(format!(
                "Field {} in table {} has no value",
                name,
                self.table.name()
            ))
        })
    }

    fn wrong_type(&self, name: &str, expected: &str, got: &SqlValue) -> SqlError {
        SqlError::type_mismatch(format!(
            "Field {} in table {}: expected {}, have {}",
            name,
            self.table.name(),
            expected,
            got.type_name()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    fn people() -> Arc<Table> {
        let mut t = Table::new("people").unwrap();
        t.add_fields([
            Field::new("id", FieldType::Int).primary_key(),
            Field::new("name", FieldType::Text).not_null(),
            Field::new("age", FieldType::Int),
            Field::new("height", FieldType::Float),
        ])
        .unwrap();
        Arc::new(t)
    }

    #[test]
    fn new_record_all_wanted_none_set() {
        let rec = people().new_record();
        assert_eq!(rec.values().len(), 4);
        assert!(rec.values().iter().all(|v| v.is_wanted() && !v.is_set()));
    }

    #[test]
    fn set_value_unknown_field() {
        let mut rec = people().new_record();
        let err = rec.set_value("missing", 1i64).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn set_value_type_mismatch() {
        let mut rec = people().new_record();
        let err = rec.set_value("age", "forty").unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn insert_values_requires_not_null_and_pk() {
        let table = people();
        let mut rec = table.new_record();
        rec.set_value("id", 1i64).unwrap();
        // "name" is NOT NULL and unset.
        let err = rec.insert_values().unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("name"));

        rec.set_value("name", "Ada").unwrap();
        let set = rec.insert_values().unwrap();
        let names: Vec<&str> = set.iter().map(|(f, _)| f.name()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn insert_values_rejects_empty_record() {
        let mut t = Table::new("notes").unwrap();
        t.add_field(Field::new("body", FieldType::Text)).unwrap();
        let rec = Arc::new(t).new_record();
        assert!(rec.insert_values().unwrap_err().is_structural());
    }

    #[test]
    fn wanted_slots_typed_placeholders() {
        let table = people();
        let mut rec = table.new_record();
        rec.set_wanted("height", false).unwrap();
        let slots = rec.wanted_slots().unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].1, SqlValue::Int(0));
        assert_eq!(slots[1].1, SqlValue::Text(String::new()));
    }

    #[test]
    fn fill_wanted_and_typed_getters() {
        let table = people();
        let mut rec = table.new_record();
        rec.fill_wanted(vec![
            SqlValue::Int(7),
            SqlValue::Text("Ada".into()),
            SqlValue::Int(36),
            SqlValue::Float(1.7),
        ])
        .unwrap();
        assert_eq!(rec.get_int("id").unwrap(), 7);
        assert_eq!(rec.get_str("name").unwrap(), "Ada");
        assert_eq!(rec.get_float("height").unwrap(), 1.7);
        assert!(rec.get_int("name").unwrap_err().is_type_mismatch());
    }

    #[test]
    fn fill_wanted_count_mismatch() {
        let table = people();
        let mut rec = table.new_record();
        let err = rec.fill_wanted(vec![SqlValue::Int(1)]).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn getter_before_fill_is_state_error() {
        let rec = people().new_record();
        assert!(rec.get_int("id").unwrap_err().is_state());
    }
}
