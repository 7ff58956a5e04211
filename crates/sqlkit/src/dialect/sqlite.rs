//! SQLite dialect: the single concrete [`Dialect`] backend.

use std::sync::Arc;

use crate::condition::{Term, quote_text};
use crate::dialect::{ColumnMeta, Dialect, FunctionCall, SchemaProbe, SqlFunction};
use crate::error::{SqlError, SqlResult};
use crate::ident::validate_identifier;
use crate::query::{Ordering, SelectQuery, SelectTarget};
use crate::record::Record;
use crate::schema::{Field, FieldType, Index, Table};

/// Table names with this prefix are reserved by SQLite itself.
const RESERVED_PREFIX: &str = "sqlite_";

/// SQLite renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn valid_table_name(&self, name: &str) -> SqlResult<()> {
        if name.is_empty() || name.starts_with(RESERVED_PREFIX) {
            return Err(SqlError::structural(format!(
                "Invalid table name [{name}] for dialect {}",
                self.name()
            )));
        }
        Ok(())
    }

    fn quote_table(&self, table: &Table) -> SqlResult<String> {
        self.valid_table_name(table.name())?;
        Ok(format!("[{}]", table.name()))
    }

    fn create_table_sql(&self, table: &Table) -> SqlResult<String> {
        self.valid_table_name(table.name())?;
        if table.fields().is_empty() {
            return Err(SqlError::structural(format!(
                "Table {} has no fields",
                table.name()
            )));
        }

        let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (", table.name());
        for (i, field) in table.fields().iter().enumerate() {
            if i != 0 {
                sql.push_str(", ");
            }
            sql.push_str(&field_sql(field)?);
        }
        for fk in table.foreign_keys() {
            sql.push_str(&format!(
                ", FOREIGN KEY({}) REFERENCES {}({})",
                fk.field().name(),
                fk.foreign_table(),
                fk.foreign_field().name()
            ));
        }
        sql.push(')');

        tracing::debug!(table = table.name(), sql, "rendered table DDL");
        Ok(sql)
    }

    fn drop_table_sql(&self, table: &Table) -> SqlResult<String> {
        self.valid_table_name(table.name())?;
        Ok(format!("DROP TABLE IF EXISTS {}", table.name()))
    }

    fn create_index_sql(&self, index: &Index) -> SqlResult<String> {
        let mut sql = String::from("CREATE ");
        if index.is_unique() {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        sql.push_str(&index.name());
        sql.push_str(" ON ");
        sql.push_str(index.table());
        sql.push('(');
        for (i, field) in index.fields().iter().enumerate() {
            if i != 0 {
                sql.push_str(", ");
            }
            sql.push_str(field.name());
        }
        sql.push(')');
        Ok(sql)
    }

    fn insert_sql(&self, record: &Record) -> SqlResult<String> {
        let set = record.insert_values()?;

        let mut sql = format!("INSERT INTO {} (", record.table().name());
        for (i, (field, _)) in set.iter().enumerate() {
            if i != 0 {
                sql.push_str(", ");
            }
            sql.push_str(field.name());
        }
        sql.push_str(") VALUES (");
        for i in 0..set.len() {
            if i != 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("${}", i + 1));
        }
        sql.push(')');

        tracing::debug!(table = record.table().name(), sql, "rendered insert");
        Ok(sql)
    }

    fn select_record_sql(&self, record: &Record, id: i64) -> SqlResult<String> {
        let wanted: Vec<&str> = record
            .values()
            .iter()
            .filter(|v| v.is_wanted())
            .map(|v| v.field().name())
            .collect();
        if wanted.is_empty() {
            return Err(SqlError::structural(format!(
                "No fields wanted in record for table {}",
                record.table().name()
            )));
        }
        Ok(format!(
            "SELECT {} FROM {} WHERE id={}",
            wanted.join(", "),
            record.table().name(),
            id
        ))
    }

    fn delete_sql(&self, table: &Table, id: i64) -> SqlResult<String> {
        self.valid_table_name(table.name())?;
        if id < 0 {
            return Err(SqlError::structural("Delete id is negative"));
        }
        let pk = table.primary_key().ok_or_else(|| {
            SqlError::structural(format!("Table {} has no primary key", table.name()))
        })?;
        Ok(format!(
            "DELETE FROM {} WHERE {}=?",
            table.name(),
            pk.name()
        ))
    }

    fn select_sql(&self, query: &SelectQuery) -> SqlResult<String> {
        if !query.is_validated() {
            return Err(SqlError::state("Select query not validated"));
        }

        let mut sql = String::from("SELECT ");
        if query.is_distinct() {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.render_targets(query.targets())?);
        sql.push_str(" FROM ");
        sql.push_str(&render_sources(query)?);

        let predicate = if query.pks().is_empty() {
            self.render_where(query)?
        } else {
            Some(render_pk_filter(query)?)
        };
        if let Some(clause) = predicate {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }

        if !query.group_by_fields().is_empty() {
            sql.push_str(" GROUP BY ");
            let names: Vec<&str> = query.group_by_fields().iter().map(|f| f.name()).collect();
            sql.push_str(&names.join(", "));
        }
        if let Some(having) = query.having_condition() {
            sql.push_str(" HAVING ");
            sql.push_str(&having.render(0)?);
        }
        if let Some(limit) = query.limit_value() {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = query.offset_value() {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        if !query.order_by_fields().is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&render_order_by(query.order_by_fields()));
            match query.global_ordering() {
                Ordering::None => {}
                direction => {
                    sql.push(' ');
                    sql.push_str(direction.token());
                }
            }
        }

        tracing::debug!(sql, "rendered select");
        Ok(sql)
    }

    fn function_sql(&self, call: &FunctionCall) -> SqlResult<String> {
        let (min, max) = call.function().arg_bounds();
        if call.args().len() < min || call.args().len() > max {
            return Err(SqlError::Arity {
                op: call.function().sql_name(),
                given: call.args().len(),
                min,
                max,
            });
        }

        let mut sql = match (call.function(), call.args().len()) {
            (SqlFunction::Count, 0) => String::from("COUNT(*)"),
            _ => {
                let names: Vec<&str> = call.args().iter().map(|f| f.name()).collect();
                format!("{}({})", call.function().sql_name(), names.join(", "))
            }
        };
        if let Some(alias) = call.alias() {
            sql.push_str(" AS ");
            sql.push_str(alias);
        }
        Ok(sql)
    }

    fn arbitrary_function_sql(&self, name: &str, args: &[Term]) -> SqlResult<String> {
        validate_identifier(name)?;
        let parts: Vec<String> = args.iter().map(Term::render).collect();
        Ok(format!("{}({})", name, parts.join(", ")))
    }

    fn extract_table(&self, probe: &mut dyn SchemaProbe, table: &str) -> SqlResult<Table> {
        self.valid_table_name(table)?;
        let columns = probe.table_columns(table)?;
        if columns.is_empty() {
            return Err(SqlError::not_found(format!(
                "Table {table} does not exist in the live schema"
            )));
        }

        let mut out = Table::new(table)?;
        for column in &columns {
            out.add_field(field_from_column(column)?)?;
        }
        Ok(out)
    }
}

impl SqliteDialect {
    fn render_targets(&self, targets: &[SelectTarget]) -> SqlResult<String> {
        let mut parts = Vec::with_capacity(targets.len());
        for target in targets {
            parts.push(match target {
                SelectTarget::Field(field) => field.name().to_string(),
                SelectTarget::FieldAs(field, alias) => {
                    if alias.is_empty() {
                        return Err(SqlError::structural(format!(
                            "Empty alias for field {}",
                            field.name()
                        )));
                    }
                    format!("{} AS {}", field.name(), alias)
                }
                SelectTarget::Function(call) => self.function_sql(call)?,
                SelectTarget::Raw(raw) => raw.clone(),
            });
        }
        Ok(parts.join(", "))
    }

    fn render_where(&self, query: &SelectQuery) -> SqlResult<Option<String>> {
        let mut parts: Vec<String> = Vec::new();
        for (left, right) in query.joins().iter().chain(query.equal_pairs()) {
            parts.push(format!(
                "{}={}",
                left.qualified_name(),
                right.qualified_name()
            ));
        }

        // A lone condition stays unwrapped; alongside other predicates its
        // compound children need parentheses.
        let condition_count = query.conditions().len();
        let depth = if parts.len() + condition_count + query.raw_conditions().len() > 1 {
            1
        } else {
            0
        };
        for condition in query.conditions() {
            parts.push(condition.render(depth)?);
        }
        for raw in query.raw_conditions() {
            parts.push(raw.clone());
        }

        if parts.is_empty() {
            Ok(None)
        } else {
            Ok(Some(parts.join(" AND ")))
        }
    }
}

fn render_sources(query: &SelectQuery) -> SqlResult<String> {
    let mut parts: Vec<String> = query
        .source_tables()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    parts.extend(query.raw_sources().iter().cloned());
    if parts.is_empty() {
        return Err(SqlError::structural("Select query has no sources"));
    }
    Ok(parts.join(", "))
}

fn render_pk_filter(query: &SelectQuery) -> SqlResult<String> {
    let table = query
        .source_tables()
        .first()
        .ok_or_else(|| SqlError::structural("Primary-key select needs a source table"))?;
    let pk = table.primary_key().ok_or_else(|| {
        SqlError::structural(format!("Table {} has no primary key", table.name()))
    })?;
    let ids: Vec<String> = query.pks().iter().map(|id| id.to_string()).collect();
    Ok(format!("{} IN ({})", pk.name(), ids.join(", ")))
}

fn render_order_by(fields: &[(Arc<Field>, Ordering)]) -> String {
    let mut parts = Vec::with_capacity(fields.len());
    for (field, direction) in fields {
        match direction {
            Ordering::None => parts.push(field.name().to_string()),
            _ => parts.push(format!("{} {}", field.name(), direction.token())),
        }
    }
    parts.join(", ")
}

fn field_sql(field: &Field) -> SqlResult<String> {
    let mut sql = format!("{} {}", field.name(), sql_type(field)?);
    if field.is_not_null() {
        sql.push_str(" NOT NULL");
    }
    if field.is_unique() {
        sql.push_str(" UNIQUE");
    }
    if field.is_primary_key() {
        sql.push_str(" PRIMARY KEY");
    }
    if let Some(default) = field.default() {
        check_default(field, default)?;
        sql.push_str(" DEFAULT ");
        if field.field_type() == FieldType::Text {
            sql.push_str(&quote_text(default));
        } else {
            sql.push_str(default);
        }
    }
    Ok(sql)
}

fn sql_type(field: &Field) -> SqlResult<String> {
    match field.field_type() {
        FieldType::Int => Ok("INT".to_string()),
        FieldType::Text => match field.fixed_length() {
            Some(n) if n > 0 => Ok(format!("varchar({n})")),
            _ => Ok("TEXT".to_string()),
        },
        FieldType::Float => Ok("REAL".to_string()),
        FieldType::Bool => Ok("BOOLEAN".to_string()),
        FieldType::Bytes => Err(SqlError::NotImplemented(
            "byte-array columns in SQLite DDL",
        )),
        FieldType::Function => Err(SqlError::structural(
            "Function fields cannot appear in DDL",
        )),
    }
}

fn check_default(field: &Field, default: &str) -> SqlResult<()> {
    let ok = match field.field_type() {
        FieldType::Int => default.parse::<i64>().is_ok(),
        FieldType::Float => default.parse::<f64>().is_ok(),
        FieldType::Bool => matches!(default, "0" | "1" | "true" | "false" | "TRUE" | "FALSE"),
        FieldType::Text => true,
        FieldType::Bytes | FieldType::Function => false,
    };
    if ok {
        Ok(())
    } else {
        Err(SqlError::type_mismatch(format!(
            "Default value {:?} does not match type {} of field {}",
            default,
            field.field_type(),
            field.name()
        )))
    }
}

fn field_from_column(column: &ColumnMeta) -> SqlResult<Field> {
    let declared = column.declared_type.trim().to_ascii_uppercase();
    let (field_type, length) = if let Some(rest) = declared.strip_prefix("VARCHAR") {
        let length = rest
            .trim_start_matches('(')
            .trim_end_matches(')')
            .parse::<u32>()
            .ok();
        (FieldType::Text, length)
    } else {
        match declared.as_str() {
            "INT" | "INTEGER" | "BIGINT" => (FieldType::Int, None),
            "TEXT" | "CLOB" => (FieldType::Text, None),
            "REAL" | "FLOAT" | "DOUBLE" => (FieldType::Float, None),
            "BOOLEAN" | "BOOL" => (FieldType::Bool, None),
            "BLOB" => (FieldType::Bytes, None),
            other => {
                return Err(SqlError::type_mismatch(format!(
                    "Unmapped declared column type {:?} on column {}",
                    other, column.name
                )));
            }
        }
    };

    let mut field = Field::new(&column.name, field_type);
    if let Some(n) = length {
        field = field.length(n);
    }
    if column.not_null {
        field = field.not_null();
    }
    if column.primary_key {
        field = field.primary_key();
    }
    if let Some(default) = &column.default {
        field = field.default_value(default);
    }
    Ok(field)
}
