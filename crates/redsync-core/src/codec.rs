//! Row encoding in both directions.
//!
//! Relational rows decode into capture-platform records. Capture-platform
//! records encode into typed bind values, with stored choice codes replaced by
//! display labels first.

use redsync_model::{FieldMeta, FieldType, Record, SqlValue, Value};

use crate::catalog::{FieldCatalog, MetaIndex};
use crate::error::ColumnCountError;
use crate::typemap::{Affinity, TableSchema};

/// Turn one positional relational row into a record keyed by column name.
///
/// NULL cells become empty values and binary cells are decoded as text.
///
/// # Errors
///
/// Returns [`ColumnCountError`] when `values` and `columns` differ in length;
/// callers skip the row.
pub fn decode_row(columns: &[String], values: Vec<SqlValue>) -> Result<Record, ColumnCountError> {
    if columns.len() != values.len() {
        return Err(ColumnCountError {
            expected: columns.len(),
            actual: values.len(),
        });
    }
    Ok(columns
        .iter()
        .zip(values)
        .map(|(column, value)| (column.trim().to_string(), decode_cell(value)))
        .collect())
}

fn decode_cell(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Empty,
        SqlValue::Int(value) => Value::Integer(value),
        SqlValue::Float(value) => Value::Float(value),
        SqlValue::Text(text) => Value::from(text),
        SqlValue::Bytes(bytes) => Value::from(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Replace a stored code with its display form for choice-bearing types.
///
/// Radio and dropdown codes become `"<label> (<code>)"` when the code is in the
/// field's choice list and pass through otherwise. Checkbox, yes/no and
/// true/false values read `"1"` as set and anything else as unset.
pub fn relabel(field: &FieldMeta, raw: &str) -> String {
    match field.field_type() {
        FieldType::Radio | FieldType::Dropdown => match field.choice_label(raw) {
            Some(label) => format!("{label} ({})", raw.trim()),
            None => raw.to_string(),
        },
        FieldType::Checkbox => flag(raw, "Checked (1)", "Unchecked (0)"),
        FieldType::TrueFalse => flag(raw, "True (1)", "False (0)"),
        FieldType::YesNo => flag(raw, "Yes (1)", "No (0)"),
        _ => raw.to_string(),
    }
}

fn flag(raw: &str, set: &str, unset: &str) -> String {
    let text = if raw.trim() == "1" { set } else { unset };
    text.to_string()
}

/// Encode a raw text value for a column of the given affinity.
///
/// Empty values are NULL. Integer columns bind an integer when the value
/// parses and the raw text otherwise.
pub fn encode_value(affinity: Affinity, raw: &str) -> SqlValue {
    if raw.is_empty() {
        return SqlValue::Null;
    }
    match affinity {
        Affinity::String => SqlValue::Text(raw.to_string()),
        Affinity::Integer => raw
            .trim()
            .parse::<i64>()
            .map_or_else(|_| SqlValue::Text(raw.to_string()), SqlValue::Int),
    }
}

/// Encodes capture-platform records into insert values for one table.
pub struct RowEncoder<'a> {
    catalog: &'a FieldCatalog,
    index: &'a MetaIndex,
    schema: &'a TableSchema,
}

impl<'a> RowEncoder<'a> {
    pub fn new(catalog: &'a FieldCatalog, index: &'a MetaIndex, schema: &'a TableSchema) -> Self {
        Self {
            catalog,
            index,
            schema,
        }
    }

    /// Display-form text of every column, relabeled, in column order.
    pub fn display_values(&self, record: &Record) -> Vec<String> {
        self.schema
            .columns
            .iter()
            .map(|column| {
                let raw = record.value(&column.name);
                match self.catalog.field_for(self.index, &column.name) {
                    Some(field) if column.name != self.schema.primary_key => relabel(field, &raw),
                    _ => raw.into_owned(),
                }
            })
            .collect()
    }

    /// Bind values for one record, matching [`TableSchema::columns`].
    pub fn encode(&self, record: &Record) -> Vec<SqlValue> {
        self.display_values(record)
            .iter()
            .zip(&self.schema.columns)
            .map(|(text, column)| encode_value(column.column_type.affinity(), text))
            .collect()
    }
}
