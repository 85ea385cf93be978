//! Field type to relational column type mapping.

use redsync_model::FieldType;

use crate::catalog::{FieldCatalog, MetaIndex, VariableOrder};
use crate::error::Result;

pub const VARCHAR_WIDTH: u16 = 255;
pub const SLIDER_WIDTH: u8 = 3;
pub const PRIMARY_KEY_WIDTH: u8 = 10;

/// How a column's values are encoded on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    String,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    VarChar(u16),
    Int(u8),
    /// Unsigned auto-increment key, used for the primary identifier.
    PrimaryKey,
}

impl ColumnType {
    pub fn affinity(self) -> Affinity {
        match self {
            Self::VarChar(_) => Affinity::String,
            Self::Int(_) | Self::PrimaryKey => Affinity::Integer,
        }
    }

    /// MySQL column definition, without the column name.
    pub fn definition(self) -> String {
        match self {
            Self::VarChar(width) => format!("varchar({width}) DEFAULT NULL"),
            Self::Int(width) => format!("int({width}) DEFAULT NULL"),
            Self::PrimaryKey => {
                format!("int({PRIMARY_KEY_WIDTH}) unsigned NOT NULL AUTO_INCREMENT")
            }
        }
    }
}

/// Storage type for a field, or `None` when the field gets no column.
///
/// File uploads, calculations, SQL fields, descriptive text and any unknown
/// type are not stored.
pub fn column_type(field_type: &FieldType) -> Option<ColumnType> {
    match field_type {
        FieldType::Text
        | FieldType::Notes
        | FieldType::Dropdown
        | FieldType::Radio
        | FieldType::Checkbox
        | FieldType::YesNo
        | FieldType::TrueFalse => Some(ColumnType::VarChar(VARCHAR_WIDTH)),
        FieldType::Slider => Some(ColumnType::Int(SLIDER_WIDTH)),
        FieldType::File
        | FieldType::Calc
        | FieldType::Sql
        | FieldType::Descriptive
        | FieldType::Other(_) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

/// Relational layout of one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub primary_key: String,
    pub columns: Vec<ColumnDef>,
    /// Variables that have no storage type and were left out.
    pub omitted: Vec<String>,
}

impl TableSchema {
    /// Derive the table for `order`; columns keep the variable order.
    pub fn for_form(
        name: impl Into<String>,
        catalog: &FieldCatalog,
        order: &VariableOrder,
        index: &MetaIndex,
    ) -> Self {
        let mut columns = Vec::with_capacity(order.len());
        let mut omitted = Vec::new();
        for variable in order {
            let column_type = if variable == catalog.primary_key() {
                Some(ColumnType::PrimaryKey)
            } else {
                catalog
                    .field_for(index, variable)
                    .and_then(|field| column_type(field.field_type()))
            };
            match column_type {
                Some(column_type) => columns.push(ColumnDef {
                    name: variable.clone(),
                    column_type,
                }),
                None => omitted.push(variable.clone()),
            }
        }
        Self {
            name: name.into(),
            primary_key: catalog.primary_key().to_string(),
            columns,
            omitted,
        }
    }

    /// Table for `form`: its variable order minus variables without a
    /// storage type. Export creates exactly these columns and import aligns
    /// tables against them.
    pub fn from_catalog(catalog: &FieldCatalog, form: &str) -> Result<Self> {
        let order = catalog.variable_order(form)?;
        let index = catalog.metadata_index(&order)?;
        Ok(Self::for_form(form, catalog, &order, &index))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.name.clone())
            .collect()
    }
}
