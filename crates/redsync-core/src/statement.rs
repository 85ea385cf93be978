//! Typed DDL/DML statements issued against a relational store.
//!
//! Stores either run [`Statement::sql`] with [`Statement::params`] bound
//! positionally, or act on the variant directly. [`Statement::render`] inlines
//! escaped literals for scripts and diagnostics.

use std::fmt;

use redsync_model::SqlValue;

use crate::typemap::TableSchema;

pub const TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=latin1";

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    DropTable {
        table: String,
    },
    CreateTable(TableSchema),
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<SqlValue>,
    },
}

/// Quote a MySQL identifier, doubling embedded backticks.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

impl Statement {
    pub fn table(&self) -> &str {
        match self {
            Self::DropTable { table } | Self::Insert { table, .. } => table,
            Self::CreateTable(schema) => &schema.name,
        }
    }

    /// SQL text with `?` placeholders.
    pub fn sql(&self) -> String {
        match self {
            Self::DropTable { table } => format!("DROP TABLE {}", quote_ident(table)),
            Self::CreateTable(schema) => create_table_sql(schema),
            Self::Insert { table, columns, .. } => {
                let placeholders = vec!["?"; columns.len()].join(", ");
                format!(
                    "INSERT INTO {} ({}) VALUES ({placeholders})",
                    quote_ident(table),
                    column_list(columns)
                )
            }
        }
    }

    /// Bind values for the placeholders of [`Statement::sql`], in order.
    pub fn params(&self) -> &[SqlValue] {
        match self {
            Self::Insert { values, .. } => values,
            Self::DropTable { .. } | Self::CreateTable(_) => &[],
        }
    }

    /// SQL text with every parameter inlined as an escaped literal.
    pub fn render(&self) -> String {
        match self {
            Self::Insert {
                table,
                columns,
                values,
            } => {
                let literals: Vec<String> = values.iter().map(SqlValue::to_literal).collect();
                format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    quote_ident(table),
                    column_list(columns),
                    literals.join(", ")
                )
            }
            Self::DropTable { .. } | Self::CreateTable(_) => self.sql(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|column| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ")
}

fn create_table_sql(schema: &TableSchema) -> String {
    let mut parts: Vec<String> = schema
        .columns
        .iter()
        .map(|column| {
            format!(
                "{} {}",
                quote_ident(&column.name),
                column.column_type.definition()
            )
        })
        .collect();
    let key = quote_ident(&schema.primary_key);
    parts.push(format!("PRIMARY KEY ({key})"));
    format!(
        "CREATE TABLE {} ({}) {TABLE_OPTIONS}",
        quote_ident(&schema.name),
        parts.join(", ")
    )
}
