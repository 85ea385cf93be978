//! Primary-key bookkeeping for stores that have no constraints of their own.

use std::collections::{BTreeMap, BTreeSet};

use redsync_core::StoreError;
use redsync_model::SqlValue;

#[derive(Debug, Default)]
pub(crate) struct KeyLedger {
    tables: BTreeMap<String, TableKeys>,
}

#[derive(Debug)]
struct TableKeys {
    column: String,
    seen: BTreeSet<String>,
}

impl KeyLedger {
    pub(crate) fn track(&mut self, table: &str, column: &str) {
        self.tables.insert(
            table.to_string(),
            TableKeys {
                column: column.to_string(),
                seen: BTreeSet::new(),
            },
        );
    }

    pub(crate) fn forget(&mut self, table: &str) {
        self.tables.remove(table);
    }

    /// Register the key of one insert, rejecting a value seen before.
    ///
    /// NULL keys are left to auto-increment and never collide.
    pub(crate) fn claim(
        &mut self,
        table: &str,
        columns: &[String],
        values: &[SqlValue],
    ) -> Result<(), StoreError> {
        let Some(keys) = self.tables.get_mut(table) else {
            return Ok(());
        };
        let Some(value) = columns
            .iter()
            .position(|column| *column == keys.column)
            .and_then(|position| values.get(position))
        else {
            return Ok(());
        };
        if value.is_null() {
            return Ok(());
        }
        let literal = value.to_literal();
        if !keys.seen.insert(literal.clone()) {
            return Err(StoreError::Integrity(format!(
                "Duplicate entry {literal} for key 'PRIMARY'"
            )));
        }
        Ok(())
    }
}
