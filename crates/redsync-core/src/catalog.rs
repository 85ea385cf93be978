//! Variable ordering derived from field metadata.
//!
//! A form's variable order is the column layout shared by the capture
//! platform and the relational table: the primary identifier first, then each
//! field in data-dictionary order, with checkbox fields expanded into one
//! column per choice.

use std::collections::{BTreeMap, BTreeSet};
use std::slice;

use redsync_model::{CHECKBOX_SEPARATOR, FieldMeta};
use tracing::debug;

use crate::error::{Result, TransferError};

/// Ordered column names for one form (or for the whole project).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableOrder(Vec<String>);

impl VariableOrder {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.0.iter().any(|name| name == variable)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a VariableOrder {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Variable name to position of its owning field in the metadata sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaIndex(BTreeMap<String, usize>);

impl MetaIndex {
    pub fn get(&self, variable: &str) -> Option<usize> {
        self.0.get(variable).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(name, index)| (name.as_str(), *index))
    }
}

/// Field metadata of one project plus its designated primary identifier.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    fields: Vec<FieldMeta>,
    primary_key: String,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FieldMeta>, primary_key: impl Into<String>) -> Self {
        Self {
            fields,
            primary_key: primary_key.into(),
        }
    }

    /// Build a catalog whose primary identifier is the first metadata field,
    /// which is how the capture platform designates it.
    pub fn with_first_field_as_key(fields: Vec<FieldMeta>) -> Result<Self> {
        let primary_key = fields
            .first()
            .map(|field| field.field_name().to_string())
            .ok_or_else(|| TransferError::schema("project metadata is empty"))?;
        Ok(Self::new(fields, primary_key))
    }

    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn field(&self, index: usize) -> Option<&FieldMeta> {
        self.fields.get(index)
    }

    /// The field owning `variable`, resolved through `index`.
    pub fn field_for(&self, index: &MetaIndex, variable: &str) -> Option<&FieldMeta> {
        index
            .get(variable)
            .and_then(|position| self.fields.get(position))
    }

    /// Distinct form names in first-seen order.
    pub fn forms(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.fields
            .iter()
            .map(FieldMeta::form_name)
            .filter(|form| seen.insert(*form))
            .map(str::to_string)
            .collect()
    }

    /// Column order for `form`.
    ///
    /// # Errors
    ///
    /// Returns a schema error when no field belongs to `form`.
    pub fn variable_order(&self, form: &str) -> Result<VariableOrder> {
        let mut variables: Vec<String> = self
            .fields
            .iter()
            .filter(|field| field.form_name() == form)
            .flat_map(FieldMeta::variables)
            .collect();
        if variables.is_empty() {
            return Err(TransferError::schema(format!(
                "no fields found for form '{form}'"
            )));
        }
        if variables[0] != self.primary_key {
            variables.insert(0, self.primary_key.clone());
        }
        Ok(VariableOrder(variables))
    }

    /// Union of every form's order; on a name collision the first form wins.
    pub fn all_variables(&self) -> Result<VariableOrder> {
        let mut seen = BTreeSet::new();
        let mut variables = Vec::new();
        for form in self.forms() {
            for variable in self.variable_order(&form)?.into_vec() {
                if seen.insert(variable.clone()) {
                    variables.push(variable);
                }
            }
        }
        Ok(VariableOrder(variables))
    }

    /// Map each variable of `order` to its owning metadata entry.
    ///
    /// Walks `order` and the metadata in lockstep. The metadata cursor skips
    /// entries of other forms, and a checkbox entry absorbs all of its
    /// expanded columns. The primary identifier is resolved by name and is
    /// left out when the metadata does not define it.
    ///
    /// # Errors
    ///
    /// Returns a schema error when a variable has no metadata entry at or
    /// after the cursor.
    pub fn metadata_index(&self, order: &VariableOrder) -> Result<MetaIndex> {
        let variables = order.as_slice();
        let key_position = self
            .fields
            .iter()
            .position(|field| field.field_name() == self.primary_key);
        let mut index = BTreeMap::new();
        let mut cursor = 0;
        let mut position = 0;

        while position < variables.len() {
            let variable = &variables[position];
            if *variable == self.primary_key {
                match key_position {
                    Some(key_position) => {
                        index.insert(variable.clone(), key_position);
                        if cursor == key_position {
                            cursor += 1;
                        }
                    }
                    None => debug!(
                        primary_key = %self.primary_key,
                        "primary identifier has no metadata entry"
                    ),
                }
                position += 1;
                continue;
            }

            let offset = self.fields[cursor.min(self.fields.len())..]
                .iter()
                .position(|field| owns_variable(field, variable))
                .ok_or_else(|| {
                    TransferError::schema(format!("variable '{variable}' has no metadata entry"))
                })?;
            let meta_position = cursor + offset;
            let field = &self.fields[meta_position];
            if field.is_checkbox() {
                let expanded = field.variables();
                let start = expanded
                    .iter()
                    .position(|name| name == variable)
                    .unwrap_or_default();
                for name in &expanded[start..] {
                    if variables.get(position) != Some(name) {
                        break;
                    }
                    index.insert(name.clone(), meta_position);
                    position += 1;
                }
            } else {
                index.insert(variable.clone(), meta_position);
                position += 1;
            }
            cursor = meta_position + 1;
        }

        Ok(MetaIndex(index))
    }
}

fn owns_variable(field: &FieldMeta, variable: &str) -> bool {
    if !field.is_checkbox() {
        return field.field_name() == variable;
    }
    variable
        .strip_prefix(field.field_name())
        .and_then(|rest| rest.strip_prefix(CHECKBOX_SEPARATOR))
        .and_then(|suffix| suffix.parse::<usize>().ok())
        .is_some_and(|choice| (1..=field.choices().len()).contains(&choice))
}
