//! In-memory collaborators shared by the engine tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use redsync_core::{
    BoxError, Decision, Operator, PlanDecision, ProgressSink, ProjectSink, ProjectSource,
    RelationalStore, RenameProposal, ResultSet, Statement, StoreError, TransferPlan,
};
use redsync_model::{FieldMeta, FieldType, Record, SqlValue};

pub fn field(name: &str, form: &str, field_type: FieldType, choices: &str) -> FieldMeta {
    FieldMeta::new(name, form, field_type, choices).unwrap()
}

pub fn record(values: &[(&str, &str)]) -> Record {
    values.iter().copied().collect()
}

pub struct FakeProject {
    pub fields: Vec<FieldMeta>,
    pub primary_key: String,
    pub records: Vec<Record>,
}

impl FakeProject {
    pub fn demo() -> Self {
        Self {
            fields: vec![
                field("study_id", "demo", FieldType::Text, ""),
                field("consent", "demo", FieldType::Checkbox, "1|2"),
                field("sex", "demo", FieldType::Radio, "0, Female | 1, Male"),
                field("photo", "demo", FieldType::File, ""),
                field("pain", "visit", FieldType::Slider, ""),
                field("smoker", "visit", FieldType::YesNo, ""),
            ],
            primary_key: "study_id".to_string(),
            records: vec![
                record(&[
                    ("study_id", "1"),
                    ("consent___1", "1"),
                    ("consent___2", "0"),
                    ("sex", "1"),
                    ("pain", "7"),
                    ("smoker", "0"),
                ]),
                record(&[
                    ("study_id", "2"),
                    ("consent___1", "0"),
                    ("consent___2", "1"),
                    ("sex", "0"),
                    ("pain", ""),
                    ("smoker", "1"),
                ]),
            ],
        }
    }
}

impl ProjectSource for FakeProject {
    fn metadata(&self) -> Result<Vec<FieldMeta>, BoxError> {
        Ok(self.fields.clone())
    }

    fn primary_key(&self) -> Result<String, BoxError> {
        Ok(self.primary_key.clone())
    }

    fn forms(&self) -> Result<Vec<String>, BoxError> {
        let mut forms: Vec<String> = Vec::new();
        for field in &self.fields {
            if !forms.iter().any(|form| form == field.form_name()) {
                forms.push(field.form_name().to_string());
            }
        }
        Ok(forms)
    }

    fn export_records(&self) -> Result<Vec<Record>, BoxError> {
        Ok(self.records.clone())
    }
}

#[derive(Debug, Default)]
pub struct MemoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
    pub primary_key: Option<String>,
}

/// Store that keeps tables in memory and rejects duplicate primary keys.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub tables: BTreeMap<String, MemoryTable>,
    pub executed: Vec<String>,
    pub commits: usize,
}

impl MemoryStore {
    pub fn with_table(mut self, name: &str, columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        self.tables.insert(
            name.to_string(),
            MemoryTable {
                columns: columns.iter().map(|column| (*column).to_string()).collect(),
                rows,
                primary_key: None,
            },
        );
        self
    }
}

impl RelationalStore for MemoryStore {
    fn table_names(&mut self) -> Result<Vec<String>, StoreError> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn execute(&mut self, statement: &Statement) -> Result<(), StoreError> {
        self.executed.push(statement.sql());
        match statement {
            Statement::DropTable { table } => {
                self.tables
                    .remove(table)
                    .ok_or_else(|| StoreError::UnknownTable(table.clone()))?;
            }
            Statement::CreateTable(schema) => {
                self.tables.insert(
                    schema.name.clone(),
                    MemoryTable {
                        columns: schema.column_names(),
                        rows: Vec::new(),
                        primary_key: Some(schema.primary_key.clone()),
                    },
                );
            }
            Statement::Insert {
                table,
                columns,
                values,
            } => {
                let target = self
                    .tables
                    .get_mut(table)
                    .ok_or_else(|| StoreError::UnknownTable(table.clone()))?;
                if let Some(key) = &target.primary_key
                    && let Some(key_position) = columns.iter().position(|column| column == key)
                {
                    let key_value = &values[key_position];
                    let rows = &target.rows;
                    if rows.iter().any(|row| &row[key_position] == key_value) {
                        return Err(StoreError::Integrity(format!(
                            "Duplicate entry '{}' for key 'PRIMARY'",
                            key_value.to_literal()
                        )));
                    }
                }
                target.rows.push(values.clone());
            }
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.commits += 1;
        Ok(())
    }

    fn scan(&mut self, table: &str) -> Result<ResultSet, StoreError> {
        let target = self
            .tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        Ok(ResultSet {
            columns: target.columns.clone(),
            rows: target.rows.clone(),
        })
    }
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    pub imported: BTreeMap<String, Vec<Record>>,
}

impl ProjectSink for CollectingSink {
    fn import_records(&mut self, form: &str, records: &[Record]) -> Result<usize, BoxError> {
        self.imported
            .entry(form.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(records.len())
    }
}

/// Operator with scripted answers that remembers what it was asked.
pub struct ScriptedOperator {
    pub renames: Decision,
    pub plan: PlanDecision,
    pub seen_proposals: Vec<Vec<String>>,
    pub seen_plans: Vec<TransferPlan>,
}

impl ScriptedOperator {
    pub fn new(renames: Decision, plan: PlanDecision) -> Self {
        Self {
            renames,
            plan,
            seen_proposals: Vec::new(),
            seen_plans: Vec::new(),
        }
    }
}

impl Operator for ScriptedOperator {
    fn confirm_renames(
        &mut self,
        _table: &str,
        _form: &str,
        proposal: &RenameProposal,
    ) -> Decision {
        self.seen_proposals
            .push(proposal.renames().iter().map(ToString::to_string).collect());
        self.renames
    }

    fn confirm_plan(&mut self, plan: &TransferPlan) -> PlanDecision {
        self.seen_plans.push(plan.clone());
        self.plan
    }
}

#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub begun: Vec<(String, usize)>,
    pub updates: Vec<u8>,
    pub finished: usize,
}

impl ProgressSink for RecordingProgress {
    fn begin(&mut self, table: &str, total_rows: usize) {
        self.begun.push((table.to_string(), total_rows));
    }

    fn update(&mut self, percent: u8) {
        self.updates.push(percent);
    }

    fn finish(&mut self) {
        self.finished += 1;
    }
}
