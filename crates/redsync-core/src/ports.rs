//! Collaborator seams: the capture platform, the relational store, and the
//! operator.

use redsync_model::{FieldMeta, Record, SqlValue};

use crate::error::{BoxError, StoreError};
use crate::plan::{PlanDecision, TransferPlan};
use crate::reconcile::{Decision, RenameProposal};
use crate::statement::Statement;

/// Read access to a capture-platform project.
pub trait ProjectSource {
    /// Data dictionary in project order.
    fn metadata(&self) -> Result<Vec<FieldMeta>, BoxError>;

    /// Name of the field designated as the record identifier.
    fn primary_key(&self) -> Result<String, BoxError>;

    fn forms(&self) -> Result<Vec<String>, BoxError>;

    /// Every record of the project.
    fn export_records(&self) -> Result<Vec<Record>, BoxError>;
}

/// Write access to a capture-platform project.
pub trait ProjectSink {
    /// Import `records` into `form`, returning how many were accepted.
    fn import_records(&mut self, form: &str, records: &[Record]) -> Result<usize, BoxError>;
}

/// Full scan of a table: column names plus positional rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

/// A relational database reached through one exclusive connection.
pub trait RelationalStore {
    fn table_names(&mut self) -> Result<Vec<String>, StoreError>;

    /// Run one statement. A rejected row is reported as
    /// [`StoreError::Integrity`].
    fn execute(&mut self, statement: &Statement) -> Result<(), StoreError>;

    fn commit(&mut self) -> Result<(), StoreError>;

    fn scan(&mut self, table: &str) -> Result<ResultSet, StoreError>;
}

/// Decisions the engine needs from a person (or a policy standing in for one).
pub trait Operator {
    /// One answer for every proposed rename of `table` onto `form`.
    fn confirm_renames(&mut self, table: &str, form: &str, proposal: &RenameProposal) -> Decision;

    /// One answer for the whole export plan.
    fn confirm_plan(&mut self, plan: &TransferPlan) -> PlanDecision;
}

/// Receives progress for the table currently being written.
///
/// `update` is called with strictly increasing percentages, so rendering it
/// directly is idempotent.
pub trait ProgressSink {
    fn begin(&mut self, table: &str, total_rows: usize);
    fn update(&mut self, percent: u8);
    fn finish(&mut self);
}

/// Operator that answers every question without asking.
#[derive(Debug, Clone, Copy)]
pub struct AutoApprove {
    pub overwrite: bool,
}

impl Operator for AutoApprove {
    fn confirm_renames(
        &mut self,
        _table: &str,
        _form: &str,
        _proposal: &RenameProposal,
    ) -> Decision {
        Decision::Accept
    }

    fn confirm_plan(&mut self, _plan: &TransferPlan) -> PlanDecision {
        if self.overwrite {
            PlanDecision::WriteNewAndOverwrite
        } else {
            PlanDecision::WriteNew
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn begin(&mut self, _table: &str, _total_rows: usize) {}
    fn update(&mut self, _percent: u8) {}
    fn finish(&mut self) {}
}
