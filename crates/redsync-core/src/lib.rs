//! Schema reconciliation and record transfer between capture-platform
//! projects and relational tables.

#![deny(unsafe_code)]

pub mod catalog;
pub mod codec;
pub mod engine;
pub mod error;
pub mod plan;
pub mod ports;
pub mod reconcile;
pub mod statement;
pub mod typemap;

pub use catalog::{FieldCatalog, MetaIndex, VariableOrder};
pub use codec::{RowEncoder, decode_row, encode_value, relabel};
pub use engine::{
    ImportRequest, TableOutcome, TableReport, TransferEngine, TransferState, TransferSummary,
};
pub use error::{BoxError, ColumnCountError, Result, StoreError, TransferError};
pub use plan::{PlanDecision, PlannedTable, TableAction, TransferPlan};
pub use ports::{
    AutoApprove, NoProgress, Operator, ProgressSink, ProjectSink, ProjectSource, RelationalStore,
    ResultSet,
};
pub use reconcile::{
    Decision, ReconciliationResult, Rename, RenameProposal, propose_renames, reconcile,
};
pub use statement::{Statement, quote_ident};
pub use typemap::{Affinity, ColumnDef, ColumnType, TableSchema, column_type};
