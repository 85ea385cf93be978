//! Transfer orchestration in both directions.
//!
//! An invocation moves through `Planning -> Reconciling -> Creating ->
//! Writing` and ends in `Done` or `Aborted`. Every row is committed on its
//! own, so an aborted export leaves the rows written so far in place. There is
//! no resume; a partial run is re-run from scratch.

use std::time::Instant;

use redsync_model::Record;
use tracing::{debug, error, info, info_span, warn};

use crate::catalog::FieldCatalog;
use crate::codec::{RowEncoder, decode_row};
use crate::error::{Result, StoreError, TransferError};
use crate::plan::{PlanDecision, PlannedTable, TableAction, TransferPlan};
use crate::ports::{Operator, ProgressSink, ProjectSink, ProjectSource, RelationalStore};
use crate::reconcile::reconcile;
use crate::statement::Statement;
use crate::typemap::TableSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Planning,
    Reconciling,
    Creating,
    Writing,
    Done,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
    Created,
    Overwritten,
    Imported,
}

/// Result for one table of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: String,
    pub form: String,
    pub outcome: TableOutcome,
    pub rows_written: usize,
    pub rows_skipped: usize,
    /// Variables with no storage type, left out of the table.
    pub omitted_columns: Vec<String>,
    /// Columns renamed during reconciliation.
    pub renamed_columns: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub tables: Vec<TableReport>,
    /// Existing tables the operator chose not to overwrite.
    pub untouched: Vec<String>,
}

impl TransferSummary {
    pub fn rows_written(&self) -> usize {
        self.tables.iter().map(|table| table.rows_written).sum()
    }

    pub fn rows_skipped(&self) -> usize {
        self.tables.iter().map(|table| table.rows_skipped).sum()
    }
}

/// One relational table to import into one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub table: String,
    pub form: String,
}

/// Percentage of rows processed, reported once per whole point.
#[derive(Debug)]
struct ProgressTracker {
    total: usize,
    processed: usize,
    last: u8,
}

impl ProgressTracker {
    fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            last: 0,
        }
    }

    /// Count one row; returns the new percentage when it moved.
    fn advance(&mut self) -> Option<u8> {
        self.processed += 1;
        if self.total == 0 {
            return None;
        }
        let percent = (self.processed.min(self.total) * 100 / self.total) as u8;
        if percent <= self.last {
            return None;
        }
        self.last = percent;
        Some(percent)
    }
}

pub struct TransferEngine<'a> {
    store: &'a mut dyn RelationalStore,
    operator: &'a mut dyn Operator,
    progress: &'a mut dyn ProgressSink,
    state: TransferState,
}

impl<'a> TransferEngine<'a> {
    pub fn new(
        store: &'a mut dyn RelationalStore,
        operator: &'a mut dyn Operator,
        progress: &'a mut dyn ProgressSink,
    ) -> Self {
        Self {
            store,
            operator,
            progress,
            state: TransferState::Planning,
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    fn enter(&mut self, state: TransferState) {
        debug!(from = ?self.state, to = ?state, "transfer state");
        self.state = state;
    }

    fn abort(&mut self, error: TransferError) -> TransferError {
        self.enter(TransferState::Aborted);
        error
    }

    /// Write every form of the project into its own table.
    ///
    /// # Errors
    ///
    /// Fails when the operator aborts the plan, when metadata is unusable, or
    /// on the first rejected insert. Rows committed before the failure stay.
    pub fn export_project(&mut self, source: &dyn ProjectSource) -> Result<TransferSummary> {
        let span = info_span!("export");
        let _guard = span.enter();
        let start = Instant::now();
        self.enter(TransferState::Planning);

        let catalog = load_catalog(source).map_err(|err| self.abort(err))?;
        let forms = source
            .forms()
            .map_err(|err| self.abort(TransferError::Source(err)))?;
        let existing = self
            .store
            .table_names()
            .map_err(|err| self.abort(err.into()))?;

        self.enter(TransferState::Reconciling);
        let plan = TransferPlan::classify(&forms, &existing);
        info!(
            new_tables = plan.new_tables.len(),
            conflicts = plan.conflicts.len(),
            "transfer plan"
        );
        let decision = if plan.is_empty() {
            PlanDecision::WriteNew
        } else {
            self.operator.confirm_plan(&plan)
        };
        if decision == PlanDecision::Abort {
            return Err(self.abort(TransferError::Aborted));
        }
        let targets = plan.targets(decision);
        let mut summary = TransferSummary {
            tables: Vec::with_capacity(targets.len()),
            untouched: plan.untouched(decision),
        };
        if targets.is_empty() {
            info!("nothing to transfer: no new tables and no overwriting");
            self.enter(TransferState::Done);
            return Ok(summary);
        }

        let records = source
            .export_records()
            .map_err(|err| self.abort(TransferError::Source(err)))?;
        for target in &targets {
            let report = self
                .write_table(&catalog, target, &records)
                .map_err(|err| self.abort(err))?;
            summary.tables.push(report);
        }

        self.enter(TransferState::Done);
        info!(
            tables = summary.tables.len(),
            rows = summary.rows_written(),
            duration_ms = start.elapsed().as_millis(),
            "export complete"
        );
        Ok(summary)
    }

    fn write_table(
        &mut self,
        catalog: &FieldCatalog,
        target: &PlannedTable,
        records: &[Record],
    ) -> Result<TableReport> {
        let table = target.form.as_str();
        let span = info_span!("table", table = %table);
        let _guard = span.enter();

        let order = catalog.variable_order(table)?;
        let index = catalog.metadata_index(&order)?;
        let schema = TableSchema::for_form(table, catalog, &order, &index);
        for column in &schema.omitted {
            debug!(column = %column, "no storage type; column omitted");
        }

        self.enter(TransferState::Creating);
        if target.action == TableAction::Overwrite {
            self.store.execute(&Statement::DropTable {
                table: table.to_string(),
            })?;
        }
        self.store.execute(&Statement::CreateTable(schema.clone()))?;
        self.store.commit()?;

        self.enter(TransferState::Writing);
        let columns = schema.column_names();
        let encoder = RowEncoder::new(catalog, &index, &schema);
        let mut tracker = ProgressTracker::new(records.len());
        self.progress.begin(table, records.len());
        let mut written = 0;
        for record in records {
            let insert = Statement::Insert {
                table: table.to_string(),
                columns: columns.clone(),
                values: encoder.encode(record),
            };
            match self.store.execute(&insert) {
                Ok(()) => {}
                Err(StoreError::Integrity(message)) => {
                    self.progress.finish();
                    error!(row = written + 1, "insert rejected by destination");
                    return Err(TransferError::IntegrityViolation {
                        table: table.to_string(),
                        statement: insert.render(),
                        message,
                    });
                }
                Err(err) => {
                    self.progress.finish();
                    return Err(err.into());
                }
            }
            self.store.commit()?;
            written += 1;
            if let Some(percent) = tracker.advance() {
                self.progress.update(percent);
            }
        }
        self.progress.finish();

        info!(
            rows = written,
            omitted = schema.omitted.len(),
            "table written"
        );
        Ok(TableReport {
            table: table.to_string(),
            form: table.to_string(),
            outcome: match target.action {
                TableAction::Create => TableOutcome::Created,
                TableAction::Overwrite => TableOutcome::Overwritten,
            },
            rows_written: written,
            rows_skipped: 0,
            omitted_columns: schema.omitted,
            renamed_columns: 0,
        })
    }

    /// Import each requested table into its form, in order.
    ///
    /// # Errors
    ///
    /// Any fatal error stops the remaining requests.
    pub fn import_tables(
        &mut self,
        source: &dyn ProjectSource,
        sink: &mut dyn ProjectSink,
        requests: &[ImportRequest],
    ) -> Result<TransferSummary> {
        let span = info_span!("import", requests = requests.len());
        let _guard = span.enter();
        let start = Instant::now();
        self.enter(TransferState::Planning);
        let catalog = load_catalog(source).map_err(|err| self.abort(err))?;

        let mut summary = TransferSummary::default();
        for request in requests {
            let report = self
                .import_table(&catalog, sink, request)
                .map_err(|err| self.abort(err))?;
            summary.tables.push(report);
        }

        self.enter(TransferState::Done);
        info!(
            tables = summary.tables.len(),
            rows = summary.rows_written(),
            skipped = summary.rows_skipped(),
            duration_ms = start.elapsed().as_millis(),
            "import complete"
        );
        Ok(summary)
    }

    fn import_table(
        &mut self,
        catalog: &FieldCatalog,
        sink: &mut dyn ProjectSink,
        request: &ImportRequest,
    ) -> Result<TableReport> {
        let ImportRequest { table, form } = request;
        let span = info_span!("table", table = %table, form = %form);
        let _guard = span.enter();

        self.enter(TransferState::Planning);
        let schema = TableSchema::from_catalog(catalog, form)?;
        let canonical = schema.column_names();
        let result_set = self.store.scan(table)?;

        self.enter(TransferState::Reconciling);
        let operator = &mut *self.operator;
        let reconciled = reconcile(&canonical, &result_set.columns, |proposal| {
            operator.confirm_renames(table, form, proposal)
        })?;
        let renamed_columns = reconciled.errors.len();
        for message in &reconciled.errors {
            warn!("{message}");
        }
        let columns = reconciled.into_columns()?;

        self.enter(TransferState::Writing);
        let total = result_set.rows.len();
        let mut tracker = ProgressTracker::new(total);
        let mut records = Vec::with_capacity(total);
        let mut skipped = 0;
        self.progress.begin(table, total);
        for (row_number, row) in result_set.rows.into_iter().enumerate() {
            match decode_row(&columns, row) {
                Ok(record) => records.push(record),
                Err(err) => {
                    skipped += 1;
                    warn!(row = row_number + 1, "skipping row: {err}");
                }
            }
            if let Some(percent) = tracker.advance() {
                self.progress.update(percent);
            }
        }
        self.progress.finish();

        let imported = sink
            .import_records(form, &records)
            .map_err(TransferError::Sink)?;
        info!(rows = imported, skipped, "table imported");
        Ok(TableReport {
            table: table.clone(),
            form: form.clone(),
            outcome: TableOutcome::Imported,
            rows_written: imported,
            rows_skipped: skipped,
            omitted_columns: schema.omitted,
            renamed_columns,
        })
    }
}

fn load_catalog(source: &dyn ProjectSource) -> Result<FieldCatalog> {
    let fields = source.metadata().map_err(TransferError::Source)?;
    let primary_key = source.primary_key().map_err(TransferError::Source)?;
    Ok(FieldCatalog::new(fields, primary_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_reports_each_point_once() {
        let mut tracker = ProgressTracker::new(3);
        assert_eq!(tracker.advance(), Some(33));
        assert_eq!(tracker.advance(), Some(66));
        assert_eq!(tracker.advance(), Some(100));
        assert_eq!(tracker.advance(), None);
    }

    #[test]
    fn progress_skips_repeated_percentages() {
        let mut tracker = ProgressTracker::new(400);
        let reported: Vec<u8> = (0..400).filter_map(|_| tracker.advance()).collect();
        assert_eq!(reported.len(), 100);
        assert_eq!(reported.first(), Some(&1));
        assert_eq!(reported.last(), Some(&100));
    }

    #[test]
    fn empty_tables_report_no_progress() {
        let mut tracker = ProgressTracker::new(0);
        assert_eq!(tracker.advance(), None);
    }
}
