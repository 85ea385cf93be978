//! Which forms get a table, and which existing tables get replaced.

use std::collections::BTreeSet;

/// Operator's single answer to a [`TransferPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDecision {
    /// Create tables for new forms; leave existing tables alone.
    WriteNew,
    /// Create tables for new forms and recreate the conflicting ones.
    WriteNewAndOverwrite,
    Abort,
}

/// What happens to a form's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAction {
    Create,
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTable {
    pub form: String,
    pub action: TableAction,
}

/// Partition of the project's forms against the destination's tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferPlan {
    /// Forms without a table of the same name.
    pub new_tables: Vec<String>,
    /// Forms whose name collides with an existing table.
    pub conflicts: Vec<String>,
}

impl TransferPlan {
    pub fn classify(forms: &[String], existing_tables: &[String]) -> Self {
        let existing: BTreeSet<&str> = existing_tables.iter().map(String::as_str).collect();
        let (conflicts, new_tables): (Vec<String>, Vec<String>) = forms
            .iter()
            .cloned()
            .partition(|form| existing.contains(form.as_str()));
        Self {
            new_tables,
            conflicts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_tables.is_empty() && self.conflicts.is_empty()
    }

    /// Tables to write under `decision`, in form order.
    pub fn targets(&self, decision: PlanDecision) -> Vec<PlannedTable> {
        let overwrite = match decision {
            PlanDecision::Abort => return Vec::new(),
            PlanDecision::WriteNew => false,
            PlanDecision::WriteNewAndOverwrite => true,
        };
        let mut targets: Vec<PlannedTable> = self
            .new_tables
            .iter()
            .map(|form| PlannedTable {
                form: form.clone(),
                action: TableAction::Create,
            })
            .collect();
        if overwrite {
            targets.extend(self.conflicts.iter().map(|form| PlannedTable {
                form: form.clone(),
                action: TableAction::Overwrite,
            }));
        }
        targets
    }

    /// Existing tables that stay as they are under `decision`.
    pub fn untouched(&self, decision: PlanDecision) -> Vec<String> {
        match decision {
            PlanDecision::WriteNewAndOverwrite => Vec::new(),
            PlanDecision::WriteNew | PlanDecision::Abort => self.conflicts.clone(),
        }
    }
}
