//! Positional alignment of a form's variables against a table's columns.
//!
//! Columns are matched by position, never by name: any renaming between the
//! two sides is tolerated as long as the column order was kept. Mismatched
//! positions become rename proposals that the operator accepts or rejects as
//! one batch.

use std::fmt;

use crate::error::{Result, TransferError};

/// One mismatched position, proposed as `observed -> canonical`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub position: usize,
    pub observed: String,
    pub canonical: String,
}

impl fmt::Display for Rename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.observed, self.canonical)
    }
}

/// Every rename needed to align two equal-length column lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameProposal {
    renames: Vec<Rename>,
}

impl RenameProposal {
    pub fn renames(&self) -> &[Rename] {
        &self.renames
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    /// Human-readable description of each mismatch.
    pub fn errors(&self) -> Vec<String> {
        self.renames
            .iter()
            .map(|rename| {
                format!(
                    "column '{}' does not match variable '{}'",
                    rename.observed, rename.canonical
                )
            })
            .collect()
    }
}

/// Operator answer to a batch of proposed changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub final_columns: Vec<String>,
    pub errors: Vec<String>,
    pub aborted: bool,
}

impl ReconciliationResult {
    /// Columns to decode rows with, or [`TransferError::RenameRejected`].
    pub fn into_columns(self) -> Result<Vec<String>> {
        if self.aborted {
            return Err(TransferError::RenameRejected {
                count: self.errors.len(),
            });
        }
        Ok(self.final_columns)
    }
}

/// Compare two column lists position by position.
///
/// # Errors
///
/// Returns [`TransferError::CountMismatch`] when the lengths differ; renaming
/// cannot repair that.
pub fn propose_renames(canonical: &[String], observed: &[String]) -> Result<RenameProposal> {
    if canonical.len() != observed.len() {
        return Err(TransferError::CountMismatch {
            expected: canonical.len(),
            observed: observed.len(),
        });
    }
    let renames = canonical
        .iter()
        .zip(observed)
        .enumerate()
        .filter(|(_, (canonical, observed))| observed.trim() != canonical.as_str())
        .map(|(position, (canonical, observed))| Rename {
            position,
            observed: observed.trim().to_string(),
            canonical: canonical.clone(),
        })
        .collect();
    Ok(RenameProposal { renames })
}

/// Align `observed` to `canonical`, asking `decide` once about all renames.
///
/// `decide` is only called when at least one position differs.
pub fn reconcile<F>(
    canonical: &[String],
    observed: &[String],
    decide: F,
) -> Result<ReconciliationResult>
where
    F: FnOnce(&RenameProposal) -> Decision,
{
    let proposal = propose_renames(canonical, observed)?;
    let mut final_columns: Vec<String> = observed
        .iter()
        .map(|name| name.trim().to_string())
        .collect();
    if proposal.is_empty() {
        return Ok(ReconciliationResult {
            final_columns,
            errors: Vec::new(),
            aborted: false,
        });
    }

    let errors = proposal.errors();
    match decide(&proposal) {
        Decision::Accept => {
            for rename in proposal.renames() {
                final_columns[rename.position] = rename.canonical.clone();
            }
            Ok(ReconciliationResult {
                final_columns,
                errors,
                aborted: false,
            })
        }
        Decision::Reject => Ok(ReconciliationResult {
            final_columns,
            errors,
            aborted: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn identical_columns_need_no_decision() {
        let columns = cols(&["study_id", "age"]);
        let result = reconcile(&columns, &columns, |_| panic!("no decision expected")).unwrap();
        assert!(result.errors.is_empty());
        assert_eq!(result.final_columns, columns);
    }

    #[test]
    fn accepted_renames_adopt_canonical_names() {
        let canonical = cols(&["study_id", "age", "sex"]);
        let observed = cols(&["study_id", "AGE_YRS", " sex "]);
        let mut seen = Vec::new();
        let result = reconcile(&canonical, &observed, |proposal| {
            seen = proposal.renames().iter().map(ToString::to_string).collect();
            Decision::Accept
        })
        .unwrap();
        assert_eq!(seen, vec!["AGE_YRS --> age"]);
        assert_eq!(result.final_columns, canonical);
        assert_eq!(
            result.errors,
            vec!["column 'AGE_YRS' does not match variable 'age'"]
        );
        assert!(!result.aborted);
    }

    #[test]
    fn rejected_renames_abort() {
        let canonical = cols(&["study_id", "age"]);
        let observed = cols(&["id", "age"]);
        let result = reconcile(&canonical, &observed, |_| Decision::Reject).unwrap();
        assert!(result.aborted);
        let err = result.into_columns().unwrap_err();
        assert!(matches!(err, TransferError::RenameRejected { count: 1 }));
    }

    #[test]
    fn length_mismatch_is_fatal_before_any_decision() {
        let canonical = cols(&["study_id", "age"]);
        let observed = cols(&["study_id"]);
        let err = reconcile(&canonical, &observed, |_| panic!("no decision expected")).unwrap_err();
        assert!(matches!(
            err,
            TransferError::CountMismatch {
                expected: 2,
                observed: 1
            }
        ));
    }
}
