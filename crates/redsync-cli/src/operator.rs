//! Terminal prompts standing in for the operator.

use std::io::{BufRead, Write};

use redsync_core::{Decision, Operator, PlanDecision, RenameProposal, TransferPlan};
use tracing::warn;

/// Asks yes/no questions on `output` and reads answers from `input`.
///
/// Anything but `y`/`yes` is a no, including end of input and I/O errors.
pub struct PromptOperator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, prompt: &str) -> bool {
        if let Err(error) = write!(self.output, "{prompt} [y/N] ")
            .and_then(|()| self.output.flush())
        {
            warn!(%error, "failed to write prompt");
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(error) => {
                warn!(%error, "failed to read answer");
                false
            }
        }
    }
}

impl<R: BufRead, W: Write> Operator for PromptOperator<R, W> {
    fn confirm_renames(&mut self, table: &str, form: &str, proposal: &RenameProposal) -> Decision {
        let mut prompt = format!(
            "Columns of table '{table}' do not match form '{form}'. Proposed renames:\n"
        );
        for rename in proposal.renames() {
            prompt.push_str(&format!("  {rename}\n"));
        }
        prompt.push_str("Accept all renames?");
        if self.ask(&prompt) {
            Decision::Accept
        } else {
            Decision::Reject
        }
    }

    fn confirm_plan(&mut self, plan: &TransferPlan) -> PlanDecision {
        let mut prompt = String::from("Tables to create:\n");
        push_list(&mut prompt, &plan.new_tables);
        let overwrite = if plan.conflicts.is_empty() {
            false
        } else {
            prompt.push_str("Tables that already exist:\n");
            push_list(&mut prompt, &plan.conflicts);
            prompt.push_str("Overwrite existing tables?");
            let answer = self.ask(&prompt);
            prompt.clear();
            answer
        };
        prompt.push_str("Continue?");
        if !self.ask(&prompt) {
            return PlanDecision::Abort;
        }
        if overwrite {
            PlanDecision::WriteNewAndOverwrite
        } else {
            PlanDecision::WriteNew
        }
    }
}

fn push_list(out: &mut String, names: &[String]) {
    if names.is_empty() {
        out.push_str("  (none)\n");
    }
    for name in names {
        out.push_str(&format!("  {name}\n"));
    }
}
