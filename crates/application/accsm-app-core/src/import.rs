//! Phases of the import modal.

use accsm_core::{ImportResult, ValidationResult};

use crate::review::ValidationReview;

pub type ImportRunId = uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Import everything found in one call.
    Direct,
    /// Validate first, then let the user review before importing.
    Staged,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub succeeded: Vec<ImportResult>,
    pub failed: Vec<ImportResult>,
}

impl ImportSummary {
    pub fn from_results(results: Vec<ImportResult>) -> Self {
        let (succeeded, failed) = results.into_iter().partition(|r| r.success);
        Self { succeeded, failed }
    }

    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }
}

/// Backend response for one run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Imported(Vec<ImportResult>),
    Validated(Vec<ValidationResult>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImportPhase {
    #[default]
    Waiting,
    Processing {
        run_id: ImportRunId,
        kind: RunKind,
    },
    Imported(ImportSummary),
    Review(ValidationReview),
    NothingFound,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportFlow {
    phase: ImportPhase,
    run_id: Option<ImportRunId>,
}

impl ImportFlow {
    pub fn phase(&self) -> &ImportPhase {
        &self.phase
    }

    pub fn run_id(&self) -> Option<ImportRunId> {
        self.run_id
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.phase, ImportPhase::Processing { .. })
    }

    /// Begins a new run, superseding any in-flight one.
    pub fn start(&mut self, kind: RunKind) -> ImportRunId {
        let run_id = uuid::Uuid::new_v4();
        self.begin(run_id, kind);
        run_id
    }

    pub(crate) fn begin(&mut self, run_id: ImportRunId, kind: RunKind) {
        self.run_id = Some(run_id);
        self.phase = ImportPhase::Processing { run_id, kind };
    }

    pub fn is_current(&self, run_id: ImportRunId) -> bool {
        self.run_id == Some(run_id)
    }

    /// Applies a run's response. Returns `false` when the run was superseded.
    pub fn complete(
        &mut self,
        run_id: ImportRunId,
        outcome: RunOutcome,
        apply_lfm_default: bool,
    ) -> bool {
        if !self.is_current(run_id) {
            tracing::debug!(%run_id, "ignoring result of superseded import run");
            return false;
        }

        self.phase = match outcome {
            RunOutcome::Imported(results) => {
                let summary = ImportSummary::from_results(results);
                if summary.is_empty() {
                    ImportPhase::NothingFound
                } else {
                    ImportPhase::Imported(summary)
                }
            }
            RunOutcome::Validated(results) => {
                let review = ValidationReview::new(results, apply_lfm_default);
                if review.is_empty() {
                    ImportPhase::NothingFound
                } else {
                    ImportPhase::Review(review)
                }
            }
        };
        true
    }

    /// The run call itself failed; the user can drop files again.
    pub fn fail(&mut self, run_id: ImportRunId) -> bool {
        if !self.is_current(run_id) {
            return false;
        }
        self.phase = ImportPhase::Waiting;
        true
    }

    pub fn try_again(&mut self) {
        self.phase = ImportPhase::Waiting;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn review(&self) -> Option<&ValidationReview> {
        match &self.phase {
            ImportPhase::Review(review) => Some(review),
            _ => None,
        }
    }

    pub fn review_mut(&mut self) -> Option<&mut ValidationReview> {
        match &mut self.phase {
            ImportPhase::Review(review) => Some(review),
            _ => None,
        }
    }
}
