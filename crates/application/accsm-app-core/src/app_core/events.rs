use accsm_core::{CarId, SetupId, TrackId};
use camino::Utf8PathBuf;

use crate::domain::{MainView, Preferences};
use crate::import::{ImportRunId, RunKind, RunOutcome};
use crate::modals::SetupModalData;
use crate::notice::Notice;
use crate::review::ReviewEdit;

#[derive(Debug, Clone)]
pub enum DomainEvent {
    // Boot state
    BootLoadingStarted,
    InitialStateLoaded {
        preferences: Preferences,
    },
    BootFailed {
        message: String,
    },

    // Navigation
    MainViewChanged(MainView),
    TrackToggled(TrackId),
    CarToggled(CarId),
    TrackSearchChanged(String),
    CarSearchChanged(String),
    CarCategoryChanged(Option<String>),

    // Authoring
    SetupFormSubmitted,
    SetupFormFailed(String),
    SetupCreated(SetupId),
    SetupEdited(SetupId),

    // Setups folder
    SetupsPathSubmitted,
    SetupsPathRejected(String),
    SetupsPathUpdated,

    // Import modal
    ImportModalOpened {
        paths: Vec<Utf8PathBuf>,
    },
    ImportModalClosed,
    ImportRunStarted {
        run_id: ImportRunId,
        kind: RunKind,
    },
    ImportRunFinished {
        run_id: ImportRunId,
        outcome: RunOutcome,
    },
    ImportRunFailed {
        run_id: ImportRunId,
    },
    ImportTryAgain,

    // Review
    ReviewEdited(ReviewEdit),
    ReviewSubmitStarted,
    ReviewSubmitFailed,

    // Setup modals
    DeleteModalOpened(SetupModalData),
    DeleteModalClosed,
    DeleteStarted,
    DeleteFailed,
    RenameModalOpened(SetupModalData),
    RenameModalClosed,
    RenameStarted,
    RenameFailed,

    // Completed mutations
    SetupDeleted(SetupId),
    SetupRenamed {
        from: SetupId,
        to: SetupId,
    },

    // User-visible notices
    Notice(Notice),
    NoticeDismissed(usize),
}

impl DomainEvent {
    /// Run id of an import result, if this event carries one.
    pub fn import_run_id(&self) -> Option<ImportRunId> {
        match self {
            DomainEvent::ImportRunFinished { run_id, .. }
            | DomainEvent::ImportRunFailed { run_id } => Some(*run_id),
            _ => None,
        }
    }
}
