use accsm_core::{CarId, SetupId, TrackId};
use camino::Utf8PathBuf;

use crate::authoring::{SetupDraft, SetupEdit};
use crate::dragdrop::DragEvent;
use crate::modals::ModalHooks;
use crate::review::ReviewEdit;

#[derive(Debug, Clone)]
pub enum AppCommand {
    // Boot
    LoadInitialState,

    // Navigation
    SelectSetup(SetupId),
    StartNewSetup,
    ClearView,
    ToggleTrack(TrackId),
    ToggleCar(CarId),
    SetTrackSearch(String),
    SetCarSearch(String),
    SetCarCategory(Option<String>),

    // Authoring
    CreateSetup(SetupDraft),
    EditSetup { setup: SetupId, edit: SetupEdit },

    // Setups folder
    RefreshFolderStructure,
    /// Raw input of the change-path dialog; checked before it is sent.
    SetSetupsPath(String),

    // Import
    OpenImportModal { paths: Vec<Utf8PathBuf> },
    CloseImportModal,
    Drag(DragEvent),
    /// Paths chosen through the file picker inside the import modal.
    PickedPaths(Vec<Utf8PathBuf>),
    /// Import without the review step.
    ImportPathsDirect(Vec<Utf8PathBuf>),
    ImportTryAgain,
    Review(ReviewEdit),
    SubmitReview,

    // Setup modals
    OpenDeleteSetup { setup: SetupId, hooks: ModalHooks },
    OpenRenameSetup { setup: SetupId, hooks: ModalHooks },
    CloseDeleteSetup,
    CloseRenameSetup,
    ConfirmDeleteSetup,
    ConfirmRenameSetup { new_name: String },

    DismissNotice(usize),
}
