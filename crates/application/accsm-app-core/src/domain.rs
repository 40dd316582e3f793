use accsm_core::{CarId, SetupId, TrackId};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::dragdrop::DropRouter;
use crate::import::ImportFlow;
use crate::modals::ModalState;
use crate::notice::Notice;

/// Client-side state kept across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Initial value of the batch-wide LFM toggle in the import review.
    pub apply_lfm_default: bool,
    pub track_search_query: String,
    pub car_search_query: String,
    pub car_category_filter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MainView {
    #[default]
    Empty,
    Viewing(SetupId),
    Creating,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BootState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// Progress of a form whose submit goes to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub pending: bool,
    pub error: Option<String>,
}

impl FormStatus {
    pub fn submitted(&mut self) {
        self.pending = true;
        self.error = None;
    }

    pub fn failed(&mut self, message: String) {
        self.pending = false;
        self.error = Some(message);
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub boot: BootState,
    pub main_view: MainView,
    /// New-setup form or edit of the viewed setup.
    pub setup_form: FormStatus,
    pub setups_path_form: FormStatus,

    pub selected_track: Option<TrackId>,
    pub selected_car: Option<CarId>,
    pub preferences: Preferences,

    pub import_modal_open: bool,
    /// Paths handed to the import modal when it was opened by a global drop.
    pub import_initial_paths: Vec<Utf8PathBuf>,
    pub import: ImportFlow,
    pub drop_router: DropRouter,

    pub modals: ModalState,
    pub notices: Vec<Notice>,
}

impl AppState {
    pub fn viewing(&self) -> Option<&SetupId> {
        match &self.main_view {
            MainView::Viewing(id) => Some(id),
            _ => None,
        }
    }
}
