use crate::domain::{AppState, BootState, MainView};
use crate::review::ReviewEdit;

use super::events::DomainEvent;

pub fn reduce(mut state: AppState, ev: DomainEvent) -> AppState {
    match ev {
        DomainEvent::BootLoadingStarted => {
            state.boot = BootState::Loading;
        }

        DomainEvent::InitialStateLoaded { preferences } => {
            state.preferences = preferences;
            state.boot = BootState::Ready;
        }

        DomainEvent::BootFailed { message } => {
            state.boot = BootState::Failed(message);
        }

        DomainEvent::MainViewChanged(view) => {
            if state.main_view != view {
                state.setup_form = Default::default();
            }
            state.main_view = view;
        }

        DomainEvent::SetupFormSubmitted => state.setup_form.submitted(),
        DomainEvent::SetupFormFailed(message) => state.setup_form.failed(message),

        DomainEvent::SetupCreated(id) => {
            state.setup_form = Default::default();
            if state.main_view == MainView::Creating {
                state.main_view = MainView::Viewing(id);
            }
        }

        DomainEvent::SetupEdited(_) => state.setup_form = Default::default(),

        DomainEvent::SetupsPathSubmitted => state.setups_path_form.submitted(),
        DomainEvent::SetupsPathRejected(message) => state.setups_path_form.failed(message),
        DomainEvent::SetupsPathUpdated => state.setups_path_form = Default::default(),

        DomainEvent::TrackToggled(track) => {
            state.selected_track = if state.selected_track.as_ref() == Some(&track) {
                None
            } else {
                Some(track)
            };
        }

        DomainEvent::CarToggled(car) => {
            state.selected_car = if state.selected_car.as_ref() == Some(&car) {
                None
            } else {
                Some(car)
            };
        }

        DomainEvent::TrackSearchChanged(q) => state.preferences.track_search_query = q,
        DomainEvent::CarSearchChanged(q) => state.preferences.car_search_query = q,
        DomainEvent::CarCategoryChanged(c) => state.preferences.car_category_filter = c,

        DomainEvent::ImportModalOpened { paths } => {
            state.import_modal_open = true;
            state.import_initial_paths = paths;
            state.import.reset();
            state.drop_router.set_modal_open(true);
        }

        DomainEvent::ImportModalClosed => {
            state.import_modal_open = false;
            state.import_initial_paths.clear();
            state.import.reset();
            state.drop_router.set_modal_open(false);
        }

        DomainEvent::ImportRunStarted { run_id, kind } => {
            state.import.begin(run_id, kind);
            state.drop_router.begin_processing();
        }

        DomainEvent::ImportRunFinished { run_id, outcome } => {
            let apply_lfm = state.preferences.apply_lfm_default;
            if state.import.complete(run_id, outcome, apply_lfm) {
                state.drop_router.processing_done();
            }
        }

        DomainEvent::ImportRunFailed { run_id } => {
            if state.import.fail(run_id) {
                state.drop_router.processing_done();
            }
        }

        DomainEvent::ImportTryAgain => state.import.try_again(),

        DomainEvent::ReviewEdited(edit) => {
            if let ReviewEdit::SetApplyLfm(on) = edit {
                state.preferences.apply_lfm_default = on;
            }
            if let Some(review) = state.import.review_mut() {
                review.apply(edit);
            }
        }

        DomainEvent::ReviewSubmitStarted => {
            if let Some(review) = state.import.review_mut() {
                review.set_pending(true);
            }
        }

        DomainEvent::ReviewSubmitFailed => {
            if let Some(review) = state.import.review_mut() {
                review.set_pending(false);
            }
        }

        DomainEvent::DeleteModalOpened(data) => state.modals.open_delete_setup(data),
        DomainEvent::DeleteModalClosed => state.modals.close_delete_setup(),
        DomainEvent::DeleteStarted => state.modals.delete_setup.pending = true,
        DomainEvent::DeleteFailed => state.modals.delete_setup.pending = false,

        DomainEvent::RenameModalOpened(data) => state.modals.open_rename_setup(data),
        DomainEvent::RenameModalClosed => state.modals.close_rename_setup(),
        DomainEvent::RenameStarted => state.modals.rename_setup.pending = true,
        DomainEvent::RenameFailed => state.modals.rename_setup.pending = false,

        DomainEvent::SetupDeleted(id) => {
            if state.viewing() == Some(&id) {
                state.main_view = MainView::Empty;
            }
            state.modals.close_delete_setup();
        }

        DomainEvent::SetupRenamed { from, to } => {
            if state.viewing() == Some(&from) {
                state.main_view = MainView::Viewing(to);
            }
            state.modals.close_rename_setup();
        }

        DomainEvent::Notice(notice) => state.notices.push(notice),

        DomainEvent::NoticeDismissed(ix) => {
            if ix < state.notices.len() {
                state.notices.remove(ix);
            }
        }
    }
    state
}
