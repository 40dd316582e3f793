//! Routing of OS drag-and-drop events.
//!
//! Both the window-wide overlay and the import modal listen for drops. Only one
//! of them may act on a given drop, chosen from whether the modal is open.

use camino::Utf8PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Drop(Vec<Utf8PathBuf>),
    Leave,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    DragOver,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Overlay,
    ImportModal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    None,
    /// Open the import modal with these paths as its initial input.
    OpenModalWith(Vec<Utf8PathBuf>),
    /// Start a run in the already open modal.
    ProcessInModal(Vec<Utf8PathBuf>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropRouter {
    modal_open: bool,
    overlay: DragState,
    modal: DragState,
}

impl DropRouter {
    pub fn set_modal_open(&mut self, open: bool) {
        self.modal_open = open;
        self.overlay = DragState::Idle;
        self.modal = DragState::Idle;
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn active_target(&self) -> DropTarget {
        if self.modal_open {
            DropTarget::ImportModal
        } else {
            DropTarget::Overlay
        }
    }

    pub fn overlay_visible(&self) -> bool {
        !self.modal_open && self.overlay == DragState::DragOver
    }

    pub fn modal_state(&self) -> DragState {
        self.modal
    }

    /// Marks a run started while the modal is open, whatever triggered it.
    pub fn begin_processing(&mut self) {
        if self.modal_open {
            self.modal = DragState::Processing;
        }
    }

    /// Marks the modal's run as finished so it accepts drops again.
    pub fn processing_done(&mut self) {
        if self.modal == DragState::Processing {
            self.modal = DragState::Idle;
        }
    }

    pub fn handle(&mut self, ev: DragEvent) -> DropAction {
        let target = self.active_target();
        let slot = match target {
            DropTarget::Overlay => &mut self.overlay,
            DropTarget::ImportModal => &mut self.modal,
        };

        match ev {
            DragEvent::Enter | DragEvent::Over => {
                if *slot != DragState::Processing {
                    *slot = DragState::DragOver;
                }
                DropAction::None
            }
            DragEvent::Leave => {
                if *slot == DragState::DragOver {
                    *slot = DragState::Idle;
                }
                DropAction::None
            }
            DragEvent::Drop(paths) => {
                if *slot == DragState::Processing {
                    return DropAction::None;
                }
                if paths.is_empty() {
                    *slot = DragState::Idle;
                    return DropAction::None;
                }
                tracing::debug!(?target, count = paths.len(), "routing drop");
                match target {
                    DropTarget::Overlay => {
                        *slot = DragState::Idle;
                        DropAction::OpenModalWith(paths)
                    }
                    DropTarget::ImportModal => {
                        *slot = DragState::Processing;
                        DropAction::ProcessInModal(paths)
                    }
                }
            }
        }
    }
}
