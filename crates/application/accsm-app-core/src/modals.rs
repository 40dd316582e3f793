//! Delete / rename modal state.
//!
//! Lives in [`crate::domain::AppState`], so any row can request a modal while a
//! single renderer at the root reads it.

use accsm_core::filename::SetupFilename;
use accsm_core::{Car, Cars, SetupId, Track, Tracks};
use std::fmt;
use std::sync::Arc;

use crate::error::RenameError;

pub type AfterDelete = Arc<dyn Fn() + Send + Sync>;
pub type AfterRename = Arc<dyn Fn(&str) + Send + Sync>;

/// Completion callbacks supplied by whoever requested the modal.
#[derive(Clone, Default)]
pub struct ModalHooks {
    pub on_after_delete: Option<AfterDelete>,
    pub on_after_rename: Option<AfterRename>,
}

impl ModalHooks {
    pub fn after_delete(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            on_after_delete: Some(Arc::new(f)),
            on_after_rename: None,
        }
    }

    pub fn after_rename(f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            on_after_delete: None,
            on_after_rename: Some(Arc::new(f)),
        }
    }
}

impl fmt::Debug for ModalHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalHooks")
            .field("on_after_delete", &self.on_after_delete.is_some())
            .field("on_after_rename", &self.on_after_rename.is_some())
            .finish()
    }
}

/// Everything a modal needs to render without fetching.
#[derive(Clone)]
pub struct SetupModalData {
    pub setup: SetupId,
    pub car: Car,
    pub track: Track,
    pub on_after_delete: Option<AfterDelete>,
    pub on_after_rename: Option<AfterRename>,
}

impl SetupModalData {
    pub fn new(setup: SetupId, car: Car, track: Track) -> Self {
        Self {
            setup,
            car,
            track,
            on_after_delete: None,
            on_after_rename: None,
        }
    }

    pub fn with_hooks(mut self, hooks: ModalHooks) -> Self {
        self.on_after_delete = hooks.on_after_delete;
        self.on_after_rename = hooks.on_after_rename;
        self
    }

    /// Filename without extension, as shown in the modal header.
    pub fn stem(&self) -> &str {
        SetupFilename::stem(&self.setup.filename)
    }
}

impl fmt::Debug for SetupModalData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupModalData")
            .field("setup", &self.setup)
            .field("car", &self.car.id)
            .field("track", &self.track.id)
            .field("on_after_delete", &self.on_after_delete.is_some())
            .field("on_after_rename", &self.on_after_rename.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModalSlot {
    pub is_open: bool,
    pub data: Option<SetupModalData>,
    /// A confirm action is in flight.
    pub pending: bool,
}

impl ModalSlot {
    fn open(&mut self, data: SetupModalData) {
        *self = Self {
            is_open: true,
            data: Some(data),
            pending: false,
        };
    }

    fn close(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub delete_setup: ModalSlot,
    pub rename_setup: ModalSlot,
}

impl ModalState {
    pub fn open_delete_setup(&mut self, data: SetupModalData) {
        self.delete_setup.open(data);
    }

    pub fn close_delete_setup(&mut self) {
        self.delete_setup.close();
    }

    pub fn open_rename_setup(&mut self, data: SetupModalData) {
        self.rename_setup.open(data);
    }

    pub fn close_rename_setup(&mut self) {
        self.rename_setup.close();
    }
}

/// Joins short-form ids against the cached reference dictionaries.
///
/// Returns `None` (and logs) while the dictionaries are not loaded or when an id
/// is unknown; the request is simply not actionable yet.
pub fn resolve_modal_data(
    cars: Option<&Cars>,
    tracks: Option<&Tracks>,
    setup: SetupId,
) -> Option<SetupModalData> {
    let (Some(cars), Some(tracks)) = (cars, tracks) else {
        tracing::warn!("Cars or tracks data not available");
        return None;
    };

    let (Some(car), Some(track)) = (cars.get(&setup.car), tracks.get(&setup.track)) else {
        tracing::warn!(car = %setup.car, track = %setup.track, "Car or track data not found");
        return None;
    };

    Some(SetupModalData::new(setup, car.clone(), track.clone()))
}

/// New filename for a rename request, keeping the current extension.
pub fn rename_target(current_filename: &str, new_name: &str) -> Result<String, RenameError> {
    let trimmed = new_name.trim();
    if trimmed.is_empty() {
        return Err(RenameError::Empty);
    }
    if trimmed == SetupFilename::stem(current_filename) {
        return Err(RenameError::Unchanged);
    }
    Ok(format!(
        "{trimmed}.{}",
        SetupFilename::extension(current_filename)
    ))
}
