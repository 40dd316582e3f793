//! Review step between validation and the bulk import.

use accsm_core::classify::{has_qualy_and_race, simplified_names, SetupKind};
use accsm_core::filename::SetupFilename;
use accsm_core::{
    find_common_track, Cars, FolderStructure, SetupId, SetupImportData, TrackId,
    ValidationResult,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameEdit {
    pub index: usize,
    pub draft: String,
}

/// One user action on a review. Carried through the store as an event payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewEdit {
    SelectTrack(Option<TrackId>),
    BeginEdit(usize),
    SetDraft(String),
    CommitEdit,
    CancelEdit,
    QuickRename {
        index: usize,
        kind: SetupKind,
        prefix: Option<String>,
    },
    SimplifyAll {
        prefix: Option<String>,
    },
    SetApplyLfm(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReview {
    accepted: Vec<ValidationResult>,
    rejected: Vec<ValidationResult>,
    selected_track: Option<TrackId>,
    custom_filenames: BTreeMap<usize, String>,
    editing: Option<FilenameEdit>,
    apply_lfm: bool,
    pending: bool,
}

impl ValidationReview {
    /// Splits results and preselects the track every accepted filename points to.
    pub fn new(results: Vec<ValidationResult>, apply_lfm: bool) -> Self {
        let (accepted, rejected): (Vec<_>, Vec<_>) =
            results.into_iter().partition(|r| r.success);

        let original_names: Vec<&str> = accepted
            .iter()
            .map(|r| r.filename.as_deref().unwrap_or_default())
            .collect();
        let selected_track = if accepted.is_empty() {
            None
        } else {
            find_common_track(&original_names).map(str::to_string)
        };

        Self {
            accepted,
            rejected,
            selected_track,
            custom_filenames: BTreeMap::new(),
            editing: None,
            apply_lfm,
            pending: false,
        }
    }

    pub fn accepted(&self) -> &[ValidationResult] {
        &self.accepted
    }

    pub fn rejected(&self) -> &[ValidationResult] {
        &self.rejected
    }

    /// Nothing was found at all (e.g. an empty folder).
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.rejected.is_empty()
    }

    pub fn selected_track(&self) -> Option<&str> {
        self.selected_track.as_deref()
    }

    pub fn apply_lfm(&self) -> bool {
        self.apply_lfm
    }

    pub fn editing(&self) -> Option<&FilenameEdit> {
        self.editing.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn custom_filename(&self, index: usize) -> Option<&str> {
        self.custom_filenames.get(&index).map(String::as_str)
    }

    /// Custom name when one is set, otherwise the original filename.
    pub fn effective_filename(&self, index: usize) -> &str {
        if let Some(custom) = self.custom_filenames.get(&index) {
            return custom;
        }
        self.accepted
            .get(index)
            .and_then(|r| r.filename.as_deref())
            .unwrap_or_default()
    }

    fn original_filenames(&self) -> Vec<&str> {
        self.accepted
            .iter()
            .map(|r| r.filename.as_deref().unwrap_or_default())
            .collect()
    }

    pub fn apply(&mut self, edit: ReviewEdit) {
        match edit {
            ReviewEdit::SelectTrack(track) => self.selected_track = track,
            ReviewEdit::BeginEdit(index) => self.begin_edit(index),
            ReviewEdit::SetDraft(text) => self.set_draft(text),
            ReviewEdit::CommitEdit => self.commit_edit(),
            ReviewEdit::CancelEdit => self.editing = None,
            ReviewEdit::QuickRename {
                index,
                kind,
                prefix,
            } => self.quick_rename(index, kind, prefix.as_deref()),
            ReviewEdit::SimplifyAll { prefix } => self.simplify_all(prefix.as_deref()),
            ReviewEdit::SetApplyLfm(on) => self.apply_lfm = on,
        }
    }

    pub fn begin_edit(&mut self, index: usize) {
        if index >= self.accepted.len() {
            return;
        }
        let draft = SetupFilename::strip_json(self.effective_filename(index)).to_string();
        self.editing = Some(FilenameEdit { index, draft });
    }

    pub fn set_draft(&mut self, text: String) {
        if let Some(edit) = self.editing.as_mut() {
            edit.draft = text;
        }
    }

    /// Keeps the previous name when the draft is blank.
    pub fn commit_edit(&mut self) {
        let Some(edit) = self.editing.take() else {
            return;
        };
        if edit.draft.trim().is_empty() {
            return;
        }
        self.custom_filenames
            .insert(edit.index, SetupFilename::ensure_json(&edit.draft));
    }

    pub fn quick_rename(&mut self, index: usize, kind: SetupKind, prefix: Option<&str>) {
        if index >= self.accepted.len() {
            return;
        }
        self.custom_filenames
            .insert(index, kind.simplified_filename(prefix));
    }

    /// Offered only for a mixed batch of qualifying and race setups.
    pub fn can_simplify(&self) -> bool {
        self.accepted.len() >= 2 && has_qualy_and_race(&self.original_filenames())
    }

    /// Names the batch would get from [`Self::simplify_all`], by index.
    pub fn simplify_preview(&self, prefix: Option<&str>) -> Vec<String> {
        let simplified = simplified_names(&self.original_filenames(), prefix);
        (0..self.accepted.len())
            .map(|ix| {
                simplified
                    .get(&ix)
                    .cloned()
                    .unwrap_or_else(|| self.effective_filename(ix).to_string())
            })
            .collect()
    }

    pub fn simplify_all(&mut self, prefix: Option<&str>) {
        let simplified = simplified_names(&self.original_filenames(), prefix);
        self.custom_filenames.extend(simplified);
    }

    /// Indices whose effective filename collides with another accepted item.
    pub fn duplicate_indices(&self) -> BTreeSet<usize> {
        let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
        for ix in 0..self.accepted.len() {
            by_name.entry(self.effective_filename(ix)).or_default().push(ix);
        }
        by_name
            .into_values()
            .filter(|ixs| ixs.len() > 1)
            .flatten()
            .collect()
    }

    pub fn has_duplicate_filenames(&self) -> bool {
        !self.duplicate_indices().is_empty()
    }

    /// Indices that would overwrite a setup already present for the selected track.
    pub fn existing_conflicts(&self, folder: Option<&FolderStructure>) -> BTreeSet<usize> {
        let (Some(folder), Some(track)) = (folder, self.selected_track.as_deref()) else {
            return BTreeSet::new();
        };
        (0..self.accepted.len())
            .filter(|&ix| {
                let car = self.accepted[ix].car.as_deref().unwrap_or_default();
                folder.contains_setup(&SetupId::new(car, track, self.effective_filename(ix)))
            })
            .collect()
    }

    /// One message per unrecognised car; empty while the dictionary is not loaded.
    pub fn car_errors(&self, cars: Option<&Cars>) -> Vec<String> {
        let Some(cars) = cars else {
            return Vec::new();
        };
        let errors: BTreeSet<String> = self
            .accepted
            .iter()
            .filter(|r| r.car.as_ref().is_none_or(|c| !cars.contains_key(c)))
            .map(|r| {
                format!(
                    "Car \"{}\" is not recognized.",
                    r.car.as_deref().unwrap_or("Unknown")
                )
            })
            .collect();
        errors.into_iter().collect()
    }

    pub fn can_import(&self, cars: Option<&Cars>, folder: Option<&FolderStructure>) -> bool {
        self.selected_track.is_some()
            && !self.accepted.is_empty()
            && !self.pending
            && !self.has_duplicate_filenames()
            && self.car_errors(cars).is_empty()
            && self.existing_conflicts(folder).is_empty()
    }

    /// The batch to send, one entry per accepted item, all on the selected track.
    pub fn submission(&self) -> Option<Vec<SetupImportData>> {
        let track = self.selected_track.as_ref()?;
        if self.accepted.is_empty() {
            return None;
        }
        Some(
            self.accepted
                .iter()
                .enumerate()
                .map(|(ix, r)| SetupImportData {
                    json_content: r.json_content.clone().unwrap_or_default(),
                    car: r.car.clone().unwrap_or_default(),
                    track: track.clone(),
                    filename: self.effective_filename(ix).to_string(),
                    apply_lfm: self.apply_lfm,
                })
                .collect(),
        )
    }
}
