#![allow(dead_code)]

use accsm_app_core::domain::Preferences;
use accsm_app_core::error::GatewayError;
use accsm_app_core::ports::{BackendGateway, PreferencesRepo};
use accsm_core::{
    Car, CarFolder, Cars, FolderStructure, ImportResult, SetupFile, SetupId, SetupImportData,
    SetupInfo, Track, TrackFolder, Tracks, ValidationResult,
};
use camino::Utf8PathBuf;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

#[derive(Default)]
struct FakeState {
    structure: Option<FolderStructure>,
    setups: HashMap<SetupId, SetupFile>,
    cars: Cars,
    tracks: Tracks,
    path: String,
    validation: Vec<ValidationResult>,
    imported: Vec<SetupImportData>,
    calls: Vec<&'static str>,
    failing: HashSet<&'static str>,
    rejects_setups: bool,
}

/// In-memory backend recording every call.
#[derive(Clone)]
pub struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
    events: broadcast::Sender<FolderStructure>,
}

impl FakeGateway {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        let gateway = Self {
            state: Arc::new(Mutex::new(FakeState::default())),
            events,
        };
        {
            let mut s = gateway.state.lock().unwrap();
            s.cars = cars();
            s.tracks = tracks();
            s.path = "/setups".into();
            s.structure = Some(structure(&[("bmw_m4_gt3", "monza", &["race.json"])]));
        }
        gateway
    }

    pub fn set_structure(&self, structure: FolderStructure) {
        self.state.lock().unwrap().structure = Some(structure);
    }

    pub fn set_validation(&self, results: Vec<ValidationResult>) {
        self.state.lock().unwrap().validation = results;
    }

    pub fn put_setup(&self, id: SetupId, file: SetupFile) {
        self.state.lock().unwrap().setups.insert(id, file);
    }

    pub fn setup(&self, id: &SetupId) -> Option<SetupFile> {
        self.state.lock().unwrap().setups.get(id).cloned()
    }

    pub fn path(&self) -> String {
        self.state.lock().unwrap().path.clone()
    }

    /// `validate_setup` answers `false` from now on.
    pub fn reject_setups(&self) {
        self.state.lock().unwrap().rejects_setups = true;
    }

    pub fn fail(&self, call: &'static str) {
        self.state.lock().unwrap().failing.insert(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn imported(&self) -> Vec<SetupImportData> {
        self.state.lock().unwrap().imported.clone()
    }

    pub fn push_setups_changed(&self, structure: FolderStructure) {
        self.events.send(structure).unwrap();
    }

    fn record(&self, call: &'static str) -> Result<(), GatewayError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(call);
        if s.failing.contains(call) {
            return Err(GatewayError::Backend(format!("{call} exploded")));
        }
        Ok(())
    }

    fn current_structure(&self) -> Result<FolderStructure, GatewayError> {
        self.state
            .lock()
            .unwrap()
            .structure
            .clone()
            .ok_or_else(|| GatewayError::Unavailable("no folder".into()))
    }
}

#[async_trait::async_trait]
impl BackendGateway for FakeGateway {
    async fn get_folder_structure(&self) -> Result<FolderStructure, GatewayError> {
        self.record("get_folder_structure")?;
        self.current_structure()
    }

    async fn refresh_folder_structure(&self) -> Result<FolderStructure, GatewayError> {
        self.record("refresh_folder_structure")?;
        self.current_structure()
    }

    async fn get_setup(&self, id: &SetupId) -> Result<SetupFile, GatewayError> {
        self.record("get_setup")?;
        self.state
            .lock()
            .unwrap()
            .setups
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::Backend(format!("Setup not found: {id}")))
    }

    async fn save_setup(&self, id: &SetupId, content: &SetupFile) -> Result<(), GatewayError> {
        self.record("save_setup")?;
        self.put_setup(id.clone(), content.clone());
        Ok(())
    }

    async fn edit_setup(&self, id: &SetupId, content: &SetupFile) -> Result<(), GatewayError> {
        self.record("edit_setup")?;
        self.put_setup(id.clone(), content.clone());
        Ok(())
    }

    async fn delete_setup(&self, id: &SetupId) -> Result<(), GatewayError> {
        self.record("delete_setup")?;
        self.state.lock().unwrap().setups.remove(id);
        Ok(())
    }

    async fn rename_setup(&self, id: &SetupId, new_filename: &str) -> Result<(), GatewayError> {
        self.record("rename_setup")?;
        let mut s = self.state.lock().unwrap();
        if let Some(file) = s.setups.remove(id) {
            s.setups.insert(id.with_filename(new_filename), file);
        }
        Ok(())
    }

    async fn setup_exists(&self, id: &SetupId) -> Result<bool, GatewayError> {
        self.record("setup_exists")?;
        Ok(self.state.lock().unwrap().setups.contains_key(id))
    }

    async fn validate_setup(
        &self,
        _car: &str,
        _content: &serde_json::Value,
    ) -> Result<bool, GatewayError> {
        self.record("validate_setup")?;
        Ok(!self.state.lock().unwrap().rejects_setups)
    }

    async fn get_setups_path(&self) -> Result<String, GatewayError> {
        self.record("get_setups_path")?;
        Ok(self.state.lock().unwrap().path.clone())
    }

    async fn set_setups_path(&self, path: &str) -> Result<(), GatewayError> {
        self.record("set_setups_path")?;
        self.state.lock().unwrap().path = path.to_string();
        Ok(())
    }

    async fn get_cars(&self) -> Result<Cars, GatewayError> {
        self.record("get_cars")?;
        Ok(self.state.lock().unwrap().cars.clone())
    }

    async fn get_tracks(&self) -> Result<Tracks, GatewayError> {
        self.record("get_tracks")?;
        Ok(self.state.lock().unwrap().tracks.clone())
    }

    async fn import_json_files(
        &self,
        paths: &[Utf8PathBuf],
    ) -> Result<Vec<ImportResult>, GatewayError> {
        self.record("import_json_files")?;
        Ok(paths
            .iter()
            .map(|p| ImportResult {
                path: p.to_string(),
                success: p.as_str().ends_with(".json"),
                error: None,
                car: Some("bmw_m4_gt3".into()),
                track: Some("monza".into()),
                filename: p.file_name().map(str::to_string),
            })
            .collect())
    }

    async fn validate_json_files(
        &self,
        _paths: &[Utf8PathBuf],
    ) -> Result<Vec<ValidationResult>, GatewayError> {
        self.record("validate_json_files")?;
        Ok(self.state.lock().unwrap().validation.clone())
    }

    async fn import_validated_setups(
        &self,
        setups: &[SetupImportData],
    ) -> Result<Vec<ImportResult>, GatewayError> {
        self.record("import_validated_setups")?;
        let mut s = self.state.lock().unwrap();
        s.imported.extend_from_slice(setups);
        Ok(setups
            .iter()
            .map(|d| ImportResult {
                path: d.filename.clone(),
                success: true,
                error: None,
                car: Some(d.car.clone()),
                track: Some(d.track.clone()),
                filename: Some(d.filename.clone()),
            })
            .collect())
    }

    fn subscribe_setups_changed(&self) -> broadcast::Receiver<FolderStructure> {
        self.events.subscribe()
    }
}

#[derive(Clone, Default)]
pub struct MemoryPreferences {
    inner: Arc<Mutex<Preferences>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryPreferences {
    pub fn with(prefs: Preferences) -> Self {
        Self {
            inner: Arc::new(Mutex::new(prefs)),
            saves: Arc::default(),
        }
    }

    pub fn current(&self) -> Preferences {
        self.inner.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl PreferencesRepo for MemoryPreferences {
    fn load(&self) -> anyhow::Result<Preferences> {
        Ok(self.current())
    }

    fn save(&self, preferences: &Preferences) -> anyhow::Result<()> {
        *self.inner.lock().unwrap() = preferences.clone();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

pub fn cars() -> Cars {
    let car = |id: &str, name: &str, brand: &str| {
        (
            id.to_string(),
            Car {
                id: id.into(),
                pretty_name: name.into(),
                full_name: format!("{brand} {name}"),
                brand_name: brand.into(),
                brand_country: String::new(),
                year: Some(2023),
                category: "GT3".into(),
            },
        )
    };
    [
        car("bmw_m4_gt3", "M4 GT3", "BMW"),
        car("porsche_992_gt3_r", "992 GT3 R", "Porsche"),
    ]
    .into_iter()
    .collect()
}

pub fn tracks() -> Tracks {
    let track = |id: &str, name: &str, country: &str| {
        (
            id.to_string(),
            Track {
                id: id.into(),
                pretty_name: name.into(),
                full_name: name.into(),
                country: country.into(),
            },
        )
    };
    [
        track("monza", "Monza", "Italy"),
        track("Spa", "Spa-Francorchamps", "Belgium"),
    ]
    .into_iter()
    .collect()
}

pub fn structure(entries: &[(&str, &str, &[&str])]) -> FolderStructure {
    let mut cars: Vec<CarFolder> = Vec::new();
    let mut total = 0;
    for (car, track, files) in entries {
        total += files.len();
        let folder = TrackFolder {
            track_id: track.to_string(),
            track_name: track.to_string(),
            setups: files
                .iter()
                .map(|f| SetupInfo {
                    filename: f.to_string(),
                    display_name: f.trim_end_matches(".json").to_string(),
                    last_modified: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
                    tags: vec![],
                    setup_type: String::new(),
                })
                .collect(),
        };
        match cars.iter_mut().find(|c| c.car_id == *car) {
            Some(existing) => existing.tracks.push(folder),
            None => cars.push(CarFolder {
                car_id: car.to_string(),
                car_name: car.to_string(),
                tracks: vec![folder],
            }),
        }
    }
    FolderStructure {
        cars,
        total_setups: total,
        last_scan: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    }
}

pub fn setup_file(car: &str) -> SetupFile {
    serde_json::from_value(serde_json::json!({
        "carName": car,
        "basicSetup": {},
        "advancedSetup": {},
        "trackBopType": 1
    }))
    .unwrap()
}

pub fn valid(path: &str, car: &str) -> ValidationResult {
    ValidationResult {
        path: path.into(),
        success: true,
        error: None,
        json_content: Some(serde_json::json!({ "carName": car })),
        car: Some(car.into()),
        filename: path.rsplit('/').next().map(str::to_string),
    }
}

pub fn invalid(path: &str, error: &str) -> ValidationResult {
    ValidationResult {
        path: path.into(),
        success: false,
        error: Some(error.into()),
        json_content: None,
        car: None,
        filename: None,
    }
}
