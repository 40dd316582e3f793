use accsm_core::{Car, CarId, Cars, FolderStructure, SetupId, TrackId, Tracks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerSummaryVm {
    pub setups: usize,
    pub cars: usize,
    pub tracks: usize,
    pub label: String,
}

pub fn explorer_summary(structure: &FolderStructure) -> ExplorerSummaryVm {
    let setups = structure.total_setups;
    let cars = structure.cars.len();
    let tracks = structure.unique_track_ids().len();
    ExplorerSummaryVm {
        setups,
        cars,
        tracks,
        label: format!("{setups} setups across {cars} cars and {tracks} tracks"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRowVm {
    pub id: TrackId,
    pub name: String,
    pub country: Option<String>,
    pub setup_count: usize,
    pub car_count: usize,
    pub selected: bool,
}

fn matches_query(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(query)
}

/// Tracks present in the folder, first-seen order, filtered by `query`.
pub fn track_list_vm(
    structure: &FolderStructure,
    tracks: Option<&Tracks>,
    query: &str,
    selected: Option<&str>,
) -> Vec<TrackRowVm> {
    let query = query.trim().to_lowercase();
    structure
        .unique_track_ids()
        .into_iter()
        .filter_map(|id| {
            let info = tracks.and_then(|t| t.get(id));
            if !query.is_empty() {
                let haystack = match info {
                    Some(t) => format!("{} {} {}", t.pretty_name, t.full_name, t.country),
                    None => id.to_string(),
                };
                if !matches_query(&haystack, &query) {
                    return None;
                }
            }
            Some(TrackRowVm {
                id: id.to_string(),
                name: info.map_or_else(|| id.to_string(), |t| t.pretty_name.clone()),
                country: info.map(|t| t.country.clone()).filter(|c| !c.is_empty()),
                setup_count: structure.setup_count_for_track(id),
                car_count: structure.car_count_for_track(id),
                selected: selected == Some(id),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarRowVm {
    pub id: CarId,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub year: Option<u16>,
}

impl From<&Car> for CarRowVm {
    fn from(c: &Car) -> Self {
        Self {
            id: c.id.clone(),
            name: c.pretty_name.clone(),
            brand: c.brand_name.clone(),
            category: c.category.clone(),
            year: c.year,
        }
    }
}

/// Cars sorted by display name, filtered by category (case-insensitive) and search.
pub fn car_list_vm(cars: &Cars, category: Option<&str>, query: &str) -> Vec<CarRowVm> {
    let query = query.trim().to_lowercase();
    let mut rows: Vec<CarRowVm> = cars
        .values()
        .filter(|c| category.is_none_or(|cat| c.category.eq_ignore_ascii_case(cat)))
        .filter(|c| {
            query.is_empty()
                || matches_query(
                    &format!("{} {} {}", c.pretty_name, c.full_name, c.brand_name),
                    &query,
                )
        })
        .map(CarRowVm::from)
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    rows
}

pub fn is_setup_selected(selected: Option<&SetupId>, id: &SetupId) -> bool {
    selected == Some(id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupRowVm {
    pub id: SetupId,
    pub name: String,
    pub setup_type: String,
    pub tags: Vec<String>,
    pub selected: bool,
}

/// Setups stored for one car and track, newest first.
pub fn setup_list_vm(
    structure: &FolderStructure,
    car: &str,
    track: &str,
    selected: Option<&SetupId>,
) -> Vec<SetupRowVm> {
    let Some(folder) = structure.track_folder(car, track) else {
        return Vec::new();
    };
    let mut setups: Vec<_> = folder.setups.iter().collect();
    setups.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    setups
        .into_iter()
        .map(|info| {
            let id = SetupId::new(car, track, info.filename.as_str());
            SetupRowVm {
                selected: is_setup_selected(selected, &id),
                id,
                name: info.display_name.clone(),
                setup_type: info.setup_type.clone(),
                tags: info.tags.clone(),
            }
        })
        .collect()
}
