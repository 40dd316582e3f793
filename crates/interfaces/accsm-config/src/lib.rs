//! Central configuration constants for cache windows, channels and local storage.

use std::time::Duration;

/// How long a fetched folder structure is served without refetching.
pub const FOLDER_STRUCTURE_STALE_SECS: u64 = 30;

/// Capacity of the kernel's domain event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Telemetry lap count the LFM league rules require. The backend applies it on
/// import; new setups start with it.
pub const LFM_TELEMETRY_LAPS: u32 = 99;

/// Name of the local key-value file holding client preferences.
pub const PREFERENCES_FILE_NAME: &str = "store.json";

/// `directories::ProjectDirs` triple for the client's config directory.
pub const PROJECT_QUALIFIER: &str = "com";
pub const PROJECT_ORG: &str = "accsm";
pub const PROJECT_APP: &str = "setup-manager";

/// Convenience accessor for the folder structure freshness window.
pub fn folder_structure_stale_time() -> Duration {
    Duration::from_secs(FOLDER_STRUCTURE_STALE_SECS)
}
