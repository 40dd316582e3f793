use accsm_core::{
    Cars, FolderStructure, ImportResult, SetupFile, SetupId, SetupImportData, Tracks,
    ValidationResult,
};
use camino::Utf8PathBuf;
use tokio::sync::broadcast;

use crate::domain::Preferences;
use crate::error::GatewayError;
use crate::notice::Notice;

/// Remote calls offered by the setups backend.
///
/// Implementations wrap whatever transport the host uses (IPC, in-process
/// handlers, a test double); none of the methods touch the client cache.
#[async_trait::async_trait]
pub trait BackendGateway: Send + Sync + 'static {
    async fn get_folder_structure(&self) -> Result<FolderStructure, GatewayError>;
    /// Forces a rescan of the setups folder.
    async fn refresh_folder_structure(&self) -> Result<FolderStructure, GatewayError>;

    async fn get_setup(&self, id: &SetupId) -> Result<SetupFile, GatewayError>;
    async fn save_setup(&self, id: &SetupId, content: &SetupFile) -> Result<(), GatewayError>;
    async fn edit_setup(&self, id: &SetupId, content: &SetupFile) -> Result<(), GatewayError>;
    async fn delete_setup(&self, id: &SetupId) -> Result<(), GatewayError>;
    async fn rename_setup(&self, id: &SetupId, new_filename: &str) -> Result<(), GatewayError>;
    async fn setup_exists(&self, id: &SetupId) -> Result<bool, GatewayError>;
    async fn validate_setup(
        &self,
        car: &str,
        content: &serde_json::Value,
    ) -> Result<bool, GatewayError>;

    async fn get_setups_path(&self) -> Result<String, GatewayError>;
    async fn set_setups_path(&self, path: &str) -> Result<(), GatewayError>;

    async fn get_cars(&self) -> Result<Cars, GatewayError>;
    async fn get_tracks(&self) -> Result<Tracks, GatewayError>;

    /// Imports files and folders (recursively) in one call, one result per discovered file.
    async fn import_json_files(
        &self,
        paths: &[Utf8PathBuf],
    ) -> Result<Vec<ImportResult>, GatewayError>;
    /// Parses and validates files and folders without importing anything.
    async fn validate_json_files(
        &self,
        paths: &[Utf8PathBuf],
    ) -> Result<Vec<ValidationResult>, GatewayError>;
    async fn import_validated_setups(
        &self,
        setups: &[SetupImportData],
    ) -> Result<Vec<ImportResult>, GatewayError>;

    /// Subscription to the `setups-changed` push event.
    fn subscribe_setups_changed(&self) -> broadcast::Receiver<FolderStructure>;
}

pub trait PreferencesRepo: Send + Sync + 'static {
    fn load(&self) -> anyhow::Result<Preferences>;
    fn save(&self, preferences: &Preferences) -> anyhow::Result<()>;
}

pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notice: Notice);
}
