use accsm_core::{
    Cars, FolderStructure, ImportResult, SetupFile, SetupId, SetupImportData, Tracks,
    ValidationResult,
};
use camino::Utf8PathBuf;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::{Cached, EntryState, QueryCache, QueryKey};
use crate::error::GatewayError;
use crate::notice::Notice;
use crate::ports::{BackendGateway, Notifier};

/// Backend access through the query cache.
///
/// Reads serve fresh cache entries and fetch otherwise. Mutations apply their
/// cache effects before returning, so a read issued after a successful mutation
/// sees the change.
pub struct SetupClient<G> {
    gateway: Arc<G>,
    cache: Arc<Mutex<QueryCache>>,
    notifier: Arc<dyn Notifier>,
}

impl<G> Clone for SetupClient<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            cache: self.cache.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<G: BackendGateway> SetupClient<G> {
    pub fn new(gateway: Arc<G>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            cache: Arc::new(Mutex::new(QueryCache::new())),
            notifier,
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    fn cache(&self) -> MutexGuard<'_, QueryCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn entry_state(&self, key: &QueryKey) -> EntryState {
        self.cache().state(key)
    }

    /// Cached data regardless of freshness; never hits the backend.
    pub fn peek<T: Cached>(&self, key: &QueryKey) -> Option<T> {
        self.cache().peek(key)
    }

    pub fn cached_cars(&self) -> Option<Cars> {
        self.peek(&QueryKey::cars())
    }

    pub fn cached_tracks(&self) -> Option<Tracks> {
        self.peek(&QueryKey::tracks())
    }

    pub fn cached_folder_structure(&self) -> Option<FolderStructure> {
        self.peek(&QueryKey::folder_structure())
    }

    async fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, GatewayError>
    where
        T: Cached + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let cached = self.cache().fresh::<T>(&key);
        if let Some(hit) = cached {
            tracing::debug!(?key, "query cache hit");
            return Ok(hit);
        }

        tracing::debug!(?key, "query cache miss, fetching");
        match fetch().await {
            Ok(data) => {
                self.cache().set(key, data.clone());
                Ok(data)
            }
            Err(e) => {
                tracing::error!(?key, "query failed: {e}");
                Err(e)
            }
        }
    }

    fn settle<T>(
        &self,
        res: Result<T, GatewayError>,
        silent: bool,
        success: &str,
        failure: &str,
    ) -> Result<T, GatewayError> {
        match &res {
            Ok(_) => {
                if !silent {
                    self.notifier.notify(Notice::success(success));
                }
            }
            Err(e) => {
                tracing::error!("{failure}: {e}");
                if !silent {
                    self.notifier.notify(Notice::error(format!("{failure}: {e}")));
                }
            }
        }
        res
    }

    // --- Queries ---

    pub async fn folder_structure(&self) -> Result<FolderStructure, GatewayError> {
        self.query(QueryKey::folder_structure(), || {
            self.gateway.get_folder_structure()
        })
        .await
    }

    pub async fn setup(&self, id: &SetupId) -> Result<SetupFile, GatewayError> {
        self.query(QueryKey::setup(id), || self.gateway.get_setup(id))
            .await
    }

    pub async fn cars(&self) -> Result<Cars, GatewayError> {
        self.query(QueryKey::cars(), || self.gateway.get_cars()).await
    }

    pub async fn tracks(&self) -> Result<Tracks, GatewayError> {
        self.query(QueryKey::tracks(), || self.gateway.get_tracks())
            .await
    }

    pub async fn setups_path(&self) -> Result<String, GatewayError> {
        self.query(QueryKey::setups_path(), || self.gateway.get_setups_path())
            .await
    }

    pub async fn setup_exists(&self, id: &SetupId) -> Result<bool, GatewayError> {
        self.gateway.setup_exists(id).await
    }

    pub async fn validate_setup(
        &self,
        car: &str,
        content: &serde_json::Value,
    ) -> Result<bool, GatewayError> {
        let res = self.gateway.validate_setup(car, content).await;
        if let Err(e) = &res {
            self.notifier
                .notify(Notice::error(format!("Validation failed: {e}")));
        }
        res
    }

    // --- Mutations ---

    pub async fn refresh_folder_structure(
        &self,
        silent: bool,
    ) -> Result<FolderStructure, GatewayError> {
        let res = self.gateway.refresh_folder_structure().await;
        if let Ok(structure) = &res {
            self.cache()
                .set(QueryKey::folder_structure(), structure.clone());
        }
        self.settle(res, silent, "Folder structure refreshed", "Failed to refresh")
    }

    pub async fn save_setup(
        &self,
        id: &SetupId,
        content: &SetupFile,
        silent: bool,
    ) -> Result<(), GatewayError> {
        let res = self.gateway.save_setup(id, content).await;
        if res.is_ok() {
            let mut cache = self.cache();
            cache.invalidate(&QueryKey::setup(id));
            cache.invalidate(&QueryKey::folder_structure());
        }
        self.settle(res, silent, "Setup saved successfully", "Failed to save setup")
    }

    pub async fn edit_setup(
        &self,
        id: &SetupId,
        content: &SetupFile,
        silent: bool,
    ) -> Result<(), GatewayError> {
        let res = self.gateway.edit_setup(id, content).await;
        if res.is_ok() {
            let mut cache = self.cache();
            cache.invalidate(&QueryKey::setup(id));
            cache.invalidate(&QueryKey::folder_structure());
        }
        self.settle(
            res,
            silent,
            "Setup updated successfully",
            "Failed to update setup",
        )
    }

    pub async fn delete_setup(&self, id: &SetupId, silent: bool) -> Result<(), GatewayError> {
        let res = self.gateway.delete_setup(id).await;
        if res.is_ok() {
            let mut cache = self.cache();
            cache.remove(&QueryKey::setup(id));
            cache.invalidate(&QueryKey::folder_structure());
        }
        self.settle(
            res,
            silent,
            "Setup deleted successfully",
            "Failed to delete setup",
        )
    }

    /// Renames a setup in place. The old entry is dropped; the new name is
    /// populated by the next read.
    pub async fn rename_setup(
        &self,
        id: &SetupId,
        new_filename: &str,
        silent: bool,
    ) -> Result<(), GatewayError> {
        let res = self.gateway.rename_setup(id, new_filename).await;
        if res.is_ok() {
            let mut cache = self.cache();
            cache.remove(&QueryKey::setup(id));
            cache.invalidate(&QueryKey::folder_structure());
        }
        self.settle(
            res,
            silent,
            "Setup renamed successfully",
            "Failed to rename setup",
        )
    }

    pub async fn set_setups_path(&self, path: &str, silent: bool) -> Result<(), GatewayError> {
        let res = self.gateway.set_setups_path(path).await;
        if res.is_ok() {
            let mut cache = self.cache();
            cache.set(QueryKey::setups_path(), path.to_string());
            cache.invalidate(&QueryKey::folder_structure());
        }
        self.settle(res, silent, "Setups path updated", "Failed to update path")
    }

    pub async fn import_json_files(
        &self,
        paths: &[Utf8PathBuf],
    ) -> Result<Vec<ImportResult>, GatewayError> {
        let res = self.gateway.import_json_files(paths).await;
        if let Ok(results) = &res {
            if results.iter().any(|r| r.success) {
                self.cache().invalidate(&QueryKey::folder_structure());
            }
        }
        res
    }

    pub async fn validate_json_files(
        &self,
        paths: &[Utf8PathBuf],
    ) -> Result<Vec<ValidationResult>, GatewayError> {
        self.gateway.validate_json_files(paths).await
    }

    pub async fn import_validated_setups(
        &self,
        setups: &[SetupImportData],
    ) -> Result<Vec<ImportResult>, GatewayError> {
        let res = self.gateway.import_validated_setups(setups).await;
        if res.is_ok() {
            self.cache().invalidate(&QueryKey::folder_structure());
        }
        res
    }

    // --- Push events ---

    /// Applies a `setups-changed` payload: the snapshot replaces the cached one
    /// without a refetch.
    pub fn apply_setups_changed(&self, structure: FolderStructure) {
        let description = format!(
            "Found {} setups across {} cars",
            structure.total_setups,
            structure.cars.len()
        );
        self.cache().set(QueryKey::folder_structure(), structure);
        self.notifier
            .notify(Notice::info("Setups folder updated").with_description(description));
    }
}
