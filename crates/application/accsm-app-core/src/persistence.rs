use crate::domain::Preferences;
use crate::ports::PreferencesRepo;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Preferences stored as pretty JSON in the platform config directory.
pub struct FilePreferences {
    path: Option<PathBuf>,
}

impl Default for FilePreferences {
    fn default() -> Self {
        Self::new()
    }
}

impl FilePreferences {
    pub fn new() -> Self {
        Self { path: None }
    }

    /// Uses an explicit file instead of the platform location.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn config_dir(&self) -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from(
            accsm_config::PROJECT_QUALIFIER,
            accsm_config::PROJECT_ORG,
            accsm_config::PROJECT_APP,
        )
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }
        Ok(config_dir.to_path_buf())
    }

    fn store_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(self.config_dir()?.join(accsm_config::PREFERENCES_FILE_NAME)),
        }
    }
}

impl PreferencesRepo for FilePreferences {
    fn load(&self) -> Result<Preferences> {
        let path = self.store_path()?;
        if !path.exists() {
            return Ok(Preferences::default());
        }
        let content = fs::read_to_string(&path).context("Failed to read preferences")?;
        match serde_json::from_str(&content) {
            Ok(prefs) => Ok(prefs),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring corrupt preferences file: {e}");
                Ok(Preferences::default())
            }
        }
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        let path = self.store_path()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(preferences)?;
        atomic_write(&path, json.as_bytes()).context("Failed to write preferences")?;
        Ok(())
    }
}

fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    };

    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp file {}", tmp_path.display()))?;

    file.write_all(contents)
        .with_context(|| format!("Failed to write temp file {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {}", tmp_path.display()))?;
    drop(file);

    match fs::rename(&tmp_path, path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            fs::remove_file(path).ok();
            fs::rename(&tmp_path, path).with_context(|| {
                format!("Failed to replace destination file {}", path.display())
            })?;
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to rename temp file {} to {}",
                    tmp_path.display(),
                    path.display()
                )
            });
        }
    }

    Ok(())
}
