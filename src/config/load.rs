use super::{
    default_global_config_path, default_state_root, ClientSettings, ConfigError, ENV_CONFIG_PATH,
};
use std::path::{Path, PathBuf};

/// Settings plus the paths they were resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSettings {
    pub settings: ClientSettings,
    pub state_root: PathBuf,
    pub config_path: PathBuf,
    pub config_exists: bool,
}

impl LoadedSettings {
    pub fn log_path(&self) -> PathBuf {
        self.settings.resolve_log_path(&self.state_root)
    }
}

pub fn load_global_settings() -> Result<LoadedSettings, ConfigError> {
    let state_root = default_state_root()?;
    let config_path = match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
        _ => default_global_config_path()?,
    };
    load_settings_from(&state_root, &config_path, |key| std::env::var(key).ok())
}

pub fn load_settings_from<F>(
    state_root: &Path,
    config_path: &Path,
    lookup: F,
) -> Result<LoadedSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config_exists = config_path.is_file();
    let mut settings = if config_exists {
        ClientSettings::from_path(config_path)?
    } else {
        ClientSettings::default()
    };
    settings.apply_env_overrides(lookup)?;
    settings.normalize();
    settings.validate()?;
    Ok(LoadedSettings {
        settings,
        state_root: state_root.to_path_buf(),
        config_path: config_path.to_path_buf(),
        config_exists,
    })
}
