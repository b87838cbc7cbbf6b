mod error;
mod load;
mod paths;
mod settings;

pub use error::ConfigError;
pub use load::{load_global_settings, load_settings_from, LoadedSettings};
pub use paths::{
    default_global_config_path, default_state_root, CLIENT_LOG_RELATIVE_PATH,
    GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR,
};
pub use settings::{
    ClientSettings, DEFAULT_API_BASE_URL, DEFAULT_PROBE_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, ENV_API_BASE_URL, ENV_CONFIG_PATH, ENV_REQUEST_TIMEOUT_SECS,
};
