use crate::client::ServiceClient;
use crate::config::{load_global_settings, ConfigError, LoadedSettings};
use crate::session::WorkflowController;
use crate::shared::ClientLog;
use std::sync::Arc;

/// Settings and log resolved once per process.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub loaded: LoadedSettings,
    pub log: ClientLog,
}

impl CommandContext {
    pub fn service_client(&self) -> ServiceClient {
        ServiceClient::from_settings(&self.loaded.settings)
    }

    pub fn probe_client(&self) -> ServiceClient {
        ServiceClient::new(
            &self.loaded.settings.api_base_url,
            self.loaded.settings.probe_timeout(),
        )
    }

    pub fn controller(&self) -> WorkflowController {
        WorkflowController::new(Arc::new(self.service_client()), self.log.clone())
    }
}

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn load_command_context() -> Result<CommandContext, String> {
    let loaded = load_global_settings().map_err(map_config_err)?;
    let log = ClientLog::new(loaded.log_path());
    Ok(CommandContext { loaded, log })
}

/// Parses `name=value` arguments; values may contain `=`.
pub fn parse_field_args(args: &[String]) -> Result<Vec<(String, String)>, String> {
    args.iter()
        .map(|arg| {
            let (name, value) = arg
                .split_once('=')
                .ok_or_else(|| format!("expected `name=value`, got `{arg}`"))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(format!("missing field name in `{arg}`"));
            }
            Ok((name.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_field_args;

    #[test]
    fn field_args_split_on_first_equals() {
        let parsed = parse_field_args(&[
            "instruction=set price = 0".to_string(),
            "filename=sales.csv".to_string(),
        ])
        .expect("parse");
        assert_eq!(
            parsed,
            vec![
                ("instruction".to_string(), "set price = 0".to_string()),
                ("filename".to_string(), "sales.csv".to_string()),
            ]
        );
    }

    #[test]
    fn field_args_require_a_name() {
        assert!(parse_field_args(&["=3".to_string()]).is_err());
        assert!(parse_field_args(&["n_keep".to_string()]).is_err());
    }
}
