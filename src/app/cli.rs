#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Play,
    Status,
    Actions,
    Call,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "play" => CliVerb::Play,
        "status" => CliVerb::Status,
        "actions" => CliVerb::Actions,
        "call" => CliVerb::Call,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  play                                 Start the interactive playground (default)"
            .to_string(),
        "  status                               Check whether the backend is reachable"
            .to_string(),
        "  actions                              List the remote actions and their fields"
            .to_string(),
        "  call <action> [field=value ...]      Run one action and print its result".to_string(),
        "  help                                 Show this help".to_string(),
        String::new(),
        "Environment:".to_string(),
        "  DATAPLAY_API_BASE_URL                Backend base URL (default http://localhost:8000)"
            .to_string(),
        "  DATAPLAY_REQUEST_TIMEOUT_SECS        Per-request timeout in seconds".to_string(),
        "  DATAPLAY_CONFIG                      Settings file (default ~/.dataplay/config.yaml)"
            .to_string(),
        "  DATAPLAY_SCRIPT_KEYS                 Run `play` headless with scripted keys".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
