use crate::app::command_support::load_command_context;
use crate::client::probe::{probe_and_log, spawn_probe};
use crate::session::Stage;
use crate::tui::keys::{parse_scripted_keys, ENV_SCRIPT_KEYS};
use crate::tui::{run_playground_tui, run_scripted_session};

pub fn cmd_play() -> Result<String, String> {
    let context = load_command_context()?;
    let mut controller = context.controller();

    if let Ok(raw) = std::env::var(ENV_SCRIPT_KEYS) {
        let keys = parse_scripted_keys(&raw)?;
        let probe = probe_and_log(&context.probe_client(), &context.log);
        return Ok(run_scripted_session(&mut controller, &keys, probe));
    }

    let probe_rx = spawn_probe(context.probe_client(), context.log.clone());
    let stage = run_playground_tui(&mut controller, probe_rx)?;
    Ok(match stage {
        Stage::Terminated => "Thank you for playing!".to_string(),
        Stage::DeclinedEntry => "Maybe next time.".to_string(),
        other => format!("playground closed at stage={other}"),
    })
}
