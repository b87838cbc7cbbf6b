use crate::app::command_support::load_command_context;
use crate::client::probe::probe_and_log;

/// Probes the backend once. Fails when the backend is not reachable so
/// scripts can branch on the exit status.
pub fn cmd_status() -> Result<String, String> {
    let context = load_command_context()?;
    let client = context.probe_client();
    let status = probe_and_log(&client, &context.log);
    let lines = [
        format!("backend={}", client.api_base()),
        format!("config={}", context.loaded.config_path.display()),
        format!("status={}", status.display_line()),
    ]
    .join("\n");
    if status.is_reachable() {
        Ok(lines)
    } else {
        Err(lines)
    }
}
