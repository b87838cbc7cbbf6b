use crate::client::probe::ProbeStatus;
use crate::session::{Stage, WorkflowController};
use crate::tui::keys::ui_command_from_key;
use crate::tui::view::{draw_stage, project_stage_view, resolve_command, UiOutcome, UiState};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

const UI_POLL_INTERVAL: Duration = Duration::from_millis(60);

pub fn run_playground_tui(
    controller: &mut WorkflowController,
    probe_rx: Receiver<ProbeStatus>,
) -> Result<Stage, String> {
    let mut terminal = setup_terminal()?;
    let mut ui = UiState::new();

    let result = run_event_loop(&mut terminal, controller, &mut ui, probe_rx);
    teardown_terminal(&mut terminal)?;

    result
}

/// Feeds `keys` through the same command path as the interactive loop,
/// waiting for each dispatch to settle, and returns the final screen as text.
pub fn run_scripted_session(
    controller: &mut WorkflowController,
    keys: &[KeyEvent],
    probe: ProbeStatus,
) -> String {
    let mut ui = UiState::new();
    ui.probe = probe;
    for key in keys {
        if handle_key(controller, &mut ui, *key) {
            break;
        }
        if controller.dispatcher().is_busy() {
            if let Some(outcome) = controller.wait_for_settlement() {
                ui.note_outcome(&outcome);
            }
            ui.sync_with(controller.session());
        }
    }
    project_stage_view(controller.session(), &ui).to_text()
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: &mut WorkflowController,
    ui: &mut UiState,
    probe_rx: Receiver<ProbeStatus>,
) -> Result<Stage, String> {
    let mut probe_rx = Some(probe_rx);
    loop {
        if let Some(rx) = &probe_rx {
            match rx.try_recv() {
                Ok(status) => {
                    ui.probe = status;
                    probe_rx = None;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => probe_rx = None,
            }
        }
        if let Some(outcome) = controller.poll() {
            ui.note_outcome(&outcome);
            ui.sync_with(controller.session());
        }
        ui.advance_spinner_if_needed(controller.dispatcher().is_busy());

        let view = project_stage_view(controller.session(), ui);
        terminal
            .draw(|frame| draw_stage(frame, &view, ui.result_scroll))
            .map_err(|e| format!("failed to render playground: {e}"))?;

        if !event::poll(UI_POLL_INTERVAL).map_err(|e| format!("failed to poll events: {e}"))? {
            continue;
        }
        let Event::Key(key) = event::read().map_err(|e| format!("failed to read event: {e}"))?
        else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if handle_key(controller, ui, key) {
            break;
        }
    }
    Ok(controller.session().stage)
}

/// Returns true when the user asked to leave the program.
fn handle_key(controller: &mut WorkflowController, ui: &mut UiState, key: KeyEvent) -> bool {
    let Some(command) = ui_command_from_key(controller.session().stage, key) else {
        return false;
    };
    match resolve_command(controller.session(), ui, command) {
        UiOutcome::Quit => true,
        UiOutcome::Redraw => false,
        UiOutcome::Event(event) => {
            let outcome = controller.apply(event);
            ui.note_outcome(&outcome);
            ui.sync_with(controller.session());
            false
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, String> {
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)
        .map_err(|e| format!("failed to enter alternate screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| format!("failed to initialize terminal: {e}"))
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), String> {
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)
        .map_err(|e| format!("failed to leave alternate screen: {e}"))?;
    terminal
        .show_cursor()
        .map_err(|e| format!("failed to restore cursor: {e}"))?;
    Ok(())
}
