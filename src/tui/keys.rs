use crate::session::Stage;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub const ENV_SCRIPT_KEYS: &str = "DATAPLAY_SCRIPT_KEYS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    MovePrev,
    MoveNext,
    Confirm,
    Back,
    NextField,
    PrevField,
    Backspace,
    Input(char),
    Retry,
    ScrollUp,
    ScrollDown,
    Quit,
}

pub fn ui_command_from_key(stage: Stage, key: KeyEvent) -> Option<UiCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(UiCommand::Quit);
    }

    match stage {
        Stage::FormOverlay => match key.code {
            KeyCode::Up | KeyCode::BackTab => Some(UiCommand::PrevField),
            KeyCode::Down | KeyCode::Tab => Some(UiCommand::NextField),
            KeyCode::Enter => Some(UiCommand::Confirm),
            KeyCode::Esc => Some(UiCommand::Back),
            KeyCode::Backspace => Some(UiCommand::Backspace),
            KeyCode::Char(c) => Some(UiCommand::Input(c)),
            _ => None,
        },
        Stage::ResultView => match key.code {
            KeyCode::Enter => Some(UiCommand::Confirm),
            KeyCode::Up | KeyCode::PageUp => Some(UiCommand::ScrollUp),
            KeyCode::Down | KeyCode::PageDown => Some(UiCommand::ScrollDown),
            KeyCode::Char('r') => Some(UiCommand::Retry),
            KeyCode::Char('q') => Some(UiCommand::Quit),
            _ => None,
        },
        Stage::DeclinedEntry | Stage::Terminated => match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => Some(UiCommand::Quit),
            _ => None,
        },
        Stage::Entry | Stage::ActionMenu | Stage::FollowUpMenu => match key.code {
            KeyCode::Up | KeyCode::Left => Some(UiCommand::MovePrev),
            KeyCode::Down | KeyCode::Right => Some(UiCommand::MoveNext),
            KeyCode::Enter => Some(UiCommand::Confirm),
            KeyCode::Esc | KeyCode::Char('q') => Some(UiCommand::Quit),
            _ => None,
        },
    }
}

pub fn parse_scripted_keys(raw: &str) -> Result<Vec<KeyEvent>, String> {
    let mut keys = Vec::new();
    for token in raw.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(text) = trimmed.strip_prefix("text:") {
            keys.extend(
                text.chars()
                    .map(|c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)),
            );
            continue;
        }
        let key = match trimmed.to_ascii_lowercase().as_str() {
            "up" => KeyEvent::new(KeyCode::Up, KeyModifiers::NONE),
            "down" => KeyEvent::new(KeyCode::Down, KeyModifiers::NONE),
            "enter" => KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            "esc" => KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            "tab" => KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE),
            "backspace" => KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE),
            "r" => KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE),
            "q" => KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
            "ctrl-c" => KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            other => {
                return Err(format!(
                    "invalid {ENV_SCRIPT_KEYS} token `{other}`; valid tokens: up,down,enter,esc,tab,backspace,r,q,ctrl-c,text:<chars>"
                ));
            }
        };
        keys.push(key);
    }
    Ok(keys)
}
