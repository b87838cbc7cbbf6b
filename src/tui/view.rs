use crate::client::probe::ProbeStatus;
use crate::client::uploads::form_fields_from_inputs;
use crate::session::actions::{ActionId, FieldKind};
use crate::session::transitions::{RejectReason, TransitionOutcome};
use crate::session::{EntryChoice, MenuRound, Session, Stage, TransitionEvent};
use crate::tui::keys::UiCommand;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, List, ListItem, Padding, Paragraph, Row, Table, Wrap};
use ratatui::Frame;
use std::time::{Duration, Instant};

pub const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
const SPINNER_TICK_INTERVAL: Duration = Duration::from_millis(120);
const SCROLL_STEP: u16 = 5;

const WELCOME_HEADING: &str = "WELCOME TO THE INDUSTRIAL DATA PLAYGROUND";
const FOLLOW_UP_HEADING: &str = "HAVING FUN?";
const TERMINATED_HEADING: &str = "THANK YOU FOR PLAYING";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Entry(EntryChoice),
    Action(ActionId),
    StopPlaying,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Entry(EntryChoice::Yes) => "YES",
            MenuItem::Entry(EntryChoice::No) => "NO",
            MenuItem::Action(action) => action.descriptor().label,
            MenuItem::StopPlaying => "STOP PLAYING",
        }
    }
}

pub fn menu_items(session: &Session) -> Vec<MenuItem> {
    match session.stage {
        Stage::Entry => vec![
            MenuItem::Entry(EntryChoice::Yes),
            MenuItem::Entry(EntryChoice::No),
        ],
        Stage::ActionMenu | Stage::FollowUpMenu => {
            let mut items: Vec<MenuItem> = session
                .available_actions()
                .iter()
                .map(|action| MenuItem::Action(*action))
                .collect();
            items.push(MenuItem::StopPlaying);
            items
        }
        _ => Vec::new(),
    }
}

/// Presentation-only state: cursor, typed form input, spinner.
#[derive(Debug, Clone)]
pub struct UiState {
    pub selected: usize,
    pub form_inputs: Vec<String>,
    pub focused_field: usize,
    pub result_scroll: u16,
    pub feedback: Option<String>,
    pub probe: ProbeStatus,
    spinner_index: usize,
    last_spinner_tick: Instant,
    seen: (Stage, Option<ActionId>),
}

impl UiState {
    pub fn new() -> Self {
        Self {
            selected: 0,
            form_inputs: Vec::new(),
            focused_field: 0,
            result_scroll: 0,
            feedback: None,
            probe: ProbeStatus::Checking,
            spinner_index: 0,
            last_spinner_tick: Instant::now(),
            seen: (Stage::Entry, None),
        }
    }

    /// Resets cursor and inputs whenever the stage or sub-choice changes.
    pub fn sync_with(&mut self, session: &Session) {
        let current = (session.stage, session.sub_choice);
        if current == self.seen {
            return;
        }
        self.seen = current;
        self.selected = 0;
        self.focused_field = 0;
        self.result_scroll = 0;
        self.form_inputs = match (session.stage, session.sub_choice) {
            (Stage::FormOverlay, Some(action)) => {
                vec![String::new(); action.descriptor().field_spec.len()]
            }
            _ => Vec::new(),
        };
    }

    pub fn spinner_frame(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_index % SPINNER_FRAMES.len()]
    }

    pub fn advance_spinner_if_needed(&mut self, busy: bool) {
        if busy && self.last_spinner_tick.elapsed() >= SPINNER_TICK_INTERVAL {
            self.spinner_index = (self.spinner_index + 1) % SPINNER_FRAMES.len();
            self.last_spinner_tick = Instant::now();
        }
    }

    pub fn note_outcome(&mut self, outcome: &TransitionOutcome) {
        self.feedback = match outcome {
            TransitionOutcome::Rejected(RejectReason::RequestPending) => {
                Some("still processing previous request".to_string())
            }
            TransitionOutcome::Rejected(RejectReason::Terminated) => None,
            TransitionOutcome::Rejected(reason) => Some(reason.to_string()),
            TransitionOutcome::Applied | TransitionOutcome::Invalid(_) => None,
        };
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiOutcome {
    Event(TransitionEvent),
    Redraw,
    Quit,
}

pub fn resolve_command(session: &Session, ui: &mut UiState, command: UiCommand) -> UiOutcome {
    ui.feedback = None;
    match command {
        UiCommand::Quit => UiOutcome::Quit,
        UiCommand::MovePrev => {
            ui.selected = ui.selected.saturating_sub(1);
            UiOutcome::Redraw
        }
        UiCommand::MoveNext => {
            let max_index = menu_items(session).len().saturating_sub(1);
            ui.selected = std::cmp::min(ui.selected + 1, max_index);
            UiOutcome::Redraw
        }
        UiCommand::Confirm => confirm(session, ui),
        UiCommand::Back => match session.stage {
            Stage::FormOverlay => UiOutcome::Event(TransitionEvent::CancelForm),
            _ => UiOutcome::Redraw,
        },
        UiCommand::Retry => UiOutcome::Event(TransitionEvent::RetryLastAction),
        UiCommand::NextField => {
            if !ui.form_inputs.is_empty() {
                ui.focused_field = (ui.focused_field + 1) % ui.form_inputs.len();
            }
            UiOutcome::Redraw
        }
        UiCommand::PrevField => {
            if !ui.form_inputs.is_empty() {
                let len = ui.form_inputs.len();
                ui.focused_field = (ui.focused_field + len - 1) % len;
            }
            UiOutcome::Redraw
        }
        UiCommand::Backspace => {
            if let Some(input) = ui.form_inputs.get_mut(ui.focused_field) {
                input.pop();
            }
            UiOutcome::Redraw
        }
        UiCommand::Input(c) => {
            if let Some(input) = ui.form_inputs.get_mut(ui.focused_field) {
                input.push(c);
            }
            UiOutcome::Redraw
        }
        UiCommand::ScrollUp => {
            ui.result_scroll = ui.result_scroll.saturating_sub(SCROLL_STEP);
            UiOutcome::Redraw
        }
        UiCommand::ScrollDown => {
            ui.result_scroll = ui.result_scroll.saturating_add(SCROLL_STEP);
            UiOutcome::Redraw
        }
    }
}

fn confirm(session: &Session, ui: &mut UiState) -> UiOutcome {
    match session.stage {
        Stage::Entry | Stage::ActionMenu | Stage::FollowUpMenu => {
            let items = menu_items(session);
            match items.get(ui.selected.min(items.len().saturating_sub(1))) {
                Some(MenuItem::Entry(choice)) => {
                    UiOutcome::Event(TransitionEvent::ChooseEntry(*choice))
                }
                Some(MenuItem::Action(action)) => {
                    UiOutcome::Event(TransitionEvent::SelectAction(*action))
                }
                Some(MenuItem::StopPlaying) => UiOutcome::Event(TransitionEvent::Terminate),
                None => UiOutcome::Redraw,
            }
        }
        Stage::FormOverlay => {
            let Some(action) = session.sub_choice else {
                return UiOutcome::Redraw;
            };
            let descriptor = action.descriptor();
            let inputs: Vec<(String, String)> = descriptor
                .field_spec
                .iter()
                .zip(ui.form_inputs.iter())
                .map(|(spec, value)| (spec.name.to_string(), value.clone()))
                .collect();
            match form_fields_from_inputs(descriptor, &inputs) {
                Ok(fields) => UiOutcome::Event(TransitionEvent::SubmitForm(fields)),
                Err(err) => {
                    ui.feedback = Some(format!("Error: {err}"));
                    UiOutcome::Redraw
                }
            }
        }
        Stage::ResultView => UiOutcome::Event(TransitionEvent::AdvanceAfterResult),
        Stage::DeclinedEntry | Stage::Terminated => UiOutcome::Quit,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRow {
    pub label: String,
    pub value: String,
    pub note: String,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageView {
    pub heading: String,
    pub backend_line: String,
    pub prompt: String,
    pub items: Vec<String>,
    pub selected: Option<usize>,
    pub form_rows: Vec<FormRow>,
    pub body: Vec<String>,
    pub hint: String,
    pub status: String,
}

impl StageView {
    /// Plain-text rendering used by scripted runs.
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            self.heading.clone(),
            self.backend_line.clone(),
            self.prompt.clone(),
        ];
        for (idx, item) in self.items.iter().enumerate() {
            let marker = if Some(idx) == self.selected { ">" } else { " " };
            lines.push(format!("{marker} {item}"));
        }
        for row in &self.form_rows {
            lines.push(format!("{}: {}", row.label, row.value));
        }
        lines.extend(self.body.iter().cloned());
        lines.push(format!("Status: {}", self.status));
        lines.join("\n")
    }
}

pub fn project_stage_view(session: &Session, ui: &UiState) -> StageView {
    let heading = if session.stage == Stage::Terminated {
        TERMINATED_HEADING
    } else if session.round == MenuRound::FollowUp {
        FOLLOW_UP_HEADING
    } else {
        WELCOME_HEADING
    };

    let prompt = match session.stage {
        Stage::Entry => "Want to generate data to play around?".to_string(),
        Stage::DeclinedEntry => "LET'S PLAY NEXT TIME THEN".to_string(),
        Stage::ActionMenu => "Choose an action:".to_string(),
        Stage::FollowUpMenu => "Choose your next adventure:".to_string(),
        Stage::FormOverlay => session
            .sub_choice
            .map(|action| action.descriptor().label.to_string())
            .unwrap_or_default(),
        Stage::ResultView => "Result:".to_string(),
        Stage::Terminated => "HOPE TO SEE YOU NEXT TIME".to_string(),
    };

    let items: Vec<String> = menu_items(session)
        .into_iter()
        .map(|item| item.label().to_string())
        .collect();
    let selected = if items.is_empty() {
        None
    } else {
        Some(ui.selected.min(items.len() - 1))
    };

    let form_rows = match (session.stage, session.sub_choice) {
        (Stage::FormOverlay, Some(action)) => action
            .descriptor()
            .field_spec
            .iter()
            .enumerate()
            .map(|(idx, spec)| FormRow {
                label: spec.label.to_string(),
                value: ui.form_inputs.get(idx).cloned().unwrap_or_default(),
                note: field_note(spec.kind),
                focused: idx == ui.focused_field,
            })
            .collect(),
        _ => Vec::new(),
    };

    let body = if session.stage == Stage::ResultView && !session.pending_request {
        let text = match (&session.last_result, &session.last_error) {
            (Some(result), _) => result.render(),
            (None, Some(report)) => report.to_string(),
            (None, None) => String::new(),
        };
        text.lines().map(str::to_string).collect()
    } else {
        Vec::new()
    };

    let hint = match session.stage {
        Stage::Entry | Stage::ActionMenu | Stage::FollowUpMenu => {
            "Up/Down move | Enter select | Esc quit"
        }
        Stage::FormOverlay => "Tab next field | Enter submit | Esc cancel",
        Stage::ResultView if session.last_error.is_some() => {
            "Enter NEXT STEP | r retry | Up/Down scroll"
        }
        Stage::ResultView => "Enter NEXT STEP | Up/Down scroll",
        Stage::DeclinedEntry | Stage::Terminated => "Enter quit",
    };

    let status = if session.pending_request {
        format!("Generating... {}", ui.spinner_frame())
    } else if let Some(feedback) = &ui.feedback {
        feedback.clone()
    } else if let (Stage::FormOverlay, Some(report)) = (session.stage, &session.last_error) {
        report.to_string()
    } else {
        "Ready".to_string()
    };

    StageView {
        heading: heading.to_string(),
        backend_line: format!("Backend Connection Check: {}", ui.probe.display_line()),
        prompt,
        items,
        selected,
        form_rows,
        body,
        hint: hint.to_string(),
        status,
    }
}

fn field_note(kind: FieldKind) -> String {
    match kind {
        FieldKind::Text => String::new(),
        FieldKind::Number { min } => format!("whole number >= {min}"),
        FieldKind::File { extensions } => format!(
            "path to {}",
            extensions
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join("/")
        ),
    }
}

pub(crate) fn draw_stage(frame: &mut Frame<'_>, view: &StageView, result_scroll: u16) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            view.heading.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            view.backend_line.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(4)])
        .split(main_panel_block().inner(chunks[1]));
    frame.render_widget(main_panel_block(), chunks[1]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            view.prompt.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))),
        main[0],
    );

    if !view.items.is_empty() {
        let items = view
            .items
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                let item = ListItem::new(Line::from(Span::raw(label.clone())));
                if Some(idx) == view.selected {
                    item.style(selected_style())
                } else {
                    item
                }
            })
            .collect::<Vec<_>>();
        frame.render_widget(List::new(items), main[1]);
    } else if !view.form_rows.is_empty() {
        let rows = view.form_rows.iter().map(|row| {
            let value = if row.focused {
                format!("{}█", row.value)
            } else {
                row.value.clone()
            };
            let style = if row.focused {
                selected_style()
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(row.label.clone()),
                Cell::from(value),
                Cell::from(Span::styled(
                    row.note.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .style(style)
        });
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(30),
                Constraint::Percentage(45),
                Constraint::Percentage(25),
            ],
        )
        .column_spacing(2);
        frame.render_widget(table, main[1]);
    } else {
        let body = view
            .body
            .iter()
            .map(|line| Line::raw(line.clone()))
            .collect::<Vec<_>>();
        frame.render_widget(
            Paragraph::new(body)
                .wrap(Wrap { trim: false })
                .scroll((result_scroll, 0)),
            main[1],
        );
    }

    let footer = Paragraph::new(vec![
        Line::from(view.hint.clone()),
        Line::from(format!("Status: {}", view.status)),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, chunks[2]);
}

fn selected_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn main_panel_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .padding(Padding::new(3, 3, 1, 1))
}
