use crate::session::actions::{ActionId, ACTION_MENU_ACTIONS, FOLLOW_UP_MENU_ACTIONS};
use crate::shared::ClientError;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Entry,
    DeclinedEntry,
    ActionMenu,
    FormOverlay,
    ResultView,
    FollowUpMenu,
    Terminated,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Entry => "entry",
            Stage::DeclinedEntry => "declined_entry",
            Stage::ActionMenu => "action_menu",
            Stage::FormOverlay => "form_overlay",
            Stage::ResultView => "result_view",
            Stage::FollowUpMenu => "follow_up_menu",
            Stage::Terminated => "terminated",
        }
    }

    pub fn is_absorbing(self) -> bool {
        matches!(self, Stage::DeclinedEntry | Stage::Terminated)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which menu a form overlay or dispatch was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRound {
    First,
    FollowUp,
}

impl MenuRound {
    pub fn menu_stage(self) -> Stage {
        match self {
            MenuRound::First => Stage::ActionMenu,
            MenuRound::FollowUp => Stage::FollowUpMenu,
        }
    }

    pub fn actions(self) -> &'static [ActionId] {
        match self {
            MenuRound::First => &ACTION_MENU_ACTIONS,
            MenuRound::FollowUp => &FOLLOW_UP_MENU_ACTIONS,
        }
    }

    pub fn offers(self, id: ActionId) -> bool {
        self.actions().contains(&id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryChoice {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File { file_name: String, contents: Vec<u8> },
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            FieldValue::File { .. } => None,
        }
    }
}

pub type FormFields = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum ResultPayload {
    Json(serde_json::Value),
    Text(String),
}

impl ResultPayload {
    /// Raw text is returned unmodified; JSON is pretty-printed.
    pub fn render(&self) -> String {
        match self {
            ResultPayload::Text(text) => text.clone(),
            ResultPayload::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connectivity,
    Service,
    Validation,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::Service => "service",
            ErrorKind::Validation => "validation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorReport {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }
}

impl From<&ClientError> for ErrorReport {
    fn from(err: &ClientError) -> Self {
        let kind = match err {
            ClientError::Connectivity { .. } | ClientError::Request { .. } => {
                ErrorKind::Connectivity
            }
            ClientError::Service { .. } | ClientError::Decode { .. } => ErrorKind::Service,
            ClientError::File { .. } => ErrorKind::Validation,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

/// Settled result of one dispatch, fed back as `RequestSettled`.
pub type DispatchOutcome = Result<ResultPayload, ErrorReport>;

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionEvent {
    ChooseEntry(EntryChoice),
    SelectAction(ActionId),
    SubmitForm(FormFields),
    CancelForm,
    AdvanceAfterResult,
    RetryLastAction,
    Terminate,
    RequestSettled(DispatchOutcome),
}

impl TransitionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionEvent::ChooseEntry(_) => "choose_entry",
            TransitionEvent::SelectAction(_) => "select_action",
            TransitionEvent::SubmitForm(_) => "submit_form",
            TransitionEvent::CancelForm => "cancel_form",
            TransitionEvent::AdvanceAfterResult => "advance_after_result",
            TransitionEvent::RetryLastAction => "retry_last_action",
            TransitionEvent::Terminate => "terminate",
            TransitionEvent::RequestSettled(_) => "request_settled",
        }
    }
}

/// The whole client state. Only `next_state` produces new values of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub stage: Stage,
    pub round: MenuRound,
    pub sub_choice: Option<ActionId>,
    pub pending_request: bool,
    pub last_result: Option<ResultPayload>,
    pub last_error: Option<ErrorReport>,
    pub form_fields: FormFields,
    pub terminated: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            stage: Stage::Entry,
            round: MenuRound::First,
            sub_choice: None,
            pending_request: false,
            last_result: None,
            last_error: None,
            form_fields: FormFields::new(),
            terminated: false,
        }
    }

    pub fn available_actions(&self) -> &'static [ActionId] {
        match self.stage {
            Stage::ActionMenu | Stage::FollowUpMenu => self.round.actions(),
            _ => &[],
        }
    }

    /// True once the first action menu has been reached, pending or not.
    pub fn can_terminate(&self) -> bool {
        matches!(
            self.stage,
            Stage::ActionMenu | Stage::FormOverlay | Stage::ResultView | Stage::FollowUpMenu
        )
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_at_entry_with_nothing_pending() {
        let session = Session::new();
        assert_eq!(session.stage, Stage::Entry);
        assert!(!session.pending_request);
        assert!(session.last_result.is_none());
        assert!(session.last_error.is_none());
        assert!(session.form_fields.is_empty());
        assert!(!session.terminated);
        assert!(!session.can_terminate());
    }

    #[test]
    fn terminate_is_offered_with_a_request_in_flight() {
        let mut session = Session::new();
        session.stage = Stage::ActionMenu;
        session.pending_request = true;
        assert!(session.can_terminate());
    }

    #[test]
    fn request_preparation_failures_are_connectivity_errors() {
        let err = ClientError::Request {
            url: "http://svc/reduce-files/".to_string(),
            message: "builder error".to_string(),
        };
        assert_eq!(ErrorReport::from(&err).kind, ErrorKind::Connectivity);
    }

    #[test]
    fn text_payload_renders_verbatim() {
        let raw = "CREATE TABLE t (id INT);\n\n-- trailing comment  ";
        assert_eq!(ResultPayload::Text(raw.to_string()).render(), raw);
    }

    #[test]
    fn decode_errors_are_reported_as_service_errors() {
        let err = ClientError::Decode {
            url: "http://svc/missing-values/".to_string(),
            message: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(ErrorReport::from(&err).kind, ErrorKind::Service);
    }
}
