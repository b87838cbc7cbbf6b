use crate::session::actions::ActionId;
use crate::session::state::{
    EntryChoice, ErrorKind, ErrorReport, FormFields, MenuRound, Session, Stage, TransitionEvent,
};
use crate::session::validation::{validate_form, FormRejection};
use std::fmt;

/// One network call the caller must perform after adopting the new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub action: ActionId,
    pub fields: FormFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    None,
    Dispatch(DispatchRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Terminated,
    Declined,
    RequestPending,
    NoRequestPending,
    NothingToRetry,
    NotOffered { action: ActionId, stage: Stage },
    NotAvailable { stage: Stage, event: &'static str },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Terminated => write!(f, "session is terminated"),
            RejectReason::Declined => write!(f, "session was declined at entry"),
            RejectReason::RequestPending => write!(f, "a request is still pending"),
            RejectReason::NoRequestPending => write!(f, "no request is pending"),
            RejectReason::NothingToRetry => write!(f, "the last action did not fail"),
            RejectReason::NotOffered { action, stage } => {
                write!(f, "action {action} is not offered in stage={stage}")
            }
            RejectReason::NotAvailable { stage, event } => {
                write!(f, "invalid transition: stage={stage} event={event}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// The session is returned unchanged and no effect is requested.
    Rejected(RejectReason),
    /// Client-side form validation failed; only `last_error` and the
    /// submitted `form_fields` changed, nothing is dispatched.
    Invalid(FormRejection),
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, TransitionOutcome::Rejected(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: Session,
    pub effect: SessionEffect,
    pub outcome: TransitionOutcome,
}

impl Transition {
    fn applied(session: Session) -> Self {
        Self {
            session,
            effect: SessionEffect::None,
            outcome: TransitionOutcome::Applied,
        }
    }

    fn dispatch(session: Session, request: DispatchRequest) -> Self {
        Self {
            session,
            effect: SessionEffect::Dispatch(request),
            outcome: TransitionOutcome::Applied,
        }
    }

    fn rejected(session: &Session, reason: RejectReason) -> Self {
        Self {
            session: session.clone(),
            effect: SessionEffect::None,
            outcome: TransitionOutcome::Rejected(reason),
        }
    }
}

pub fn next_state(session: &Session, event: TransitionEvent) -> Transition {
    if session.terminated || session.stage == Stage::Terminated {
        return Transition::rejected(session, RejectReason::Terminated);
    }
    if session.stage == Stage::DeclinedEntry {
        return Transition::rejected(session, RejectReason::Declined);
    }

    if let TransitionEvent::RequestSettled(outcome) = event {
        if !session.pending_request {
            return Transition::rejected(session, RejectReason::NoRequestPending);
        }
        let mut next = session.clone();
        next.pending_request = false;
        next.stage = Stage::ResultView;
        match outcome {
            Ok(payload) => {
                next.last_result = Some(payload);
                next.last_error = None;
            }
            Err(report) => {
                next.last_result = None;
                next.last_error = Some(report);
            }
        }
        return Transition::applied(next);
    }

    if event == TransitionEvent::Terminate {
        return terminate(session);
    }

    if session.pending_request {
        return Transition::rejected(session, RejectReason::RequestPending);
    }

    let event_name = event.as_str();
    let not_available = || {
        Transition::rejected(
            session,
            RejectReason::NotAvailable {
                stage: session.stage,
                event: event_name,
            },
        )
    };

    match (session.stage, event) {
        (Stage::Entry, TransitionEvent::ChooseEntry(choice)) => {
            let mut next = session.clone();
            match choice {
                EntryChoice::Yes => {
                    next.stage = Stage::ActionMenu;
                    next.round = MenuRound::First;
                }
                EntryChoice::No => next.stage = Stage::DeclinedEntry,
            }
            Transition::applied(next)
        }
        (Stage::ActionMenu | Stage::FollowUpMenu, TransitionEvent::SelectAction(action)) => {
            if !session.round.offers(action) {
                return Transition::rejected(
                    session,
                    RejectReason::NotOffered {
                        action,
                        stage: session.stage,
                    },
                );
            }
            let mut next = session.clone();
            next.sub_choice = Some(action);
            next.form_fields.clear();
            next.last_result = None;
            next.last_error = None;
            if action.descriptor().requires_form() {
                next.stage = Stage::FormOverlay;
                return Transition::applied(next);
            }
            next.pending_request = true;
            Transition::dispatch(
                next,
                DispatchRequest {
                    action,
                    fields: FormFields::new(),
                },
            )
        }
        (Stage::FormOverlay, TransitionEvent::SubmitForm(fields)) => {
            let Some(action) = session.sub_choice else {
                return not_available();
            };
            let mut next = session.clone();
            next.last_result = None;
            match validate_form(action.descriptor(), &fields) {
                Ok(accepted) => {
                    next.form_fields = accepted.clone();
                    next.last_error = None;
                    next.pending_request = true;
                    Transition::dispatch(
                        next,
                        DispatchRequest {
                            action,
                            fields: accepted,
                        },
                    )
                }
                Err(rejection) => {
                    next.form_fields = fields;
                    next.last_error = Some(ErrorReport::validation(rejection.message()));
                    Transition {
                        session: next,
                        effect: SessionEffect::None,
                        outcome: TransitionOutcome::Invalid(rejection),
                    }
                }
            }
        }
        (Stage::FormOverlay, TransitionEvent::CancelForm) => {
            let mut next = session.clone();
            next.stage = session.round.menu_stage();
            next.sub_choice = None;
            next.form_fields.clear();
            next.last_error = None;
            Transition::applied(next)
        }
        (Stage::ResultView, TransitionEvent::AdvanceAfterResult) => {
            let mut next = session.clone();
            next.stage = Stage::FollowUpMenu;
            next.round = MenuRound::FollowUp;
            next.sub_choice = None;
            next.last_result = None;
            next.last_error = None;
            next.form_fields.clear();
            Transition::applied(next)
        }
        (Stage::ResultView, TransitionEvent::RetryLastAction) => {
            let retryable = session
                .last_error
                .as_ref()
                .map(|report| report.kind != ErrorKind::Validation)
                .unwrap_or(false);
            let Some(action) = session.sub_choice.filter(|_| retryable) else {
                return Transition::rejected(session, RejectReason::NothingToRetry);
            };
            let mut next = session.clone();
            next.last_error = None;
            next.pending_request = true;
            let fields = next.form_fields.clone();
            Transition::dispatch(next, DispatchRequest { action, fields })
        }
        _ => not_available(),
    }
}

/// Accepted from every stage after entry, even with a request in flight.
/// That request still runs to completion; its settlement is then rejected
/// because the session is terminated.
fn terminate(session: &Session) -> Transition {
    if !session.can_terminate() {
        return Transition::rejected(
            session,
            RejectReason::NotAvailable {
                stage: session.stage,
                event: TransitionEvent::Terminate.as_str(),
            },
        );
    }
    let mut next = session.clone();
    next.stage = Stage::Terminated;
    next.terminated = true;
    next.pending_request = false;
    next.sub_choice = None;
    next.last_result = None;
    next.last_error = None;
    next.form_fields.clear();
    Transition::applied(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::{FieldValue, ResultPayload};

    fn at_action_menu() -> Session {
        next_state(&Session::new(), TransitionEvent::ChooseEntry(EntryChoice::Yes)).session
    }

    #[test]
    fn choose_entry_no_is_absorbing() {
        let declined =
            next_state(&Session::new(), TransitionEvent::ChooseEntry(EntryChoice::No)).session;
        assert_eq!(declined.stage, Stage::DeclinedEntry);

        let again = next_state(&declined, TransitionEvent::ChooseEntry(EntryChoice::Yes));
        assert_eq!(again.outcome, TransitionOutcome::Rejected(RejectReason::Declined));
        assert_eq!(again.session, declined);
    }

    #[test]
    fn terminate_is_not_available_from_entry() {
        let transition = next_state(&Session::new(), TransitionEvent::Terminate);
        assert!(transition.outcome.is_rejected());
        assert_eq!(transition.session.stage, Stage::Entry);
    }

    #[test]
    fn selecting_a_follow_up_only_action_in_the_first_menu_is_rejected() {
        let menu = at_action_menu();
        let transition = next_state(
            &menu,
            TransitionEvent::SelectAction(ActionId::MissingValues),
        );
        assert_eq!(
            transition.outcome,
            TransitionOutcome::Rejected(RejectReason::NotOffered {
                action: ActionId::MissingValues,
                stage: Stage::ActionMenu,
            })
        );
        assert_eq!(transition.effect, SessionEffect::None);
    }

    #[test]
    fn cancel_form_returns_to_the_menu_it_came_from() {
        let menu = at_action_menu();
        let form = next_state(&menu, TransitionEvent::SelectAction(ActionId::GenerateErrors));
        assert_eq!(form.session.stage, Stage::FormOverlay);
        let cancelled = next_state(&form.session, TransitionEvent::CancelForm).session;
        assert_eq!(cancelled.stage, Stage::ActionMenu);
        assert_eq!(cancelled.sub_choice, None);

        let mut follow_up = cancelled.clone();
        follow_up.stage = Stage::FollowUpMenu;
        follow_up.round = MenuRound::FollowUp;
        let form = next_state(
            &follow_up,
            TransitionEvent::SelectAction(ActionId::AskCsvQuestion),
        );
        let cancelled = next_state(&form.session, TransitionEvent::CancelForm).session;
        assert_eq!(cancelled.stage, Stage::FollowUpMenu);
    }

    #[test]
    fn invalid_submission_keeps_fields_for_correction() {
        let form = next_state(
            &at_action_menu(),
            TransitionEvent::SelectAction(ActionId::GenerateIdeal),
        )
        .session;
        let mut fields = FormFields::new();
        fields.insert("industry".to_string(), FieldValue::text(""));
        fields.insert("subdomain".to_string(), FieldValue::text("retail"));

        let transition = next_state(&form, TransitionEvent::SubmitForm(fields.clone()));
        assert!(matches!(transition.outcome, TransitionOutcome::Invalid(_)));
        assert_eq!(transition.effect, SessionEffect::None);
        assert_eq!(transition.session.stage, Stage::FormOverlay);
        assert_eq!(transition.session.form_fields, fields);
        assert!(!transition.session.pending_request);
        let report = transition.session.last_error.expect("validation error");
        assert_eq!(report.kind, ErrorKind::Validation);
    }

    #[test]
    fn retry_redispatches_same_action_with_same_fields_after_failure() {
        let mut failed = at_action_menu();
        failed.stage = Stage::ResultView;
        failed.sub_choice = Some(ActionId::ReduceFiles);
        failed
            .form_fields
            .insert("n_keep".to_string(), FieldValue::text("2"));
        failed.last_error = Some(ErrorReport {
            kind: ErrorKind::Connectivity,
            message: "connection refused".to_string(),
        });

        let retry = next_state(&failed, TransitionEvent::RetryLastAction);
        assert!(retry.session.pending_request);
        assert_eq!(retry.session.last_error, None);
        let SessionEffect::Dispatch(request) = retry.effect else {
            panic!("expected dispatch");
        };
        assert_eq!(request.action, ActionId::ReduceFiles);
        assert_eq!(request.fields["n_keep"], FieldValue::text("2"));
    }

    #[test]
    fn retry_after_success_is_rejected() {
        let mut succeeded = at_action_menu();
        succeeded.stage = Stage::ResultView;
        succeeded.sub_choice = Some(ActionId::RefreshAgent);
        succeeded.last_result = Some(ResultPayload::Text("ok".to_string()));

        let retry = next_state(&succeeded, TransitionEvent::RetryLastAction);
        assert_eq!(
            retry.outcome,
            TransitionOutcome::Rejected(RejectReason::NothingToRetry)
        );
        assert_eq!(retry.session, succeeded);
    }

    #[test]
    fn terminate_while_pending_ends_the_session_and_discards_the_result() {
        let started = next_state(
            &at_action_menu(),
            TransitionEvent::SelectAction(ActionId::RefreshAgent),
        );
        assert!(started.session.pending_request);

        let ended = next_state(&started.session, TransitionEvent::Terminate);
        assert!(ended.outcome.is_applied());
        assert_eq!(ended.effect, SessionEffect::None);
        assert_eq!(ended.session.stage, Stage::Terminated);
        assert!(ended.session.terminated);
        assert!(!ended.session.pending_request);
        assert_eq!(ended.session.sub_choice, None);

        let late = next_state(
            &ended.session,
            TransitionEvent::RequestSettled(Ok(ResultPayload::Text("late".to_string()))),
        );
        assert_eq!(
            late.outcome,
            TransitionOutcome::Rejected(RejectReason::Terminated)
        );
        assert_eq!(late.session, ended.session);
    }

    #[test]
    fn settle_without_pending_request_is_rejected() {
        let menu = at_action_menu();
        let transition = next_state(
            &menu,
            TransitionEvent::RequestSettled(Ok(ResultPayload::Text("late".to_string()))),
        );
        assert_eq!(
            transition.outcome,
            TransitionOutcome::Rejected(RejectReason::NoRequestPending)
        );
        assert_eq!(transition.session, menu);
    }
}
