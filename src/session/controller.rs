use crate::client::ServiceTransport;
use crate::session::dispatcher::Dispatcher;
use crate::session::state::{DispatchOutcome, Session, Stage, TransitionEvent};
use crate::session::transitions::{
    next_state, RejectReason, SessionEffect, Transition, TransitionOutcome,
};
use crate::shared::ClientLog;
use std::sync::Arc;

/// Sole owner of the session. User events go through `apply`; dispatch
/// results come back through `poll` or `wait_for_settlement`.
pub struct WorkflowController {
    session: Session,
    dispatcher: Dispatcher,
    log: ClientLog,
}

impl WorkflowController {
    pub fn new(transport: Arc<dyn ServiceTransport>, log: ClientLog) -> Self {
        Self {
            session: Session::new(),
            dispatcher: Dispatcher::new(transport, log.clone()),
            log,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn apply(&mut self, event: TransitionEvent) -> TransitionOutcome {
        if let TransitionEvent::RequestSettled(_) = event {
            let outcome = TransitionOutcome::Rejected(RejectReason::NotAvailable {
                stage: self.session.stage,
                event: event.as_str(),
            });
            self.log_outcome(&outcome);
            return outcome;
        }
        self.adopt(next_state(&self.session, event))
    }

    /// Applies the in-flight result if it has arrived.
    pub fn poll(&mut self) -> Option<TransitionOutcome> {
        let outcome = self.dispatcher.try_settle()?;
        Some(self.settle(outcome))
    }

    pub fn wait_for_settlement(&mut self) -> Option<TransitionOutcome> {
        let outcome = self.dispatcher.wait()?;
        Some(self.settle(outcome))
    }

    fn settle(&mut self, outcome: DispatchOutcome) -> TransitionOutcome {
        let transition = next_state(&self.session, TransitionEvent::RequestSettled(outcome));
        if transition.outcome == TransitionOutcome::Rejected(RejectReason::Terminated) {
            self.log.info(
                "dispatch.discarded",
                "session ended before the request settled",
            );
            return transition.outcome;
        }
        self.adopt(transition)
    }

    fn adopt(&mut self, transition: Transition) -> TransitionOutcome {
        let Transition {
            session,
            effect,
            outcome,
        } = transition;

        if let SessionEffect::Dispatch(request) = effect {
            if let Err(err) = self.dispatcher.start(request) {
                self.log.error("dispatch.refused", &err.to_string());
                let outcome = TransitionOutcome::Rejected(RejectReason::RequestPending);
                self.log_outcome(&outcome);
                return outcome;
            }
        }

        let entered_terminal =
            session.stage == Stage::Terminated && self.session.stage != Stage::Terminated;
        self.session = session;
        if entered_terminal {
            self.log.info("session.terminated", "user ended the session");
        }
        self.log_outcome(&outcome);
        outcome
    }

    fn log_outcome(&self, outcome: &TransitionOutcome) {
        match outcome {
            TransitionOutcome::Applied => {}
            TransitionOutcome::Rejected(reason) => {
                self.log.warn("transition.rejected", &reason.to_string())
            }
            TransitionOutcome::Invalid(rejection) => {
                self.log.warn("form.invalid", &rejection.message())
            }
        }
    }
}
