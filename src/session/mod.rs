pub mod actions;
pub mod controller;
pub mod dispatcher;
pub mod state;
pub mod transitions;
pub mod validation;

pub use actions::{ActionDescriptor, ActionId, FieldKind, FieldSpec, HttpMethod, ResponseKind};
pub use controller::WorkflowController;
pub use dispatcher::{DispatchError, Dispatcher};
pub use state::{
    DispatchOutcome, EntryChoice, ErrorKind, ErrorReport, FieldValue, FormFields, MenuRound,
    ResultPayload, Session, Stage, TransitionEvent,
};
pub use transitions::{
    next_state, DispatchRequest, RejectReason, SessionEffect, Transition, TransitionOutcome,
};
pub use validation::{validate_form, FieldProblem, FormRejection};
