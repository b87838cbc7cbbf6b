use super::ServiceClient;
use crate::session::actions::PROBE_ACTION;
use crate::shared::{ClientError, ClientLog};
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// Advisory backend reachability. Never gates the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Checking,
    Reachable,
    ServiceError { status: u16, reason: String },
    Unreachable(String),
}

impl ProbeStatus {
    pub fn display_line(&self) -> String {
        match self {
            ProbeStatus::Checking => "Checking...".to_string(),
            ProbeStatus::Reachable => "Backend is reachable!".to_string(),
            ProbeStatus::ServiceError { status, reason } => {
                format!("Backend error: {status} {reason}")
            }
            ProbeStatus::Unreachable(message) => format!("Backend not reachable: {message}"),
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeStatus::Reachable)
    }
}

pub fn probe_service(client: &ServiceClient) -> ProbeStatus {
    match client.check_status(PROBE_ACTION.descriptor().endpoint) {
        Ok(_) => ProbeStatus::Reachable,
        Err(ClientError::Service { status, reason, .. }) => {
            ProbeStatus::ServiceError { status, reason }
        }
        Err(ClientError::Connectivity { message, .. }) => ProbeStatus::Unreachable(message),
        Err(other) => ProbeStatus::Unreachable(other.to_string()),
    }
}

pub fn probe_and_log(client: &ServiceClient, log: &ClientLog) -> ProbeStatus {
    let status = probe_service(client);
    let line = format!("base={} status={}", client.api_base(), status.display_line());
    if status.is_reachable() {
        log.info("probe.result", &line);
    } else {
        log.warn("probe.result", &line);
    }
    status
}

/// Runs the probe on a background thread; the receiver yields exactly one status.
pub fn spawn_probe(client: ServiceClient, log: ClientLog) -> Receiver<ProbeStatus> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(probe_and_log(&client, &log));
    });
    rx
}
