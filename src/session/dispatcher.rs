use crate::client::{ServiceRequest, ServiceTransport};
use crate::session::actions::ActionId;
use crate::session::state::{DispatchOutcome, ErrorKind, ErrorReport};
use crate::session::transitions::DispatchRequest;
use crate::shared::ClientLog;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("dispatch rejected: {action} is still in flight")]
    Busy { action: ActionId },
}

struct InFlight {
    action: ActionId,
    started_at: Instant,
    result_rx: Receiver<DispatchOutcome>,
}

/// Runs at most one request at a time on a worker thread. A started request
/// always runs to completion; there is no cancellation.
pub struct Dispatcher {
    transport: Arc<dyn ServiceTransport>,
    in_flight: Option<InFlight>,
    log: ClientLog,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn ServiceTransport>, log: ClientLog) -> Self {
        Self {
            transport,
            in_flight: None,
            log,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight_action(&self) -> Option<ActionId> {
        self.in_flight.as_ref().map(|worker| worker.action)
    }

    pub fn start(&mut self, request: DispatchRequest) -> Result<(), DispatchError> {
        if let Some(worker) = &self.in_flight {
            return Err(DispatchError::Busy {
                action: worker.action,
            });
        }

        let descriptor = request.action.descriptor();
        self.log.info(
            "dispatch.start",
            &format!(
                "action={} method={} path={}",
                request.action, descriptor.method, descriptor.endpoint
            ),
        );

        let transport = Arc::clone(&self.transport);
        let service_request = ServiceRequest::for_action(request.action, &request.fields);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let outcome = execute_request(transport.as_ref(), &service_request);
            let _ = tx.send(outcome);
        });

        self.in_flight = Some(InFlight {
            action: request.action,
            started_at: Instant::now(),
            result_rx: rx,
        });
        Ok(())
    }

    /// Non-blocking; returns the outcome once the in-flight request settles.
    pub fn try_settle(&mut self) -> Option<DispatchOutcome> {
        let worker = self.in_flight.take()?;
        match worker.result_rx.try_recv() {
            Ok(outcome) => Some(self.finish(&worker, outcome)),
            Err(TryRecvError::Empty) => {
                self.in_flight = Some(worker);
                None
            }
            Err(TryRecvError::Disconnected) => {
                let outcome = Err(worker_lost());
                Some(self.finish(&worker, outcome))
            }
        }
    }

    /// Blocks until the in-flight request settles.
    pub fn wait(&mut self) -> Option<DispatchOutcome> {
        let worker = self.in_flight.take()?;
        let outcome = worker.result_rx.recv().unwrap_or_else(|_| Err(worker_lost()));
        Some(self.finish(&worker, outcome))
    }

    fn finish(&self, worker: &InFlight, outcome: DispatchOutcome) -> DispatchOutcome {
        let elapsed_ms = worker.started_at.elapsed().as_millis();
        match &outcome {
            Ok(_) => self.log.info(
                "dispatch.settled",
                &format!("action={} result=ok elapsed_ms={elapsed_ms}", worker.action),
            ),
            Err(report) => self.log.error(
                "dispatch.settled",
                &format!(
                    "action={} result=error kind={} elapsed_ms={elapsed_ms} message={}",
                    worker.action,
                    report.kind.as_str(),
                    report.message
                ),
            ),
        }
        outcome
    }
}

pub fn execute_request(
    transport: &dyn ServiceTransport,
    request: &ServiceRequest,
) -> DispatchOutcome {
    transport
        .execute(request)
        .map_err(|err| ErrorReport::from(&err))
}

fn worker_lost() -> ErrorReport {
    ErrorReport {
        kind: ErrorKind::Connectivity,
        message: "request worker stopped before reporting a result".to_string(),
    }
}
