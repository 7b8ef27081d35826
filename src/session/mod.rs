//! Session manager: the concurrency core.
//!
//! The manager owns a queue of submitted requests and a bounded pool of
//! in-flight sessions. [`SessionManager::run`] drives every request to a
//! terminal state and returns one outcome per request, in submission
//! order — not completion order.
//!
//! Admission is FIFO with no priorities. The in-flight bound is the
//! minimum of the session limits of every active request and the next
//! queued one, so a request can lower the engine-wide limit but never
//! raise it.

mod driver;

use std::collections::{HashMap, VecDeque};

use tokio::task::JoinSet;

use crate::config::{Config, ResolvedConfig};
use crate::error::{Result, SnmpError, SnmpErrorKind};
use crate::pdu::PduCodec;
use crate::request::SnmpRequest;
use crate::response::SnmpResponse;
use crate::transport::PduTransport;

use driver::Session;

/// The terminal state of one request: a response or a typed error.
pub type RequestOutcome = std::result::Result<SnmpResponse, SnmpError>;

/// Schedules submitted requests over a bounded pool of asynchronous
/// sessions.
///
/// The manager is the sole mutator of slot accounting and exchange
/// state; callers interact only through [`submit`](Self::submit),
/// [`withdraw`](Self::withdraw), and [`run`](Self::run). Defaults are
/// explicit constructor configuration, so multiple independently tuned
/// managers can coexist in one process.
///
/// # Example
///
/// ```ignore
/// let mut manager = SessionManager::new(transport, codec, Config::default())?;
/// manager.submit(request);
/// let outcomes = manager.run().await;
/// ```
pub struct SessionManager<T, C> {
    transport: T,
    codec: C,
    base: Config,
    pending: Vec<SnmpRequest>,
}

impl<T: PduTransport, C: PduCodec> SessionManager<T, C> {
    /// Create a manager with the given default configuration.
    ///
    /// Absent config fields fall back to the engine defaults
    /// (see [`crate::config`]).
    pub fn new(transport: T, codec: C, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            codec,
            base: config,
            pending: Vec::new(),
        })
    }

    /// Queue a request. Non-blocking; never fails (requests validate at
    /// construction).
    pub fn submit(&mut self, request: SnmpRequest) {
        tracing::debug!(
            snmp.host = request.host(),
            snmp.kind = %request.kind(),
            snmp.request_id = request.request_id().unwrap_or(""),
            "request submitted"
        );
        self.pending.push(request);
    }

    /// The number of requests queued for the next [`run`](Self::run).
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Withdraw a still-queued request by its correlation id.
    ///
    /// Only requests that have not started dispatching can be withdrawn,
    /// so this has no side effects. Returns whether a request was
    /// removed.
    pub fn withdraw(&mut self, request_id: &str) -> bool {
        let position = self
            .pending
            .iter()
            .position(|r| r.request_id() == Some(request_id));
        match position {
            Some(position) => {
                self.pending.remove(position);
                true
            }
            None => false,
        }
    }

    /// Drive every submitted request to a terminal state.
    ///
    /// Returns one outcome per request, in submission order. This is the
    /// sole suspension point: it resolves once no pending or in-flight
    /// work remains. A failure in one request never disturbs its
    /// siblings.
    pub async fn run(&mut self) -> Vec<RequestOutcome> {
        let requests = std::mem::take(&mut self.pending);
        let total = requests.len();
        tracing::debug!(snmp.requests = total, "run start");

        let empty = Config::default();
        let mut queue: VecDeque<(usize, SnmpRequest, ResolvedConfig)> = requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                let config = self
                    .base
                    .merge(request.config().unwrap_or(&empty))
                    .resolve();
                (index, request.clone(), config)
            })
            .collect();

        let mut results: Vec<Option<RequestOutcome>> = vec![None; total];
        let mut running: JoinSet<(usize, RequestOutcome)> = JoinSet::new();
        let mut active_limits: HashMap<usize, usize> = HashMap::new();
        let mut task_index: HashMap<tokio::task::Id, usize> = HashMap::new();

        loop {
            // Admit queued requests in FIFO order while the budget allows.
            // The effective limit is the minimum over every active
            // request's limit and the candidate's own.
            while let Some((_, _, config)) = queue.front() {
                let limit = active_limits
                    .values()
                    .copied()
                    .chain(std::iter::once(config.max_async_sessions))
                    .min()
                    .unwrap_or(config.max_async_sessions);
                if running.len() >= limit {
                    break;
                }
                let Some((index, request, config)) = queue.pop_front() else {
                    break;
                };
                tracing::debug!(
                    snmp.index = index,
                    snmp.host = request.host(),
                    snmp.in_flight = running.len() + 1,
                    "admitting request"
                );
                active_limits.insert(index, config.max_async_sessions);

                let transport = self.transport.clone();
                let codec = self.codec.clone();
                let handle = running.spawn(async move {
                    let outcome = Session::new(transport, codec, request, config).run().await;
                    (index, outcome)
                });
                task_index.insert(handle.id(), index);
            }

            match running.join_next_with_id().await {
                Some(Ok((id, (index, outcome)))) => {
                    task_index.remove(&id);
                    active_limits.remove(&index);
                    results[index] = Some(outcome);
                }
                Some(Err(join_error)) => {
                    // A session task died without producing an outcome
                    // (panic or runtime-level cancellation).
                    tracing::error!(error = %join_error, "session task failed");
                    if let Some(index) = task_index.remove(&join_error.id()) {
                        active_limits.remove(&index);
                        results[index] = Some(Err(SnmpError::new(
                            SnmpErrorKind::AsyncProbe,
                            requests[index].clone(),
                        )
                        .with_message(join_error.to_string())));
                    }
                }
                None => {
                    if queue.is_empty() {
                        break;
                    }
                    // Nothing in flight but work remains: loop back to
                    // admit (the limit is at least 1, so this progresses).
                }
            }
        }

        tracing::debug!(snmp.requests = total, "run complete");
        results
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| {
                outcome.unwrap_or_else(|| {
                    Err(SnmpError::new(
                        SnmpErrorKind::AsyncProbe,
                        requests[index].clone(),
                    )
                    .with_message("session task produced no outcome"))
                })
            })
            .collect()
    }
}
