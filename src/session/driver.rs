//! Per-request state machine.
//!
//! One [`Session`] drives one request from Pending to a terminal state:
//! it builds PDUs via the codec, exchanges them through the transport
//! with retry/timeout/backoff discipline, and accumulates bindings into
//! the final response. The manager owns scheduling; a session never sees
//! its siblings.

use crate::config::ResolvedConfig;
use crate::error::{SnmpError, SnmpErrorKind};
use crate::oid::ObjectIdentity;
use crate::pdu::{PduCodec, PduKind, ResponsePdu};
use crate::request::{RequestKind, SnmpRequest};
use crate::response::SnmpResponse;
use crate::transport::{PduTransport, TransportError};
use crate::varbind::{VarBind, VarBindValue};
use crate::version::Version;

use super::RequestOutcome;

/// GETBULK repetitions per cursor when the PDU budget is "agent default"
/// (`max_response_var_binds_per_pdu = 0`); unbounded cannot be expressed
/// in a GETBULK PDU.
const DEFAULT_BULK_REPETITIONS: u32 = 10;

/// One exchange attempt failed.
struct AttemptError {
    error: SnmpError,
    retryable: bool,
}

/// Drives one request to a terminal state.
pub(crate) struct Session<T, C> {
    transport: T,
    codec: C,
    request: SnmpRequest,
    config: ResolvedConfig,
    warnings: Vec<SnmpError>,
}

/// Per-root traversal state for a WALK.
struct WalkCursor {
    root: ObjectIdentity,
    /// Absolute window bounds: root joined with the range bounds.
    start: Option<ObjectIdentity>,
    stop: Option<ObjectIdentity>,
    /// Last accepted (or skipped) OID; the next cycle asks for the OID
    /// after this. Initially the root itself.
    cursor: ObjectIdentity,
    results: Vec<VarBind>,
    done: bool,
}

impl<T: PduTransport, C: PduCodec> Session<T, C> {
    pub(crate) fn new(
        transport: T,
        codec: C,
        request: SnmpRequest,
        config: ResolvedConfig,
    ) -> Self {
        Self {
            transport,
            codec,
            request,
            config,
            warnings: Vec::new(),
        }
    }

    pub(crate) async fn run(mut self) -> RequestOutcome {
        tracing::debug!(
            snmp.host = self.request.host(),
            snmp.kind = %self.request.kind(),
            snmp.roots = self.request.root_oids().len(),
            "session start"
        );

        let var_binds = match self.request.kind() {
            RequestKind::Get => self.run_get().await?,
            RequestKind::Walk => self.run_walk().await?,
        };

        tracing::debug!(
            snmp.host = self.request.host(),
            snmp.bindings = var_binds.len(),
            snmp.warnings = self.warnings.len(),
            "session complete"
        );
        Ok(SnmpResponse::new(self.request, var_binds, self.warnings))
    }

    fn error(&self, kind: SnmpErrorKind) -> SnmpError {
        SnmpError::new(kind, self.request.clone())
    }

    fn warn(&mut self, warning: SnmpError) {
        tracing::debug!(snmp.warning = %warning, "value warning");
        self.warnings.push(warning);
    }

    /// One Sending → AwaitingResponse cycle, retried per the config.
    ///
    /// Send failures, timeouts, and undecodable responses retry up to
    /// `retries` times with the configured backoff. Encode failures,
    /// transport disconnects, and agent error-status responses are
    /// terminal immediately.
    async fn exchange(
        &mut self,
        kind: PduKind,
        oids: &[ObjectIdentity],
    ) -> Result<ResponsePdu, SnmpError> {
        let mut attempt: u32 = 0;
        loop {
            match self.attempt(kind, oids).await {
                Ok(response) => return Ok(response),
                Err(AttemptError { error, retryable }) => {
                    if !retryable || attempt >= self.config.retries {
                        return Err(error);
                    }
                    attempt += 1;
                    tracing::debug!(
                        snmp.host = self.request.host(),
                        snmp.attempt = attempt,
                        snmp.retries = self.config.retries,
                        snmp.error = %error,
                        "retrying exchange"
                    );
                    let delay = self.config.backoff.delay_for(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    async fn attempt(
        &self,
        kind: PduKind,
        oids: &[ObjectIdentity],
    ) -> Result<ResponsePdu, AttemptError> {
        // A fresh id per attempt keeps a late response to an abandoned
        // attempt from satisfying the retry.
        let exchange = self.transport.alloc_exchange_id();

        let pdu = self
            .codec
            .encode(exchange, kind, self.request.community(), oids)
            .map_err(|e| AttemptError {
                error: self
                    .error(SnmpErrorKind::CreateRequestPdu)
                    .with_message(e.to_string()),
                retryable: false,
            })?;

        tracing::trace!(
            snmp.host = self.request.host(),
            snmp.exchange = %exchange,
            snmp.oids = oids.len(),
            "sending PDU"
        );
        if let Err(e) = self.transport.send(self.request.host(), &pdu).await {
            return Err(self.send_failure(e));
        }

        let data = match self.transport.recv(exchange, self.config.timeout).await {
            Ok(data) => data,
            Err(e) => return Err(self.recv_failure(e)),
        };

        let response = self.codec.decode(&data).map_err(|e| AttemptError {
            error: self
                .error(SnmpErrorKind::BadResponsePdu)
                .with_message(e.to_string()),
            retryable: true,
        })?;

        if response.exchange != exchange {
            return Err(AttemptError {
                error: self.error(SnmpErrorKind::BadResponsePdu).with_message(format!(
                    "response carries exchange id {}, expected {}",
                    response.exchange, exchange
                )),
                retryable: true,
            });
        }

        if response.error_status != 0 {
            let err_oid = (response.error_index > 0)
                .then(|| response.var_binds.get(response.error_index as usize - 1))
                .flatten()
                .map(|vb| vb.oid.clone());
            let mut error = self
                .error(SnmpErrorKind::BadResponsePdu)
                .with_status(response.error_status, response.error_index)
                .with_message("agent reported an error status");
            if let Some(oid) = err_oid {
                error = error.with_oid(oid);
            }
            return Err(AttemptError {
                error,
                retryable: false,
            });
        }

        Ok(response)
    }

    fn send_failure(&self, e: TransportError) -> AttemptError {
        match e {
            // An unresolvable peer means the session can never open.
            TransportError::Unresolvable { .. } => AttemptError {
                error: self
                    .error(SnmpErrorKind::Session)
                    .with_message(e.to_string()),
                retryable: false,
            },
            TransportError::Disconnected => AttemptError {
                error: self
                    .error(SnmpErrorKind::TransportDisconnect)
                    .with_message("transport disconnected during send"),
                retryable: false,
            },
            TransportError::Io(io) => {
                let mut error = self
                    .error(SnmpErrorKind::Send)
                    .with_message(io.to_string());
                if let Some(errno) = io.raw_os_error() {
                    error = error.with_errno(errno);
                }
                AttemptError {
                    error,
                    retryable: true,
                }
            }
            other => AttemptError {
                error: self.error(SnmpErrorKind::Send).with_message(other.to_string()),
                retryable: true,
            },
        }
    }

    fn recv_failure(&self, e: TransportError) -> AttemptError {
        match e {
            TransportError::Timeout { timeout } => AttemptError {
                error: self
                    .error(SnmpErrorKind::Timeout)
                    .with_message(format!("no response within {:?}", timeout)),
                retryable: true,
            },
            TransportError::Disconnected => AttemptError {
                error: self
                    .error(SnmpErrorKind::TransportDisconnect)
                    .with_message("transport disconnected awaiting response"),
                retryable: false,
            },
            TransportError::Io(io) => {
                let mut error = self
                    .error(SnmpErrorKind::TransportDisconnect)
                    .with_message(io.to_string());
                if let Some(errno) = io.raw_os_error() {
                    error = error.with_errno(errno);
                }
                AttemptError {
                    error,
                    retryable: false,
                }
            }
            other => AttemptError {
                error: self
                    .error(SnmpErrorKind::TransportDisconnect)
                    .with_message(other.to_string()),
                retryable: false,
            },
        }
    }

    /// GET: one exchange per batch of root OIDs; batches never exceed
    /// the PDU budget (0 means everything in one PDU). Bindings aggregate
    /// in input order.
    async fn run_get(&mut self) -> Result<Vec<VarBind>, SnmpError> {
        let oids = self.request.root_oids().to_vec();
        let batch = match self.config.max_response_var_binds_per_pdu {
            0 => oids.len(),
            n => n,
        };

        let mut results = Vec::with_capacity(oids.len());
        for chunk in oids.chunks(batch) {
            let response = self.exchange(PduKind::Get, chunk).await?;

            for (slot, requested) in chunk.iter().enumerate() {
                let Some(vb) = response.var_binds.get(slot) else {
                    let warning = self
                        .error(SnmpErrorKind::ValueWarning)
                        .with_oid(requested.clone())
                        .with_message("no binding returned for request OID");
                    self.warn(warning);
                    continue;
                };
                if vb.oid != *requested {
                    let warning = self
                        .error(SnmpErrorKind::ValueWarning)
                        .with_oid(vb.oid.clone())
                        .with_message(format!(
                            "response OID does not match request OID {}",
                            requested
                        ));
                    self.warn(warning);
                    continue;
                }
                if vb.value.is_exception() {
                    let warning = self
                        .error(SnmpErrorKind::ValueWarning)
                        .with_oid(vb.oid.clone())
                        .with_message(vb.value.to_string());
                    self.warn(warning);
                    continue;
                }
                results.push(vb.clone());
            }

            if response.var_binds.len() > chunk.len() {
                let warning = self
                    .error(SnmpErrorKind::ValueWarning)
                    .with_message(format!(
                        "agent returned {} bindings for {} request OIDs",
                        response.var_binds.len(),
                        chunk.len()
                    ));
                self.warn(warning);
            }
        }
        Ok(results)
    }

    /// WALK: per-root cursors driven by GETNEXT (v1) or GETBULK (v2c)
    /// cycles until every root is done.
    async fn run_walk(&mut self) -> Result<Vec<VarBind>, SnmpError> {
        let mut cursors = self.build_cursors();

        loop {
            let active: Vec<usize> = cursors
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.done)
                .map(|(i, _)| i)
                .collect();
            if active.is_empty() {
                break;
            }

            let budget = self.config.max_response_var_binds_per_pdu;
            let round: Vec<usize> = match budget {
                0 => active,
                n => active.into_iter().take(n).collect(),
            };
            let oids: Vec<ObjectIdentity> =
                round.iter().map(|&i| cursors[i].cursor.clone()).collect();

            let kind = match self.request.community().version() {
                Version::V1 => PduKind::GetNext,
                Version::V2c => PduKind::GetBulk {
                    non_repeaters: 0,
                    max_repetitions: match budget {
                        0 => DEFAULT_BULK_REPETITIONS,
                        n => (n / round.len()).max(1) as u32,
                    },
                },
            };

            let response = self.exchange(kind, &oids).await?;

            if kind == PduKind::GetNext && response.var_binds.len() != round.len() {
                return Err(self
                    .error(SnmpErrorKind::BadResponsePdu)
                    .with_message(format!(
                        "agent returned {} bindings for {} get-next OIDs",
                        response.var_binds.len(),
                        round.len()
                    )));
            }

            // Bindings arrive repetition-major: each chunk holds one
            // binding per requested cursor, positionally aligned.
            let mut touched = vec![false; round.len()];
            for repetition in response.var_binds.chunks(round.len()) {
                for (slot, vb) in repetition.iter().enumerate() {
                    let index = round[slot];
                    if cursors[index].done {
                        continue;
                    }
                    touched[slot] = true;
                    self.step_cursor(&mut cursors[index], vb)?;
                }
            }

            // A cursor the agent returned nothing for cannot make
            // progress; treat it as exhausted rather than re-asking
            // forever.
            for (slot, touched) in touched.into_iter().enumerate() {
                let index = round[slot];
                if !touched && !cursors[index].done {
                    tracing::debug!(
                        snmp.root = %cursors[index].root,
                        "no binding for cursor, closing root"
                    );
                    cursors[index].done = true;
                }
            }
        }

        Ok(cursors.into_iter().flat_map(|c| c.results).collect())
    }

    fn build_cursors(&self) -> Vec<WalkCursor> {
        self.request
            .root_oids()
            .iter()
            .enumerate()
            .map(|(i, root)| {
                let range = self.request.ranges().map(|ranges| &ranges[i]);
                WalkCursor {
                    root: root.clone(),
                    start: range
                        .and_then(|r| r.start())
                        .map(|suffix| root.join(suffix)),
                    stop: range
                        .and_then(|r| r.stop())
                        .map(|suffix| root.join(suffix)),
                    cursor: root.clone(),
                    results: Vec::new(),
                    done: false,
                }
            })
            .collect()
    }

    /// Apply one returned binding to its cursor.
    fn step_cursor(&mut self, cursor: &mut WalkCursor, vb: &VarBind) -> Result<(), SnmpError> {
        if vb.value == VarBindValue::EndOfMibView {
            tracing::trace!(snmp.root = %cursor.root, "end of MIB view");
            cursor.done = true;
            return Ok(());
        }
        if vb.value.is_exception() {
            // noSuchObject/noSuchInstance leave no safe cursor to advance
            // to; record the anomaly and close the root.
            let warning = self
                .error(SnmpErrorKind::ValueWarning)
                .with_oid(vb.oid.clone())
                .with_message(vb.value.to_string());
            self.warn(warning);
            cursor.done = true;
            return Ok(());
        }

        if !vb.oid.starts_with(&cursor.root) {
            tracing::trace!(snmp.root = %cursor.root, snmp.oid = %vb.oid, "left subtree");
            cursor.done = true;
            return Ok(());
        }
        if let Some(stop) = &cursor.stop
            && vb.oid > *stop
            && !stop.is_prefix_of(&vb.oid)
        {
            tracing::trace!(snmp.root = %cursor.root, snmp.oid = %vb.oid, "past stop bound");
            cursor.done = true;
            return Ok(());
        }

        // Loop guard: the cursor must advance strictly or the agent is
        // cycling and the walk would never terminate.
        if vb.oid <= cursor.cursor {
            return Err(self
                .error(SnmpErrorKind::BadResponsePdu)
                .with_oid(vb.oid.clone())
                .with_message(format!(
                    "non-increasing OID in walk response: {} after {}",
                    vb.oid, cursor.cursor
                )));
        }
        cursor.cursor = vb.oid.clone();

        // Below the start bound: advance past it without recording.
        if let Some(start) = &cursor.start
            && vb.oid < *start
        {
            return Ok(());
        }

        cursor.results.push(vb.clone());
        Ok(())
    }
}
