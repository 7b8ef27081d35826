//! Scripted in-process agent behind the `PduTransport` trait.
//!
//! The mock parses toy-format requests at `send`, asks its handler what
//! to do, and stages the outcome for the matching `recv`. Handlers make
//! adversarial behavior easy: drop requests, inject send failures,
//! disconnects, garbage bytes, or hand-built responses.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use snmp_stream::oid::ObjectIdentity;
use snmp_stream::pdu::{ExchangeId, PduKind};
use snmp_stream::transport::{PduTransport, TransportError};
use snmp_stream::varbind::{VarBind, VarBindValue};

use super::codec::{ParsedRequest, decode_request, encode_response};

/// What the agent does with one received request.
pub enum AgentAction {
    /// Send a well-formed response.
    Respond {
        error_status: i32,
        error_index: u32,
        var_binds: Vec<VarBind>,
    },
    /// Never answer (the exchange times out).
    Drop,
    /// Fail the send itself with an I/O error.
    FailSend,
    /// Report a transport disconnect on receive.
    Disconnect,
    /// Answer with undecodable bytes.
    Garbage,
}

impl AgentAction {
    /// A clean response with no error status.
    pub fn respond(var_binds: Vec<VarBind>) -> Self {
        Self::Respond {
            error_status: 0,
            error_index: 0,
            var_binds,
        }
    }
}

type Handler = Box<dyn FnMut(&ParsedRequest) -> AgentAction + Send>;

/// Mock transport wrapping a scripted agent.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

struct MockInner {
    handler: Mutex<Handler>,
    next_id: AtomicI32,
    slots: Mutex<HashMap<i32, Slot>>,
    latency: Duration,
    sends: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

enum Slot {
    Response(Bytes),
    Disconnect,
}

impl MockTransport {
    /// A transport driven by a custom handler.
    pub fn new(handler: impl FnMut(&ParsedRequest) -> AgentAction + Send + 'static) -> Self {
        Self::with_latency(handler, Duration::ZERO)
    }

    /// A transport driven by a custom handler, delaying each response.
    pub fn with_latency(
        handler: impl FnMut(&ParsedRequest) -> AgentAction + Send + 'static,
        latency: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(MockInner {
                handler: Mutex::new(Box::new(handler)),
                next_id: AtomicI32::new(1),
                slots: Mutex::new(HashMap::new()),
                latency,
                sends: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// A well-behaved agent serving the given MIB data.
    pub fn serving(mib: BTreeMap<ObjectIdentity, Bytes>) -> Self {
        Self::new(mib_handler(mib))
    }

    /// A well-behaved agent serving MIB data with per-response latency.
    pub fn serving_with_latency(mib: BTreeMap<ObjectIdentity, Bytes>, latency: Duration) -> Self {
        Self::with_latency(mib_handler(mib), latency)
    }

    /// Total request PDUs the agent has seen.
    pub fn sends(&self) -> usize {
        self.inner.sends.load(Ordering::Relaxed)
    }

    /// High-water mark of simultaneously outstanding exchanges.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::Relaxed)
    }
}

impl PduTransport for MockTransport {
    fn alloc_exchange_id(&self) -> ExchangeId {
        ExchangeId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    async fn send(&self, _host: &str, pdu: &[u8]) -> Result<(), TransportError> {
        let request = decode_request(pdu)
            .map_err(|e| TransportError::Io(std::io::Error::other(e.to_string())))?;
        self.inner.sends.fetch_add(1, Ordering::Relaxed);

        let action = {
            let mut handler = self.inner.handler.lock().unwrap();
            (*handler)(&request)
        };
        match action {
            AgentAction::FailSend => {
                return Err(TransportError::Io(std::io::Error::other(
                    "injected send failure",
                )));
            }
            AgentAction::Respond {
                error_status,
                error_index,
                var_binds,
            } => {
                self.inner.slots.lock().unwrap().insert(
                    request.exchange,
                    Slot::Response(encode_response(
                        request.exchange,
                        error_status,
                        error_index,
                        &var_binds,
                    )),
                );
            }
            AgentAction::Garbage => {
                self.inner
                    .slots
                    .lock()
                    .unwrap()
                    .insert(request.exchange, Slot::Response(Bytes::from_static(b"\xDE")));
            }
            AgentAction::Disconnect => {
                self.inner
                    .slots
                    .lock()
                    .unwrap()
                    .insert(request.exchange, Slot::Disconnect);
            }
            AgentAction::Drop => {}
        }

        let now = self.inner.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.max_in_flight.fetch_max(now, Ordering::Relaxed);
        Ok(())
    }

    async fn recv(
        &self,
        exchange: ExchangeId,
        timeout: Duration,
    ) -> Result<Bytes, TransportError> {
        if !self.inner.latency.is_zero() {
            tokio::time::sleep(self.inner.latency).await;
        }

        let slot = self.inner.slots.lock().unwrap().remove(&exchange.0);
        let result = match slot {
            Some(Slot::Response(data)) => Ok(data),
            Some(Slot::Disconnect) => Err(TransportError::Disconnected),
            None => {
                tokio::time::sleep(timeout).await;
                Err(TransportError::Timeout { timeout })
            }
        };
        self.inner.in_flight.fetch_sub(1, Ordering::Relaxed);
        result
    }
}

/// Handler serving a MIB map with standard GET/GETNEXT/GETBULK semantics.
pub fn mib_handler(
    mib: BTreeMap<ObjectIdentity, Bytes>,
) -> impl FnMut(&ParsedRequest) -> AgentAction + Send + 'static {
    move |request| match request.kind {
        PduKind::Get => {
            let var_binds = request
                .oids
                .iter()
                .map(|oid| match mib.get(oid) {
                    Some(value) => VarBind::opaque(oid.clone(), value.clone()),
                    None => VarBind::new(oid.clone(), VarBindValue::NoSuchObject),
                })
                .collect();
            AgentAction::respond(var_binds)
        }
        PduKind::GetNext => next_bindings(&mib, &request.oids, 1),
        PduKind::GetBulk {
            max_repetitions, ..
        } => next_bindings(&mib, &request.oids, max_repetitions.max(1)),
    }
}

/// Repetition-major get-next bindings, the way a conformant agent
/// answers GETNEXT/GETBULK.
fn next_bindings(
    mib: &BTreeMap<ObjectIdentity, Bytes>,
    oids: &[ObjectIdentity],
    repetitions: u32,
) -> AgentAction {
    let mut cursors: Vec<ObjectIdentity> = oids.to_vec();
    let mut var_binds = Vec::new();
    for _ in 0..repetitions {
        for cursor in cursors.iter_mut() {
            let next = mib
                .range((Bound::Excluded(&*cursor), Bound::Unbounded))
                .next();
            match next {
                Some((oid, value)) => {
                    var_binds.push(VarBind::opaque(oid.clone(), value.clone()));
                    *cursor = oid.clone();
                }
                None => var_binds.push(VarBind::new(cursor.clone(), VarBindValue::EndOfMibView)),
            }
        }
    }
    AgentAction::respond(var_binds)
}
