//! PDU transport capability.
//!
//! The engine treats the transport as an opaque capability: allocate a
//! correlation key, send encoded bytes to a host, and wait for the
//! response bytes carrying that key. [`UdpTransport`] is the bundled
//! implementation — a single unconnected UDP socket shared by every
//! in-flight exchange, with a background receive loop routing datagrams
//! to waiters by exchange id.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::pdu::ExchangeId;

/// Transport failure for one exchange.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// No response arrived within the timeout.
    #[error("no response within {timeout:?}")]
    Timeout { timeout: Duration },

    /// The transport closed mid-exchange.
    #[error("transport disconnected")]
    Disconnected,

    /// The target host could not be resolved.
    #[error("could not resolve host '{host}'")]
    Unresolvable { host: String },

    /// I/O error on send or receive.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The transport capability consumed by the engine.
///
/// # Clone Requirement
///
/// The `Clone` bound exists because every in-flight session owns a clone
/// of the transport. Implementations use `Arc` internally, making clone a
/// reference count increment.
pub trait PduTransport: Send + Sync + Clone + 'static {
    /// Allocate a fresh correlation key for one exchange.
    ///
    /// The codec embeds this key in the request PDU; the agent echoes it
    /// back, which is how [`recv`](Self::recv) routes the response.
    fn alloc_exchange_id(&self) -> ExchangeId;

    /// Send an encoded request PDU to the target host.
    fn send(&self, host: &str, pdu: &[u8]) -> impl Future<Output = std::result::Result<(), TransportError>> + Send;

    /// Wait for the response to the given exchange, up to `timeout`.
    fn recv(
        &self,
        exchange: ExchangeId,
        timeout: Duration,
    ) -> impl Future<Output = std::result::Result<Bytes, TransportError>> + Send;
}

/// Peeks the exchange id out of an encoded response datagram.
///
/// The transport cannot parse PDUs itself (the wire format belongs to the
/// codec collaborator), so the pairing codec supplies this hook.
pub type Correlator = fn(&[u8]) -> Option<ExchangeId>;

/// Single-socket UDP transport with exchange-id demultiplexing.
///
/// One unconnected socket carries every exchange regardless of target
/// host. A background tokio task receives all inbound datagrams, extracts
/// the exchange id via the configured [`Correlator`], and wakes the
/// matching waiter. Unmatched or late responses are logged and dropped
/// without disturbing other in-flight state.
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    socket: UdpSocket,
    local_addr: SocketAddr,
    pending: Mutex<HashMap<i32, PendingExchange>>,
    correlator: Correlator,
    max_message_size: usize,
    /// Shared counter; prevents correlation-key collisions between
    /// concurrent exchanges.
    next_exchange_id: AtomicI32,
}

struct PendingExchange {
    sender: oneshot::Sender<Bytes>,
    deadline: Instant,
}

impl UdpTransport {
    /// Bind a transport with default settings.
    pub async fn bind(addr: impl Into<String>, correlator: Correlator) -> Result<Self> {
        Self::builder().bind(addr).build(correlator).await
    }

    /// Create a builder for configuring the transport.
    pub fn builder() -> UdpTransportBuilder {
        UdpTransportBuilder::new()
    }

    /// Get the local bind address.
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    fn start_recv_loop(inner: Arc<UdpTransportInner>) {
        // Hold a weak reference so the loop dies with the last transport
        // clone instead of keeping the socket alive forever.
        let weak = Arc::downgrade(&inner);
        drop(inner);

        tokio::spawn(async move {
            loop {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let mut buf = vec![0u8; inner.max_message_size];

                match inner.socket.recv_from(&mut buf).await {
                    Ok((len, source)) => {
                        let data = Bytes::copy_from_slice(&buf[..len]);
                        if let Some(exchange) = (inner.correlator)(&data) {
                            let pending = inner.pending.lock().unwrap().remove(&exchange.0);
                            if let Some(pending) = pending {
                                tracing::trace!(
                                    snmp.exchange = %exchange,
                                    snmp.source = %source,
                                    snmp.bytes = len,
                                    "routed response to waiter"
                                );
                                // Receiver may have timed out already.
                                let _ = pending.sender.send(data);
                            } else {
                                tracing::debug!(
                                    snmp.exchange = %exchange,
                                    snmp.source = %source,
                                    "dropped response for unknown exchange"
                                );
                            }
                        } else {
                            tracing::debug!(
                                snmp.source = %source,
                                len,
                                "dropped datagram without an exchange id"
                            );
                        }
                    }
                    Err(e) => {
                        // Socket errors don't stop the loop.
                        tracing::error!(error = %e, "transport recv error");
                    }
                }

                // Expired waiters have given up; drop their slots inline
                // rather than spawning a sweeper task.
                let now = Instant::now();
                inner
                    .pending
                    .lock()
                    .unwrap()
                    .retain(|_, p| p.deadline > now);
            }
        });
    }
}

impl PduTransport for UdpTransport {
    fn alloc_exchange_id(&self) -> ExchangeId {
        ExchangeId(self.inner.next_exchange_id.fetch_add(1, Ordering::Relaxed))
    }

    async fn send(&self, host: &str, pdu: &[u8]) -> std::result::Result<(), TransportError> {
        let target = resolve(host).await?;
        tracing::trace!(snmp.target = %target, snmp.bytes = pdu.len(), "UDP send");
        self.inner.socket.send_to(pdu, target).await?;
        Ok(())
    }

    async fn recv(
        &self,
        exchange: ExchangeId,
        timeout: Duration,
    ) -> std::result::Result<Bytes, TransportError> {
        let (tx, rx) = oneshot::channel();
        self.inner.pending.lock().unwrap().insert(
            exchange.0,
            PendingExchange {
                sender: tx,
                deadline: Instant::now() + timeout,
            },
        );

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(_)) => {
                // Sender dropped: the receive loop is gone.
                self.inner.pending.lock().unwrap().remove(&exchange.0);
                Err(TransportError::Disconnected)
            }
            Err(_) => {
                tracing::trace!(snmp.exchange = %exchange, "UDP recv timeout");
                self.inner.pending.lock().unwrap().remove(&exchange.0);
                Err(TransportError::Timeout { timeout })
            }
        }
    }
}

/// Resolve a `host:port` string to a socket address.
async fn resolve(host: &str) -> std::result::Result<SocketAddr, TransportError> {
    if let Ok(addr) = host.parse() {
        return Ok(addr);
    }
    tokio::net::lookup_host(host)
        .await
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| TransportError::Unresolvable {
            host: host.to_string(),
        })
}

/// Builder for [`UdpTransport`].
pub struct UdpTransportBuilder {
    bind_addr: String,
    max_message_size: usize,
}

impl UdpTransportBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:0".into(),
            max_message_size: 65535,
        }
    }

    /// Set the local bind address (default `0.0.0.0:0`).
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Set the maximum inbound datagram size (default 65535).
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Bind the socket and start the receive loop.
    pub async fn build(self, correlator: Correlator) -> Result<UdpTransport> {
        let bind_addr: SocketAddr = self.bind_addr.parse().map_err(|_| Error::Io {
            target: None,
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address: {}", self.bind_addr),
            ),
        })?;

        let socket = bind_udp_socket(bind_addr).map_err(|e| Error::Io {
            target: Some(bind_addr),
            source: e,
        })?;
        let local_addr = socket.local_addr().map_err(|e| Error::Io {
            target: Some(bind_addr),
            source: e,
        })?;

        // Seed the exchange id counter from the clock so a quick restart
        // (SO_REUSEADDR) doesn't resume the previous incarnation's
        // sequence and collide with its still-routable responses.
        let initial_exchange_id = {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as i32)
                .unwrap_or(1)
                .wrapping_abs()
                .max(1)
        };

        tracing::debug!(
            snmp.local_addr = %local_addr,
            snmp.initial_exchange_id = initial_exchange_id,
            "UDP transport bound"
        );

        let inner = Arc::new(UdpTransportInner {
            socket,
            local_addr,
            pending: Mutex::new(HashMap::new()),
            correlator,
            max_message_size: self.max_message_size,
            next_exchange_id: AtomicI32::new(initial_exchange_id),
        });

        UdpTransport::start_recv_loop(inner.clone());

        Ok(UdpTransport { inner })
    }
}

impl Default for UdpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create and bind a non-blocking UDP socket.
///
/// IPv6 bind addresses get `IPV6_V6ONLY = false` for dual-stack operation,
/// and `SO_REUSEADDR` is set to allow quick restarts.
fn bind_udp_socket(addr: SocketAddr) -> std::io::Result<UdpSocket> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;

    UdpSocket::from_std(socket.into())
}
