//! PDU codec capability.
//!
//! SNMP PDU encoding per RFC is an external collaborator: the engine only
//! fixes the interface it drives. A codec turns (kind, community, OIDs)
//! into wire bytes and wire bytes back into a decoded response; it never
//! touches the network.

use bytes::Bytes;

use crate::community::Community;
use crate::oid::ObjectIdentity;
use crate::varbind::VarBind;

/// Transport-assigned correlation key for one in-flight exchange.
///
/// Not the caller's `request_id`: this is the sequence id the transport
/// uses to demultiplex inbound PDUs to pending exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(pub i32);

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request PDU kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduKind {
    /// Exact-match GET.
    Get,
    /// Get-next (SNMPv1 walk cycle).
    GetNext,
    /// Get-bulk (SNMPv2c walk cycle).
    GetBulk {
        non_repeaters: u32,
        max_repetitions: u32,
    },
}

/// A decoded response PDU.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePdu {
    /// Correlation key echoed by the agent.
    pub exchange: ExchangeId,
    /// Agent error status (0 = no error).
    pub error_status: i32,
    /// 1-based index of the offending variable binding, 0 if none.
    pub error_index: u32,
    /// Returned variable bindings, in PDU order.
    pub var_binds: Vec<VarBind>,
}

/// Codec failure: a PDU could not be encoded or decoded.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CodecError {
    message: String,
}

impl CodecError {
    /// Create a codec error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The protocol-codec capability consumed by the engine.
pub trait PduCodec: Send + Sync + Clone + 'static {
    /// Encode a request PDU.
    fn encode(
        &self,
        exchange: ExchangeId,
        kind: PduKind,
        community: &Community,
        oids: &[ObjectIdentity],
    ) -> Result<Bytes, CodecError>;

    /// Decode a response PDU.
    fn decode(&self, bytes: &[u8]) -> Result<ResponsePdu, CodecError>;
}
