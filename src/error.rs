//! Error types for snmp-stream.
//!
//! Two layers, mirroring how failures surface:
//!
//! - [`Error`] — synchronous failures raised before any I/O happens:
//!   OID parsing, range construction, request validation, snapshot
//!   format violations, transport setup.
//! - [`SnmpError`] — a request that reached the engine and failed (or
//!   produced a non-fatal warning). Carries the originating request and
//!   enough context to reconstruct what failed and where without
//!   re-running it.
//!
//! All enums are `#[non_exhaustive]` to allow new variants without
//! breaking changes.

use std::net::SocketAddr;

use crate::oid::ObjectIdentity;
use crate::request::SnmpRequest;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// OID parse error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Arc component was not a non-negative integer (or overflowed u64).
    InvalidArc,
    /// Empty component, e.g. `"1..3"` or a trailing dot.
    EmptyComponent,
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::EmptyComponent => write!(f, "empty dotted component"),
        }
    }
}

/// Snapshot format error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// Stream shorter than the fixed 16-byte header.
    TruncatedHeader { available: usize },
    /// Declared field width is not one of 2, 4, or 8.
    UnsupportedWidth { value: u8 },
    /// Endianness byte is not 0 (little) or 1 (big).
    UnsupportedEndianness { value: u8 },
    /// A declared length exceeds the remaining buffer.
    Truncated { needed: u64, available: usize },
    /// OID byte-length is not a multiple of the arc width.
    ArcArrayMisaligned { length: u64, suboid_size: u8 },
    /// Alignment padding contained non-zero bytes (strict parse).
    NonZeroPadding,
    /// Metadata bytes are not valid UTF-8.
    InvalidUtf8,
    /// A length or arc does not fit the declared field width (encode).
    ValueTooWide { value: u64, width: u8 },
}

impl std::fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TruncatedHeader { available } => {
                write!(f, "header needs 16 bytes but only {} present", available)
            }
            Self::UnsupportedWidth { value } => {
                write!(f, "field width {} is not one of 2, 4, 8", value)
            }
            Self::UnsupportedEndianness { value } => {
                write!(f, "endianness byte {} is not 0 or 1", value)
            }
            Self::Truncated { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
            Self::ArcArrayMisaligned { length, suboid_size } => {
                write!(
                    f,
                    "OID byte-length {} is not a multiple of arc width {}",
                    length, suboid_size
                )
            }
            Self::NonZeroPadding => write!(f, "non-zero alignment padding"),
            Self::InvalidUtf8 => write!(f, "metadata is not valid UTF-8"),
            Self::ValueTooWide { value, width } => {
                write!(f, "value {} does not fit a {}-byte field", value, width)
            }
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid OID format.
    #[error("invalid OID{}: {kind}", input.as_deref().map(|s| format!(" '{}'", s)).unwrap_or_default())]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },

    /// OID range constructed with inverted bounds.
    #[error("invalid OID range: start {start} sorts after stop {stop}")]
    InvalidRange {
        start: ObjectIdentity,
        stop: ObjectIdentity,
    },

    /// One root OID is a prefix of (or equal to) another in the same request.
    #[error("ambiguous root OIDs: {first} is a prefix of {second}")]
    AmbiguousRootOids {
        first: ObjectIdentity,
        second: ObjectIdentity,
    },

    /// Request carries no root OIDs.
    #[error("request has no root OIDs")]
    EmptyRootOids,

    /// Range list is present but not aligned 1:1 with the root OIDs.
    #[error("{ranges} ranges do not align with {oids} root OIDs")]
    RangeCountMismatch { oids: usize, ranges: usize },

    /// Ranges bound WALK traversal; a GET request must not carry them.
    #[error("GET requests do not accept ranges")]
    RangesNotAllowedForGet,

    /// Config field failed validation.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    /// Snapshot stream violates the interchange format.
    #[error("format error at offset {offset}: {kind}")]
    Format { offset: usize, kind: FormatErrorKind },

    /// I/O error during transport setup.
    #[error("I/O error{}: {source}", target.map(|t| format!(" binding {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Create a snapshot format error.
    pub fn format(offset: usize, kind: FormatErrorKind) -> Self {
        Self::Format { offset, kind }
    }
}

/// Reported categories for per-request failures and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SnmpErrorKind {
    /// Session or slot setup failure.
    Session,
    /// Request PDU could not be encoded before send.
    CreateRequestPdu,
    /// Transport send failure.
    Send,
    /// Malformed response PDU, agent error status, or walk loop-guard
    /// violation.
    BadResponsePdu,
    /// Retries exhausted with no valid response.
    Timeout,
    /// Internal scheduling failure.
    AsyncProbe,
    /// Transport closed mid-exchange.
    TransportDisconnect,
    /// Aggregate response could not be assembled.
    CreateResponsePdu,
    /// Non-fatal per-binding anomaly, e.g. an agent-reported exception
    /// value. Does not abort the request; surfaced alongside the response.
    ValueWarning,
}

impl std::fmt::Display for SnmpErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session => write!(f, "session setup failed"),
            Self::CreateRequestPdu => write!(f, "failed to build request PDU"),
            Self::Send => write!(f, "transport send failed"),
            Self::BadResponsePdu => write!(f, "bad response PDU"),
            Self::Timeout => write!(f, "request timed out"),
            Self::AsyncProbe => write!(f, "internal scheduling failure"),
            Self::TransportDisconnect => write!(f, "transport disconnected"),
            Self::CreateResponsePdu => write!(f, "failed to assemble response"),
            Self::ValueWarning => write!(f, "value warning"),
        }
    }
}

/// A failed (or warned-about) SNMP request.
///
/// Immutable once constructed; built with [`SnmpError::new`] plus the
/// `with_*` methods.
#[derive(Debug, Clone, PartialEq)]
pub struct SnmpError {
    kind: SnmpErrorKind,
    request: SnmpRequest,
    sys_errno: Option<i32>,
    err_stat: Option<i32>,
    err_index: Option<u32>,
    err_oid: Option<ObjectIdentity>,
    message: Option<String>,
}

impl SnmpError {
    /// Create an error of the given kind for a request.
    pub fn new(kind: SnmpErrorKind, request: SnmpRequest) -> Self {
        Self {
            kind,
            request,
            sys_errno: None,
            err_stat: None,
            err_index: None,
            err_oid: None,
            message: None,
        }
    }

    /// Attach a system errno.
    pub fn with_errno(mut self, errno: i32) -> Self {
        self.sys_errno = Some(errno);
        self
    }

    /// Attach the agent-reported error status and index.
    pub fn with_status(mut self, err_stat: i32, err_index: u32) -> Self {
        self.err_stat = Some(err_stat);
        self.err_index = Some(err_index);
        self
    }

    /// Attach the offending OID.
    pub fn with_oid(mut self, oid: ObjectIdentity) -> Self {
        self.err_oid = Some(oid);
        self
    }

    /// Attach a human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The error category.
    pub fn kind(&self) -> SnmpErrorKind {
        self.kind
    }

    /// The originating request.
    pub fn request(&self) -> &SnmpRequest {
        &self.request
    }

    /// System errno, if one was captured.
    pub fn sys_errno(&self) -> Option<i32> {
        self.sys_errno
    }

    /// Agent-reported error status, if any.
    pub fn err_stat(&self) -> Option<i32> {
        self.err_stat
    }

    /// Agent-reported error index, if any.
    pub fn err_index(&self) -> Option<u32> {
        self.err_index
    }

    /// The offending OID, if one was identified.
    pub fn err_oid(&self) -> Option<&ObjectIdentity> {
        self.err_oid.as_ref()
    }

    /// Attached message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl std::fmt::Display for SnmpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        write!(f, " (host {}", self.request.host())?;
        if let Some(id) = self.request.request_id() {
            write!(f, ", request {}", id)?;
        }
        if let Some(oid) = &self.err_oid {
            write!(f, ", oid {}", oid)?;
        }
        if let Some(stat) = self.err_stat {
            write!(f, ", status {}", stat)?;
        }
        if let Some(index) = self.err_index {
            write!(f, ", index {}", index)?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for SnmpError {}
