// Allow large error types - SnmpError carries the originating request inline
// so a failure can be diagnosed without re-running it.
#![allow(clippy::result_large_err)]

//! # snmp-stream
//!
//! Concurrent SNMP GET/WALK client engine for Rust.
//!
//! Given hosts, community credentials, and sets of OIDs, the engine
//! issues GET and WALK operations concurrently over a bounded pool of
//! asynchronous sessions and returns structured responses or typed
//! errors per request, in submission order.
//!
//! ## Features
//!
//! - Bounded concurrent session pool with FIFO admission
//! - Retry/timeout/backoff discipline per exchange
//! - WALK traversal hardened against misbehaving agents (strictly
//!   increasing OID loop guard, subtree and range bounds)
//! - Portable binary snapshot format for OID trees and variable
//!   bindings, independent of integer width and byte order
//!
//! PDU encoding per RFC and the UDP wire protocol are collaborator
//! capabilities ([`PduCodec`], [`PduTransport`]): the engine drives
//! them but does not implement the SNMP BER grammar itself.
//!
//! ## Quick Start
//!
//! ```ignore
//! use snmp_stream::{
//!     Community, Config, RequestKind, SessionManager, SnmpRequest, Version, oid,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), snmp_stream::Error> {
//!     // `codec` is any PduCodec implementation; the transport pairs
//!     // with it through the correlator hook.
//!     let transport = snmp_stream::UdpTransport::bind("0.0.0.0:0", codec_correlator).await?;
//!     let mut manager = SessionManager::new(transport, codec, Config::default())?;
//!
//!     manager.submit(SnmpRequest::new(
//!         RequestKind::Walk,
//!         "192.168.1.1:161",
//!         Community::new("public", Version::V2c),
//!         vec![oid!(1, 3, 6, 1, 2, 1, 1)],
//!         None,
//!         Some("sys-walk".into()),
//!         None,
//!     )?);
//!
//!     for outcome in manager.run().await {
//!         match outcome {
//!             Ok(response) => println!("{}: {} bindings",
//!                 response.request_id().unwrap_or("-"),
//!                 response.var_binds().len()),
//!             Err(error) => eprintln!("{}", error),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod community;
pub mod config;
pub mod error;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod request;
pub mod response;
pub mod retry;
pub mod session;
pub mod snapshot;
pub mod transport;
pub mod varbind;
pub mod version;

// Re-exports for convenience
pub use community::Community;
pub use config::Config;
pub use error::{Error, FormatErrorKind, OidErrorKind, Result, SnmpError, SnmpErrorKind};
pub use oid::{ObjectIdentity, ObjectIdentityRange};
pub use pdu::{CodecError, ExchangeId, PduCodec, PduKind, ResponsePdu};
pub use request::{RequestKind, SnmpRequest};
pub use response::SnmpResponse;
pub use retry::Backoff;
pub use session::{RequestOutcome, SessionManager};
pub use snapshot::{Endianness, Snapshot, SnapshotLayout, VarBindRecord, Width};
pub use transport::{PduTransport, TransportError, UdpTransport};
pub use varbind::{VarBind, VarBindValue};
pub use version::Version;
