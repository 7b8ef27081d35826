//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use snmp_stream::prelude::*;
//! ```
//!
//! This imports the value types, the session manager, the collaborator
//! traits, and the [`oid!`](crate::oid!) macro.

pub use crate::community::Community;
pub use crate::config::Config;
pub use crate::error::{Error, Result, SnmpError, SnmpErrorKind};
pub use crate::oid::{ObjectIdentity, ObjectIdentityRange};
pub use crate::pdu::{ExchangeId, PduCodec, PduKind};
pub use crate::request::{RequestKind, SnmpRequest};
pub use crate::response::SnmpResponse;
pub use crate::session::SessionManager;
pub use crate::transport::PduTransport;
pub use crate::varbind::{VarBind, VarBindValue};
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
