//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value. Value payloads stay opaque bytes;
//! only the agent exception markers are modeled, because they drive walk
//! termination and VALUE_WARNING reporting.

use bytes::Bytes;

use crate::oid::ObjectIdentity;

/// A variable binding value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarBindValue {
    /// Encoded value bytes, uninterpreted by the engine.
    Opaque(Bytes),
    /// Agent exception: no such object (SNMPv2c).
    NoSuchObject,
    /// Agent exception: no such instance (SNMPv2c).
    NoSuchInstance,
    /// Agent exception: end of MIB view (SNMPv2c).
    EndOfMibView,
}

impl VarBindValue {
    /// Whether this is one of the agent exception markers.
    pub fn is_exception(&self) -> bool {
        !matches!(self, Self::Opaque(_))
    }

    /// The payload bytes, if this is an opaque value.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Opaque(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl std::fmt::Display for VarBindValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Opaque(bytes) => write!(f, "opaque({} bytes)", bytes.len()),
            Self::NoSuchObject => write!(f, "noSuchObject"),
            Self::NoSuchInstance => write!(f, "noSuchInstance"),
            Self::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: ObjectIdentity,
    /// The value.
    pub value: VarBindValue,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: ObjectIdentity, value: VarBindValue) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with an opaque payload.
    pub fn opaque(oid: ObjectIdentity, value: impl Into<Bytes>) -> Self {
        Self {
            oid,
            value: VarBindValue::Opaque(value.into()),
        }
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}
