//! SNMP response type.

use crate::error::SnmpError;
use crate::request::SnmpRequest;
use crate::varbind::VarBind;

/// The terminal success result of one request.
///
/// Bindings are in deterministic order: GET responses follow the caller's
/// root-OID order; WALK responses group bindings per root in root order,
/// ascending within each root.
///
/// A response may carry non-fatal warnings (agent exception values,
/// response OID mismatches). The request still completed; the warnings
/// record which bindings were dropped and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SnmpResponse {
    request: SnmpRequest,
    var_binds: Vec<VarBind>,
    warnings: Vec<SnmpError>,
}

impl SnmpResponse {
    /// Assemble a response.
    pub fn new(request: SnmpRequest, var_binds: Vec<VarBind>, warnings: Vec<SnmpError>) -> Self {
        Self {
            request,
            var_binds,
            warnings,
        }
    }

    /// The originating request.
    pub fn request(&self) -> &SnmpRequest {
        &self.request
    }

    /// The caller's correlation id, if the request carried one.
    pub fn request_id(&self) -> Option<&str> {
        self.request.request_id()
    }

    /// The accepted variable bindings.
    pub fn var_binds(&self) -> &[VarBind] {
        &self.var_binds
    }

    /// Non-fatal warnings collected while the request ran.
    pub fn warnings(&self) -> &[SnmpError] {
        &self.warnings
    }

    /// Whether the request completed without warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Consume the response, returning its bindings.
    pub fn into_var_binds(self) -> Vec<VarBind> {
        self.var_binds
    }
}
