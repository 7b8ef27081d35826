//! Per-request tunables and engine defaults.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::retry::Backoff;

/// Default retry count applied when neither the engine nor the request
/// overrides it.
pub const DEFAULT_RETRIES: u32 = 3;
/// Default per-exchange timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
/// Default cap on response variable bindings per PDU.
pub const DEFAULT_MAX_RESPONSE_VAR_BINDS_PER_PDU: usize = 10;
/// Default bound on concurrent in-flight sessions.
pub const DEFAULT_MAX_ASYNC_SESSIONS: usize = 10;

/// Optional overrides for request handling.
///
/// Absent fields fall back to the [`SessionManager`](crate::session::SessionManager)
/// configuration, then to the engine defaults above. A request-level
/// `Config` overlays the manager's via [`merge`](Config::merge).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Number of retry attempts per exchange.
    pub retries: Option<u32>,
    /// Per-exchange response timeout.
    pub timeout: Option<Duration>,
    /// Maximum response variable bindings requested per PDU.
    /// `0` means "agent default" (no engine-imposed batching).
    pub max_response_var_binds_per_pdu: Option<usize>,
    /// Maximum concurrent in-flight sessions. Must be at least 1.
    pub max_async_sessions: Option<usize>,
    /// Delay policy between retry attempts.
    pub backoff: Option<Backoff>,
}

impl Config {
    /// Check field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.max_async_sessions == Some(0) {
            return Err(Error::InvalidConfig {
                reason: "max_async_sessions must be at least 1",
            });
        }
        Ok(())
    }

    /// Overlay `overlay` on top of `self`: present fields in `overlay`
    /// win, absent fields keep the value from `self`.
    pub fn merge(&self, overlay: &Config) -> Config {
        Config {
            retries: overlay.retries.or(self.retries),
            timeout: overlay.timeout.or(self.timeout),
            max_response_var_binds_per_pdu: overlay
                .max_response_var_binds_per_pdu
                .or(self.max_response_var_binds_per_pdu),
            max_async_sessions: overlay.max_async_sessions.or(self.max_async_sessions),
            backoff: overlay.backoff.clone().or_else(|| self.backoff.clone()),
        }
    }

    /// Fill any remaining absent field from the engine defaults.
    pub(crate) fn resolve(&self) -> ResolvedConfig {
        ResolvedConfig {
            retries: self.retries.unwrap_or(DEFAULT_RETRIES),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            max_response_var_binds_per_pdu: self
                .max_response_var_binds_per_pdu
                .unwrap_or(DEFAULT_MAX_RESPONSE_VAR_BINDS_PER_PDU),
            max_async_sessions: self.max_async_sessions.unwrap_or(DEFAULT_MAX_ASYNC_SESSIONS),
            backoff: self.backoff.clone().unwrap_or_default(),
        }
    }
}

/// A `Config` with every field filled in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ResolvedConfig {
    pub retries: u32,
    pub timeout: Duration,
    pub max_response_var_binds_per_pdu: usize,
    pub max_async_sessions: usize,
    pub backoff: Backoff,
}
