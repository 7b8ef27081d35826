//! SNMP request model.
//!
//! A request is an immutable unit of work. All validation happens at
//! construction, before any I/O: an `SnmpRequest` that exists is safe to
//! dispatch, which is why [`SessionManager::submit`](crate::session::SessionManager::submit)
//! is infallible.

use crate::community::Community;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::oid::{ObjectIdentity, ObjectIdentityRange};

/// SNMP request kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Single exchange per batch of root OIDs.
    Get,
    /// Iterative subtree traversal via get-next style exchanges.
    Walk,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Walk => write!(f, "WALK"),
        }
    }
}

/// One unit of work for the session manager.
#[derive(Debug, Clone, PartialEq)]
pub struct SnmpRequest {
    kind: RequestKind,
    host: String,
    community: Community,
    root_oids: Vec<ObjectIdentity>,
    ranges: Option<Vec<ObjectIdentityRange>>,
    request_id: Option<String>,
    config: Option<Config>,
}

impl SnmpRequest {
    /// Create a request, validating it eagerly.
    ///
    /// Fails when:
    /// - `root_oids` is empty;
    /// - one root OID is a prefix of (or equal to) another — a WALK scoped
    ///   to one root could otherwise swallow or duplicate results
    ///   belonging to a prefix/suffix root;
    /// - `ranges` is present but not aligned 1:1 with `root_oids`;
    /// - `ranges` is present on a GET (ranges bound WALK traversal only);
    /// - the embedded `config` fails validation.
    pub fn new(
        kind: RequestKind,
        host: impl Into<String>,
        community: Community,
        root_oids: Vec<ObjectIdentity>,
        ranges: Option<Vec<ObjectIdentityRange>>,
        request_id: Option<String>,
        config: Option<Config>,
    ) -> Result<Self> {
        if root_oids.is_empty() {
            return Err(Error::EmptyRootOids);
        }
        check_ambiguous_root_oids(&root_oids)?;

        if let Some(ranges) = &ranges {
            if kind == RequestKind::Get {
                return Err(Error::RangesNotAllowedForGet);
            }
            if ranges.len() != root_oids.len() {
                return Err(Error::RangeCountMismatch {
                    oids: root_oids.len(),
                    ranges: ranges.len(),
                });
            }
        }

        if let Some(config) = &config {
            config.validate()?;
        }

        Ok(Self {
            kind,
            host: host.into(),
            community,
            root_oids,
            ranges,
            request_id,
            config,
        })
    }

    /// The request kind.
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// The target host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The community credential.
    pub fn community(&self) -> &Community {
        &self.community
    }

    /// The root OIDs, in caller order.
    pub fn root_oids(&self) -> &[ObjectIdentity] {
        &self.root_oids
    }

    /// The per-root ranges, if any. Aligned 1:1 with [`root_oids`](Self::root_oids).
    pub fn ranges(&self) -> Option<&[ObjectIdentityRange]> {
        self.ranges.as_deref()
    }

    /// The caller's correlation id, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// The request-level config overrides, if any.
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }
}

/// Test that no OID in the sequence is a prefix of (or equal to) another.
///
/// Sorts a copy; in lexicographic order a prefix sorts immediately before
/// its extensions, so checking adjacent pairs suffices.
pub fn check_ambiguous_root_oids(oids: &[ObjectIdentity]) -> Result<()> {
    let mut sorted: Vec<&ObjectIdentity> = oids.iter().collect();
    sorted.sort();
    for pair in sorted.windows(2) {
        if pair[0].is_prefix_of(pair[1]) {
            return Err(Error::AmbiguousRootOids {
                first: pair[0].clone(),
                second: pair[1].clone(),
            });
        }
    }
    Ok(())
}
