//! Object identity types.
//!
//! OIDs are stored as `SmallVec<[u64; 12]>` to avoid heap allocation for
//! common OIDs. Arcs are `u64` because the snapshot interchange format
//! (see [`crate::snapshot`]) admits 8-byte sub-identifiers.

use crate::error::{Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Object identity: an immutable ordered sequence of non-negative arcs.
///
/// Ordering is lexicographic arc-by-arc; a strict prefix sorts before any
/// extension of it, so `.1.3.6 < .1.3.6.1 < .1.3.7`. The empty OID sorts
/// before everything else.
///
/// # Examples
///
/// ```
/// use snmp_stream::oid::ObjectIdentity;
///
/// let system = ObjectIdentity::parse("1.3.6.1.2.1.1").unwrap();
/// let sys_descr = ObjectIdentity::parse(".1.3.6.1.2.1.1.1.0").unwrap();
///
/// assert!(system.is_prefix_of(&sys_descr));
/// assert!(system < sys_descr);
/// assert_eq!(sys_descr.to_string(), ".1.3.6.1.2.1.1.1.0");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentity {
    arcs: SmallVec<[u64; 12]>,
}

impl ObjectIdentity {
    /// Create an empty (zero-length) OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    pub fn new(arcs: impl IntoIterator<Item = u64>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u64]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted-decimal notation.
    ///
    /// A single leading dot is accepted (`".1.3.6"` and `"1.3.6"` parse to
    /// the same OID). The empty string parses to the empty OID, matching
    /// its `Display` form. Empty or non-numeric components fail with a
    /// format error.
    pub fn parse(s: &str) -> Result<Self> {
        let body = s.strip_prefix('.').unwrap_or(s);
        if body.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();
        for part in body.split('.') {
            if part.is_empty() {
                return Err(Error::invalid_oid_with_input(
                    OidErrorKind::EmptyComponent,
                    s,
                ));
            }
            let arc: u64 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID has no arcs.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID is a prefix of (or equal to) `other`.
    ///
    /// The empty OID is a prefix of every OID.
    pub fn is_prefix_of(&self, other: &ObjectIdentity) -> bool {
        other.starts_with(self)
    }

    /// Check if this OID starts with the arcs of `prefix`.
    pub fn starts_with(&self, prefix: &ObjectIdentity) -> bool {
        self.arcs.len() >= prefix.arcs.len() && self.arcs[..prefix.arcs.len()] == prefix.arcs[..]
    }

    /// Concatenate two OIDs into a new OID.
    ///
    /// ```
    /// use snmp_stream::oid;
    ///
    /// assert_eq!(oid!(1, 3, 6).join(&oid!(1, 2)), oid!(1, 3, 6, 1, 2));
    /// ```
    pub fn join(&self, suffix: &ObjectIdentity) -> ObjectIdentity {
        let mut arcs = self.arcs.clone();
        arcs.extend_from_slice(&suffix.arcs);
        ObjectIdentity { arcs }
    }

    /// The arcs of `self` past `prefix`, or `None` if `prefix` does not
    /// prefix this OID.
    pub fn suffix_of(&self, prefix: &ObjectIdentity) -> Option<ObjectIdentity> {
        if self.starts_with(prefix) {
            Some(ObjectIdentity::from_slice(&self.arcs[prefix.arcs.len()..]))
        } else {
            None
        }
    }
}

impl PartialOrd for ObjectIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectIdentity {
    /// Lexicographic arc order; a missing arc compares less than any value.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.as_slice().cmp(other.arcs.as_slice())
    }
}

impl fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for arc in &self.arcs {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectIdentity({})", self)
    }
}

impl FromStr for ObjectIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u64]> for ObjectIdentity {
    fn from(arcs: &[u64]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u64; N]> for ObjectIdentity {
    fn from(arcs: [u64; N]) -> Self {
        Self::new(arcs)
    }
}

/// Construct an [`ObjectIdentity`] from arc literals.
///
/// ```
/// use snmp_stream::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.len(), 9);
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::ObjectIdentity::from_slice(&[$($arc as u64),*])
    };
}

/// An OID range with optional bounds, used to restrict WALK traversal.
///
/// A missing bound means "unbounded on that side". When both bounds are
/// present, `start` must not sort after `stop`; inverted bounds are a
/// construction error, never silently swapped.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectIdentityRange {
    start: Option<ObjectIdentity>,
    stop: Option<ObjectIdentity>,
}

impl ObjectIdentityRange {
    /// Create a range from optional bounds.
    ///
    /// Fails with a range error when both bounds are present and
    /// `start > stop`.
    pub fn new(start: Option<ObjectIdentity>, stop: Option<ObjectIdentity>) -> Result<Self> {
        if let (Some(start), Some(stop)) = (&start, &stop)
            && start > stop
        {
            return Err(Error::InvalidRange {
                start: start.clone(),
                stop: stop.clone(),
            });
        }
        Ok(Self { start, stop })
    }

    /// Create a point range covering exactly one OID.
    pub fn point(oid: ObjectIdentity) -> Self {
        Self {
            start: Some(oid.clone()),
            stop: Some(oid),
        }
    }

    /// Create a range with no bounds.
    pub fn unbounded() -> Self {
        Self {
            start: None,
            stop: None,
        }
    }

    /// The start bound, if any.
    pub fn start(&self) -> Option<&ObjectIdentity> {
        self.start.as_ref()
    }

    /// The stop bound, if any.
    pub fn stop(&self) -> Option<&ObjectIdentity> {
        self.stop.as_ref()
    }

    /// Whether both bounds are present and equal.
    pub fn is_point(&self) -> bool {
        match (&self.start, &self.stop) {
            (Some(start), Some(stop)) => start == stop,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_dot_optional() {
        let with_dot = ObjectIdentity::parse(".1.3.6.1").unwrap();
        let without = ObjectIdentity::parse("1.3.6.1").unwrap();
        assert_eq!(with_dot, without);
        assert_eq!(with_dot.arcs(), &[1, 3, 6, 1]);
    }

    #[test]
    fn test_parse_empty_is_empty_oid() {
        assert!(ObjectIdentity::parse("").unwrap().is_empty());
        assert!(ObjectIdentity::parse(".").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ObjectIdentity::parse("1..3").is_err());
        assert!(ObjectIdentity::parse("1.x.3").is_err());
        assert!(ObjectIdentity::parse("1.3.").is_err());
        assert!(ObjectIdentity::parse("-1.3").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let oid = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
        assert_eq!(oid.to_string(), ".1.3.6.1.2.1.1.1.0");
        assert_eq!(ObjectIdentity::parse(&oid.to_string()).unwrap(), oid);
    }

    #[test]
    fn test_empty_formats_as_empty_string() {
        assert_eq!(ObjectIdentity::empty().to_string(), "");
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert!(oid!(1, 3, 6) < oid!(1, 3, 6, 1));
        assert!(oid!(1, 3, 6, 1) < oid!(1, 3, 7));
        assert!(ObjectIdentity::empty() < oid!(0));
    }

    #[test]
    fn test_is_prefix_of() {
        let root = oid!(1, 3, 6);
        assert!(root.is_prefix_of(&oid!(1, 3, 6, 1, 2)));
        assert!(root.is_prefix_of(&root.clone()));
        assert!(!root.is_prefix_of(&oid!(1, 3)));
        assert!(ObjectIdentity::empty().is_prefix_of(&root));
    }

    #[test]
    fn test_suffix_of() {
        let oid = oid!(1, 3, 6, 1, 5);
        assert_eq!(oid.suffix_of(&oid!(1, 3, 6)), Some(oid!(1, 5)));
        assert_eq!(oid.suffix_of(&oid), Some(ObjectIdentity::empty()));
        assert_eq!(oid.suffix_of(&oid!(1, 4)), None);
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        let err = ObjectIdentityRange::new(Some(oid!(1, 3, 7)), Some(oid!(1, 3, 6)));
        assert!(matches!(err, Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn test_range_accepts_ordered_and_open_bounds() {
        assert!(ObjectIdentityRange::new(Some(oid!(1, 3)), Some(oid!(1, 4))).is_ok());
        assert!(ObjectIdentityRange::new(None, Some(oid!(1, 4))).is_ok());
        assert!(ObjectIdentityRange::new(Some(oid!(1, 4)), None).is_ok());
        assert!(ObjectIdentityRange::new(None, None).is_ok());
        // Equal bounds are a valid point range.
        let point = ObjectIdentityRange::new(Some(oid!(1, 3)), Some(oid!(1, 3))).unwrap();
        assert!(point.is_point());
    }
}
