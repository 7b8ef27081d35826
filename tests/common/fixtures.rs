//! MIB data fixtures.

use std::collections::BTreeMap;

use bytes::Bytes;
use snmp_stream::oid;
use snmp_stream::oid::ObjectIdentity;

/// Standard system subtree entries (1.3.6.1.2.1.1).
pub fn system_mib() -> BTreeMap<ObjectIdentity, Bytes> {
    let mut data = BTreeMap::new();
    data.insert(
        oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
        Bytes::from_static(b"Test SNMP Agent"),
    );
    data.insert(
        oid!(1, 3, 6, 1, 2, 1, 1, 3, 0),
        Bytes::from_static(b"\x00\x01\xE2\x40"),
    );
    data.insert(
        oid!(1, 3, 6, 1, 2, 1, 1, 4, 0),
        Bytes::from_static(b"admin@test.local"),
    );
    data.insert(
        oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
        Bytes::from_static(b"test-agent"),
    );
    data.insert(
        oid!(1, 3, 6, 1, 2, 1, 1, 6, 0),
        Bytes::from_static(b"Test Lab"),
    );
    data
}

/// Interface subtree entries (1.3.6.1.2.1.2), `count` rows.
pub fn interface_mib(count: u64) -> BTreeMap<ObjectIdentity, Bytes> {
    let mut data = BTreeMap::new();
    data.insert(
        oid!(1, 3, 6, 1, 2, 1, 2, 1, 0),
        Bytes::copy_from_slice(&count.to_be_bytes()),
    );
    for index in 1..=count {
        data.insert(
            ObjectIdentity::new([1, 3, 6, 1, 2, 1, 2, 2, 1, 1, index]),
            Bytes::copy_from_slice(&index.to_be_bytes()),
        );
        data.insert(
            ObjectIdentity::new([1, 3, 6, 1, 2, 1, 2, 2, 1, 2, index]),
            Bytes::from(format!("eth{}", index - 1)),
        );
    }
    data
}

/// Merge several fixture maps.
pub fn combined(
    maps: impl IntoIterator<Item = BTreeMap<ObjectIdentity, Bytes>>,
) -> BTreeMap<ObjectIdentity, Bytes> {
    let mut data = BTreeMap::new();
    for map in maps {
        data.extend(map);
    }
    data
}
