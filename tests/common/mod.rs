//! Shared test utilities for snmp-stream integration tests.

// Allow dead code since not all test files use all utilities
#![allow(dead_code)]

pub mod agent;
pub mod codec;
pub mod fixtures;

pub use agent::{AgentAction, MockTransport};
pub use codec::{ParsedRequest, TestCodec};

use std::time::Duration;

use snmp_stream::oid::{ObjectIdentity, ObjectIdentityRange};
use snmp_stream::session::SessionManager;
use snmp_stream::{Community, Config, RequestKind, SnmpRequest, Version};

/// A manager over a mock transport with the toy codec.
pub fn manager(
    transport: MockTransport,
    config: Config,
) -> SessionManager<MockTransport, TestCodec> {
    SessionManager::new(transport, TestCodec, config).expect("valid manager config")
}

/// A config with a short exchange timeout so timeout paths stay fast.
pub fn fast_config() -> Config {
    Config {
        timeout: Some(Duration::from_millis(25)),
        ..Default::default()
    }
}

/// A v2c community credential used throughout the tests.
pub fn public_v2c() -> Community {
    Community::new("public", Version::V2c)
}

/// A v1 community credential.
pub fn public_v1() -> Community {
    Community::new("public", Version::V1)
}

/// A GET request against the standard test host.
pub fn get_request(oids: Vec<ObjectIdentity>, config: Option<Config>) -> SnmpRequest {
    SnmpRequest::new(
        RequestKind::Get,
        "192.0.2.10:161",
        public_v2c(),
        oids,
        None,
        None,
        config,
    )
    .expect("valid GET request")
}

/// A v2c WALK request against the standard test host.
pub fn walk_request(
    oids: Vec<ObjectIdentity>,
    ranges: Option<Vec<ObjectIdentityRange>>,
    config: Option<Config>,
) -> SnmpRequest {
    SnmpRequest::new(
        RequestKind::Walk,
        "192.0.2.10:161",
        public_v2c(),
        oids,
        ranges,
        None,
        config,
    )
    .expect("valid WALK request")
}

/// A v1 WALK request (GETNEXT cycles).
pub fn walk_request_v1(oids: Vec<ObjectIdentity>, config: Option<Config>) -> SnmpRequest {
    SnmpRequest::new(
        RequestKind::Walk,
        "192.0.2.10:161",
        public_v1(),
        oids,
        None,
        None,
        config,
    )
    .expect("valid WALK request")
}
