#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_stream::oid::ObjectIdentity;

fuzz_target!(|data: &[u8]| {
    // Fuzz OID parsing from dotted string notation (if data is valid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(oid) = ObjectIdentity::parse(s) {
            // Parsed OIDs must survive a format/parse round trip
            let round_tripped = ObjectIdentity::parse(&oid.to_string()).unwrap();
            assert_eq!(round_tripped, oid);
        }
    }
});
