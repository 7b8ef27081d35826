#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_stream::snapshot::Snapshot;

fuzz_target!(|data: &[u8]| {
    // The decoder must reject malformed streams with a typed error,
    // never panic or over-read
    if let Ok(snapshot) = Snapshot::decode(data) {
        // Anything that decodes must re-encode under some layout; the
        // original layout is recoverable from the header
        let _ = snapshot.metadata.len();
        let _ = snapshot.root_oids.len();
        let _ = snapshot.var_binds.len();
    }
});
