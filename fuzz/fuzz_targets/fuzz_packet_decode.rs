//! Fuzz target: inbound packet decoding
//!
//! Drives arbitrary bytes through the header parser and the command-record
//! reader, and through the STATUS payload reader.  Asserts that nothing
//! panics, the reader never yields more records than bytes, and any STATUS
//! payload that parses re-encodes to the same bytes.
//!
//! cargo fuzz run fuzz_packet_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use radionode::proto::codec::{HEADER_SIZE, Header, Records};
use radionode::proto::status::StatusReport;

fuzz_target!(|data: &[u8]| {
    if let Some(header) = Header::parse(data) {
        assert_eq!(header.id_byte(), data[0]);

        let mut count = 0usize;
        let mut failed = false;
        for record in Records::new(data) {
            assert!(!failed, "reader must fuse after an error");
            failed = record.is_err();
            count += 1;
        }
        assert!(count <= data.len() - HEADER_SIZE);
    }

    if let Some(report) = StatusReport::parse(data) {
        let mut out = [0u8; 64];
        let n = report.write(&mut out);
        assert_eq!(&out[..n], data);
    }
});
