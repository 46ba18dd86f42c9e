//! Fuzz target: persisted lock timestamps
//!
//! Lock variables live in a store anyone can edit, so `timestamp::parse`
//! sees arbitrary text.  Verifies:
//! - No panics on any UTF-8 input
//! - Anything that parses formats back to a string that parses to the same instant
//!
//! cargo fuzz run fuzz_timestamp

#![no_main]

use autofan::timestamp;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(t) = timestamp::parse(raw) {
        let again = timestamp::parse(&timestamp::format(t));
        assert_eq!(again, Ok(t), "format/parse disagree for {raw:?}");
    }
});
