//! Fuzz target: `find_address`
//!
//! Treats the input as one subevent payload straight from the controller.
//! The first byte picks the tag's slot; the rest is the payload.  The
//! scanner must never panic, and any opcode it returns must be the byte
//! right after the address header.
//!
//! cargo fuzz run fuzz_subevent_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use pawrtag::pawr::codec::find_address;

fuzz_target!(|data: &[u8]| {
    let Some((&slot, payload)) = data.split_first() else {
        return;
    };

    if let Some(opcode) = find_address(payload, slot) {
        let header = usize::from(payload[0]);
        assert!(header < payload.len() - 1, "header must fit before the opcode");
        assert_eq!(opcode, payload[header + 1]);
        assert!(
            payload[1..=header].iter().any(|&a| a == slot || a == 255),
            "match without our slot or broadcast"
        );
    }
});
