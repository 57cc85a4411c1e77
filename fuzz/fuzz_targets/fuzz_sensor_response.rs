//! Fuzz target: `decode_sensor_response`
//!
//! The access-point side parser walks untrusted AD records.  It must never
//! panic, and whatever it accepts must survive a re-encode unchanged.
//!
//! cargo fuzz run fuzz_sensor_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use pawrtag::pawr::codec::{decode_sensor_response, encode_sensor_response};

fuzz_target!(|data: &[u8]| {
    let Ok(reading) = decode_sensor_response(data) else {
        return;
    };

    let reencoded = encode_sensor_response(
        i32::from(reading.temperature_centi_c) * 10,
        u32::from(reading.humidity_centi_pct.min(10_000)) * 10,
        reading.battery_level,
    );
    let again = decode_sensor_response(&reencoded).expect("encoder output must decode");
    assert_eq!(again.temperature_centi_c, reading.temperature_centi_c);
    assert_eq!(again.battery_level, reading.battery_level);
});
