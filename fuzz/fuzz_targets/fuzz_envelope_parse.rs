#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stackdeck::fuzz_api::{error_from_status, parse_error_envelope};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    status: u16,
    body: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let _ = parse_error_envelope(input.body, input.status);
    let err = error_from_status(input.status, input.body);
    assert_eq!(err.status_code(), input.status);
});
