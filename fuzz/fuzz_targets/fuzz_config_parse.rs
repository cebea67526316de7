#![no_main]

use libfuzzer_sys::fuzz_target;
use stackdeck::config::ConsoleConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(v) = serde_json::from_slice::<serde_json::Value>(data)
        && let Ok(config) = serde_json::from_value::<ConsoleConfig>(v)
    {
        let _ = config.validate();
    }
});
