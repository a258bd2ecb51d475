//! Fuzz target for scenario file parsing.
//!
//! Arbitrary bytes go through both the JSON and TOML front ends and, when
//! they parse, through semantic validation. None of it may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quap_config::{validate_scenarios, ScenarioFile};

fuzz_target!(|data: &[u8]| {
    if let Ok(file) = serde_json::from_slice::<ScenarioFile>(data) {
        let _ = validate_scenarios(&file);
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(file) = ScenarioFile::from_toml_str(text) {
            let _ = validate_scenarios(&file);
        }
    }
});
