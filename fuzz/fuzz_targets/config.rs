//! Fuzz target for TOML search configurations.
//!
//! Malformed or hostile config files must produce a parse or validation
//! error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use gcf_search::config::SearchConfig;

fuzz_target!(|text: &str| {
    let Ok(config) = toml::from_str::<SearchConfig>(text) else {
        return;
    };
    if config.validate().is_ok() {
        let _ = config.key_digits();
        let _ = config.polynomials();
    }
});
