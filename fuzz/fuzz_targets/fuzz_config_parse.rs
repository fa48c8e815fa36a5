//! Fuzz target: Curve config and trade record parsing
//!
//! Feeds arbitrary bytes to the JSON decoders for CurveConfig and
//! MarketEvent. Decoding must never panic; a decoded config must either
//! validate into a curve or be rejected, and re-encoding must round-trip.
//!
//! Run: cargo +nightly fuzz run fuzz_config_parse

#![no_main]
use abt_core::{CurveConfig, MarketEvent};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<CurveConfig>(data) {
        let valid = config.validate().is_ok();
        assert_eq!(config.to_curve().is_ok(), valid);

        let encoded = serde_json::to_vec(&config).unwrap();
        let decoded: CurveConfig = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, config);
    }

    if let Ok(event) = serde_json::from_slice::<MarketEvent>(data) {
        let encoded = serde_json::to_string(&event).unwrap();
        let decoded: MarketEvent = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, event);
    }
});
