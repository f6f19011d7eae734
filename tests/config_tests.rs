// Host-side tests for engine configuration and page overrides.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod config {
    include!("../src/config.rs");
}
mod core {
    pub mod error {
        include!("../src/core/error.rs");
    }
}

use crate::config::*;
use crate::constants::*;
use crate::core::error::CoreError;
use std::time::Duration;

#[test]
fn defaults_come_from_constants() {
    let c = EngineConfig::default();
    assert_eq!(c.analysis.bins, ANALYSIS_BINS);
    assert_eq!(c.analysis.fft_size(), 2 * ANALYSIS_BINS as u32);
    assert_eq!(c.waves.strands, STRAND_COUNT);
    assert_eq!(c.waves.bass_release, BASS_RELEASE);
    assert_eq!(c.sync.tolerance_sec, SYNC_TOLERANCE_SEC);
    assert_eq!(c.gate.fade, Duration::from_millis(EFFECT_FADE_MS));
}

#[test]
fn accepts_valid_overrides() {
    let mut c = EngineConfig::default();
    c.apply_override("bins", "256").unwrap();
    c.apply_override("strands", " 3 ").unwrap();
    c.apply_override("sync-tolerance", "0.2").unwrap();
    c.apply_override("fade-ms", "0").unwrap();
    c.apply_override("bass-release", "0.98").unwrap();
    assert_eq!(c.analysis.bins, 256);
    assert_eq!(c.waves.strands, 3);
    assert_eq!(c.sync.tolerance_sec, 0.2);
    assert_eq!(c.gate.fade, Duration::ZERO);
    assert_eq!(c.waves.bass_release, 0.98);
}

#[test]
fn rejects_out_of_range_values() {
    let cases = [
        ("bins", "100"),
        ("bins", "2048"),
        ("bins", "8"),
        ("strands", "0"),
        ("strands", "13"),
        ("sync-tolerance", "0.01"),
        ("sync-tolerance", "abc"),
        ("fade-ms", "-1"),
        ("fade-ms", "10001"),
        ("bass-release", "1.0"),
        ("bass-release", "0"),
        ("bass-release", "NaN"),
        ("colour", "red"),
    ];
    for (key, value) in cases {
        let mut c = EngineConfig::default();
        let err = c.apply_override(key, value);
        assert_eq!(
            err,
            Err(CoreError::InvalidConfig {
                key: key.to_string(),
                value: value.to_string()
            }),
            "{}={}",
            key,
            value
        );
        assert_eq!(c, EngineConfig::default());
    }
}

#[test]
fn with_overrides_keeps_defaults_for_rejected_pairs() {
    let c = EngineConfig::default().with_overrides(vec![
        ("strands", "4".to_string()),
        ("bins", "nope".to_string()),
    ]);
    assert_eq!(c.waves.strands, 4);
    assert_eq!(c.analysis.bins, ANALYSIS_BINS);
}

#[test]
fn every_override_key_is_understood() {
    let samples = ["64", "5", "0.3", "500", "0.5"];
    for (key, value) in OVERRIDE_KEYS.into_iter().zip(samples) {
        let mut c = EngineConfig::default();
        assert!(c.apply_override(key, value).is_ok(), "{}", key);
    }
}
