// Host-side tests for the analysis feed against a fake audio backend.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod core {
    pub mod coordinator {
        include!("../src/core/coordinator.rs");
    }
    pub mod error {
        include!("../src/core/error.rs");
    }
    pub mod spectrum {
        include!("../src/core/spectrum.rs");
    }
    pub mod feed {
        include!("../src/core/feed.rs");
    }
}

use crate::core::coordinator::*;
use crate::core::error::CoreError;
use crate::core::feed::*;
use std::collections::HashSet;

#[derive(Default)]
struct FakeBackend {
    graph_built: bool,
    fail_graph: bool,
    broken: HashSet<String>,
    connected: Vec<String>,
    taps_created: usize,
    fill: f32,
}

impl AnalysisBackend for FakeBackend {
    type Tap = String;

    fn ensure_graph(&mut self) -> Result<(), CoreError> {
        if self.fail_graph {
            return Err(CoreError::AnalysisUnavailable("no context".into()));
        }
        self.graph_built = true;
        Ok(())
    }

    fn tap_for(&mut self, track: &TrackId) -> Result<String, CoreError> {
        if self.broken.contains(track.as_str()) {
            return Err(CoreError::AnalysisUnavailable(track.to_string()));
        }
        self.taps_created += 1;
        Ok(track.to_string())
    }

    fn connect(&mut self, tap: &String) {
        self.connected.push(tap.clone());
    }

    fn disconnect(&mut self, tap: &String) {
        self.connected.retain(|t| t != tap);
    }

    fn read_db(&mut self, out: &mut [f32]) {
        out.fill(self.fill);
    }
}

fn playing(track: &str) -> PlaybackState {
    PlaybackState {
        active: Some(TrackId::new(track)),
        playing: true,
    }
}

#[test]
fn no_snapshot_until_sampled() {
    let mut feed = AnalysisFeed::new(FakeBackend::default(), 16);
    assert!(feed.latest_snapshot().is_none());
    feed.on_playback(&playing("a.mp3"));
    assert!(feed.latest_snapshot().is_none());
    feed.backend_mut().fill = -20.0;
    feed.sample();
    let snap = feed.latest_snapshot().map(|s| s.db().to_vec());
    assert_eq!(snap, Some(vec![-20.0; 16]));
}

#[test]
fn at_most_one_tap_connected_across_switches() {
    let mut feed = AnalysisFeed::new(FakeBackend::default(), 8);
    for t in ["a.mp3", "b.mp3", "c.mp3", "a.mp3"] {
        feed.on_playback(&playing(t));
        assert_eq!(feed.backend().connected, vec![t.to_string()]);
        assert_eq!(feed.active_track().map(|t| t.as_str()), Some(t));
    }
    feed.on_playback(&PlaybackState::default());
    assert!(feed.backend().connected.is_empty());
    assert!(feed.latest_snapshot().is_none());
}

#[test]
fn reactivating_same_track_keeps_session() {
    let mut feed = AnalysisFeed::new(FakeBackend::default(), 8);
    feed.on_playback(&playing("a.mp3"));
    feed.sample();
    feed.on_playback(&playing("a.mp3"));
    assert_eq!(feed.backend().taps_created, 1);
    assert!(feed.latest_snapshot().is_some());
}

#[test]
fn snapshot_length_fixed_for_session() {
    let mut feed = AnalysisFeed::new(FakeBackend::default(), 32);
    feed.on_playback(&playing("a.mp3"));
    for fill in [-90.0, -10.0, 5.0] {
        feed.backend_mut().fill = fill;
        feed.sample();
        assert_eq!(feed.latest_snapshot().map(|s| s.len()), Some(32));
    }
}

#[test]
fn tap_failure_degrades_to_idle() {
    let mut backend = FakeBackend::default();
    backend.broken.insert("bad.mp3".into());
    let mut feed = AnalysisFeed::new(backend, 8);

    feed.on_playback(&playing("bad.mp3"));
    feed.sample();
    assert!(feed.latest_snapshot().is_none());
    assert!(feed.backend().connected.is_empty());

    // Other tracks still analyse.
    feed.on_playback(&playing("good.mp3"));
    feed.sample();
    assert!(feed.latest_snapshot().is_some());
}

#[test]
fn failed_track_is_not_retried_until_forgotten() {
    let mut backend = FakeBackend::default();
    backend.broken.insert("bad.mp3".into());
    let mut feed = AnalysisFeed::new(backend, 8);
    let bad = TrackId::new("bad.mp3");

    feed.activate(&bad);
    feed.backend_mut().broken.clear();
    feed.activate(&bad);
    assert!(feed.active_track().is_none());

    feed.forget_failure(&bad);
    feed.activate(&bad);
    assert_eq!(feed.active_track(), Some(&bad));
}

#[test]
fn graph_failure_returns_none() {
    let backend = FakeBackend {
        fail_graph: true,
        ..Default::default()
    };
    let mut feed = AnalysisFeed::new(backend, 8);
    feed.on_playback(&playing("a.mp3"));
    feed.sample();
    assert!(feed.latest_snapshot().is_none());
    assert!(!feed.backend().graph_built);
}

#[test]
fn paused_state_disconnects() {
    let mut feed = AnalysisFeed::new(FakeBackend::default(), 8);
    feed.on_playback(&playing("a.mp3"));
    feed.on_playback(&PlaybackState {
        active: Some(TrackId::new("a.mp3")),
        playing: false,
    });
    assert!(feed.backend().connected.is_empty());
}
