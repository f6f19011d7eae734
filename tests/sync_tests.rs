// Host-side tests for the audio/video sync state machine.
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
    pub mod sync {
        include!("../src/core/sync.rs");
    }
}

use crate::config::SyncParams;
use crate::core::error::CoreError;
use crate::core::sync::*;

fn pair() -> SyncPair {
    SyncPair::new(Some("clip.mp4".into()), SyncParams::default())
}

/// Loaded pair, near the viewport, with the load command consumed.
fn loaded() -> SyncPair {
    let mut p = pair();
    let mut cmds = Commands::new();
    p.on_viewport(true, &mut cmds);
    let probe = MediaProbe {
        video_ready: true,
        video_paused: true,
        ..Default::default()
    };
    p.tick(&probe, &mut cmds).ok();
    assert_eq!(p.phase(), SyncPhase::Loaded);
    p
}

fn playing_probe(audio: f64, video: f64) -> MediaProbe {
    MediaProbe {
        audio_time: audio,
        audio_playing: true,
        video_time: video,
        video_paused: false,
        video_ready: true,
    }
}

/// Run one tick and apply the commands to a simulated video clock.
fn tick_apply(p: &mut SyncPair, probe: &mut MediaProbe) -> Result<Commands, CoreError> {
    let mut cmds = Commands::new();
    let result = p.tick(probe, &mut cmds);
    for c in &cmds {
        match c {
            SyncCommand::Seek(t) => probe.video_time = *t,
            SyncCommand::Play => probe.video_paused = false,
            SyncCommand::Pause => probe.video_paused = true,
            SyncCommand::Load(_) => {}
        }
    }
    result.map(|_| cmds)
}

#[test]
fn stays_unloaded_until_near_viewport() {
    let mut p = pair();
    let mut cmds = Commands::new();
    p.tick(&playing_probe(1.0, 0.0), &mut cmds).ok();
    assert_eq!(p.phase(), SyncPhase::Unloaded);
    assert!(cmds.is_empty());

    p.on_viewport(true, &mut cmds);
    assert_eq!(cmds.as_slice(), &[SyncCommand::Load("clip.mp4".into())]);
    // Only loads once.
    cmds.clear();
    p.on_viewport(false, &mut cmds);
    p.on_viewport(true, &mut cmds);
    assert!(cmds.is_empty());
}

#[test]
fn waits_for_enough_data_before_playing() {
    let mut p = pair();
    let mut cmds = Commands::new();
    p.on_viewport(true, &mut cmds);
    cmds.clear();
    let mut probe = playing_probe(1.0, 0.0);
    probe.video_ready = false;
    probe.video_paused = true;
    p.tick(&probe, &mut cmds).ok();
    assert_eq!(p.phase(), SyncPhase::Unloaded);
    assert!(cmds.is_empty());

    probe.video_ready = true;
    p.tick(&probe, &mut cmds).ok();
    assert_eq!(p.phase(), SyncPhase::Playing);
    assert_eq!(cmds.as_slice(), &[SyncCommand::Seek(1.0), SyncCommand::Play]);
}

#[test]
fn stalled_video_is_corrected_in_one_tick() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();
    assert_eq!(p.phase(), SyncPhase::Playing);

    // Audio advances, video stays frozen.
    probe.audio_time = 2.5;
    let cmds = tick_apply(&mut p, &mut probe).ok();
    assert!(cmds.is_some());
    assert_eq!(probe.video_time, probe.audio_time);
    assert_eq!(probe.drift(), 0.0);
}

#[test]
fn drift_within_tolerance_is_left_alone() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();
    probe.audio_time = 5.0;
    probe.video_time = 5.0 + p.tolerance() * 0.5;
    let cmds = tick_apply(&mut p, &mut probe).ok();
    assert_eq!(cmds.map(|c| c.len()), Some(0));
}

#[test]
fn audio_pause_pauses_video() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();
    probe.audio_playing = false;
    let cmds = tick_apply(&mut p, &mut probe).ok();
    assert_eq!(p.phase(), SyncPhase::Paused);
    assert_eq!(cmds.map(|c| c.to_vec()), Some(vec![SyncCommand::Pause]));

    probe.audio_playing = true;
    tick_apply(&mut p, &mut probe).ok();
    assert_eq!(p.phase(), SyncPhase::Playing);
}

#[test]
fn hidden_page_pauses_and_resumes_on_return() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();

    let mut cmds = Commands::new();
    p.on_page_visibility(false, &mut cmds);
    assert_eq!(p.phase(), SyncPhase::Paused);
    assert_eq!(cmds.as_slice(), &[SyncCommand::Pause]);

    // Still hidden: no resume.
    tick_apply(&mut p, &mut probe).ok();
    assert_eq!(p.phase(), SyncPhase::Paused);

    cmds.clear();
    p.on_page_visibility(true, &mut cmds);
    tick_apply(&mut p, &mut probe).ok();
    assert_eq!(p.phase(), SyncPhase::Playing);
}

#[test]
fn rejected_play_is_not_retried_every_frame() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();
    p.on_play_rejected();
    assert!(p.is_blocked());
    assert_eq!(p.phase(), SyncPhase::Paused);

    probe.video_paused = true;
    let cmds = tick_apply(&mut p, &mut probe).ok();
    assert_eq!(cmds.map(|c| c.len()), Some(0));

    // A fresh audio play edge clears the block.
    probe.audio_playing = false;
    tick_apply(&mut p, &mut probe).ok();
    probe.audio_playing = true;
    tick_apply(&mut p, &mut probe).ok();
    assert!(!p.is_blocked());
    assert_eq!(p.phase(), SyncPhase::Playing);
}

#[test]
fn repeated_failed_seeks_diverge_and_pause() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();

    let mut cmds = Commands::new();
    let max = SyncParams::default().max_corrections;
    for n in 1..=max {
        cmds.clear();
        // Each seek lands but the video does not advance.
        let frozen = playing_probe(n as f64, 0.0);
        assert!(p.tick(&frozen, &mut cmds).is_ok());
        assert_eq!(cmds[0], SyncCommand::Seek(n as f64));
    }
    cmds.clear();
    let err = p.tick(&playing_probe(99.0, 0.0), &mut cmds);
    assert_eq!(err, Err(CoreError::SyncDiverged { corrections: max + 1 }));
    assert_eq!(p.phase(), SyncPhase::Paused);
    assert!(p.is_awaiting_ready());
    assert_eq!(cmds.as_slice(), &[SyncCommand::Pause]);

    // Still reporting ready from before: keep waiting.
    cmds.clear();
    p.tick(&playing_probe(100.0, 0.0), &mut cmds).ok();
    assert_eq!(p.phase(), SyncPhase::Paused);
    assert!(cmds.is_empty());

    // The video drops to buffering, then reports ready again.
    let mut buffering = playing_probe(101.0, 0.0);
    buffering.video_ready = false;
    p.tick(&buffering, &mut cmds).ok();
    assert!(cmds.is_empty());
    p.tick(&playing_probe(102.0, 0.0), &mut cmds).ok();
    assert!(!p.is_awaiting_ready());
    assert_eq!(p.phase(), SyncPhase::Playing);
    assert_eq!(cmds.as_slice(), &[SyncCommand::Seek(102.0), SyncCommand::Play]);
}

#[test]
fn stalled_but_ready_video_diverges_once_and_stops_seeking() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();

    let (mut seeks, mut divergences) = (0, 0);
    for n in 1..=60 {
        let mut cmds = Commands::new();
        if p.tick(&playing_probe(n as f64, 0.0), &mut cmds).is_err() {
            divergences += 1;
        }
        seeks += cmds
            .iter()
            .filter(|c| matches!(c, SyncCommand::Seek(_)))
            .count();
    }
    assert_eq!(divergences, 1);
    assert_eq!(seeks, SyncParams::default().max_corrections as usize);
}

#[test]
fn canplay_after_divergence_allows_a_retry() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();
    let mut cmds = Commands::new();
    for n in 1..=SyncParams::default().max_corrections + 1 {
        p.tick(&playing_probe(n as f64, 0.0), &mut cmds).ok();
    }
    assert!(p.is_awaiting_ready());

    p.on_media_ready();
    cmds.clear();
    p.tick(&playing_probe(50.0, 0.0), &mut cmds).ok();
    assert_eq!(p.phase(), SyncPhase::Playing);
    assert_eq!(cmds.as_slice(), &[SyncCommand::Seek(50.0), SyncCommand::Play]);
}

#[test]
fn no_corrective_seek_while_buffering() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();

    let mut cmds = Commands::new();
    for n in 1..=30 {
        let mut buffering = playing_probe(n as f64, 0.0);
        buffering.video_ready = false;
        assert!(p.tick(&buffering, &mut cmds).is_ok());
    }
    assert!(cmds.is_empty());
    assert_eq!(p.phase(), SyncPhase::Playing);

    // Buffered again: one seek catches up.
    p.tick(&playing_probe(31.0, 0.0), &mut cmds).ok();
    assert_eq!(cmds.as_slice(), &[SyncCommand::Seek(31.0)]);
}

#[test]
fn switching_source_resets_and_reloads() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();

    let mut cmds = Commands::new();
    p.switch_source(Some("other.mp4".into()), &mut cmds);
    assert_eq!(p.phase(), SyncPhase::Unloaded);
    assert_eq!(p.video_src(), Some("other.mp4"));
    assert_eq!(
        cmds.as_slice(),
        &[SyncCommand::Pause, SyncCommand::Load("other.mp4".into())]
    );

    cmds.clear();
    p.switch_source(None, &mut cmds);
    assert!(cmds.is_empty());
    assert_eq!(p.video_src(), None);
}

#[test]
fn switching_source_clears_the_divergence_wait() {
    let mut p = loaded();
    let mut probe = playing_probe(0.0, 0.0);
    tick_apply(&mut p, &mut probe).ok();
    let mut cmds = Commands::new();
    for n in 1..=SyncParams::default().max_corrections + 1 {
        p.tick(&playing_probe(n as f64, 0.0), &mut cmds).ok();
    }
    assert!(p.is_awaiting_ready());

    p.switch_source(Some("other.mp4".into()), &mut cmds);
    assert!(!p.is_awaiting_ready());
}

#[test]
fn load_error_stays_unloaded() {
    let mut p = loaded();
    let err = p.on_load_error();
    assert_eq!(err, CoreError::AssetLoad("clip.mp4".into()));
    assert_eq!(p.phase(), SyncPhase::Unloaded);
}
