use crate::config::SyncParams;
use crate::core::error::CoreError;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPhase {
    Unloaded,
    Loaded,
    Playing,
    Paused,
}

/// What the controller observed of both media elements this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MediaProbe {
    pub audio_time: f64,
    /// The paired audio is the coordinator's active track and is playing.
    pub audio_playing: bool,
    pub video_time: f64,
    pub video_paused: bool,
    /// The video has buffered enough to start.
    pub video_ready: bool,
}

impl MediaProbe {
    pub fn drift(&self) -> f64 {
        (self.video_time - self.audio_time).abs()
    }
}

/// Commands for the video element, applied in order by the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncCommand {
    Load(String),
    Seek(f64),
    Play,
    Pause,
}

pub type Commands = SmallVec<[SyncCommand; 4]>;

/// Keeps one muted looping video within `tolerance` of its audio.
///
/// `Unloaded -> Loaded -> (Playing <-> Paused)`. Playing is entered only
/// once the video reports enough buffered data; drift under tolerance is
/// left alone. No corrective seek is issued while the video is buffering,
/// and after a divergence the pair waits for the video to report ready
/// again (a not-ready to ready edge or `on_media_ready`) before retrying.
pub struct SyncPair {
    params: SyncParams,
    video_src: Option<String>,
    phase: SyncPhase,
    near_viewport: bool,
    page_visible: bool,
    load_issued: bool,
    play_blocked: bool,
    corrections: u32,
    last_audio_playing: bool,
    last_video_ready: bool,
    awaiting_ready: bool,
}

impl SyncPair {
    pub fn new(video_src: Option<String>, params: SyncParams) -> Self {
        Self {
            params,
            video_src,
            phase: SyncPhase::Unloaded,
            near_viewport: false,
            page_visible: true,
            load_issued: false,
            play_blocked: false,
            corrections: 0,
            last_audio_playing: false,
            last_video_ready: false,
            awaiting_ready: false,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn tolerance(&self) -> f64 {
        self.params.tolerance_sec
    }

    pub fn video_src(&self) -> Option<&str> {
        self.video_src.as_deref()
    }

    pub fn is_blocked(&self) -> bool {
        self.play_blocked
    }

    /// Diverged and waiting for the video to report ready again.
    pub fn is_awaiting_ready(&self) -> bool {
        self.awaiting_ready
    }

    /// The video signalled it can play (`canplay`).
    pub fn on_media_ready(&mut self) {
        self.awaiting_ready = false;
    }

    /// The element came near the viewport; loading is deferred until then.
    pub fn on_viewport(&mut self, near: bool, out: &mut Commands) {
        self.near_viewport = near;
        if near {
            self.issue_load(out);
        }
    }

    /// Page visibility changed. Losing it pauses immediately; regaining it
    /// lets the next tick resume if the audio is still the active track.
    pub fn on_page_visibility(&mut self, visible: bool, out: &mut Commands) {
        self.page_visible = visible;
        if visible {
            self.play_blocked = false;
        } else if self.phase == SyncPhase::Playing {
            self.phase = SyncPhase::Paused;
            out.push(SyncCommand::Pause);
        }
    }

    /// A new audio source became active on this pair.
    pub fn switch_source(&mut self, video_src: Option<String>, out: &mut Commands) {
        if self.phase == SyncPhase::Playing {
            out.push(SyncCommand::Pause);
        }
        self.video_src = video_src;
        self.phase = SyncPhase::Unloaded;
        self.load_issued = false;
        self.play_blocked = false;
        self.awaiting_ready = false;
        self.corrections = 0;
        if self.near_viewport {
            self.issue_load(out);
        }
    }

    /// The platform rejected a play attempt. The audio is left alone.
    pub fn on_play_rejected(&mut self) {
        if self.phase == SyncPhase::Playing {
            self.phase = SyncPhase::Paused;
        }
        self.play_blocked = true;
    }

    /// The video failed to load; stay unloaded until the source changes.
    pub fn on_load_error(&mut self) -> CoreError {
        self.phase = SyncPhase::Unloaded;
        CoreError::AssetLoad(self.video_src.clone().unwrap_or_default())
    }

    /// Per-frame step.
    pub fn tick(&mut self, probe: &MediaProbe, out: &mut Commands) -> Result<(), CoreError> {
        if probe.audio_playing && !self.last_audio_playing {
            self.play_blocked = false;
        }
        self.last_audio_playing = probe.audio_playing;
        if probe.video_ready && !self.last_video_ready {
            self.awaiting_ready = false;
        }
        self.last_video_ready = probe.video_ready;

        if self.phase == SyncPhase::Unloaded {
            if self.load_issued && probe.video_ready {
                self.phase = SyncPhase::Loaded;
            } else {
                return Ok(());
            }
        }

        let want_play = probe.audio_playing && self.page_visible;
        match self.phase {
            SyncPhase::Playing if !want_play => {
                self.phase = SyncPhase::Paused;
                self.corrections = 0;
                out.push(SyncCommand::Pause);
            }
            SyncPhase::Playing => return self.correct(probe, out),
            SyncPhase::Loaded | SyncPhase::Paused => {
                if want_play && probe.video_ready && !self.play_blocked && !self.awaiting_ready {
                    if probe.drift() > self.params.tolerance_sec {
                        out.push(SyncCommand::Seek(probe.audio_time));
                    }
                    out.push(SyncCommand::Play);
                    self.phase = SyncPhase::Playing;
                    self.corrections = 0;
                }
            }
            SyncPhase::Unloaded => {}
        }
        Ok(())
    }

    fn correct(&mut self, probe: &MediaProbe, out: &mut Commands) -> Result<(), CoreError> {
        if probe.drift() <= self.params.tolerance_sec {
            self.corrections = 0;
            if probe.video_paused && probe.video_ready && !self.play_blocked {
                out.push(SyncCommand::Play);
            }
            return Ok(());
        }
        // Seeking a buffering video only restarts its buffering.
        if !probe.video_ready {
            return Ok(());
        }
        self.corrections += 1;
        if self.corrections > self.params.max_corrections {
            let corrections = self.corrections;
            self.corrections = 0;
            self.awaiting_ready = true;
            self.phase = SyncPhase::Paused;
            out.push(SyncCommand::Pause);
            return Err(CoreError::SyncDiverged { corrections });
        }
        out.push(SyncCommand::Seek(probe.audio_time));
        if probe.video_paused {
            out.push(SyncCommand::Play);
        }
        Ok(())
    }

    fn issue_load(&mut self, out: &mut Commands) {
        if self.load_issued {
            return;
        }
        if let Some(src) = &self.video_src {
            out.push(SyncCommand::Load(src.clone()));
            self.load_issued = true;
        }
    }
}
