use crate::core::coordinator::{PlaybackCoordinator, PlaybackState, Subscription, TrackId};
use crate::core::error::CoreError;
use crate::core::playlist::{Playlist, TrackEntry};
use std::cell::{Cell, RefCell};

/// One play attempt. Any later play, pause or track switch on the same
/// session supersedes it, and a superseded attempt's rejection is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayTicket(u64);

#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Unchanged,
    Switched(TrackEntry),
    OutOfRange,
}

/// Playback bookkeeping of one mounted player, independent of the DOM:
/// the playlist, the coordinator subscription and the play-attempt
/// generation.
///
/// All methods take `&self`. No borrow is held across a coordinator call,
/// so the subscribed listener may read the session while it is notified.
pub struct WidgetSession {
    coordinator: PlaybackCoordinator,
    playlist: RefCell<Playlist>,
    subscription: RefCell<Option<Subscription>>,
    generation: Cell<u64>,
}

impl WidgetSession {
    pub fn new(coordinator: &PlaybackCoordinator, first: TrackEntry) -> Self {
        Self {
            coordinator: coordinator.clone(),
            playlist: RefCell::new(Playlist::new(first)),
            subscription: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    /// Follow coordinator changes until `teardown`. Replaces any earlier
    /// listener.
    pub fn attach(&self, listener: impl Fn(&PlaybackState) + 'static) {
        let sub = self.coordinator.subscribe(listener);
        *self.subscription.borrow_mut() = Some(sub);
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    pub fn current_track(&self) -> Option<TrackId> {
        self.playlist.borrow().current().map(|e| e.track.clone())
    }

    /// The current track is the coordinator's playing track.
    pub fn is_active(&self) -> bool {
        match self.current_track() {
            Some(track) => self.coordinator.state().is_playing(&track),
            None => false,
        }
    }

    fn bump(&self) -> PlayTicket {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        PlayTicket(next)
    }

    /// Start a play attempt for the current track.
    pub fn begin_play(&self) -> Option<(TrackId, PlayTicket)> {
        let track = self.current_track()?;
        let ticket = self.bump();
        self.coordinator.request_play(&track);
        Some((track, ticket))
    }

    /// The element started playing on its own (native controls). Claims the
    /// active slot without superseding a pending attempt.
    pub fn claim(&self) -> Option<TrackId> {
        let track = self.current_track()?;
        self.coordinator.request_play(&track);
        Some(track)
    }

    /// Pause or native stop: supersede pending attempts, release the slot.
    pub fn stop(&self) {
        self.bump();
        if let Some(track) = self.current_track() {
            self.coordinator.stop(&track);
        }
    }

    /// A play attempt was rejected. Aborted attempts (interrupted by a
    /// pause or a new source) and superseded ones change nothing; a current
    /// denial releases the slot and is returned for logging.
    pub fn on_play_rejected(
        &self,
        ticket: PlayTicket,
        track: &TrackId,
        aborted: bool,
        reason: &str,
    ) -> Option<CoreError> {
        if aborted || ticket.0 != self.generation.get() {
            log::debug!("[player] superseded play of {} settled: {}", track, reason);
            return None;
        }
        self.coordinator.stop(track);
        Some(CoreError::PlaybackDenied {
            track: track.to_string(),
            reason: reason.to_string(),
        })
    }

    /// Move the selection to `index`, releasing the old track's slot.
    pub fn select(&self, index: usize) -> Selection {
        let old = self.current_track();
        let selected = self.playlist.borrow_mut().select(index).cloned();
        let Some(entry) = selected else {
            return Selection::OutOfRange;
        };
        if old.as_ref() == Some(&entry.track) {
            return Selection::Unchanged;
        }
        self.bump();
        if let Some(old) = &old {
            self.coordinator.stop(old);
        }
        Selection::Switched(entry)
    }

    /// Track end: the next entry, wrapping to the first.
    pub fn advance_wrapping(&self) -> Option<TrackEntry> {
        self.playlist.borrow_mut().advance_wrapping().cloned()
    }

    pub fn push(&self, entry: TrackEntry) {
        self.playlist.borrow_mut().push(entry);
    }

    pub fn index(&self) -> usize {
        self.playlist.borrow().index()
    }

    pub fn len(&self) -> usize {
        self.playlist.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.borrow().is_empty()
    }

    pub fn tracks(&self) -> Vec<TrackId> {
        let playlist = self.playlist.borrow();
        (0..playlist.len())
            .filter_map(|i| playlist.entry(i).map(|e| e.track.clone()))
            .collect()
    }

    /// Stop the current track if it holds the slot, drop the subscription
    /// and return every playlist track so the caller can release its taps.
    pub fn teardown(&self) -> Vec<TrackId> {
        self.stop();
        self.subscription.borrow_mut().take();
        self.tracks()
    }
}

/// Seek target within `[0, duration]`; an unknown duration only clamps
/// below.
pub fn clamp_seek(time: f64, duration: f64) -> f64 {
    if !time.is_finite() {
        return 0.0;
    }
    let time = time.max(0.0);
    if duration.is_finite() && duration > 0.0 {
        time.min(duration)
    } else {
        time
    }
}

pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}

/// Media duration with the "not loaded" (NaN) and "stream" (infinite)
/// cases reported as zero.
pub fn media_duration(raw: f64) -> f64 {
    if raw.is_finite() {
        raw
    } else {
        0.0
    }
}
