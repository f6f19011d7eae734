use crate::core::coordinator::{PlaybackState, TrackId};
use crate::core::error::CoreError;
use crate::core::spectrum::FrequencySnapshot;
use fnv::FnvHashSet;

/// Platform side of the analysis graph: one shared graph, one tap per
/// media element.
pub trait AnalysisBackend {
    type Tap: Clone;

    /// Build the shared graph if it does not exist yet. Called on every
    /// activation; only the first successful call does any work.
    fn ensure_graph(&mut self) -> Result<(), CoreError>;

    /// Create (or look up) the tap for `track`'s media element.
    fn tap_for(&mut self, track: &TrackId) -> Result<Self::Tap, CoreError>;

    fn connect(&mut self, tap: &Self::Tap);

    fn disconnect(&mut self, tap: &Self::Tap);

    /// Write the current dB magnitudes into `out`.
    fn read_db(&mut self, out: &mut [f32]);
}

struct Session<T> {
    track: TrackId,
    tap: T,
    snapshot: FrequencySnapshot,
    scratch: Vec<f32>,
}

/// Live frequency snapshots from whichever track the coordinator marks
/// active. At most one tap is connected at any time.
pub struct AnalysisFeed<B: AnalysisBackend> {
    backend: B,
    bins: usize,
    session: Option<Session<B::Tap>>,
    unavailable: FnvHashSet<TrackId>,
    sampled: bool,
}

impl<B: AnalysisBackend> AnalysisFeed<B> {
    pub fn new(backend: B, bins: usize) -> Self {
        Self {
            backend,
            bins,
            session: None,
            unavailable: FnvHashSet::default(),
            sampled: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn active_track(&self) -> Option<&TrackId> {
        self.session.as_ref().map(|s| &s.track)
    }

    /// Follow a coordinator state change.
    pub fn on_playback(&mut self, state: &PlaybackState) {
        match (&state.active, state.playing) {
            (Some(track), true) => self.activate(track),
            _ => self.deactivate(),
        }
    }

    pub fn activate(&mut self, track: &TrackId) {
        if self.active_track() == Some(track) {
            return;
        }
        self.deactivate();
        if self.unavailable.contains(track) {
            return;
        }
        let tap = match self
            .backend
            .ensure_graph()
            .and_then(|_| self.backend.tap_for(track))
        {
            Ok(tap) => tap,
            Err(e) => {
                log::warn!("[feed] {}; rendering idle for {}", e, track);
                self.unavailable.insert(track.clone());
                return;
            }
        };
        self.backend.connect(&tap);
        log::info!("[feed] session start {} ({} bins)", track, self.bins);
        self.session = Some(Session {
            track: track.clone(),
            tap,
            snapshot: FrequencySnapshot::silent(self.bins),
            scratch: vec![0.0; self.bins],
        });
        self.sampled = false;
    }

    /// Disconnect the current tap; the shared graph stays alive.
    pub fn deactivate(&mut self) {
        if let Some(session) = self.session.take() {
            self.backend.disconnect(&session.tap);
            log::info!("[feed] session end {}", session.track);
        }
        self.sampled = false;
    }

    /// Capture one snapshot; call once per animation frame.
    pub fn sample(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        self.backend.read_db(&mut session.scratch);
        session.snapshot.refill(&session.scratch);
        self.sampled = true;
    }

    /// Latest snapshot, or `None` when nothing plays or analysis failed.
    pub fn latest_snapshot(&self) -> Option<&FrequencySnapshot> {
        if !self.sampled {
            return None;
        }
        self.session.as_ref().map(|s| &s.snapshot)
    }

    /// Forget a track's tap failure so a later activation retries it.
    pub fn forget_failure(&mut self, track: &TrackId) {
        self.unavailable.remove(track);
    }
}
