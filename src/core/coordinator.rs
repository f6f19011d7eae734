use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Opaque identifier of a playable resource (its source URI).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrackId(Rc<str>);

impl TrackId {
    pub fn new(uri: &str) -> Self {
        Self(Rc::from(uri))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

/// Which track, if any, is audible. `playing` implies `active.is_some()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub active: Option<TrackId>,
    pub playing: bool,
}

impl PlaybackState {
    pub fn is_active(&self, track: &TrackId) -> bool {
        self.active.as_ref() == Some(track)
    }

    pub fn is_playing(&self, track: &TrackId) -> bool {
        self.playing && self.is_active(track)
    }
}

type Listener = Rc<dyn Fn(&PlaybackState)>;

struct Inner {
    state: RefCell<PlaybackState>,
    listeners: RefCell<SmallVec<[(u64, Listener); 8]>>,
    next_id: Cell<u64>,
    notifying: Cell<bool>,
    // Set when a listener mutates the state mid-delivery.
    dirty: Cell<bool>,
}

/// Process-wide authority on the audible track.
///
/// Cloning yields another handle to the same state. Every mutation notifies
/// all subscribers synchronously, in registration order, before returning.
/// Subscribers may call back into the coordinator: no borrow is held while
/// they run, and a mutation made by a subscriber restarts delivery with the
/// new state, so no subscriber is left holding a superseded one.
#[derive(Clone)]
pub struct PlaybackCoordinator {
    inner: Rc<Inner>,
}

impl Default for PlaybackCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackCoordinator {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(PlaybackState::default()),
                listeners: RefCell::new(SmallVec::new()),
                next_id: Cell::new(0),
                notifying: Cell::new(false),
                dirty: Cell::new(false),
            }),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.state.borrow().clone()
    }

    pub fn is_any_playing(&self) -> bool {
        self.inner.state.borrow().playing
    }

    pub fn request_play(&self, track: &TrackId) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.active.as_ref() == Some(track) {
                return;
            }
            if let Some(prev) = &state.active {
                log::debug!("[coordinator] {} -> {}", prev, track);
            }
            state.active = Some(track.clone());
            state.playing = true;
        }
        self.notify();
    }

    pub fn stop(&self, track: &TrackId) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.active.as_ref() != Some(track) {
                return;
            }
            state.active = None;
            state.playing = false;
        }
        self.notify();
    }

    /// Clears state unconditionally; used on navigation and page unload.
    pub fn stop_all(&self) {
        *self.inner.state.borrow_mut() = PlaybackState::default();
        self.notify();
    }

    pub fn subscribe(&self, listener: impl Fn(&PlaybackState) + 'static) -> Subscription {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Subscription {
            id,
            owner: Rc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self) {
        let inner = &self.inner;
        if inner.notifying.get() {
            inner.dirty.set(true);
            return;
        }
        inner.notifying.set(true);
        'deliver: loop {
            inner.dirty.set(false);
            let state = self.state();
            let listeners: SmallVec<[Listener; 8]> = inner
                .listeners
                .borrow()
                .iter()
                .map(|(_, l)| l.clone())
                .collect();
            for listener in listeners {
                listener(&state);
                if inner.dirty.get() {
                    continue 'deliver;
                }
            }
            break;
        }
        inner.notifying.set(false);
    }
}

/// Registration handle; unsubscribes when dropped.
pub struct Subscription {
    id: u64,
    owner: Weak<Inner>,
}

impl Subscription {
    /// Explicit form of dropping the handle; `Drop` does the removal.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.owner.upgrade() {
            inner.listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}
