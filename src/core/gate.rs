use crate::core::coordinator::{PlaybackCoordinator, Subscription};
use crate::core::timer::{Scheduler, TimerHandle};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectPhase {
    Idle,
    Active,
    /// Playback stopped; the effect is fading out and goes idle when the
    /// fade timer fires unless playback resumes first.
    FadingOut,
}

impl EffectPhase {
    pub fn is_active(self) -> bool {
        self != EffectPhase::Idle
    }
}

type PhaseListener = Rc<dyn Fn(EffectPhase)>;

struct GateInner {
    phase: Cell<EffectPhase>,
    fade: Duration,
    scheduler: Rc<dyn Scheduler>,
    pending: RefCell<Option<TimerHandle>>,
    listeners: RefCell<Vec<PhaseListener>>,
}

impl GateInner {
    fn set_phase(&self, phase: EffectPhase) {
        if self.phase.replace(phase) == phase {
            return;
        }
        log::debug!("[gate] {:?}", phase);
        let listeners: Vec<PhaseListener> = self.listeners.borrow().clone();
        for l in listeners {
            l(phase);
        }
    }
}

/// Debounced "ambient effect active" flag derived from `is_playing`.
/// Turning on is immediate; turning off waits `fade`, and the wait is
/// cancelled if playback resumes.
#[derive(Clone)]
pub struct BackgroundEffectGate {
    inner: Rc<GateInner>,
}

impl BackgroundEffectGate {
    pub fn new(scheduler: Rc<dyn Scheduler>, fade: Duration) -> Self {
        Self {
            inner: Rc::new(GateInner {
                phase: Cell::new(EffectPhase::Idle),
                fade,
                scheduler,
                pending: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn phase(&self) -> EffectPhase {
        self.inner.phase.get()
    }

    pub fn is_active(&self) -> bool {
        self.phase().is_active()
    }

    pub fn on_change(&self, listener: impl Fn(EffectPhase) + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn set_playing(&self, playing: bool) {
        let inner = &self.inner;
        if playing {
            // Dropping the handle cancels a pending fade.
            inner.pending.borrow_mut().take();
            inner.set_phase(EffectPhase::Active);
            return;
        }
        if inner.phase.get() != EffectPhase::Active {
            return;
        }
        inner.set_phase(EffectPhase::FadingOut);
        let weak: Weak<GateInner> = Rc::downgrade(inner);
        let handle = inner.scheduler.schedule(
            inner.fade,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    if inner.phase.get() == EffectPhase::FadingOut {
                        inner.set_phase(EffectPhase::Idle);
                    }
                }
            }),
        );
        // A previously fired handle is dropped here, outside its own task.
        *inner.pending.borrow_mut() = Some(handle);
    }

    /// Follow the coordinator's `playing` flag.
    pub fn attach(&self, coordinator: &PlaybackCoordinator) -> Subscription {
        let gate = self.clone();
        self.set_playing(coordinator.is_any_playing());
        coordinator.subscribe(move |state| gate.set_playing(state.playing))
    }

    /// Cancel any pending fade and go idle at once (teardown).
    pub fn shutdown(&self) {
        self.inner.pending.borrow_mut().take();
        self.inner.set_phase(EffectPhase::Idle);
    }
}
