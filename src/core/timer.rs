use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Pending,
    Fired,
    Cancelled,
}

/// Shared between a scheduled task and its handle.
#[derive(Clone, Debug)]
pub struct CancelToken(Rc<Cell<TimerState>>);

impl Default for CancelToken {
    fn default() -> Self {
        Self(Rc::new(Cell::new(TimerState::Pending)))
    }
}

impl CancelToken {
    pub fn state(&self) -> TimerState {
        self.0.get()
    }

    /// Wrap `task` so it runs at most once and never after cancellation.
    pub fn guard(&self, task: Box<dyn FnOnce()>) -> Box<dyn FnOnce()> {
        let token = self.clone();
        Box::new(move || {
            if token.state() == TimerState::Pending {
                token.0.set(TimerState::Fired);
                task();
            }
        })
    }

    fn cancel(&self) -> bool {
        if self.state() == TimerState::Pending {
            self.0.set(TimerState::Cancelled);
            true
        } else {
            false
        }
    }
}

/// A scheduled task. Cancelling or dropping a pending handle stops the task
/// from running and releases the host timer.
pub struct TimerHandle {
    token: CancelToken,
    release: Option<Box<dyn FnOnce()>>,
}

impl TimerHandle {
    pub fn new(token: CancelToken, release: impl FnOnce() + 'static) -> Self {
        Self {
            token,
            release: Some(Box::new(release)),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.token.state() == TimerState::Pending
    }

    pub fn state(&self) -> TimerState {
        self.token.state()
    }

    /// Explicit form of dropping the handle; `Drop` cancels and releases.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle;
}
