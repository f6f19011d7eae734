/// Collects release actions for everything a component acquires while
/// mounted. `dispose` runs them newest-first, exactly once; dropping the
/// scope disposes it as well, so abnormal teardown releases too.
#[derive(Default)]
pub struct Scope {
    disposers: Vec<Box<dyn FnOnce()>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&mut self, release: impl FnOnce() + 'static) {
        self.disposers.push(Box::new(release));
    }

    /// Keep a guard alive until disposal (listeners, loops, subscriptions).
    pub fn hold<T: 'static>(&mut self, guard: T) {
        self.defer(move || drop(guard));
    }

    pub fn len(&self) -> usize {
        self.disposers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disposers.is_empty()
    }

    pub fn dispose(&mut self) {
        while let Some(release) = self.disposers.pop() {
            release();
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.dispose();
    }
}
