// Host-side tests for playlist stepping and disposal scopes.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod core {
    pub mod coordinator {
        include!("../src/core/coordinator.rs");
    }
    pub mod playlist {
        include!("../src/core/playlist.rs");
    }
    pub mod scope {
        include!("../src/core/scope.rs");
    }
}

use crate::core::coordinator::TrackId;
use crate::core::playlist::*;
use crate::core::scope::Scope;
use std::cell::RefCell;
use std::rc::Rc;

fn entry(src: &str) -> TrackEntry {
    TrackEntry {
        track: TrackId::new(src),
        video: None,
    }
}

fn three() -> Playlist {
    let mut p = Playlist::new(entry("a.mp3"));
    p.push(entry("b.mp3"));
    p.push(entry("c.mp3"));
    p
}

#[test]
fn push_ignores_duplicates() {
    let mut p = three();
    p.push(entry("b.mp3"));
    assert_eq!(p.len(), 3);
    assert_eq!(p.position_of(&TrackId::new("c.mp3")), Some(2));
}

#[test]
fn next_and_previous_do_not_wrap() {
    let mut p = three();
    assert!(p.previous().is_none());
    assert_eq!(p.index(), 0);
    assert_eq!(p.next().map(|e| e.track.as_str()), Some("b.mp3"));
    assert_eq!(p.next().map(|e| e.track.as_str()), Some("c.mp3"));
    assert!(p.next().is_none());
    assert_eq!(p.index(), 2);
    assert!(!p.has_next());
    assert!(p.has_previous());
}

#[test]
fn track_end_wraps_to_first() {
    let mut p = three();
    p.select(2);
    assert_eq!(
        p.advance_wrapping().map(|e| e.track.as_str()),
        Some("a.mp3")
    );
    assert_eq!(p.index(), 0);
}

#[test]
fn select_out_of_range_keeps_current() {
    let mut p = three();
    p.select(1);
    assert!(p.select(7).is_none());
    assert_eq!(p.index(), 1);
    assert_eq!(p.entry(2).map(|e| e.track.as_str()), Some("c.mp3"));
}

#[test]
fn scope_disposes_newest_first_exactly_once() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut scope = Scope::new();
    for i in 0..3 {
        let log = log.clone();
        scope.defer(move || log.borrow_mut().push(i));
    }
    assert_eq!(scope.len(), 3);
    scope.dispose();
    scope.dispose();
    assert_eq!(*log.borrow(), vec![2, 1, 0]);
    assert!(scope.is_empty());
}

#[test]
fn dropping_scope_releases_held_guards() {
    struct Guard(Rc<RefCell<bool>>);
    impl Drop for Guard {
        fn drop(&mut self) {
            *self.0.borrow_mut() = true;
        }
    }
    let released = Rc::new(RefCell::new(false));
    {
        let mut scope = Scope::new();
        scope.hold(Guard(released.clone()));
        assert!(!*released.borrow());
    }
    assert!(*released.borrow());
}
