use crate::config::SyncParams;
use crate::constants::{HAVE_FUTURE_DATA, LAZY_LOAD_MARGIN, LAZY_LOAD_THRESHOLD};
use crate::core::{
    clamp_seek, clamp_volume, media_duration, Commands, CoreError, MediaProbe, PlayTicket,
    PlaybackCoordinator, PlaybackState, Scope, Selection, SyncCommand, SyncPair, TrackEntry,
    TrackId, WidgetSession,
};
use crate::dom::{EventListener, IntersectionWatch};
use crate::events::navigation;
use crate::frame::{AnimationLoop, SharedFeed};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// The source URI a page gave an element, falling back to the resolved one.
pub fn media_src(el: &web::HtmlMediaElement) -> String {
    el.get_attribute("src")
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| el.src())
}

struct PlayerInner {
    audio: web::HtmlAudioElement,
    video: Option<web::HtmlVideoElement>,
    session: WidgetSession,
    feed: SharedFeed,
    sync: RefCell<Option<SyncPair>>,
}

// The `sync` borrow is never held across session calls: the coordinator
// notifies synchronously and `on_playback` runs inside them.
impl PlayerInner {
    fn current_track(&self) -> Option<TrackId> {
        self.session.current_track()
    }

    fn is_playing(&self) -> bool {
        self.session.is_active() && !self.audio.paused()
    }

    /// Point the feed at this element for `track`; an earlier failure (for
    /// instance a play requested before any element was bound) is retried.
    fn register(&self, track: &TrackId) {
        let mut feed = self.feed.borrow_mut();
        feed.backend_mut().register(track, &self.audio);
        feed.forget_failure(track);
    }

    fn play(self: &Rc<Self>) {
        let Some(track) = self.current_track() else {
            return;
        };
        self.register(&track);
        let Some((track, ticket)) = self.session.begin_play() else {
            return;
        };
        let promise = match self.audio.play() {
            Ok(p) => p,
            Err(e) => {
                self.deny(ticket, &track, e);
                return;
            }
        };
        let inner = Rc::downgrade(self);
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                if let Some(inner) = inner.upgrade() {
                    inner.deny(ticket, &track, e);
                }
            }
        });
    }

    fn deny(&self, ticket: PlayTicket, track: &TrackId, reason: JsValue) {
        let aborted = reason
            .dyn_ref::<web::DomException>()
            .map_or(false, |e| e.name() == "AbortError");
        let reason = format!("{:?}", reason);
        if let Some(err) = self.session.on_play_rejected(ticket, track, aborted, &reason) {
            log::warn!("[player] {}", err);
        }
    }

    fn pause(&self) {
        _ = self.audio.pause();
        self.session.stop();
    }

    fn toggle(self: &Rc<Self>) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Switch to playlist entry `index`, playing it if the old one was.
    fn select(self: &Rc<Self>, index: usize) -> bool {
        let was_playing = self.is_playing();
        match self.session.select(index) {
            Selection::OutOfRange => false,
            Selection::Unchanged => true,
            Selection::Switched(entry) => {
                self.load(&entry);
                if was_playing {
                    self.play();
                }
                true
            }
        }
    }

    fn step(self: &Rc<Self>, forward: bool) -> bool {
        let index = self.session.index();
        let target = if forward {
            index + 1
        } else {
            match index.checked_sub(1) {
                Some(i) => i,
                None => return false,
            }
        };
        self.select(target)
    }

    fn load(self: &Rc<Self>, entry: &TrackEntry) {
        self.audio.set_src(entry.track.as_str());
        self.audio.load();
        self.mark_state(None);
        let video = entry.video.clone();
        self.with_sync(|sync, cmds| sync.switch_source(video, cmds));
        log::debug!("[player] loaded {}", entry.track);
    }

    fn on_playback(&self, state: &PlaybackState) {
        let Some(track) = self.current_track() else {
            return;
        };
        if !state.is_active(&track) && !self.audio.paused() {
            _ = self.audio.pause();
        }
    }

    /// Reconcile a pause the element reported on its own (native controls,
    /// end of media, pauses requested by `on_playback`).
    fn on_paused(&self) {
        if self.audio.paused() {
            self.session.stop();
        }
    }

    fn on_ended(self: &Rc<Self>) {
        if let Some(entry) = self.session.advance_wrapping() {
            self.load(&entry);
            self.play();
        }
    }

    fn on_audio_error(&self) {
        if let Some(track) = self.current_track() {
            log::warn!("[player] {}", CoreError::AssetLoad(track.to_string()));
        }
        self.session.stop();
        self.mark_state(Some("error"));
    }

    fn on_video_error(&self) {
        let err = self.sync.borrow_mut().as_mut().map(|sync| sync.on_load_error());
        if let Some(err) = err {
            log::warn!("[sync] {}", err);
        }
    }

    fn mark_state(&self, state: Option<&str>) {
        if let Some(el) = self.audio.parent_element() {
            _ = match state {
                Some(s) => el.set_attribute("data-state", s),
                None => el.remove_attribute("data-state"),
            };
        }
    }

    fn sync_tick(self: &Rc<Self>) {
        let Some(video) = &self.video else {
            return;
        };
        let probe = MediaProbe {
            audio_time: self.audio.current_time(),
            audio_playing: self.is_playing(),
            video_time: video.current_time(),
            video_paused: video.paused(),
            video_ready: video.ready_state() >= HAVE_FUTURE_DATA,
        };
        let mut cmds = Commands::new();
        let result = match self.sync.borrow_mut().as_mut() {
            Some(sync) => sync.tick(&probe, &mut cmds),
            None => return,
        };
        if let Err(e) = result {
            log::warn!("[sync] {}; waiting for video", e);
        }
        self.apply(cmds);
    }

    fn with_sync(self: &Rc<Self>, f: impl FnOnce(&mut SyncPair, &mut Commands)) {
        let mut cmds = Commands::new();
        if let Some(sync) = self.sync.borrow_mut().as_mut() {
            f(sync, &mut cmds);
        }
        self.apply(cmds);
    }

    fn apply(self: &Rc<Self>, cmds: Commands) {
        let Some(video) = &self.video else {
            return;
        };
        for cmd in cmds {
            match cmd {
                SyncCommand::Load(src) => {
                    video.set_src(&src);
                    video.load();
                }
                SyncCommand::Seek(t) => video.set_current_time(t),
                SyncCommand::Pause => {
                    _ = video.pause();
                }
                SyncCommand::Play => self.play_video(video),
            }
        }
    }

    fn play_video(self: &Rc<Self>, video: &web::HtmlVideoElement) {
        let promise = match video.play() {
            Ok(p) => p,
            Err(e) => {
                self.reject_video(e);
                return;
            }
        };
        let inner = Rc::downgrade(self);
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                if let Some(inner) = inner.upgrade() {
                    inner.reject_video(e);
                }
            }
        });
    }

    fn reject_video(&self, reason: JsValue) {
        log::warn!("[sync] video play rejected: {:?}", reason);
        if let Some(sync) = self.sync.borrow_mut().as_mut() {
            sync.on_play_rejected();
        }
    }
}

/// One mounted player: an audio element, its optional video overlay and a
/// playlist. Every listener, loop and subscription it acquires lives in its
/// scope and is released by `unmount` or drop.
pub struct PlayerWidget {
    inner: Rc<PlayerInner>,
    scope: Scope,
}

impl PlayerWidget {
    pub fn mount(
        audio: web::HtmlAudioElement,
        video: Option<web::HtmlVideoElement>,
        coordinator: &PlaybackCoordinator,
        feed: SharedFeed,
        sync_params: SyncParams,
    ) -> Result<Self, JsValue> {
        let document = crate::dom::window_document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let video_src = video.as_ref().and_then(|v| {
            v.get_attribute("data-src")
                .filter(|s| !s.is_empty())
                .or_else(|| Some(media_src(v)).filter(|s| !s.is_empty()))
        });
        let first = TrackEntry {
            track: TrackId::new(&media_src(&audio)),
            video: video_src.clone(),
        };
        if let Some(v) = &video {
            v.set_muted(true);
            v.set_loop(true);
            _ = v.set_attribute("playsinline", "");
            // The source is assigned once the element nears the viewport.
            if v.get_attribute("data-src").is_some() {
                _ = v.remove_attribute("src");
            }
        }
        let sync = video
            .as_ref()
            .map(|_| SyncPair::new(video_src.clone(), sync_params));
        let inner = Rc::new(PlayerInner {
            audio,
            video,
            session: WidgetSession::new(coordinator, first.clone()),
            feed,
            sync: RefCell::new(sync),
        });
        inner.register(&first.track);

        let mut scope = Scope::new();
        let sub_inner = Rc::downgrade(&inner);
        inner.session.attach(move |state| {
            if let Some(p) = sub_inner.upgrade() {
                p.on_playback(state);
            }
        });

        let audio_target: &web::EventTarget = &inner.audio;
        let handlers: [(&'static str, fn(&Rc<PlayerInner>)); 4] = [
            ("play", |p: &Rc<PlayerInner>| {
                if let Some(track) = p.current_track() {
                    p.register(&track);
                    p.session.claim();
                }
            }),
            ("pause", |p: &Rc<PlayerInner>| p.on_paused()),
            ("ended", |p: &Rc<PlayerInner>| p.on_ended()),
            ("error", |p: &Rc<PlayerInner>| p.on_audio_error()),
        ];
        for (kind, handler) in handlers {
            let p = inner.clone();
            scope.hold(EventListener::new(audio_target, kind, move |_| handler(&p))?);
        }

        if let Some(video) = &inner.video {
            let p = inner.clone();
            scope.hold(EventListener::new(video, "error", move |_| p.on_video_error())?);

            let p = inner.clone();
            scope.hold(EventListener::new(video, "canplay", move |_| {
                p.with_sync(|sync, _| sync.on_media_ready())
            })?);

            let p = inner.clone();
            scope.hold(IntersectionWatch::new(
                video,
                LAZY_LOAD_MARGIN,
                LAZY_LOAD_THRESHOLD,
                move |near| p.with_sync(|sync, cmds| sync.on_viewport(near, cmds)),
            )?);

            let p = inner.clone();
            scope.hold(navigation::watch_page_visibility(&document, move |visible| {
                p.with_sync(|sync, cmds| sync.on_page_visibility(visible, cmds))
            })?);

            let p = inner.clone();
            scope.hold(AnimationLoop::start(move |_ts| p.sync_tick())?);
        }

        log::info!(
            "[player] mounted {} (video: {})",
            first.track,
            first.video.as_deref().unwrap_or("none")
        );
        Ok(Self { inner, scope })
    }

    pub fn track(&self) -> Option<TrackId> {
        self.inner.current_track()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    pub fn toggle(&self) {
        self.inner.toggle();
    }

    pub fn add_track(&self, src: &str, video: Option<String>) {
        self.inner.session.push(TrackEntry {
            track: TrackId::new(src),
            video,
        });
    }

    pub fn select(&self, index: usize) -> bool {
        self.inner.select(index)
    }

    pub fn next(&self) -> bool {
        self.inner.step(true)
    }

    pub fn previous(&self) -> bool {
        self.inner.step(false)
    }

    pub fn index(&self) -> usize {
        self.inner.session.index()
    }

    pub fn len(&self) -> usize {
        self.inner.session.len()
    }

    pub fn current_time(&self) -> f64 {
        self.inner.audio.current_time()
    }

    /// Zero until the metadata is known.
    pub fn duration(&self) -> f64 {
        media_duration(self.inner.audio.duration())
    }

    /// Seek the audio; the video follows on the next sync tick.
    pub fn seek(&self, time: f64) {
        let audio = &self.inner.audio;
        audio.set_current_time(clamp_seek(time, audio.duration()));
    }

    pub fn volume(&self) -> f64 {
        self.inner.audio.volume()
    }

    pub fn set_volume(&self, volume: f64) {
        self.inner.audio.set_volume(clamp_volume(volume));
    }

    pub fn is_muted(&self) -> bool {
        self.inner.audio.muted()
    }

    pub fn set_muted(&self, muted: bool) {
        self.inner.audio.set_muted(muted);
    }

    fn is_mounted(&self) -> bool {
        self.inner.session.is_attached()
    }

    /// Stop this player's track if it is the active one, silence its media
    /// and release everything the mount acquired.
    pub fn unmount(&mut self) {
        if !self.is_mounted() {
            return;
        }
        let track = self.inner.current_track();
        let tracks = self.inner.session.teardown();
        _ = self.inner.audio.pause();
        if let Some(v) = &self.inner.video {
            _ = v.pause();
        }
        self.scope.dispose();
        {
            let mut feed = self.inner.feed.borrow_mut();
            for track in &tracks {
                feed.backend_mut().unregister(track);
            }
        }
        log::info!(
            "[player] unmounted {}",
            track.map(|t| t.to_string()).unwrap_or_default()
        );
    }
}

impl Drop for PlayerWidget {
    fn drop(&mut self) {
        self.unmount();
    }
}
