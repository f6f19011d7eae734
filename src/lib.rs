#![cfg(target_arch = "wasm32")]
use crate::audio::WebAudioBackend;
use crate::config::{EngineConfig, OVERRIDE_KEYS};
use crate::core::{AnalysisFeed, BackgroundEffectGate, PlaybackCoordinator, Scope, TrackId};
use crate::dom::WebScheduler;
use crate::frame::{SharedFeed, WaveRenderer};
use crate::player::PlayerWidget;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod audio;
mod config;
mod constants;
mod core;
mod dom;
mod events;
mod frame;
mod overlay;
mod player;
mod render;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("wavefield starting");
    Ok(())
}

fn to_js(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", e))
}

/// `data-bins`, `data-strands`, ... on the wave canvas.
fn read_config(canvas: &web::HtmlCanvasElement) -> EngineConfig {
    let pairs = OVERRIDE_KEYS
        .into_iter()
        .filter_map(|key| canvas.get_attribute(&format!("data-{}", key)).map(|v| (key, v)));
    EngineConfig::default().with_overrides(pairs)
}

/// One page's playback engine: the coordinator every player shares, the
/// analysis feed, the background effect gate and the wave renderer.
#[wasm_bindgen]
pub struct Engine {
    config: EngineConfig,
    coordinator: PlaybackCoordinator,
    feed: SharedFeed,
    gate: BackgroundEffectGate,
    renderer: Option<WaveRenderer>,
    scope: Scope,
}

impl Engine {
    fn init(canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let config = read_config(&canvas);
        log::info!(
            "[engine] bins={} strands={} sync_tolerance={:.2}s fade={}ms",
            config.analysis.bins,
            config.waves.strands,
            config.sync.tolerance_sec,
            config.gate.fade.as_millis()
        );

        let coordinator = PlaybackCoordinator::new();
        let feed: SharedFeed = Rc::new(RefCell::new(AnalysisFeed::new(
            WebAudioBackend::new(config.analysis.clone()),
            config.analysis.bins,
        )));
        let gate = BackgroundEffectGate::new(Rc::new(WebScheduler), config.gate.fade);
        let mut scope = Scope::new();

        let feed_sub = feed.clone();
        scope.hold(coordinator.subscribe(move |state| feed_sub.borrow_mut().on_playback(state)));
        gate.on_change(overlay::apply_effect_phase);
        scope.hold(gate.attach(&coordinator));
        events::navigation::wire_route_stops(&window, &coordinator, &mut scope)
            .map_err(|e| anyhow::anyhow!("route listeners: {:?}", e))?;

        let renderer = WaveRenderer::mount(&canvas, feed.clone(), gate.clone(), config.waves.clone())
            .map_err(|e| anyhow::anyhow!("wave renderer: {:?}", e))?;

        Ok(Self {
            config,
            coordinator,
            feed,
            gate,
            renderer: Some(renderer),
            scope,
        })
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: web::HtmlCanvasElement) -> Result<Engine, JsValue> {
        Self::init(canvas).map_err(|e| {
            log::error!("[engine] init error: {:#}", e);
            to_js(e)
        })
    }

    /// Bind an `<audio>` element, and optionally its `<video>` overlay, to
    /// this engine.
    pub fn mount_player(
        &self,
        audio: web::HtmlAudioElement,
        video: Option<web::HtmlVideoElement>,
    ) -> Result<PlayerHandle, JsValue> {
        let widget = PlayerWidget::mount(
            audio,
            video,
            &self.coordinator,
            self.feed.clone(),
            self.config.sync.clone(),
        )?;
        Ok(PlayerHandle { widget })
    }

    pub fn request_play(&self, track: &str) {
        self.coordinator.request_play(&TrackId::new(track));
    }

    pub fn stop(&self, track: &str) {
        self.coordinator.stop(&TrackId::new(track));
    }

    pub fn stop_all(&self) {
        self.coordinator.stop_all();
    }

    /// Client-side routers call this on navigation; history navigation and
    /// page unload are already wired.
    pub fn notify_route_change(&self) {
        log::info!("[coordinator] route change -> stop all");
        self.coordinator.stop_all();
    }

    pub fn is_playing(&self) -> bool {
        self.coordinator.is_any_playing()
    }

    pub fn active_track(&self) -> Option<String> {
        self.coordinator.state().active.map(|t| t.to_string())
    }

    pub fn effect_active(&self) -> bool {
        self.gate.is_active()
    }

    /// Stop everything and release the renderer and every engine listener.
    /// Mounted players stay usable until their handles are unmounted.
    pub fn dispose(&mut self) {
        self.coordinator.stop_all();
        if let Some(mut renderer) = self.renderer.take() {
            renderer.unmount();
        }
        self.scope.dispose();
        self.gate.shutdown();
        self.feed.borrow_mut().deactivate();
        overlay::clear();
        log::info!("[engine] disposed");
    }
}

/// Page-side handle to one mounted player; dropping it unmounts.
#[wasm_bindgen]
pub struct PlayerHandle {
    widget: PlayerWidget,
}

#[wasm_bindgen]
impl PlayerHandle {
    pub fn toggle(&self) {
        self.widget.toggle();
    }

    pub fn is_playing(&self) -> bool {
        self.widget.is_playing()
    }

    pub fn track(&self) -> Option<String> {
        self.widget.track().map(|t| t.to_string())
    }

    pub fn add_track(&self, src: &str, video_src: Option<String>) {
        self.widget.add_track(src, video_src);
    }

    pub fn select(&self, index: usize) -> bool {
        self.widget.select(index)
    }

    pub fn next(&self) -> bool {
        self.widget.next()
    }

    pub fn previous(&self) -> bool {
        self.widget.previous()
    }

    pub fn index(&self) -> usize {
        self.widget.index()
    }

    pub fn len(&self) -> usize {
        self.widget.len()
    }

    pub fn current_time(&self) -> f64 {
        self.widget.current_time()
    }

    pub fn duration(&self) -> f64 {
        self.widget.duration()
    }

    pub fn seek(&self, time: f64) {
        self.widget.seek(time);
    }

    pub fn volume(&self) -> f64 {
        self.widget.volume()
    }

    pub fn set_volume(&self, volume: f64) {
        self.widget.set_volume(volume);
    }

    pub fn is_muted(&self) -> bool {
        self.widget.is_muted()
    }

    pub fn set_muted(&self, muted: bool) {
        self.widget.set_muted(muted);
    }

    pub fn unmount(&mut self) {
        self.widget.unmount();
    }
}
