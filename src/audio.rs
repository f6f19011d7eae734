use crate::config::AnalysisParams;
use crate::constants::{MAX_DB, MIN_DB};
use crate::core::{AnalysisBackend, CoreError, TrackId};
use fnv::FnvHashMap;
use web_sys as web;

struct Graph {
    ctx: web::AudioContext,
    analyser: web::AnalyserNode,
}

struct CachedTap {
    element: web::HtmlMediaElement,
    source: web::MediaElementAudioSourceNode,
}

/// WebAudio side of the analysis feed: one lazily built context and
/// analyser shared by every track, one source node per media element.
pub struct WebAudioBackend {
    params: AnalysisParams,
    graph: Option<Graph>,
    elements: FnvHashMap<TrackId, web::HtmlMediaElement>,
    // Keyed by element: a player reuses its element for every playlist track.
    taps: Vec<CachedTap>,
}

fn js_err(label: &str, e: wasm_bindgen::JsValue) -> CoreError {
    CoreError::AnalysisUnavailable(format!("{} error: {:?}", label, e))
}

impl WebAudioBackend {
    pub fn new(params: AnalysisParams) -> Self {
        Self {
            params,
            graph: None,
            elements: FnvHashMap::default(),
            taps: Vec::new(),
        }
    }

    /// Make `element` the media source for `track`.
    pub fn register(&mut self, track: &TrackId, element: &web::HtmlMediaElement) {
        self.elements.insert(track.clone(), element.clone());
    }

    pub fn unregister(&mut self, track: &TrackId) {
        self.elements.remove(track);
    }

    /// Browsers keep new contexts suspended until a user gesture.
    pub fn resume(&self) {
        if let Some(g) = &self.graph {
            _ = g.ctx.resume();
        }
    }
}

impl AnalysisBackend for WebAudioBackend {
    type Tap = web::MediaElementAudioSourceNode;

    fn ensure_graph(&mut self) -> Result<(), CoreError> {
        if self.graph.is_some() {
            self.resume();
            return Ok(());
        }
        let ctx = web::AudioContext::new().map_err(|e| js_err("AudioContext", e))?;
        let analyser = ctx
            .create_analyser()
            .map_err(|e| js_err("AnalyserNode", e))?;
        analyser.set_fft_size(self.params.fft_size());
        analyser.set_smoothing_time_constant(self.params.smoothing);
        analyser.set_min_decibels(MIN_DB as f64);
        analyser.set_max_decibels(MAX_DB as f64);
        analyser
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| js_err("analyser connect", e))?;
        _ = ctx.resume();
        log::info!(
            "[feed] audio graph ready (fft {}, {} bins)",
            self.params.fft_size(),
            analyser.frequency_bin_count()
        );
        self.graph = Some(Graph { ctx, analyser });
        Ok(())
    }

    fn tap_for(&mut self, track: &TrackId) -> Result<Self::Tap, CoreError> {
        let graph = self
            .graph
            .as_ref()
            .ok_or_else(|| CoreError::AnalysisUnavailable("no audio graph".into()))?;
        let element = self
            .elements
            .get(track)
            .ok_or_else(|| CoreError::AnalysisUnavailable(format!("no element for {}", track)))?;
        // A media element accepts a single source node for its lifetime.
        if let Some(cached) = self.taps.iter().find(|t| &t.element == element) {
            return Ok(cached.source.clone());
        }
        let source = graph
            .ctx
            .create_media_element_source(element)
            .map_err(|e| js_err("MediaElementSource", e))?;
        self.taps.push(CachedTap {
            element: element.clone(),
            source: source.clone(),
        });
        Ok(source)
    }

    fn connect(&mut self, tap: &Self::Tap) {
        if let Some(g) = &self.graph {
            _ = tap.connect_with_audio_node(&g.analyser);
        }
    }

    fn disconnect(&mut self, tap: &Self::Tap) {
        _ = tap.disconnect();
    }

    fn read_db(&mut self, out: &mut [f32]) {
        if let Some(g) = &self.graph {
            let bins = g.analyser.frequency_bin_count() as usize;
            if bins == out.len() {
                g.analyser.get_float_frequency_data(out);
            } else {
                let mut buf = vec![MIN_DB; bins];
                g.analyser.get_float_frequency_data(&mut buf);
                let n = bins.min(out.len());
                out[..n].copy_from_slice(&buf[..n]);
            }
        }
    }
}
