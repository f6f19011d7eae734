/// Playback, analysis and wave-field tuning constants.
///
/// These express intended behavior (time constants, clamp limits, spacing)
/// and keep magic numbers out of the code. `config::EngineConfig` builds its
/// defaults from them; pages may override a subset via `data-*` attributes.
// Analysis resolution (frequency bins per snapshot); FFT size is twice this
pub const ANALYSIS_BINS: usize = 128;
pub const ANALYSIS_SMOOTHING: f64 = 0.8;

// Decibel clamp applied to every snapshot
pub const MIN_DB: f32 = -100.0;
pub const MAX_DB: f32 = 0.0;

// Bins summed into the bass term
pub const BASS_BIN_COUNT: usize = 10;

// Bass accumulator release per frame (multiplicative)
pub const BASS_RELEASE: f32 = 0.99995;

// Strand layout
pub const STRAND_COUNT: usize = 7;
pub const BASE_FREQUENCY: f32 = 0.0005;
pub const STRAND_FREQUENCY_STEP: f32 = 0.05;
pub const POINTER_FREQUENCY_GAIN: f32 = 0.008;
pub const WAVE_SPEED: f32 = 0.0025; // phase advance per frame
pub const PAGE_PADDING_PX: f32 = 120.0;

// Idle motion
pub const IDLE_POINTS: usize = 100;
pub const IDLE_BASE_AMPLITUDE: f32 = 80.0;
pub const IDLE_STRAND_STEP: f32 = 4.0;
pub const IDLE_POINTER_Y_GAIN: f32 = 0.2;
pub const IDLE_RIPPLE_FREQUENCY: f32 = 0.01;
pub const IDLE_RIPPLE_GAIN: f32 = 25.0;
pub const SCROLL_FREQUENCY: f32 = 0.002;
pub const SCROLL_INFLUENCE_PX: f32 = 100.0;
pub const SCROLL_SMOOTHING: f32 = 0.05; // lerp factor per frame

// Active (audio-driven) amplitude
pub const VOLUME_GAIN: f32 = 260.0;
pub const BASS_GAIN: f32 = 180.0;
pub const BASS_STRAND_WEIGHT: f32 = 0.15; // extra bass share per strand index
pub const ACTIVE_MAX_AMPLITUDE: f32 = 320.0;
pub const CONTOUR_FLOOR: f32 = 0.35; // share of amplitude kept on silent bins

// Strand styling
pub const HUE_CYCLE_RATE: f32 = 0.0001;
pub const BASE_ALPHA: f32 = 0.2;
pub const ALPHA_STEP: f32 = 0.05;
pub const BASE_LINE_WIDTH: f32 = 2.0;
pub const LINE_WIDTH_STEP: f32 = 0.2;
pub const SHADOW_BLUR: f64 = 20.0;
pub const FADE_FILL: &str = "rgba(0, 0, 0, 0.1)";

// Audio/video sync
pub const SYNC_TOLERANCE_SEC: f64 = 0.1;
pub const SYNC_MAX_CORRECTIONS: u32 = 8;
pub const HAVE_FUTURE_DATA: u16 = 3;
pub const LAZY_LOAD_MARGIN: &str = "100px";
pub const LAZY_LOAD_THRESHOLD: f64 = 0.1;

// Background effect fade-out before going idle
pub const EFFECT_FADE_MS: u64 = 1000;
