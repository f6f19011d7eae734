use crate::config::WaveParams;
use crate::constants::*;
use crate::core::spectrum::{BassAccumulator, FrequencySnapshot};
use glam::Vec2;
use std::f32::consts::FRAC_PI_2;

/// Page and pointer inputs sampled once per frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub width: f32,
    pub height: f32,
    pub page_height: f32,
    pub scroll_y: f32,
    pub pointer: Vec2,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            page_height: 1.0,
            scroll_y: 0.0,
            pointer: Vec2::new(0.5, 0.5),
        }
    }
}

impl FrameInput {
    /// Drawing extent: the full document plus a margin so strands run off
    /// the bottom edge.
    pub fn effective_height(&self) -> f32 {
        self.page_height.max(self.height) + PAGE_PADDING_PX
    }

    fn pointer_norm(&self) -> Vec2 {
        Vec2::new(
            self.pointer.x / self.width.max(1.0),
            self.pointer.y / self.height.max(1.0),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveMode {
    Idle,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
    LineTo(Vec2),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrandStyle {
    pub hue: f32,
    pub alpha: f32,
    pub line_width: f32,
}

impl StrandStyle {
    pub fn css(&self) -> String {
        format!("hsla({:.1}, 100%, 70%, {:.3})", self.hue, self.alpha)
    }
}

/// Colour and stroke of strand `index` at frame `t`.
pub fn strand_style(t: f32, index: usize) -> StrandStyle {
    let i = index as f32;
    StrandStyle {
        hue: (t * HUE_CYCLE_RATE + i).sin() * 180.0 + 180.0,
        alpha: (BASE_ALPHA + i * ALPHA_STEP).min(1.0),
        line_width: BASE_LINE_WIDTH + i * LINE_WIDTH_STEP,
    }
}

#[derive(Clone, Debug, Default)]
pub struct StrandPath {
    pub style: Option<StrandStyle>,
    pub cmds: Vec<PathCmd>,
}

/// Quadratic smoothing through `points`: each control point becomes the
/// curve control and the curve ends halfway to the next point, so adjacent
/// segments share a tangent.
pub fn smooth_path(points: &[Vec2], out: &mut Vec<PathCmd>) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    out.push(PathCmd::MoveTo(*first));
    let mut prev = *first;
    for &p in rest {
        out.push(PathCmd::QuadTo {
            ctrl: prev,
            to: (prev + p) * 0.5,
        });
        prev = p;
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Amplitude of strand `index` while audio drives the field.
pub fn active_amplitude(volume: f32, bass: f32, index: usize, params: &WaveParams) -> f32 {
    let bass_weight = 1.0 + index as f32 * BASS_STRAND_WEIGHT;
    (volume * VOLUME_GAIN + bass * BASS_GAIN * bass_weight).clamp(0.0, params.max_amplitude)
}

/// Base amplitude of strand `index` with nothing playing.
pub fn idle_amplitude(scroll_influence: f32, pointer_y_norm: f32, index: usize) -> f32 {
    IDLE_BASE_AMPLITUDE
        + scroll_influence
        + index as f32 * IDLE_STRAND_STEP
        + pointer_y_norm * IDLE_POINTER_Y_GAIN
}

/// Vertical distance between consecutive points of a strand. Whole pixels
/// where there is room; below one pixel per point the fraction is kept so
/// points never collapse onto the same row.
pub fn point_spacing(height: f32, count: usize) -> f32 {
    let raw = height / count.max(1) as f32;
    if raw >= 1.0 {
        raw.floor()
    } else {
        raw
    }
}

/// Per-frame wave field state: frame counter, smoothed scroll influence and
/// the bass accumulator.
pub struct WaveField {
    params: WaveParams,
    t: f32,
    scroll_influence: f32,
    bass: BassAccumulator,
    mode: WaveMode,
    points: Vec<Vec2>,
}

impl WaveField {
    pub fn new(params: WaveParams) -> Self {
        Self {
            bass: BassAccumulator::new(params.bass_release),
            params,
            t: 0.0,
            scroll_influence: 0.0,
            mode: WaveMode::Idle,
            points: Vec::new(),
        }
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    pub fn mode(&self) -> WaveMode {
        self.mode
    }

    pub fn frame(&self) -> f32 {
        self.t
    }

    pub fn bass_level(&self) -> f32 {
        self.bass.value()
    }

    pub fn scroll_influence(&self) -> f32 {
        self.scroll_influence
    }

    /// Advance one frame and write one path per strand into `out`.
    /// Audio drives the field only when `enabled` and a snapshot exists.
    pub fn step(
        &mut self,
        input: &FrameInput,
        snapshot: Option<&FrequencySnapshot>,
        enabled: bool,
        out: &mut Vec<StrandPath>,
    ) {
        let target = (input.scroll_y * SCROLL_FREQUENCY).sin() * SCROLL_INFLUENCE_PX;
        self.scroll_influence = lerp(self.scroll_influence, target, SCROLL_SMOOTHING);

        let snapshot = snapshot.filter(|s| enabled && !s.is_empty());
        let (volume, bass) = match snapshot {
            Some(s) => (s.mean_amplitude(), s.bass_amplitude(BASS_BIN_COUNT)),
            None => (0.0, 0.0),
        };
        self.bass.step(bass);
        self.mode = if snapshot.is_some() {
            WaveMode::Active
        } else {
            WaveMode::Idle
        };

        out.resize_with(self.params.strands, StrandPath::default);
        for (i, path) in out.iter_mut().enumerate() {
            path.cmds.clear();
            path.style = Some(strand_style(self.t, i));
            match snapshot {
                Some(s) => self.active_points(input, s, volume, i),
                None => self.idle_points(input, i),
            }
            smooth_path(&self.points, &mut path.cmds);
            path.cmds
                .push(PathCmd::LineTo(Vec2::new(input.width * 0.5, input.effective_height())));
        }
        self.t += 1.0;
    }

    fn strand_frequency(&self, input: &FrameInput, index: usize) -> f32 {
        BASE_FREQUENCY + index as f32 * STRAND_FREQUENCY_STEP
            + input.pointer_norm().x * POINTER_FREQUENCY_GAIN
    }

    fn phase(&self, y: f32, frequency: f32, index: usize) -> f32 {
        y * frequency + self.t * WAVE_SPEED + index as f32 * FRAC_PI_2
    }

    fn idle_points(&mut self, input: &FrameInput, index: usize) {
        let center = input.width * 0.5;
        let frequency = self.strand_frequency(input, index);
        let pointer = input.pointer_norm();
        let base = idle_amplitude(self.scroll_influence, pointer.y, index);
        let spacing = point_spacing(input.effective_height(), IDLE_POINTS);
        self.points.clear();
        for k in 0..IDLE_POINTS {
            let y = k as f32;
            let ripple =
                ((y - input.pointer.y) * IDLE_RIPPLE_FREQUENCY).sin() * pointer.x * IDLE_RIPPLE_GAIN;
            let x = center + self.phase(y, frequency, index).sin() * (base + ripple);
            self.points.push(Vec2::new(x, y * spacing));
        }
    }

    fn active_points(
        &mut self,
        input: &FrameInput,
        snapshot: &FrequencySnapshot,
        volume: f32,
        index: usize,
    ) {
        let center = input.width * 0.5;
        let frequency = self.strand_frequency(input, index);
        let amplitude = active_amplitude(volume, self.bass.value(), index, &self.params);
        let bins = snapshot.len();
        let spacing = point_spacing(input.effective_height(), bins);
        self.points.clear();
        for k in 0..bins {
            let y = k as f32;
            let contour = CONTOUR_FLOOR + (1.0 - CONTOUR_FLOOR) * snapshot.level(k);
            let x = center + self.phase(y, frequency, index).sin() * amplitude * contour;
            self.points.push(Vec2::new(x, y * spacing));
        }
    }
}
