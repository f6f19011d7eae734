use crate::constants::*;
use crate::core::error::CoreError;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisParams {
    pub bins: usize,
    pub smoothing: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            bins: ANALYSIS_BINS,
            smoothing: ANALYSIS_SMOOTHING,
        }
    }
}

impl AnalysisParams {
    pub fn fft_size(&self) -> u32 {
        (self.bins * 2) as u32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaveParams {
    pub strands: usize,
    pub bass_release: f32,
    pub max_amplitude: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            strands: STRAND_COUNT,
            bass_release: BASS_RELEASE,
            max_amplitude: ACTIVE_MAX_AMPLITUDE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyncParams {
    pub tolerance_sec: f64,
    pub max_corrections: u32,
}

impl Default for SyncParams {
    fn default() -> Self {
        Self {
            tolerance_sec: SYNC_TOLERANCE_SEC,
            max_corrections: SYNC_MAX_CORRECTIONS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GateParams {
    pub fade: Duration,
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            fade: Duration::from_millis(EFFECT_FADE_MS),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineConfig {
    pub analysis: AnalysisParams,
    pub waves: WaveParams,
    pub sync: SyncParams,
    pub gate: GateParams,
}

/// Keys accepted by `EngineConfig::apply_override`, as read from `data-*`
/// attributes.
pub const OVERRIDE_KEYS: [&str; 5] = ["bins", "strands", "sync-tolerance", "fade-ms", "bass-release"];

impl EngineConfig {
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let invalid = || CoreError::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
        };
        let value = value.trim();
        match key {
            "bins" => {
                let bins: usize = value.parse().map_err(|_| invalid())?;
                if !bins.is_power_of_two() || !(16..=1024).contains(&bins) {
                    return Err(invalid());
                }
                self.analysis.bins = bins;
            }
            "strands" => {
                let strands: usize = value.parse().map_err(|_| invalid())?;
                if !(1..=12).contains(&strands) {
                    return Err(invalid());
                }
                self.waves.strands = strands;
            }
            "sync-tolerance" => {
                let tol: f64 = value.parse().map_err(|_| invalid())?;
                if !(0.02..=1.0).contains(&tol) {
                    return Err(invalid());
                }
                self.sync.tolerance_sec = tol;
            }
            "fade-ms" => {
                let ms: u64 = value.parse().map_err(|_| invalid())?;
                if ms > 10_000 {
                    return Err(invalid());
                }
                self.gate.fade = Duration::from_millis(ms);
            }
            "bass-release" => {
                let release: f32 = value.parse().map_err(|_| invalid())?;
                if !(release > 0.0 && release < 1.0) {
                    return Err(invalid());
                }
                self.waves.bass_release = release;
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    /// Apply every `(key, value)` pair, keeping defaults for rejected ones.
    pub fn with_overrides<'a>(
        mut self,
        pairs: impl IntoIterator<Item = (&'a str, String)>,
    ) -> Self {
        for (key, value) in pairs {
            if let Err(e) = self.apply_override(key, &value) {
                log::warn!("[config] {}", e);
            }
        }
        self
    }
}
