use crate::constants::{BASS_RELEASE, MAX_DB, MIN_DB};

/// Decibels to linear amplitude.
#[inline]
pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// One analysis frame of per-bin magnitudes in decibels, clamped to
/// `[MIN_DB, MAX_DB]`. The length never changes within a session.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencySnapshot {
    db: Vec<f32>,
}

impl FrequencySnapshot {
    pub fn from_db(raw: &[f32]) -> Self {
        let mut snap = Self {
            db: vec![MIN_DB; raw.len()],
        };
        snap.refill(raw);
        snap
    }

    pub fn silent(bins: usize) -> Self {
        Self {
            db: vec![MIN_DB; bins],
        }
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    pub fn db(&self) -> &[f32] {
        &self.db
    }

    pub fn amplitudes(&self) -> impl Iterator<Item = f32> + '_ {
        self.db.iter().map(|&d| db_to_amplitude(d))
    }

    /// Bin level mapped onto 0..=1 across the clamp range.
    pub fn level(&self, bin: usize) -> f32 {
        self.db
            .get(bin)
            .map(|&d| (d - MIN_DB) / (MAX_DB - MIN_DB))
            .unwrap_or(0.0)
    }

    /// Mean linear amplitude over all bins.
    pub fn mean_amplitude(&self) -> f32 {
        if self.db.is_empty() {
            return 0.0;
        }
        self.amplitudes().sum::<f32>() / self.db.len() as f32
    }

    /// Mean linear amplitude over the lowest `bins` bins.
    pub fn bass_amplitude(&self, bins: usize) -> f32 {
        let take = bins.min(self.db.len());
        if take == 0 {
            return 0.0;
        }
        self.db[..take]
            .iter()
            .map(|&d| db_to_amplitude(d))
            .sum::<f32>()
            / take as f32
    }

    /// Overwrite in place from raw analyser output; extra input is ignored
    /// and missing bins read as silence, so the length stays fixed.
    pub(crate) fn refill(&mut self, raw: &[f32]) {
        for (i, slot) in self.db.iter_mut().enumerate() {
            let v = raw.get(i).copied().unwrap_or(MIN_DB);
            // Analysers report -inf for silent bins.
            *slot = if v.is_finite() {
                v.clamp(MIN_DB, MAX_DB)
            } else {
                MIN_DB
            };
        }
    }
}

/// Slow-release bass level carried across frames: instantaneous attack,
/// multiplicative release.
#[derive(Clone, Debug)]
pub struct BassAccumulator {
    value: f32,
    release: f32,
}

impl Default for BassAccumulator {
    fn default() -> Self {
        Self::new(BASS_RELEASE)
    }
}

impl BassAccumulator {
    pub fn new(release: f32) -> Self {
        Self {
            value: 0.0,
            release: release.clamp(0.0, 1.0),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// One frame: release the carried value, then rise to `bass` if louder.
    pub fn step(&mut self, bass: f32) -> f32 {
        self.value = (self.value * self.release).max(bass.max(0.0));
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}
