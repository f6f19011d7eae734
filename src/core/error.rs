use thiserror::Error;

/// Failure classes of the playback core. None of them is fatal to the page:
/// each one degrades a single audio or visual feature.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("playback denied for {track}: {reason}")]
    PlaybackDenied { track: String, reason: String },

    #[error("analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    #[error("sync diverged after {corrections} corrective seeks")]
    SyncDiverged { corrections: u32 },

    #[error("failed to load {0}")]
    AssetLoad(String),

    #[error("invalid config value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}
