pub mod coordinator;
pub mod error;
pub mod feed;
pub mod gate;
pub mod playlist;
pub mod scope;
pub mod session;
pub mod spectrum;
pub mod sync;
pub mod timer;
pub mod waves;

pub use coordinator::*;
pub use error::CoreError;
pub use feed::{AnalysisBackend, AnalysisFeed};
pub use gate::{BackgroundEffectGate, EffectPhase};
pub use playlist::{Playlist, TrackEntry};
pub use scope::Scope;
pub use session::{clamp_seek, clamp_volume, media_duration, PlayTicket, Selection, WidgetSession};
pub use spectrum::{db_to_amplitude, BassAccumulator, FrequencySnapshot};
pub use sync::{Commands, MediaProbe, SyncCommand, SyncPair, SyncPhase};
pub use timer::{CancelToken, Scheduler, TimerHandle, TimerState};
pub use waves::{FrameInput, PathCmd, StrandPath, WaveField, WaveMode};
