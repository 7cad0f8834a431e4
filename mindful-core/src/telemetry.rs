//! Fire-and-forget telemetry for player interactions.

use crate::error::Result;
use tracing::info;

/// Event category attached to every player event.
pub const AUDIO_CATEGORY: &str = "Audio";

/// Player interaction worth recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    Play,
    Pause,
    Replay,
    Seek,
    Complete,
}

impl PlayerAction {
    /// Event name as sent to the analytics backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "audio_play",
            Self::Pause => "audio_pause",
            Self::Replay => "audio_replay",
            Self::Seek => "audio_seek",
            Self::Complete => "audio_complete",
        }
    }
}

impl std::fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded player event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEvent {
    pub action: PlayerAction,
    /// Title of the audio source
    pub label: String,
    /// Position (or duration for `Complete`) in whole seconds
    pub value: Option<u64>,
}

impl PlayerEvent {
    pub fn new(action: PlayerAction, label: impl Into<String>, value: Option<u64>) -> Self {
        Self {
            action,
            label: label.into(),
            value,
        }
    }

    #[must_use]
    pub const fn category(&self) -> &'static str {
        AUDIO_CATEGORY
    }
}

/// Sink for player telemetry.
///
/// Callers never depend on a sink succeeding: errors are logged and dropped.
pub trait TelemetrySink: Send + Sync {
    /// Record one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejected or could not receive the event.
    fn record(&self, event: &PlayerEvent) -> Result<()>;
}

/// Records events as structured tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn record(&self, event: &PlayerEvent) -> Result<()> {
        info!(
            target: "mindful::telemetry",
            action = event.action.as_str(),
            category = event.category(),
            label = %event.label,
            value = ?event.value,
            "player event"
        );
        Ok(())
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn record(&self, _event: &PlayerEvent) -> Result<()> {
        Ok(())
    }
}
