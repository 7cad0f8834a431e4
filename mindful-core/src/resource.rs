//! Audio resource contract.

use async_trait::async_trait;
use thiserror::Error;

/// Why the resource refused to start playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// Platform policy rejected the request (e.g. autoplay without a user gesture)
    #[error("playback not allowed: {0}")]
    NotAllowed(String),

    /// The media could not be decoded
    #[error("media could not be decoded: {0}")]
    Decode(String),

    /// The media could not be fetched or the resource is gone
    #[error("audio resource unavailable: {0}")]
    Unavailable(String),
}

/// Notifications emitted by an audio resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    /// Metadata finished loading; duration is now known
    MetadataLoaded { duration: f64 },
    /// Periodic playback progress
    TimeUpdated { current_time: f64 },
    /// Natural end of stream
    Ended,
    /// The resource failed to load or play
    Error { message: String },
}

/// A platform facility that plays one media file.
///
/// Implementations wrap a handle (an audio element, an output stream) and use
/// interior mutability; every command except `play` is synchronous and
/// infallible from the caller's point of view.
#[async_trait]
pub trait AudioResource: Send + Sync {
    /// Point the resource at a media URL and start loading metadata.
    fn load(&self, url: &str);

    /// Request playback to start.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the request.
    async fn play(&self) -> Result<(), ResourceError>;

    /// Pause playback.
    fn pause(&self);

    /// Jump to a position in seconds.
    fn seek(&self, secs: f64);

    /// Set output volume in `[0, 1]`.
    fn set_volume(&self, volume: f64);

    /// Set the resource-level mute flag.
    fn set_muted(&self, muted: bool);

    /// Release notification subscriptions. No events are delivered afterwards.
    fn detach(&self);
}
