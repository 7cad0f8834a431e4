//! Audio playback controller.
//!
//! Presents one logical player over one [`AudioResource`]. User intents
//! (play, pause, replay, seek, volume, mute) become resource commands, and
//! resource notifications flow back into [`PlaybackState`] for display.
//!
//! Starting playback is a two-phase transition: [`PlaybackController::begin_play`]
//! marks the player as playing immediately and returns a [`PlayRequest`];
//! the outcome of the resource's start request is applied later with
//! [`PlaybackController::complete_play`], which rolls back on rejection.

use crate::catalog::EpisodeRef;
use crate::resource::{AudioResource, ResourceError, ResourceEvent};
use crate::telemetry::{PlayerAction, PlayerEvent, TelemetrySink};
use crate::time::{sanitize_secs, SecondsExt};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Soft, non-fatal playback error surfaced to the display layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The resource rejected a start request
    #[error("could not start playback: {0}")]
    StartRejected(ResourceError),

    /// The resource reported a load or decode failure
    #[error("could not load audio: {message}")]
    LoadFailed { message: String },
}

/// State-machine label of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerPhase {
    /// Metadata not loaded yet
    Idle,
    /// Ready and not producing audio
    Paused,
    /// Producing audio (possibly optimistically)
    Playing,
    /// Reached end of stream; only replay or seek leaves this phase
    Finished,
}

/// Display state of a player
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_finished: bool,
    /// Display mute flag (true when muted or when volume is zero)
    pub is_muted: bool,
    /// Volume in `[0, 1]`
    pub volume: f64,
    /// Position in seconds
    pub current_time: f64,
    /// Duration in seconds, 0 until metadata loads
    pub duration: f64,
    pub error: Option<PlaybackError>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_finished: false,
            is_muted: false,
            volume: 1.0,
            current_time: 0.0,
            duration: 0.0,
            error: None,
        }
    }
}

impl PlaybackState {
    /// Progress through the media in percent.
    ///
    /// Always within `[0, 100]`, and exactly 0 while the duration is unknown.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.duration <= 0.0 || !self.duration.is_finite() {
            return 0.0;
        }
        (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
    }
}

/// Ticket for an in-flight start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a play request must be completed with `complete_play`"]
pub struct PlayRequest {
    generation: u64,
}

/// Controller for a single audio resource.
pub struct PlaybackController<R: AudioResource + ?Sized> {
    resource: Arc<R>,
    source: EpisodeRef,
    telemetry: Option<Arc<dyn TelemetrySink>>,
    state: PlaybackState,
    phase: PlayerPhase,
    metadata_loaded: bool,
    /// Mute flag as last set on the resource; volume zero does not touch it
    resource_muted: bool,
    generation: u64,
    torn_down: bool,
}

impl<R: AudioResource + ?Sized> PlaybackController<R> {
    /// Bind a controller to a resource and start loading the source.
    pub fn new(
        resource: Arc<R>,
        source: EpisodeRef,
        telemetry: Option<Arc<dyn TelemetrySink>>,
    ) -> Self {
        info!(
            "Mounting player for episode {} ({})",
            source.episode_id, source.audio_url
        );
        resource.load(&source.audio_url);

        Self {
            resource,
            source,
            telemetry,
            state: PlaybackState::default(),
            phase: PlayerPhase::Idle,
            metadata_loaded: false,
            resource_muted: false,
            generation: 0,
            torn_down: false,
        }
    }

    /// Apply the initial volume without touching the display mute flag.
    #[must_use]
    pub fn with_volume(mut self, volume: f64) -> Self {
        let volume = clamp_unit(volume);
        self.resource.set_volume(volume);
        self.state.volume = volume;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> PlayerPhase {
        self.phase
    }

    #[must_use]
    pub const fn source(&self) -> &EpisodeRef {
        &self.source
    }

    /// Shared handle to the underlying resource
    #[must_use]
    pub fn resource(&self) -> Arc<R> {
        Arc::clone(&self.resource)
    }

    /// Whether the resource-level mute flag is set
    #[must_use]
    pub const fn resource_muted(&self) -> bool {
        self.resource_muted
    }

    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.state.progress_percent()
    }

    /// Elapsed time as `m:ss`
    #[must_use]
    pub fn elapsed_display(&self) -> String {
        self.state.current_time.clock_display()
    }

    /// Duration as `m:ss`, `0:00` until metadata loads
    #[must_use]
    pub fn duration_display(&self) -> String {
        self.state.duration.clock_display()
    }

    /// Apply a notification from the resource.
    pub fn handle_event(&mut self, event: ResourceEvent) {
        if self.torn_down {
            debug!("Ignoring resource event after teardown: {:?}", event);
            return;
        }

        match event {
            ResourceEvent::MetadataLoaded { duration } => {
                self.state.duration = sanitize_secs(duration);
                self.metadata_loaded = true;
                self.state.current_time = self.clamp_position(self.state.current_time);
                if self.phase == PlayerPhase::Idle {
                    self.set_phase(PlayerPhase::Paused);
                }
                debug!("Metadata loaded: duration={:.1}s", self.state.duration);
            }
            ResourceEvent::TimeUpdated { current_time } => {
                self.state.current_time = self.clamp_position(sanitize_secs(current_time));
            }
            ResourceEvent::Ended => {
                info!("Playback finished for episode {}", self.source.episode_id);
                self.set_phase(PlayerPhase::Finished);
                self.emit(PlayerAction::Complete, Some(self.state.duration.whole_secs()));
            }
            ResourceEvent::Error { message } => {
                warn!("Audio resource error: {}", message);
                if self.phase == PlayerPhase::Playing {
                    self.set_phase(self.rest_phase());
                }
                self.state.error = Some(PlaybackError::LoadFailed { message });
            }
        }
    }

    /// First phase of starting playback: mark the player as playing.
    ///
    /// The caller issues the resource start request and reports the outcome
    /// with [`complete_play`](Self::complete_play). A finished player replays
    /// from the beginning instead.
    pub fn begin_play(&mut self) -> PlayRequest {
        if self.phase == PlayerPhase::Finished {
            return self.begin_replay();
        }

        self.state.error = None;
        self.set_phase(PlayerPhase::Playing);
        self.emit(PlayerAction::Play, Some(self.state.current_time.whole_secs()));
        self.next_request()
    }

    /// First phase of replaying: rewind to zero, clear the finished flag and
    /// mark the player as playing.
    pub fn begin_replay(&mut self) -> PlayRequest {
        self.resource.seek(0.0);
        self.state.current_time = 0.0;
        self.state.error = None;
        self.set_phase(PlayerPhase::Playing);
        self.emit(PlayerAction::Replay, None);
        self.next_request()
    }

    /// Second phase: apply the outcome of a start request.
    ///
    /// A rejection rolls the player back to a non-playing phase and surfaces a
    /// soft error, unless a newer request or a state change (pause, end of
    /// stream, teardown) already superseded this one.
    pub fn complete_play(&mut self, request: PlayRequest, result: Result<(), ResourceError>) {
        let Err(error) = result else {
            debug!("Start request {} confirmed", request.generation);
            return;
        };

        if request.generation != self.generation || self.phase != PlayerPhase::Playing {
            debug!(
                "Ignoring stale start rejection {} ({})",
                request.generation, error
            );
            return;
        }

        warn!("Playback start rejected: {}", error);
        self.set_phase(self.rest_phase());
        self.state.error = Some(PlaybackError::StartRejected(error));
    }

    /// Start (or resume) playback and wait for the resource to answer.
    pub async fn play(&mut self) {
        let request = self.begin_play();
        let result = self.resource.play().await;
        self.complete_play(request, result);
    }

    /// Replay from the beginning and wait for the resource to answer.
    pub async fn replay(&mut self) {
        let request = self.begin_replay();
        let result = self.resource.play().await;
        self.complete_play(request, result);
    }

    /// Pause playback. No-op unless playing.
    pub fn pause(&mut self) {
        if self.phase != PlayerPhase::Playing {
            return;
        }
        self.resource.pause();
        self.set_phase(self.rest_phase());
        self.emit(PlayerAction::Pause, Some(self.state.current_time.whole_secs()));
    }

    /// Single-button behavior: replay when finished, pause when playing,
    /// play otherwise. Returns the start request when one was issued.
    pub fn toggle_play(&mut self) -> Option<PlayRequest> {
        match self.phase {
            PlayerPhase::Finished => Some(self.begin_replay()),
            PlayerPhase::Playing => {
                self.pause();
                None
            }
            PlayerPhase::Idle | PlayerPhase::Paused => Some(self.begin_play()),
        }
    }

    /// Jump to `secs`, clamped to `[0, duration]`.
    ///
    /// Always clears the finished flag. A playing resource keeps playing from
    /// the new position; every other phase becomes `Paused`.
    pub fn seek(&mut self, secs: f64) {
        let target = self.clamp_position(if secs.is_nan() { 0.0 } else { secs.max(0.0) });
        self.resource.seek(target);
        self.state.current_time = target;
        if self.phase != PlayerPhase::Playing {
            self.set_phase(PlayerPhase::Paused);
        }
        self.emit(PlayerAction::Seek, Some(target.whole_secs()));
    }

    /// Seek to a fraction of the duration (progress-bar click).
    pub fn seek_fraction(&mut self, fraction: f64) {
        let target = clamp_unit(fraction) * self.state.duration;
        self.seek(target);
    }

    /// Set the volume, clamped to `[0, 1]`.
    ///
    /// Zero volume shows as muted. A positive volume while muted unmutes,
    /// including the resource-level mute flag if it was set.
    pub fn set_volume(&mut self, volume: f64) {
        let volume = clamp_unit(volume);
        self.resource.set_volume(volume);
        self.state.volume = volume;

        if volume <= 0.0 {
            self.state.is_muted = true;
        } else if self.state.is_muted {
            if self.resource_muted {
                self.resource.set_muted(false);
                self.resource_muted = false;
            }
            self.state.is_muted = false;
        }
    }

    /// Flip the resource-level mute flag.
    ///
    /// Volume is untouched, so the display stays muted at zero volume.
    pub fn toggle_mute(&mut self) {
        let muted = !self.resource_muted;
        self.resource.set_muted(muted);
        self.resource_muted = muted;
        self.state.is_muted = muted || self.state.volume <= 0.0;
    }

    /// Pause the resource and release its subscriptions. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        info!("Unmounting player for episode {}", self.source.episode_id);
        self.resource.pause();
        self.resource.detach();
        if self.phase == PlayerPhase::Playing {
            self.set_phase(self.rest_phase());
        }
        // Invalidate any in-flight start request
        self.generation += 1;
        self.torn_down = true;
    }

    fn next_request(&mut self) -> PlayRequest {
        self.generation += 1;
        PlayRequest {
            generation: self.generation,
        }
    }

    fn set_phase(&mut self, phase: PlayerPhase) {
        self.phase = phase;
        self.state.is_playing = phase == PlayerPhase::Playing;
        self.state.is_finished = phase == PlayerPhase::Finished;
    }

    const fn rest_phase(&self) -> PlayerPhase {
        if self.metadata_loaded {
            PlayerPhase::Paused
        } else {
            PlayerPhase::Idle
        }
    }

    fn clamp_position(&self, secs: f64) -> f64 {
        if self.state.duration > 0.0 {
            secs.min(self.state.duration)
        } else {
            secs
        }
    }

    fn emit(&self, action: PlayerAction, value: Option<u64>) {
        let Some(ref telemetry) = self.telemetry else {
            return;
        };
        let event = PlayerEvent::new(action, &self.source.title, value);
        if let Err(e) = telemetry.record(&event) {
            debug!("Dropping telemetry event {}: {}", action, e);
        }
    }
}

impl<R: AudioResource + ?Sized> Drop for PlaybackController<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
