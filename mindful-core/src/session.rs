//! Async host for a [`PlaybackController`].
//!
//! A session owns the controller behind a mutex, pumps resource notifications
//! into it on a background task, and runs start requests without holding the
//! lock so the optimistic `Playing` state is observable while the resource
//! decides.

use crate::player::{PlaybackController, PlaybackState, PlayerPhase};
use crate::resource::{AudioResource, ResourceEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A mounted player: controller plus its notification pump.
pub struct PlayerSession<R: AudioResource + ?Sized + 'static> {
    controller: Arc<Mutex<PlaybackController<R>>>,
    cancel_token: CancellationToken,
    pump: Option<JoinHandle<()>>,
}

impl<R: AudioResource + ?Sized + 'static> PlayerSession<R> {
    /// Mount a session and start pumping `events` into the controller.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    /// * `controller` - Controller bound to the resource emitting `events`
    /// * `events` - Resource notifications, in arrival order
    /// * `cancel_token` - Optional parent token; cancelling it stops the pump.
    ///   The session only ever cancels its own child of it.
    pub fn start(
        controller: PlaybackController<R>,
        events: mpsc::Receiver<ResourceEvent>,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        let controller = Arc::new(Mutex::new(controller));
        let cancel_token = cancel_token.map_or_else(CancellationToken::new, |parent| {
            parent.child_token()
        });

        let pump = tokio::spawn(pump_events(
            Arc::clone(&controller),
            events,
            cancel_token.clone(),
        ));

        Self {
            controller,
            cancel_token,
            pump: Some(pump),
        }
    }

    /// Get a clone of the cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Start playback; resolves once the resource answered.
    pub async fn play(&self) {
        let (request, resource) = {
            let mut controller = self.controller.lock().await;
            (controller.begin_play(), controller.resource())
        };
        let result = resource.play().await;
        self.controller.lock().await.complete_play(request, result);
    }

    /// Replay from the start; resolves once the resource answered.
    pub async fn replay(&self) {
        let (request, resource) = {
            let mut controller = self.controller.lock().await;
            (controller.begin_replay(), controller.resource())
        };
        let result = resource.play().await;
        self.controller.lock().await.complete_play(request, result);
    }

    /// Single-button behavior (play, pause or replay).
    pub async fn toggle_play(&self) {
        let (request, resource) = {
            let mut controller = self.controller.lock().await;
            (controller.toggle_play(), controller.resource())
        };
        if let Some(request) = request {
            let result = resource.play().await;
            self.controller.lock().await.complete_play(request, result);
        }
    }

    pub async fn pause(&self) {
        self.controller.lock().await.pause();
    }

    pub async fn seek(&self, secs: f64) {
        self.controller.lock().await.seek(secs);
    }

    pub async fn seek_fraction(&self, fraction: f64) {
        self.controller.lock().await.seek_fraction(fraction);
    }

    pub async fn set_volume(&self, volume: f64) {
        self.controller.lock().await.set_volume(volume);
    }

    pub async fn toggle_mute(&self) {
        self.controller.lock().await.toggle_mute();
    }

    /// Snapshot of the display state
    pub async fn state(&self) -> PlaybackState {
        self.controller.lock().await.state().clone()
    }

    pub async fn phase(&self) -> PlayerPhase {
        self.controller.lock().await.phase()
    }

    pub async fn progress_percent(&self) -> f64 {
        self.controller.lock().await.progress_percent()
    }

    /// Stop the pump, pause the resource and release its subscriptions.
    pub async fn shutdown(mut self) {
        self.cancel_token.cancel();
        if let Some(pump) = self.pump.take() {
            if let Err(e) = pump.await {
                warn!("Player event pump ended abnormally: {}", e);
            }
        }
        self.controller.lock().await.teardown();
    }
}

impl<R: AudioResource + ?Sized + 'static> Drop for PlayerSession<R> {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn pump_events<R: AudioResource + ?Sized>(
    controller: Arc<Mutex<PlaybackController<R>>>,
    mut events: mpsc::Receiver<ResourceEvent>,
    cancel_token: CancellationToken,
) {
    debug!("Player event pump started");

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!("Player event pump shutting down");
                break;
            }
            event = events.recv() => {
                match event {
                    Some(event) => controller.lock().await.handle_event(event),
                    None => {
                        debug!("Resource event channel closed");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EpisodeRef;
    use crate::resource::testing::{Command, FakeResource};
    use crate::resource::ResourceError;
    use std::time::Duration;

    fn episode() -> EpisodeRef {
        EpisodeRef::new("002", "Episódio", "/audios/episode-2.mp3", "12:00")
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test]
    async fn test_events_are_pumped() {
        let resource = Arc::new(FakeResource::default());
        let controller = PlaybackController::new(Arc::clone(&resource), episode(), None);
        let (tx, rx) = mpsc::channel(8);
        let session = PlayerSession::start(controller, rx, None);

        tx.send(ResourceEvent::MetadataLoaded { duration: 720.0 })
            .await
            .unwrap();
        tx.send(ResourceEvent::TimeUpdated { current_time: 72.0 })
            .await
            .unwrap();
        settle().await;

        assert_eq!(session.phase().await, PlayerPhase::Paused);
        assert!((session.progress_percent().await - 10.0).abs() < 1e-9);
        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_play_and_reject_through_session() {
        let resource = Arc::new(FakeResource::default());
        let controller = PlaybackController::new(Arc::clone(&resource), episode(), None);
        let (_tx, rx) = mpsc::channel(8);
        let session = PlayerSession::start(controller, rx, None);

        session.play().await;
        assert!(session.state().await.is_playing);

        session.pause().await;
        resource.set_reject(Some(ResourceError::NotAllowed("gesture".into())));
        session.play().await;
        let state = session.state().await;
        assert!(!state.is_playing);
        assert!(state.error.is_some());

        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_toggle_play_through_session() {
        let resource = Arc::new(FakeResource::default());
        let controller = PlaybackController::new(Arc::clone(&resource), episode(), None);
        let (tx, rx) = mpsc::channel(8);
        let session = PlayerSession::start(controller, rx, None);

        session.toggle_play().await;
        assert_eq!(session.phase().await, PlayerPhase::Playing);

        tx.send(ResourceEvent::Ended).await.unwrap();
        settle().await;
        assert_eq!(session.phase().await, PlayerPhase::Finished);

        session.toggle_play().await;
        let state = session.state().await;
        assert!(state.is_playing);
        assert!(state.current_time.abs() < f64::EPSILON);

        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_pauses_and_detaches() {
        let resource = Arc::new(FakeResource::default());
        let controller = PlaybackController::new(Arc::clone(&resource), episode(), None);
        let (tx, rx) = mpsc::channel(8);
        let session = PlayerSession::start(controller, rx, None);

        session.play().await;
        session.shutdown().await;

        let commands = resource.commands();
        assert!(commands.contains(&Command::Pause));
        assert_eq!(commands.last(), Some(&Command::Detach));
        // Pump is gone; the channel receiver was dropped with it
        assert!(tx.send(ResourceEvent::Ended).await.is_err());
    }

    #[tokio::test]
    async fn test_sessions_sharing_a_parent_token_are_independent() {
        let app_token = CancellationToken::new();

        let first = PlayerSession::start(
            PlaybackController::new(Arc::new(FakeResource::default()), episode(), None),
            mpsc::channel(8).1,
            Some(app_token.clone()),
        );
        let (tx, rx) = mpsc::channel(8);
        let second = PlayerSession::start(
            PlaybackController::new(Arc::new(FakeResource::default()), episode(), None),
            rx,
            Some(app_token.clone()),
        );

        drop(first);
        settle().await;
        assert!(!app_token.is_cancelled());

        tx.send(ResourceEvent::MetadataLoaded { duration: 30.0 })
            .await
            .unwrap();
        settle().await;
        assert_eq!(second.phase().await, PlayerPhase::Paused);

        second.shutdown().await;
        assert!(!app_token.is_cancelled());
    }

    #[tokio::test]
    async fn test_external_cancel_stops_pump() {
        let resource = Arc::new(FakeResource::default());
        let controller = PlaybackController::new(Arc::clone(&resource), episode(), None);
        let (tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let session = PlayerSession::start(controller, rx, Some(token.clone()));

        token.cancel();
        settle().await;
        assert!(tx.send(ResourceEvent::Ended).await.is_err());
        assert_eq!(session.phase().await, PlayerPhase::Idle);

        session.shutdown().await;
    }
}
