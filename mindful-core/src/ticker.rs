//! Periodic driver for the live-visitor count.

use crate::visitors::{VisitorCountState, VisitorModel};
use chrono::{Local, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default update cadence
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(8);

/// Recomputes the visitor count on a fixed interval and publishes it.
pub struct VisitorTicker {
    model: VisitorModel,
    interval: Duration,
    state_tx: watch::Sender<VisitorCountState>,
    cancel_token: CancellationToken,
}

impl VisitorTicker {
    /// Create a new ticker
    ///
    /// # Arguments
    /// * `model` - Validated time-of-day model
    /// * `seed` - Value displayed before the first tick
    /// * `interval` - Update cadence
    /// * `cancel_token` - Optional parent token; [`Self::stop`] never cancels it
    pub fn new(
        model: VisitorModel,
        seed: f64,
        interval: Duration,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        let (state_tx, _) = watch::channel(VisitorCountState::seeded(seed));
        Self {
            model,
            interval,
            state_tx,
            cancel_token: cancel_token
                .map_or_else(CancellationToken::new, |parent| parent.child_token()),
        }
    }

    /// Subscribe to count updates; the receiver starts at the current value
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<VisitorCountState> {
        self.state_tx.subscribe()
    }

    /// Current state
    #[must_use]
    pub fn current(&self) -> VisitorCountState {
        *self.state_tx.borrow()
    }

    /// Get a clone of the cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Signal the ticker to stop.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Start ticking on the local wall clock in a background task
    #[must_use]
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            self.run_with(|| Local::now().time(), &mut rng).await;
        })
    }

    /// Tick until cancelled, reading the time of day from `clock`.
    ///
    /// The first update happens one full interval after the call.
    pub async fn run_with<C, G>(&self, clock: C, rng: &mut G)
    where
        C: Fn() -> NaiveTime + Send,
        G: Rng + Send + ?Sized,
    {
        info!(
            "Starting live visitor ticker (every {}s)",
            self.interval.as_secs_f64()
        );

        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        // A suspended timer resumes without bursting through missed ticks
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!("Live visitor ticker shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let previous = self.current();
                    let next = self.model.tick(previous, clock(), rng);
                    debug!(
                        "Visitor tick: {:.0} -> {:.0} (target {:.0})",
                        previous.displayed, next.displayed, next.target
                    );
                    self.state_tx.send_replace(next);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_seed_before_first_tick() {
        let ticker = VisitorTicker::new(VisitorModel::default(), 24_950.0, DEFAULT_INTERVAL, None);
        let rx = ticker.subscribe();
        assert!((rx.borrow().displayed - 24_950.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let ticker = Arc::new(VisitorTicker::new(
            VisitorModel::default(),
            24_950.0,
            DEFAULT_INTERVAL,
            None,
        ));
        let mut rx = ticker.subscribe();

        let runner = Arc::clone(&ticker);
        let handle = tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(11);
            runner.run_with(noon, &mut rng).await;
        });

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert!(!rx.has_changed().unwrap());

        rx.changed().await.unwrap();
        let first = *rx.borrow_and_update();
        // Target near 2600 pulls the seed down by the maximum step
        assert!((first.displayed - 24_950.0 * 0.92).abs() < 1e-6);
        assert!(first.target >= 2600.0 * 0.95 && first.target <= 2600.0 * 1.05);

        rx.changed().await.unwrap();
        let second = *rx.borrow_and_update();
        assert!(second.displayed < first.displayed);
        assert!(first.displayed - second.displayed <= first.displayed * 0.08 + 1e-9);

        ticker.stop();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticking() {
        let token = CancellationToken::new();
        let ticker = Arc::new(VisitorTicker::new(
            VisitorModel::default(),
            1_000.0,
            DEFAULT_INTERVAL,
            Some(token.clone()),
        ));

        let runner = Arc::clone(&ticker);
        let handle = tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(5);
            runner.run_with(noon, &mut rng).await;
        });

        token.cancel();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!((ticker.current().displayed - 1_000.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_leaves_sibling_tickers_running() {
        let app_token = CancellationToken::new();
        let stopped = Arc::new(VisitorTicker::new(
            VisitorModel::default(),
            1_000.0,
            DEFAULT_INTERVAL,
            Some(app_token.clone()),
        ));
        let running = Arc::new(VisitorTicker::new(
            VisitorModel::default(),
            24_950.0,
            DEFAULT_INTERVAL,
            Some(app_token.clone()),
        ));
        let mut rx = running.subscribe();

        let runner = Arc::clone(&running);
        let handle = tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(3);
            runner.run_with(noon, &mut rng).await;
        });

        stopped.stop();
        assert!(!app_token.is_cancelled());

        rx.changed().await.unwrap();
        assert!(rx.borrow().displayed < 24_950.0);

        app_token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_uses_wall_clock() {
        let ticker = Arc::new(VisitorTicker::new(
            VisitorModel::default(),
            24_950.0,
            Duration::from_secs(1),
            None,
        ));
        let mut rx = ticker.subscribe();
        let handle = Arc::clone(&ticker).start();

        rx.changed().await.unwrap();
        assert!(rx.borrow().displayed < 24_950.0);

        ticker.stop();
        handle.await.unwrap();
    }
}
