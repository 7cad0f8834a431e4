//! Locally persisted like counter.
//!
//! Counts are cosmetic: each content item is seeded once with a plausible
//! random value and then moves by exactly one per toggle. Persistence
//! failures never block the in-memory update.

use crate::catalog::ContentType;
use crate::store::KeyValueStore;
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, warn};

/// Range the initial like count is drawn from
pub const DEFAULT_SEED_RANGE: RangeInclusive<u32> = 845..=2788;

/// Storage key of the per-visitor liked flag
#[must_use]
pub fn like_status_key(content_type: ContentType, content_id: &str) -> String {
    format!("{content_type}_like_{content_id}")
}

/// Storage key of the like count
#[must_use]
pub fn like_count_key(content_type: ContentType, content_id: &str) -> String {
    format!("{content_type}_count_{content_id}")
}

/// Like state of one content item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeState {
    pub content_id: String,
    pub content_type: ContentType,
    pub is_liked: bool,
    pub like_count: u32,
}

/// Like toggle bound to a store
pub struct LikeCounter<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    state: LikeState,
}

impl<S: KeyValueStore + ?Sized> LikeCounter<S> {
    /// Load the like state, seeding and persisting the count on first view.
    pub fn load<G: Rng + ?Sized>(
        store: Arc<S>,
        content_type: ContentType,
        content_id: impl Into<String>,
        seed_range: &RangeInclusive<u32>,
        rng: &mut G,
    ) -> Self {
        let content_id = content_id.into();
        let status_key = like_status_key(content_type, &content_id);
        let count_key = like_count_key(content_type, &content_id);

        let is_liked = match store.get(&status_key) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!("Failed to read like status for {}: {}", status_key, e);
                false
            }
        };

        let saved_count = match store.get(&count_key) {
            Ok(Some(value)) => match value.trim().parse::<u32>() {
                Ok(count) => Some(count),
                Err(_) => {
                    warn!("Ignoring malformed like count {:?} for {}", value, count_key);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read like count for {}: {}", count_key, e);
                None
            }
        };

        let like_count = saved_count.unwrap_or_else(|| {
            let seeded = if seed_range.is_empty() {
                *seed_range.start()
            } else {
                rng.gen_range(seed_range.clone())
            };
            debug!("Seeding {} with {} likes", count_key, seeded);
            persist(store.as_ref(), &count_key, &seeded.to_string());
            seeded
        });

        Self {
            store,
            state: LikeState {
                content_id,
                content_type,
                is_liked,
                like_count,
            },
        }
    }

    #[must_use]
    pub const fn state(&self) -> &LikeState {
        &self.state
    }

    /// Flip the liked flag and move the count by one in the same direction.
    pub fn toggle_like(&mut self) -> &LikeState {
        let is_liked = !self.state.is_liked;
        let like_count = if is_liked {
            self.state.like_count.saturating_add(1)
        } else {
            self.state.like_count.saturating_sub(1)
        };

        self.state.is_liked = is_liked;
        self.state.like_count = like_count;

        let content_type = self.state.content_type;
        let content_id = &self.state.content_id;
        persist(
            self.store.as_ref(),
            &like_status_key(content_type, content_id),
            if is_liked { "true" } else { "false" },
        );
        persist(
            self.store.as_ref(),
            &like_count_key(content_type, content_id),
            &like_count.to_string(),
        );

        &self.state
    }
}

fn persist<S: KeyValueStore + ?Sized>(store: &S, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        warn!("Failed to persist {}: {}", key, e);
    }
}
