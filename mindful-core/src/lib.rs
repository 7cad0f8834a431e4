pub mod catalog;
pub mod config;
pub mod error;
pub mod likes;
pub mod paths;
pub mod player;
pub mod resource;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod ticker;
pub mod time;
pub mod visitors;

pub use catalog::{ContentType, EpisodeRef};
pub use config::{
    build_config_template, IntegrationsConfig, LikesConfig, LoggingConfig, MindfulConfig,
    PlayerConfig, VisitorsConfig,
};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use error::{CoreError, Result};
pub use likes::{like_count_key, like_status_key, LikeCounter, LikeState, DEFAULT_SEED_RANGE};
pub use paths::{
    config_dir, config_path, likes_db_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    LIKES_DB_FILE_NAME, LOG_FILE_NAME,
};
pub use player::{PlayRequest, PlaybackController, PlaybackError, PlaybackState, PlayerPhase};
pub use resource::{AudioResource, ResourceError, ResourceEvent};
pub use session::PlayerSession;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use telemetry::{
    NoopTelemetry, PlayerAction, PlayerEvent, TelemetrySink, TracingTelemetry, AUDIO_CATEGORY,
};
pub use ticker::{VisitorTicker, DEFAULT_INTERVAL};
pub use time::SecondsExt;
pub use visitors::{
    default_periods, format_count, validate_periods, Layout, TimePeriod, VisitorCountState,
    VisitorModel, WalkBounds,
};
