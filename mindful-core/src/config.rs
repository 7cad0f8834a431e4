use crate::error::{CoreError, Result};
use crate::likes::DEFAULT_SEED_RANGE;
use crate::ticker::DEFAULT_INTERVAL;
use crate::visitors::{default_periods, Layout, TimePeriod, VisitorModel, WalkBounds};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MindfulConfig {
    #[serde(default)]
    pub visitors: VisitorsConfig,
    #[serde(default)]
    pub likes: LikesConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub integrations: IntegrationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorsConfig {
    /// Daily visitor total distributed over the periods
    #[serde(default = "default_daily_total")]
    pub daily_total: f64,
    /// Value shown before the first update
    #[serde(default = "default_seed")]
    pub seed: f64,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_jitter_min")]
    pub jitter_min: f64,
    #[serde(default = "default_jitter_max")]
    pub jitter_max: f64,
    #[serde(default = "default_min_step")]
    pub min_step: f64,
    #[serde(default = "default_max_step")]
    pub max_step: f64,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default = "default_group_separator")]
    pub group_separator: char,
    #[serde(default = "default_periods")]
    pub periods: Vec<TimePeriod>,
}

const fn default_daily_total() -> f64 {
    26_000.0
}

const fn default_seed() -> f64 {
    24_950.0
}

const fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL.as_secs()
}

const fn default_jitter_min() -> f64 {
    0.95
}

const fn default_jitter_max() -> f64 {
    1.05
}

const fn default_min_step() -> f64 {
    0.02
}

const fn default_max_step() -> f64 {
    0.08
}

const fn default_group_separator() -> char {
    '.'
}

impl Default for VisitorsConfig {
    fn default() -> Self {
        Self {
            daily_total: default_daily_total(),
            seed: default_seed(),
            interval_secs: default_interval_secs(),
            jitter_min: default_jitter_min(),
            jitter_max: default_jitter_max(),
            min_step: default_min_step(),
            max_step: default_max_step(),
            layout: Layout::default(),
            group_separator: default_group_separator(),
            periods: default_periods(),
        }
    }
}

impl VisitorsConfig {
    /// Build the validated time-of-day model.
    ///
    /// # Errors
    ///
    /// Returns an error if the periods or walk bounds are inconsistent.
    pub fn model(&self) -> Result<VisitorModel> {
        VisitorModel::new(
            self.periods.clone(),
            self.daily_total,
            WalkBounds {
                jitter_min: self.jitter_min,
                jitter_max: self.jitter_max,
                min_step: self.min_step,
                max_step: self.max_step,
            },
        )
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikesConfig {
    #[serde(default = "default_like_seed_min")]
    pub seed_min: u32,
    #[serde(default = "default_like_seed_max")]
    pub seed_max: u32,
}

const fn default_like_seed_min() -> u32 {
    *DEFAULT_SEED_RANGE.start()
}

const fn default_like_seed_max() -> u32 {
    *DEFAULT_SEED_RANGE.end()
}

impl Default for LikesConfig {
    fn default() -> Self {
        Self {
            seed_min: default_like_seed_min(),
            seed_max: default_like_seed_max(),
        }
    }
}

impl LikesConfig {
    #[must_use]
    pub const fn seed_range(&self) -> RangeInclusive<u32> {
        self.seed_min..=self.seed_max
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_volume")]
    pub initial_volume: f64,
    /// Record player events through the tracing telemetry sink
    #[serde(default = "default_true")]
    pub telemetry: bool,
}

const fn default_volume() -> f64 {
    1.0
}

const fn default_true() -> bool {
    true
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: default_volume(),
            telemetry: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to the cache directory
    #[serde(default)]
    pub enabled: bool,
}

/// Per-integration tables under `[integrations.<name>]`.
///
/// Integration crates own their config types and extract them by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrationsConfig(HashMap<String, toml::Value>);

impl IntegrationsConfig {
    /// Deserialize the table for `name`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not match `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.0.get(name) {
            Some(value) => Ok(Some(value.clone().try_into()?)),
            None => Ok(None),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

impl MindfulConfig {
    /// Get the configuration directory path (~/.config/mindful/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/mindful/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from file or create template on first run
    ///
    /// `extra_templates` are appended to the generated template (integration
    /// sections owned by other crates).
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed, or is invalid.
    /// Returns [`CoreError::ConfigNotFound`] after writing a fresh template.
    pub fn load_or_create(extra_templates: Option<&[&str]>) -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(&config_path, build_config_template(extra_templates))?;

            return Err(CoreError::ConfigNotFound { path: config_path });
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or fails validation.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.visitors.model()?;

        if self.visitors.interval_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "visitors.interval_secs must be at least 1".into(),
            });
        }
        if self.likes.seed_min > self.likes.seed_max {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "likes.seed_min ({}) exceeds likes.seed_max ({})",
                    self.likes.seed_min, self.likes.seed_max
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.player.initial_volume) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "player.initial_volume must be within [0, 1], got {}",
                    self.player.initial_volume
                ),
            });
        }
        Ok(())
    }
}

/// Full config template including integration sections
#[must_use]
pub fn build_config_template(extra_templates: Option<&[&str]>) -> String {
    let mut template = CONFIG_TEMPLATE.to_string();
    for extra in extra_templates.unwrap_or_default() {
        template.push('\n');
        template.push_str(extra);
    }
    template
}

const CONFIG_TEMPLATE: &str = r#"# Being Mindful Configuration
# ~/.config/mindful/config.toml

[visitors]
# Simulated "visitors online now" counter
daily_total = 26000
seed = 24950
interval_secs = 8
# Random factor applied to each target
jitter_min = 0.95
jitter_max = 1.05
# Step bounds as a fraction of the displayed value
min_step = 0.02
max_step = 0.08
layout = "wide"  # "wide" or "narrow"
group_separator = "."

# Hour ranges must cover 0-24 without gaps; fractions must sum to 1
periods = [
    { start_hour = 0, end_hour = 6, fraction = 0.05 },
    { start_hour = 6, end_hour = 9, fraction = 0.10 },
    { start_hour = 9, end_hour = 12, fraction = 0.15 },
    { start_hour = 12, end_hour = 14, fraction = 0.20 },
    { start_hour = 14, end_hour = 17, fraction = 0.15 },
    { start_hour = 17, end_hour = 20, fraction = 0.25 },
    { start_hour = 20, end_hour = 24, fraction = 0.10 },
]

[likes]
# Initial like count range for content seen for the first time
seed_min = 845
seed_max = 2788

[player]
initial_volume = 1.0
telemetry = true

[logging]
# Also write logs to ~/.cache/mindful/mindful.log
enabled = false
"#;
