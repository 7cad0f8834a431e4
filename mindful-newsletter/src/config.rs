//! Newsletter integration configuration.

use const_format::concatcp;
use mindful_core::{CoreError, IntegrationsConfig};
use serde::{Deserialize, Serialize};

/// Integration name used in config file
pub const INTEGRATION_NAME: &str = "newsletter";

/// Sender used when none is configured
pub const DEFAULT_FROM: &str = "Being Mindful <noreply@being-mindful.com>";

/// Resend API base URL
pub const DEFAULT_API_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterConfig {
    /// Resend API key
    pub api_key: String,
    /// Audience new subscribers are added to
    pub audience_id: String,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_from() -> String {
    DEFAULT_FROM.into()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

impl NewsletterConfig {
    /// Extract the newsletter config from the integrations table.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be parsed.
    pub fn from_integrations(integrations: &IntegrationsConfig) -> Result<Option<Self>, CoreError> {
        integrations.get(INTEGRATION_NAME)
    }

    /// Validate that required fields are present.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or empty.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api_key.trim().is_empty() {
            return Err(CoreError::ConfigMissingField {
                field: "integrations.newsletter.api_key".into(),
            });
        }
        if self.audience_id.trim().is_empty() {
            return Err(CoreError::ConfigMissingField {
                field: "integrations.newsletter.audience_id".into(),
            });
        }
        Ok(())
    }
}

/// Config template for the newsletter integration.
/// This is appended to the base config template when creating a new config file.
pub const CONFIG_TEMPLATE: &str = concatcp!(
    r#"[integrations.newsletter]
# Required for `mindful subscribe`
# Get these from https://resend.com/api-keys and https://resend.com/audiences
api_key = ""
audience_id = ""
from = ""#,
    DEFAULT_FROM,
    "\"\n"
);
