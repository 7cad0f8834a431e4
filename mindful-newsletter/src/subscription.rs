//! Newsletter sign-up flow.

use crate::email::{ContactList, EmailSender};
use crate::error::{NewsletterError, Result};
use crate::template::welcome_email;
use chrono::{Datelike, Local};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Accepted address shape: `local@domain.tld`, no whitespace
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(pattern) = PATTERN.get() {
        return Ok(pattern);
    }
    let compiled = Regex::new(EMAIL_PATTERN)?;
    Ok(PATTERN.get_or_init(|| compiled))
}

/// Trim and validate a submitted address.
///
/// # Errors
///
/// Returns [`NewsletterError::EmailRequired`] for blank input and
/// [`NewsletterError::InvalidEmail`] when the shape does not match.
pub fn validate_email(raw: &str) -> Result<String> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(NewsletterError::EmailRequired);
    }
    if !email_pattern()?.is_match(email) {
        return Err(NewsletterError::InvalidEmail {
            email: email.to_string(),
        });
    }
    Ok(email.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    /// The contact already existed; the welcome e-mail was still sent
    AlreadySubscribed,
}

/// Adds contacts to the mailing list and welcomes them.
pub struct Subscriptions {
    contacts: Arc<dyn ContactList>,
    sender: Arc<dyn EmailSender>,
}

impl Subscriptions {
    #[must_use]
    pub fn new(contacts: Arc<dyn ContactList>, sender: Arc<dyn EmailSender>) -> Self {
        Self { contacts, sender }
    }

    /// Subscribe `raw` and send the welcome e-mail.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid, the contact could not be
    /// added for a reason other than already existing, or sending failed.
    pub async fn subscribe(&self, raw: &str) -> Result<SubscribeOutcome> {
        self.subscribe_in_year(raw, Local::now().year()).await
    }

    /// Same as [`Self::subscribe`] with an explicit footer year.
    ///
    /// # Errors
    ///
    /// See [`Self::subscribe`].
    pub async fn subscribe_in_year(&self, raw: &str, year: i32) -> Result<SubscribeOutcome> {
        let email = validate_email(raw)?;
        info!("Processing subscription for {}", email);

        let outcome = match self.contacts.add_contact(&email).await {
            Ok(()) => SubscribeOutcome::Subscribed,
            Err(NewsletterError::AlreadySubscribed { .. }) => {
                info!("{} is already on the list", email);
                SubscribeOutcome::AlreadySubscribed
            }
            Err(e) => {
                warn!("Failed to add {} to the list: {}", email, e);
                return Err(e);
            }
        };

        let name = email.split('@').next().unwrap_or_default();
        let welcome = welcome_email(name, year).addressed_to(email.as_str());
        self.sender.send(&welcome).await?;

        info!("Subscription complete for {} ({:?})", email, outcome);
        Ok(outcome)
    }
}
