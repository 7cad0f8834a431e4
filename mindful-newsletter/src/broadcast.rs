//! Newsletter issues and contact-form forwarding.

use crate::email::{EmailSender, OutgoingEmail};
use crate::error::{NewsletterError, Result};
use crate::subscription::validate_email;
use crate::template::{contact_form_email, newsletter_email};
use std::sync::Arc;
use tracing::info;

/// One newsletter issue. `content` is trusted HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Newsletter {
    pub subject: String,
    pub content: String,
    pub preview_text: Option<String>,
}

fn required(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NewsletterError::MissingField { field });
    }
    Ok(())
}

/// Sends issues to every contact in an audience.
pub struct Broadcasts {
    sender: Arc<dyn EmailSender>,
    audience_id: String,
}

impl Broadcasts {
    #[must_use]
    pub fn new(sender: Arc<dyn EmailSender>, audience_id: impl Into<String>) -> Self {
        Self {
            sender,
            audience_id: audience_id.into(),
        }
    }

    /// Recipient address the mail API expands to the whole audience.
    #[must_use]
    pub fn audience_address(&self) -> String {
        format!("audience:{}", self.audience_id)
    }

    /// Render `issue` with the unsubscribe footer and send it to the audience.
    ///
    /// # Errors
    ///
    /// Returns [`NewsletterError::MissingField`] for a blank subject or content,
    /// or the sender's error.
    pub async fn send_newsletter(&self, issue: &Newsletter) -> Result<()> {
        required(&issue.subject, "subject")?;
        required(&issue.content, "content")?;

        let email = newsletter_email(&issue.subject, &issue.content, issue.preview_text.as_deref())
            .addressed_to(self.audience_address());
        self.sender.send(&email).await?;
        info!("Newsletter \"{}\" sent to audience {}", issue.subject, self.audience_id);
        Ok(())
    }
}

/// A message submitted through the site's contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Forwards contact-form messages to the site inbox.
pub struct ContactMessages {
    sender: Arc<dyn EmailSender>,
    inbox: String,
}

impl ContactMessages {
    #[must_use]
    pub fn new(sender: Arc<dyn EmailSender>, inbox: impl Into<String>) -> Self {
        Self {
            sender,
            inbox: inbox.into(),
        }
    }

    /// Forward `form` to the inbox with replies going back to the visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, the visitor's address is invalid,
    /// or sending failed.
    pub async fn forward(&self, form: &ContactForm) -> Result<()> {
        required(&form.name, "name")?;
        required(&form.message, "message")?;
        let reply_to = validate_email(&form.email)?;

        let email = contact_form_email(form.name.trim(), &reply_to, &form.message)
            .addressed_to(self.inbox.clone())
            .with_reply_to(reply_to);
        self.sender.send(&email).await
    }
}
