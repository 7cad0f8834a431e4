use crate::error::Result;
use async_trait::async_trait;

/// A single transactional e-mail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address, or `audience:<id>` for a broadcast
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

impl OutgoingEmail {
    #[must_use]
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    #[must_use]
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    #[must_use]
    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }
}

/// Delivers transactional e-mail.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handed to the provider.
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

/// Mailing list membership.
#[async_trait]
pub trait ContactList: Send + Sync {
    /// Add a subscribed contact.
    ///
    /// # Errors
    ///
    /// Returns [`crate::NewsletterError::AlreadySubscribed`] if the contact
    /// exists, or another error if the provider rejected the request.
    async fn add_contact(&self, email: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_recipients() {
        let email = OutgoingEmail::new("contato@being-mindful.com", "Oi", "<p>Oi</p>")
            .with_reply_to("ana@example.com")
            .with_cc("equipe@being-mindful.com")
            .with_bcc("arquivo@being-mindful.com")
            .with_bcc("log@being-mindful.com");

        assert_eq!(email.reply_to.as_deref(), Some("ana@example.com"));
        assert_eq!(email.cc, vec!["equipe@being-mindful.com"]);
        assert_eq!(email.bcc.len(), 2);
    }

    #[test]
    fn test_new_has_no_extra_recipients() {
        let email = OutgoingEmail::new("ana@example.com", "Oi", "");
        assert!(email.reply_to.is_none());
        assert!(email.cc.is_empty() && email.bcc.is_empty());
    }
}
