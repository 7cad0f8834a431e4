pub mod broadcast;
pub mod config;
pub mod email;
pub mod error;
pub mod resend;
pub mod subscription;
pub mod template;

pub use broadcast::{Broadcasts, ContactForm, ContactMessages, Newsletter};
pub use config::{NewsletterConfig, CONFIG_TEMPLATE as NEWSLETTER_CONFIG_TEMPLATE};
pub use email::{ContactList, EmailSender, OutgoingEmail};
pub use error::NewsletterError;
pub use resend::ResendClient;
pub use subscription::{validate_email, SubscribeOutcome, Subscriptions};
pub use template::{
    contact_form_email, escape_html, newsletter_email, welcome_email, RenderedEmail,
};
