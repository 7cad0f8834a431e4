use mindful_core::CoreError;
use thiserror::Error;

/// Errors from the newsletter subscription flow and the mail API.
#[derive(Debug, Error)]
pub enum NewsletterError {
    /// No address was submitted.
    #[error("Email is required")]
    EmailRequired,

    /// The address does not look like `local@domain.tld`.
    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    /// A required message field was blank.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// The audience already contains this contact.
    #[error("{email} is already subscribed")]
    AlreadySubscribed { email: String },

    /// The mail API answered with a non-success status.
    #[error("Mail API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid email pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for Results with `NewsletterError`.
pub type Result<T> = std::result::Result<T, NewsletterError>;
