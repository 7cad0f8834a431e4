use mindful_core::CoreError;
use mindful_newsletter::NewsletterError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Newsletter(#[from] NewsletterError),

    #[error("Newsletter is not configured. Add an [integrations.newsletter] section to {}", path.display())]
    NewsletterNotConfigured { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    ReadContent {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
