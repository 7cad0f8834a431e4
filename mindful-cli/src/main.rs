mod args;
mod commands;
mod error;

use crate::args::Cli;
use clap::Parser;
use mindful_core::{CoreError, MindfulConfig};
use mindful_newsletter::NEWSLETTER_CONFIG_TEMPLATE;
use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(file_logging_enabled());

    // Load config or create template on first run
    let integration_templates: &[&str] = &[NEWSLETTER_CONFIG_TEMPLATE];
    let config = match MindfulConfig::load_or_create(Some(integration_templates)) {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            eprintln!(
                "Created a new config file at {}. Review it and run the command again.",
                path.display()
            );
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Ctrl+C triggers graceful shutdown
    let cancel_token = CancellationToken::new();
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    match runtime.block_on(commands::run(cli.command, &config, cancel_token)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Read only `logging.enabled`, so tracing is up before the full config load.
fn file_logging_enabled() -> bool {
    #[derive(serde::Deserialize, Default)]
    struct Logging {
        #[serde(default)]
        enabled: bool,
    }
    #[derive(serde::Deserialize)]
    struct Partial {
        #[serde(default)]
        logging: Logging,
    }

    std::fs::read_to_string(MindfulConfig::config_path())
        .ok()
        .and_then(|content| toml::from_str::<Partial>(&content).ok())
        .is_some_and(|partial| partial.logging.enabled)
}

fn open_log_file() -> Option<File> {
    let log_path = mindful_core::log_file_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match File::create(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Failed to create log file at {}: {e}", log_path.display());
            None
        }
    }
}

/// Log to stderr, plus the cache-dir log file when enabled.
fn init_tracing(to_file: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest_retry=warn"));

    let file_layer = to_file.then(open_log_file).flatten().map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
}
