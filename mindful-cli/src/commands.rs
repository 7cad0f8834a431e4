use crate::args::Command;
use crate::error::CliError;
use mindful_core::{
    format_count, ContentType, KeyValueStore, LikeCounter, LikeState, MindfulConfig,
    SqliteStore, VisitorTicker, VisitorsConfig,
};
use mindful_newsletter::{
    Broadcasts, Newsletter, NewsletterConfig, ResendClient, SubscribeOutcome, Subscriptions,
};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Run one parsed command to completion or cancellation.
pub async fn run(
    command: Command,
    config: &MindfulConfig,
    cancel_token: CancellationToken,
) -> Result<(), CliError> {
    let mut out = std::io::stdout();
    match command {
        Command::Visitors { ticks } => run_visitors(config, ticks, cancel_token, &mut out).await,
        Command::Likes { content_type, id } => {
            let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new()?);
            print_like(&mut out, &run_like(config, store, content_type, id, false));
            Ok(())
        }
        Command::Like { content_type, id } => {
            let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new()?);
            print_like(&mut out, &run_like(config, store, content_type, id, true));
            Ok(())
        }
        Command::Subscribe { email } => run_subscribe(config, &email, &mut out).await,
        Command::Broadcast {
            subject,
            content,
            preview,
        } => {
            let issue = Newsletter {
                subject,
                content: std::fs::read_to_string(&content)
                    .map_err(|source| CliError::ReadContent { path: content, source })?,
                preview_text: preview,
            };
            run_broadcast(config, &issue, &mut out).await
        }
    }
}

/// Print the visitor count on every update.
pub async fn run_visitors<W: Write + Send>(
    config: &MindfulConfig,
    ticks: Option<u32>,
    cancel_token: CancellationToken,
    out: &mut W,
) -> Result<(), CliError> {
    let visitors = &config.visitors;
    let ticker = Arc::new(VisitorTicker::new(
        visitors.model()?,
        visitors.seed,
        visitors.interval(),
        Some(cancel_token.child_token()),
    ));
    let mut rx = ticker.subscribe();

    let initial = rx.borrow_and_update().displayed;
    print_count(out, visitors, initial);
    let handle = Arc::clone(&ticker).start();

    let mut seen = 0_u32;
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *rx.borrow_and_update();
                print_count(out, visitors, state.displayed);
                seen += 1;
                if ticks.is_some_and(|limit| seen >= limit) {
                    debug!("Reached {} updates", seen);
                    break;
                }
            }
        }
    }

    ticker.stop();
    handle.await?;
    Ok(())
}

fn print_count<W: Write>(out: &mut W, visitors: &VisitorsConfig, displayed: f64) {
    let _ = writeln!(
        out,
        "{} visitantes online agora",
        format_count(displayed, visitors.layout, visitors.group_separator)
    );
}

/// Load, and optionally toggle, the like state of one item.
pub fn run_like(
    config: &MindfulConfig,
    store: Arc<dyn KeyValueStore>,
    content_type: ContentType,
    content_id: String,
    toggle: bool,
) -> LikeState {
    let mut counter = LikeCounter::load(
        store,
        content_type,
        content_id,
        &config.likes.seed_range(),
        &mut rand::thread_rng(),
    );
    if toggle {
        counter.toggle_like();
    }
    counter.state().clone()
}

fn print_like<W: Write>(out: &mut W, state: &LikeState) {
    let marker = if state.is_liked { "♥" } else { "♡" };
    let _ = writeln!(
        out,
        "{marker} {} {}: {} curtidas",
        state.content_type, state.content_id, state.like_count
    );
}

fn newsletter_config(config: &MindfulConfig) -> Result<NewsletterConfig, CliError> {
    NewsletterConfig::from_integrations(&config.integrations)?.ok_or_else(|| {
        CliError::NewsletterNotConfigured {
            path: MindfulConfig::config_path(),
        }
    })
}

async fn run_subscribe<W: Write + Send>(
    config: &MindfulConfig,
    email: &str,
    out: &mut W,
) -> Result<(), CliError> {
    let newsletter = newsletter_config(config)?;
    let client = Arc::new(ResendClient::new(&newsletter)?);
    let subscriptions = Subscriptions::new(client.clone(), client);

    let outcome = subscriptions.subscribe(email).await?;
    info!("Subscribe outcome: {:?}", outcome);
    let _ = match outcome {
        SubscribeOutcome::Subscribed => writeln!(out, "Inscrição realizada com sucesso"),
        SubscribeOutcome::AlreadySubscribed => {
            writeln!(out, "Você já estava inscrito(a); reenviamos o e-mail de boas-vindas")
        }
    };
    Ok(())
}

async fn run_broadcast<W: Write + Send>(
    config: &MindfulConfig,
    issue: &Newsletter,
    out: &mut W,
) -> Result<(), CliError> {
    let newsletter = newsletter_config(config)?;
    let client = Arc::new(ResendClient::new(&newsletter)?);
    let broadcasts = Broadcasts::new(client, newsletter.audience_id);

    broadcasts.send_newsletter(issue).await?;
    let _ = writeln!(out, "Newsletter enviada para {}", broadcasts.audience_address());
    Ok(())
}
