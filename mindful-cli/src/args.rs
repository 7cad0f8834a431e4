//! Command-line parsing.

use clap::{Parser, Subcommand};
use mindful_core::ContentType;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mindful")]
#[command(version)]
#[command(about = "Being Mindful widgets from the terminal", long_about = None)]
#[command(after_help = "Set RUST_LOG to control log verbosity (default: info).")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the live visitor count as it updates
    Visitors {
        /// Stop after this many updates
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        ticks: Option<u32>,
    },
    /// Show the like count of a content item
    Likes {
        /// blog or podcast
        #[arg(value_parser = parse_content_type)]
        content_type: ContentType,
        id: String,
    },
    /// Toggle your like on a content item
    Like {
        /// blog or podcast
        #[arg(value_parser = parse_content_type)]
        content_type: ContentType,
        id: String,
    },
    /// Subscribe to the newsletter
    Subscribe { email: String },
    /// Send a newsletter issue to the whole audience
    Broadcast {
        /// Subject line
        #[arg(long)]
        subject: String,
        /// HTML file with the issue body
        content: PathBuf,
        /// Preview text shown by mail clients
        #[arg(long)]
        preview: Option<String>,
    },
}

fn parse_content_type(value: &str) -> Result<ContentType, String> {
    ContentType::parse(value)
        .ok_or_else(|| format!("unknown content type {value:?} (expected \"blog\" or \"podcast\")"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("mindful").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_shows_help() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_visitors() {
        assert_eq!(parse(&["visitors"]).unwrap(), Command::Visitors { ticks: None });
        assert_eq!(
            parse(&["visitors", "--ticks", "3"]).unwrap(),
            Command::Visitors { ticks: Some(3) }
        );
        assert_eq!(
            parse(&["visitors", "--ticks", "0"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["visitors", "--fast"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
    }

    #[test]
    fn test_like_and_likes() {
        assert_eq!(
            parse(&["like", "podcast", "001"]).unwrap(),
            Command::Like {
                content_type: ContentType::Podcast,
                id: "001".into(),
            }
        );
        assert_eq!(
            parse(&["likes", "blog", "respiracao"]).unwrap(),
            Command::Likes {
                content_type: ContentType::Blog,
                id: "respiracao".into(),
            }
        );
        assert_eq!(
            parse(&["like", "video", "1"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["like", "blog"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_subscribe() {
        assert_eq!(
            parse(&["subscribe", "ana@example.com"]).unwrap(),
            Command::Subscribe {
                email: "ana@example.com".into()
            }
        );
        assert_eq!(
            parse(&["subscribe", "a@b.c", "extra"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
    }

    #[test]
    fn test_broadcast() {
        assert_eq!(
            parse(&["broadcast", "--subject", "Novidades", "issue.html"]).unwrap(),
            Command::Broadcast {
                subject: "Novidades".into(),
                content: PathBuf::from("issue.html"),
                preview: None,
            }
        );
        assert_eq!(
            parse(&["broadcast", "issue.html"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse(&["dance"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
    }
}
