//! # replyline Main Entry Point
//!
//! Loads a storefront page and runs a reply session against it.

use anyhow::{Context, Result};
use replyline::cmd_args::CommandLineArgs;
use replyline::config;
use replyline::io::{ScriptCommandStream, StdinCommandStream};
use replyline::{AppController, HttpTransport, PageDocument, ReplyController, TerminalNotifier};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CommandLineArgs::parse();
    init_logging(args.verbose());

    let profile_path = config::get_profile_path();
    let profile = config::load_profile(args.profile(), &profile_path)?;

    let markup = std::fs::read_to_string(args.page())
        .with_context(|| format!("Failed to read page '{}'", args.page().display()))?;
    let document = PageDocument::parse(&markup);

    let transport = HttpTransport::new(&profile)?;
    if !transport.is_available() {
        tracing::warn!(
            "Profile '{}' has no server; network actions will fail",
            profile.name
        );
    }

    let controller = ReplyController::new(
        document,
        Arc::new(transport),
        Arc::new(TerminalNotifier::new(args.assume_yes())),
    );
    let stdout = std::io::stdout();

    match args.script() {
        Some(script) => {
            let commands = ScriptCommandStream::from_file(script)?;
            AppController::new(controller, commands, stdout).run().await
        }
        None => {
            AppController::new(controller, StdinCommandStream::new(), stdout)
                .run()
                .await
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(config::LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
