// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! svw: run an `svn` command with credential retry.

mod exit_error;
mod prompt;

use anyhow::{bail, Context, Result};
use clap::Parser;
use exit_error::ExitError;
use prompt::TerminalPrompt;
use std::path::PathBuf;
use svw_adapters::{EmptyAccountStore, TracingOutput};
use svw_core::SvwConfig;
use svw_engine::{ExecOptions, Svn};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "svw",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")"),
    about = "Run svn commands with credential retry"
)]
struct Cli {
    /// Working directory for the svn command
    #[arg(long, default_value = ".")]
    cwd: PathBuf,

    /// Repository URL used to look up and cache credentials
    #[arg(long)]
    realm: Option<String>,

    /// Username suggested at the credential prompt
    #[arg(long)]
    username: Option<String>,

    /// TOML configuration file
    #[arg(long, env = "SVW_CONFIG")]
    config: Option<PathBuf>,

    /// Print the svn version and exit
    #[arg(long)]
    check: bool,

    /// Arguments passed to svn
    #[arg(last = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            if !exit.message.is_empty() {
                eprintln!("svw: {}", exit.message);
            }
            std::process::exit(exit.code);
        }
        eprintln!("svw: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("SVW_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = SvwConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let prompt = TerminalPrompt::new(cli.username);
    let svn = Svn::new(config, TracingOutput, EmptyAccountStore, prompt)
        .context("failed to open credential cache")?;

    if cli.check {
        let version = svn.version().await.map_err(ExitError::from)?;
        println!("svn {version}");
        return Ok(());
    }

    if cli.args.is_empty() {
        bail!("no svn arguments given; pass them after `--`");
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling svn command");
            on_interrupt.cancel();
        }
    });

    let mut options = ExecOptions::default().cancel(cancel);
    options.realm_url = cli.realm;

    let result = svn.exec(&cli.cwd, cli.args, options).await.map_err(ExitError::from)?;
    print!("{}", result.stdout);
    Ok(())
}
