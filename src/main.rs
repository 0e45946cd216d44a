//! Seltrans - Selection-driven Translation Assistant
//!
//! Command-line entry point. Runs one translation cycle against an in-memory
//! buffer built from the arguments and prints what an editor would display.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use seltrans::cli::{Args, Commands};
use seltrans::config::Config;
use seltrans::dispatcher::{Action, Dispatcher};
use seltrans::host::{BufferHost, PointerEvent, Region, ViewId};
use seltrans::task::SUCCEED_MESSAGE;
use seltrans::terminal::TerminalHost;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("seltrans.toml").exists() {
                info!("Found seltrans.toml in current directory, loading...");
                Config::from_file("seltrans.toml")?
            } else {
                Config::default()
            }
        }
    };

    let view = ViewId::default();

    match args.command {
        Commands::Translate { text, provider, at, then } => {
            let buffer = match at {
                Some(position) => BufferHost::new(text).with_cursor(position),
                None => {
                    let len = text.chars().count();
                    BufferHost::new(text).with_selection(Region::new(0, len))
                }
            };
            let host = Arc::new(TerminalHost::new(buffer));
            let dispatcher = Dispatcher::from_config(host.clone(), config)?;

            let Some(worker) = dispatcher.run(view, &provider, Action::Translate) else {
                std::process::exit(1);
            };
            worker.await?;
            dispatcher.pump_ui();

            if let Some(follow_up) = then {
                dispatcher.run(view, &provider, follow_up.into());
                println!("\nClipboard: {}", host.buffer().clipboard());
                println!("Buffer:\n{}", host.buffer().text());
            }

            if dispatcher.tasks().get(view).status.as_deref() != Some(SUCCEED_MESSAGE) {
                std::process::exit(1);
            }
        }
        Commands::Menu { text, at } => {
            let host = Arc::new(TerminalHost::new(BufferHost::new(text)));
            let dispatcher = Dispatcher::from_config(host, config)?;

            let event = PointerEvent { x: at as f64, y: 0.0 };
            match dispatcher.menu(view, event) {
                Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
                None => println!("No menu for this position."),
            }
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".seltrans").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "seltrans.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::WARN };

    // Console output goes to stderr so rendered results stay clean on stdout
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("seltrans.log").display());

    Ok(())
}
