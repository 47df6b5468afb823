//! Cotree CLI: the `cotree` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::prelude::*;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);
    let config = support::load_config_or_exit(cli.config.as_deref());

    match cli.command {
        Commands::Canon { tree, labels, json } => {
            commands::canon::run(tree, labels, json, &config)
        }

        Commands::Cuts { tree, limit, json } => commands::cuts::run(tree, limit, json),

        Commands::Delta {
            tree,
            mode,
            semiring,
            labels,
            out,
            json,
        } => commands::delta::run(
            commands::delta::Args {
                tree,
                mode,
                semiring,
                labels,
                out,
                json,
            },
            &config,
        ),
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    // stdout is reserved for command output
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
