// Copyright (c) 2024-present, visited-link-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! CLI tool for querying and updating Chromium Visited Links files

use clap::{ArgAction, CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    prelude::*,
    registry::Registry,
};
use visited_link::VisitedLinks;

macro_rules! die {
    ($fmt:literal, $($arg:tt)*) => {{
        eprintln!($fmt, $($arg)*);
        std::process::exit(1)
    }};

    ($msg:literal) => {{
        eprintln!($msg);
        std::process::exit(1)
    }};
}

#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

pub fn init_tracing(quiet: bool, verbose: u8) {
    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // Bridge log crate macros to tracing (for library code that uses log::*)
    tracing_log::LogTracer::init().expect("Failed to set log tracer");

    let registry = Registry::default();

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("VLINK_LOG")
        .from_env_lossy();

    let subscriber = registry.with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact(),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        die!("INTERNAL ERROR: setting default tracing::subscriber failed");
    }

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing_panic::panic_hook(info);
        prev_hook(info); // daisy-chain to old panic hook
    }));
}

/// CLI tool for querying and updating Chromium Visited Links files
#[derive(Parser, Debug)]
#[command(name = "vlink")]
#[command(about = "Query and update Chromium Visited Links files")]
#[command(
    after_help = "Prints each visited URL to stdout and each unvisited URL to stderr.\n\
                  With --update, the visited state of each URL is flipped first."
)]
struct ToolArgs {
    /// Suppress all output except for errors. This overrides the -v flag.
    #[arg(short, long)]
    quiet: bool,

    /// Turn on verbose output. Supply -v multiple times to increase verbosity.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Path to the Visited Links file
    file: PathBuf,

    /// URLs whose visited state to report
    urls: Vec<String>,

    /// Toggle the visited state of each URL before reporting it
    #[arg(short, long)]
    update: bool,

    /// Create a fresh table with the given number of slots, then exit
    #[arg(long, value_name = "SLOTS", conflicts_with_all = ["update", "urls"])]
    create: Option<u32>,
}

fn main() -> ExitCode {
    let args = ToolArgs::parse();

    init_tracing(args.quiet, args.verbose);

    if let Some(slots) = args.create {
        if let Err(e) = VisitedLinks::create(&args.file, slots) {
            die!("Unable to create {:?}: {e}", args.file);
        }
        return ExitCode::SUCCESS;
    }

    if args.urls.is_empty() {
        // clap exits with status 2, like any other usage error
        ToolArgs::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "expected at least one URL",
            )
            .exit();
    }

    let mut table = if args.update {
        VisitedLinks::open_writable(&args.file)
    } else {
        VisitedLinks::open(&args.file)
    }
    .unwrap_or_else(|e| die!("Unable to open {:?}: {e}", args.file));

    debug!(
        "table has {} slots ({} used)",
        table.header().slot_count(),
        table.header().used,
    );

    for url in &args.urls {
        if args.update {
            if let Err(e) = table.toggle(url) {
                die!("Unable to update {url}: {e}");
            }
        }

        // Re-probe so the report reflects the (possibly just-updated) state
        if table.is_visited(url) {
            println!("{url}");
        } else {
            eprintln!("{url}");
        }
    }

    ExitCode::SUCCESS
}
