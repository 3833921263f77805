//! `pb`: command line front end for page builder documents.
//!
//! Headless driver for the editing core: validates and prints documents,
//! exports them to markup or compact encodings, and replays scripted edits
//! through the same editor session the canvas uses.

mod cli;
mod error;
mod script;

use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if let Err(error) = cli::run(cli) {
        eprintln!("pb: {error}");
        std::process::exit(error.exit_code());
    }
}
