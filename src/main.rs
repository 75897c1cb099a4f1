//! src/main.rs
//!
//! Entry point for Dirhound.
//!
//! Responsibilities of this file:
//!   1) Initialize structured logging.
//!   2) Parse command-line flags into a typed `Args` struct (via `clap`).
//!   3) Resolve the config file + CLI flags into `Settings`.
//!   4) Hand off to the scan manager (`manager::run`) and report the
//!      outcome per spec §7 ("Scan cancelled by user" vs "Scan completed").
//!
//! Uses Tokio's multi-thread runtime, following the teacher's
//! `#[tokio::main(flavor = "multi_thread")]`.

mod args;
mod banner;
mod classifier;
mod client_pool;
mod config;
mod control;
mod dispatcher;
mod error;
mod logging;
mod manager;
mod pipeline;
mod progress;
mod target;
mod url;
mod wordlist;

use args::Args;
use clap::Parser;
use error::DirhoundError;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), DirhoundError> {
    logging::init();

    let args = Args::parse();
    let script_dir = config::script_dir();
    let settings = config::resolve(&args, &script_dir)?;

    let cancelled = manager::run(settings).await?;

    if cancelled {
        println!("Scan cancelled by user");
    } else {
        println!("Scan completed");
    }

    Ok(())
}
