#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Binary entrypoint: reconcile once, print the verified paths, exit with a status code.

use std::process;

/// Runs one reconciliation and exits with its status code.
#[tokio::main]
async fn main() {
    let exit_code = seedcheck_app::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
