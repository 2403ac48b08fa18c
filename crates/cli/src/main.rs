// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! iorgate CLI entry point.

use iorgate_cli::Exit;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match iorgate_cli::run().await {
        Ok(exit) => exit.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            Exit::Error.into()
        }
    }
}
