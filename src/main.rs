// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Kuriiri CLI
//!
//! `kuriiri [OPTIONS] [METHOD] URL [REQUEST_ITEM...]`

use std::env;
use std::io;
use std::process::ExitCode;

use kuriiri::logging::init_logging;
use kuriiri::{run, Cli, Config};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::discover() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("kuriiri: error: {}", e);
            return ExitCode::from(1);
        }
    };

    let cli = match Cli::parse_with_defaults(env::args_os(), &config) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    init_logging(cli.verbose);

    let code = run(&cli, &config, &mut io::stdout(), &mut io::stderr()).await;
    ExitCode::from(code)
}
