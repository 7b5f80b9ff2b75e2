// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Log output on stderr, so that stdout carries only the exchange

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "kuriiri=warn",
        1 => "kuriiri=info",
        2 => "kuriiri=debug",
        _ => "kuriiri=trace",
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the `-v` level
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

    // a second initialisation (embedding, tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(0), "kuriiri=warn");
        assert_eq!(default_directive(2), "kuriiri=debug");
        assert_eq!(default_directive(9), "kuriiri=trace");
    }
}
