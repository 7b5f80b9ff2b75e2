// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Kuriiri - Command-line HTTP client with persistent sessions
//!
//! Each invocation performs one HTTP exchange. With `--session`, headers,
//! cookies and credentials are carried over from earlier invocations and
//! the result of this one is saved for the next.
//!
//! ## Features
//!
//! - Named sessions scoped to a host, or sessions stored at any path
//! - Read-only sessions that are used but never written back
//! - Atomic session writes: a crash never leaves a half-written file
//! - Volatile headers (`Content-*`, `If-*`) are never stored
//! - Cookies from every redirect hop end up in the session
//! - Basic and Digest authentication
//!
//! ## Example
//!
//! ```rust,no_run
//! use kuriiri::{Config, Request, Session, SessionSelector, HttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::discover()?;
//!     let request = Request::get("https://example.com/api")?.header("X-Api-Key", "secret")?;
//!
//!     let mut session = Session::open(&SessionSelector::new("work"), &request.url, &config)?;
//!     let prepared = session.prepare(&request)?;
//!
//!     let response = HttpClient::new()?.execute(&prepared.request, &prepared.jar).await?;
//!
//!     session.ingest(&request, &response, chrono::Utc::now());
//!     session.commit()?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod session;

// Re-exports for convenience

// CLI
pub use cli::{run, Cli};

// Configuration
pub use config::Config;

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{Auth, AuthKind, Cookie, CookieJar, HttpClient, HttpClientConfig, Request, Response};

// Sessions
pub use session::{
    HeaderPolicy, HeaderRules, MergeContext, MergeOutcome, Prepared, Session, SessionIdentifier,
    SessionRecord, SessionSelector, SessionState,
};

/// Kuriiri version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
