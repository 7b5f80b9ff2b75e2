// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Command-line interface
//!
//! ```text
//! kuriiri [OPTIONS] [METHOD] URL [REQUEST_ITEM...]
//! ```

mod items;
mod run;

use std::ffi::OsString;

use clap::{ArgAction, Parser, ValueEnum};

pub use items::{is_method, normalize_url, RequestItem, RequestItems};
pub use run::run;

use crate::config::Config;
use crate::http::AuthKind;
use crate::session::SessionSelector;

#[derive(Parser, Debug, Clone)]
#[command(name = "kuriiri")]
#[command(about = "Command-line HTTP client with persistent sessions")]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// [METHOD] URL [REQUEST_ITEM...]
    #[arg(value_name = "ARGS", required = true, num_args = 1..)]
    pub args: Vec<String>,

    /// Create or reuse a session and save it after the exchange
    #[arg(long, value_name = "NAME|PATH", conflicts_with = "session_read_only")]
    pub session: Option<String>,

    /// Use a session without saving changes to it
    #[arg(long, value_name = "NAME|PATH")]
    pub session_read_only: Option<String>,

    /// Treat the session selector as a file path
    #[arg(long)]
    pub session_is_path: bool,

    /// Credentials
    #[arg(short = 'a', long, value_name = "USER[:PASS]")]
    pub auth: Option<String>,

    /// Authentication scheme
    #[arg(short = 'A', long, value_enum, default_value = "basic")]
    pub auth_type: AuthTypeArg,

    /// Follow redirects
    #[arg(short = 'F', long)]
    pub follow: bool,

    /// Maximum redirects followed with --follow
    #[arg(long, default_value_t = 30)]
    pub max_redirects: usize,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Proxy URL
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Exit with 3/4/5 on HTTP 3xx/4xx/5xx
    #[arg(long)]
    pub check_status: bool,

    /// What to print: H request headers, h response headers, b response body
    #[arg(short = 'p', long, value_name = "WHAT", default_value = "hb")]
    pub print: String,

    /// Send data fields as a urlencoded form instead of JSON
    #[arg(short = 'f', long)]
    pub form: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// `--auth-type` values
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AuthTypeArg {
    #[default]
    Basic,
    Digest,
}

impl From<AuthTypeArg> for AuthKind {
    fn from(arg: AuthTypeArg) -> Self {
        match arg {
            AuthTypeArg::Basic => AuthKind::Basic,
            AuthTypeArg::Digest => AuthKind::Digest,
        }
    }
}

impl Cli {
    /// Parse `args` (program name first) with the configured default options
    /// inserted before the user's arguments
    pub fn parse_with_defaults<I, T>(args: I, config: &Config) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into);
        let program = args.next().unwrap_or_else(|| OsString::from("kuriiri"));
        let argv = std::iter::once(program)
            .chain(config.default_options.iter().map(OsString::from))
            .chain(args);
        Self::try_parse_from(argv)
    }

    /// Session requested on the command line
    pub fn session_selector(&self) -> Option<SessionSelector> {
        match (&self.session, &self.session_read_only) {
            (Some(token), _) => Some(SessionSelector::new(token).force_path(self.session_is_path)),
            (None, Some(token)) => Some(
                SessionSelector::new(token)
                    .read_only(true)
                    .force_path(self.session_is_path),
            ),
            (None, None) => None,
        }
    }

    /// Split the positionals into method, URL and request items
    pub fn positionals(&self) -> (Option<&str>, &str, &[String]) {
        match self.args.as_slice() {
            [method, url, items @ ..] if is_method(method) => {
                (Some(method.as_str()), url.as_str(), items)
            }
            [url, items @ ..] => (None, url.as_str(), items),
            [] => (None, "", &[]),
        }
    }

    /// Whether a `--print` letter is enabled
    pub fn prints(&self, what: char) -> bool {
        self.print.contains(what)
    }
}
