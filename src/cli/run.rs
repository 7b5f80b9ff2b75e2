// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! One invocation: build the request, bind the session, exchange, save

use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use reqwest::{Method, StatusCode};
use tracing::{debug, error, info};

use super::items::{normalize_url, RequestItems};
use super::Cli;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{Auth, CookieJar, HttpClient, HttpClientConfig, Request, Response};
use crate::session::{Prepared, Session};

/// Run the invocation described by `cli` and return the process exit status
///
/// The exchange is written to `out`; errors go to `err`. A session that
/// cannot be saved yields status 7 regardless of the HTTP outcome.
pub async fn run<O: Write, E: Write>(cli: &Cli, config: &Config, out: &mut O, err: &mut E) -> u8 {
    let request = match build_request(cli) {
        Ok(request) => request,
        Err(e) => return report(err, &e),
    };

    let client_config = HttpClientConfig::default()
        .accept_invalid_certs(cli.insecure)
        .proxy(cli.proxy.clone());

    let mut session = match cli.session_selector() {
        Some(selector) => match Session::open(&selector, &request.url, config) {
            Ok(session) => Some(session.default_user_agent(client_config.user_agent.clone())),
            Err(e) => return report(err, &e),
        },
        None => None,
    };

    let prepared = match &session {
        Some(session) => match session.prepare(&request) {
            Ok(prepared) => prepared,
            Err(e) => return report(err, &e),
        },
        None => Prepared {
            request: request.clone(),
            jar: CookieJar::new(),
        },
    };

    let response = match exchange(client_config, &prepared).await {
        Ok(response) => response,
        Err(e) => return report(err, &e),
    };

    if let Err(e) = print_exchange(cli, &prepared, &response, out) {
        return report(err, &Error::from(e));
    }

    let mut status = http_exit_status(cli, response.status);

    if let Some(session) = session.as_mut() {
        session.ingest(&request, &response, Utc::now());
        match session.commit() {
            Ok(true) => info!(session = %session.identifier(), "Session saved"),
            Ok(false) => {}
            Err(e) => {
                error!(session = %session.identifier(), error = %e, "Session not saved");
                status = report(err, &e);
            }
        }
    }

    status
}

/// Turn the command line into a request, without any session state
fn build_request(cli: &Cli) -> Result<Request> {
    let (method, raw_url, raw_items) = cli.positionals();
    let items = RequestItems::parse(raw_items)?;

    let method = match method {
        Some(method) => Method::from_bytes(method.as_bytes())
            .map_err(|e| Error::request_item(method, e.to_string()))?,
        None if items.has_data() => Method::POST,
        None => Method::GET,
    };

    let mut request = Request::new(method, normalize_url(raw_url, "http"))?;
    if !items.query.is_empty() {
        request
            .url
            .query_pairs_mut()
            .extend_pairs(items.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    if items.has_data() {
        request = if cli.form {
            request.form(items.form_body()?)
        } else {
            request.json(&items.json_body())?
        };
    }

    for (name, value) in &items.headers {
        request = request.header(name, value)?;
    }
    for name in &items.unset {
        request = request.unset_header(name)?;
    }

    if let Some(credentials) = &cli.auth {
        request = request.auth(Auth::parse(credentials, cli.auth_type.into())?);
    }
    if let Some(secs) = cli.timeout {
        let timeout = Duration::try_from_secs_f64(secs)
            .map_err(|e| Error::config(format!("invalid --timeout {}: {}", secs, e)))?;
        request = request.timeout(timeout);
    }

    debug!(method = %request.method, url = %request.url, "Built request");

    Ok(request
        .follow_redirects(cli.follow)
        .max_redirects(cli.max_redirects))
}

async fn exchange(config: HttpClientConfig, prepared: &Prepared) -> Result<Response> {
    let client = HttpClient::with_config(config)?;
    client.execute(&prepared.request, &prepared.jar).await
}

fn print_exchange<W: Write>(
    cli: &Cli,
    prepared: &Prepared,
    response: &Response,
    out: &mut W,
) -> std::io::Result<()> {
    if cli.prints('H') {
        let request = &prepared.request;
        let target = &request.url[url::Position::BeforePath..url::Position::AfterQuery];
        writeln!(out, "{} {} HTTP/1.1", request.method, target)?;
        writeln!(out, "Host: {}", request.netloc())?;
        for (name, value) in &request.headers {
            writeln!(out, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()))?;
        }
        if let Some(cookies) = prepared.jar.get_cookie_header(&request.url) {
            writeln!(out, "Cookie: {}", cookies)?;
        }
        writeln!(out)?;
    }

    if cli.prints('h') {
        writeln!(
            out,
            "{:?} {} {}",
            response.version,
            response.status.as_u16(),
            response.status.canonical_reason().unwrap_or("")
        )?;
        for (name, value) in &response.headers {
            writeln!(out, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()))?;
        }
        writeln!(out)?;
    }

    if cli.prints('b') && !response.body.is_empty() {
        let body = response.text_lossy();
        write!(out, "{}", body)?;
        if !body.ends_with('\n') {
            writeln!(out)?;
        }
    }

    out.flush()
}

/// Exit status for the final response under `--check-status`
fn http_exit_status(cli: &Cli, status: StatusCode) -> u8 {
    if !cli.check_status {
        return 0;
    }
    match status.as_u16() {
        300..=399 if !cli.follow => 3,
        400..=499 => 4,
        500..=599 => 5,
        _ => 0,
    }
}

fn report<E: Write>(err: &mut E, e: &Error) -> u8 {
    let _ = writeln!(err, "kuriiri: error: {}", e);
    e.exit_status()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let config = Config::new("/nonexistent");
        Cli::parse_with_defaults(std::iter::once("kuriiri").chain(args.iter().copied()), &config)
            .unwrap()
    }

    #[test]
    fn test_build_request_defaults() {
        let request = build_request(&cli(&[":8080/get", "q==1", "Hello:World"])).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.as_str(), "http://localhost:8080/get?q=1");
        assert_eq!(request.headers["hello"], "World");
        assert!(request.body.is_none());
        assert!(!request.follow_redirects);
    }

    #[test]
    fn test_build_request_with_data() {
        let request = build_request(&cli(&["example.com/post", "a=1", "n:=2"])).unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.defaults["content-type"], "application/json");
        assert!(request.headers.get("content-type").is_none());

        let request = build_request(&cli(&["--form", "PUT", "example.com", "a=1"])).unwrap();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.body.as_deref(), Some(&b"a=1"[..]));
    }

    #[test]
    fn test_build_request_auth_and_limits() {
        let request = build_request(&cli(&[
            "-a",
            "user:pa:ss",
            "--follow",
            "--max-redirects=3",
            "--timeout=1.5",
            "example.com",
        ]))
        .unwrap();

        let auth = request.auth.unwrap();
        assert_eq!(auth.username, "user");
        assert_eq!(auth.password, "pa:ss");
        assert!(request.follow_redirects);
        assert_eq!(request.max_redirects, 3);
        assert_eq!(request.timeout, Some(Duration::from_millis(1500)));

        assert!(build_request(&cli(&["--timeout=-1", "example.com"])).is_err());
        assert!(build_request(&cli(&["example.com", "bad"])).is_err());
    }

    #[test]
    fn test_http_exit_status() {
        assert_eq!(http_exit_status(&cli(&["x"]), StatusCode::NOT_FOUND), 0);

        let checked = cli(&["--check-status", "x"]);
        assert_eq!(http_exit_status(&checked, StatusCode::OK), 0);
        assert_eq!(http_exit_status(&checked, StatusCode::FOUND), 3);
        assert_eq!(http_exit_status(&checked, StatusCode::NOT_FOUND), 4);
        assert_eq!(http_exit_status(&checked, StatusCode::BAD_GATEWAY), 5);

        let following = cli(&["--check-status", "--follow", "x"]);
        assert_eq!(http_exit_status(&following, StatusCode::FOUND), 0);
    }

    #[tokio::test]
    async fn test_invalid_session_fails_before_request() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path());
        let mut out = Vec::new();
        let mut err = Vec::new();

        // nothing listens on port 9; the invocation must stop before connecting
        let code = run(
            &cli(&["--session=bad name", "http://127.0.0.1:9/"]),
            &config,
            &mut out,
            &mut err,
        )
        .await;

        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(String::from_utf8(err).unwrap().contains("bad name"));
    }
}
