// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Folding one exchange into a session record
//!
//! [`merge`] is pure: it reads the context, returns a new record and the
//! cookies it could not parse. Logging and persistence belong to the caller.
//!
//! Order of application:
//! 1. explicit request headers, filtered through [`HeaderRules`]
//! 2. explicit credentials
//! 3. `Set-Cookie` of every hop, in the order they were received
//! 4. stored cookies expired at `now` are dropped

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use url::Url;

use super::headers::HeaderRules;
use super::record::SessionRecord;
use crate::error::Error;
use crate::http::{headers, parse_cookie_pairs, Auth, Cookie};

/// Everything one invocation contributes to its session
#[derive(Debug, Clone)]
pub struct MergeContext<'a> {
    /// Request URL as given by the user
    pub url: &'a Url,
    /// Headers the user supplied explicitly
    pub headers: &'a HeaderMap,
    /// Credentials the user supplied explicitly
    pub auth: Option<&'a Auth>,
    /// `Set-Cookie` values paired with the URL of the hop that sent them
    pub set_cookies: Vec<(&'a Url, &'a str)>,
    /// Reference time for cookie expiry
    pub now: DateTime<Utc>,
    /// Which headers may be stored
    pub rules: &'a HeaderRules,
    /// User agent the client sends when none is given
    pub default_user_agent: &'a str,
}

/// Result of a merge
#[derive(Debug)]
pub struct MergeOutcome {
    /// Updated record
    pub record: SessionRecord,
    /// `Set-Cookie` values that were ignored
    pub skipped: Vec<Error>,
}

/// Merge one exchange into `record`
pub fn merge(record: &SessionRecord, ctx: &MergeContext<'_>) -> MergeOutcome {
    let mut record = record.clone();

    merge_headers(&mut record, ctx);

    if let Some(auth) = ctx.auth.filter(|a| !a.username.is_empty()) {
        record.auth = Some(auth.clone());
    }

    let skipped = merge_set_cookies(&mut record, ctx);
    record.cookies.retain(|cookie| !cookie.is_expired_at(ctx.now));

    MergeOutcome { record, skipped }
}

fn merge_headers(record: &mut SessionRecord, ctx: &MergeContext<'_>) {
    let host = ctx.url.host_str().unwrap_or("").to_ascii_lowercase();

    for (name, value) in ctx.headers.iter() {
        let Ok(value) = value.to_str() else {
            continue;
        };
        let name = name.as_str();

        if name == headers::COOKIE {
            for (cookie_name, cookie_value) in parse_cookie_pairs(value) {
                record.upsert_cookie(Cookie::new(cookie_name, cookie_value).domain(host.clone()));
            }
            continue;
        }
        if name == headers::AUTHORIZATION && ctx.auth.is_some() {
            continue;
        }
        if name == headers::USER_AGENT && value == ctx.default_user_agent {
            continue;
        }
        if !ctx.rules.allows(name) {
            continue;
        }

        record.headers.insert(name, value);
    }
}

fn merge_set_cookies(record: &mut SessionRecord, ctx: &MergeContext<'_>) -> Vec<Error> {
    let mut skipped = Vec::new();

    for (origin, header) in &ctx.set_cookies {
        match Cookie::parse(header, origin, ctx.now) {
            Ok(cookie) if cookie.is_expired_at(ctx.now) => {
                record.remove_cookie(&cookie.name, &cookie.domain, &cookie.path);
            }
            Ok(cookie) => record.upsert_cookie(cookie),
            Err(e) => skipped.push(e),
        }
    }

    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::AuthKind;
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;

    const UA: &str = "kuriiri/test";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn header_map(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn context<'a>(
        url: &'a Url,
        headers: &'a HeaderMap,
        rules: &'a HeaderRules,
        set_cookies: Vec<(&'a Url, &'a str)>,
    ) -> MergeContext<'a> {
        MergeContext {
            url,
            headers,
            auth: None,
            set_cookies,
            now: now(),
            rules,
            default_user_agent: UA,
        }
    }

    #[test]
    fn test_header_merge() {
        let url = Url::parse("http://example.com/").unwrap();
        let rules = HeaderRules::default();
        let mut record = SessionRecord::new();
        record.headers.insert("Hello", "Old");
        record.headers.insert("X-Kept", "1");

        let headers = header_map(&[("hello", "World"), ("x-api-key", "k")]);
        let outcome = merge(&record, &context(&url, &headers, &rules, vec![]));

        assert_eq!(
            outcome.record.headers.iter().collect::<Vec<_>>(),
            vec![("Hello", "World"), ("X-Kept", "1"), ("X-Api-Key", "k")]
        );
        assert!(outcome.skipped.is_empty());
        // input untouched
        assert_eq!(record.headers.get("Hello"), Some("Old"));
    }

    #[test]
    fn test_excluded_headers_never_stored() {
        let url = Url::parse("http://example.com/").unwrap();
        let rules = HeaderRules::default();
        let headers = header_map(&[
            ("content-type", "text/plain"),
            ("content-length", "5"),
            ("if-unmodified-since", "Sat, 29 Oct 1994 19:43:31 GMT"),
            ("host", "example.org"),
            ("user-agent", UA),
        ]);

        let mut record = SessionRecord::new();
        for _ in 0..3 {
            record = merge(&record, &context(&url, &headers, &rules, vec![])).record;
        }
        assert!(record.headers.is_empty());

        let custom = header_map(&[("user-agent", "curl/8")]);
        let record = merge(&record, &context(&url, &custom, &rules, vec![])).record;
        assert_eq!(record.headers.get("User-Agent"), Some("curl/8"));
    }

    #[test]
    fn test_cookie_request_header_becomes_cookies() {
        let url = Url::parse("http://Example.com/path").unwrap();
        let rules = HeaderRules::default();
        let headers = header_map(&[("cookie", "a=1; b=2")]);

        let record = merge(&SessionRecord::new(), &context(&url, &headers, &rules, vec![])).record;

        assert!(record.headers.get("Cookie").is_none());
        assert_eq!(record.cookies.len(), 2);
        assert_eq!(record.cookie("a", "example.com", "/").map(|c| c.value.as_str()), Some("1"));
    }

    #[test]
    fn test_auth_merge_and_stickiness() {
        let url = Url::parse("http://example.com/").unwrap();
        let rules = HeaderRules::default();
        let headers = header_map(&[("authorization", "Bearer x")]);
        let auth = Auth::new(AuthKind::Basic, "user", "pass");

        let mut ctx = context(&url, &headers, &rules, vec![]);
        ctx.auth = Some(&auth);
        let record = merge(&SessionRecord::new(), &ctx).record;
        assert_eq!(record.auth.as_ref(), Some(&auth));
        assert!(record.headers.get("Authorization").is_none());

        let empty = HeaderMap::new();
        let record = merge(&record, &context(&url, &empty, &rules, vec![])).record;
        assert_eq!(record.auth.as_ref(), Some(&auth));

        let replacement = Auth::new(AuthKind::Digest, "other", "secret");
        let mut ctx = context(&url, &empty, &rules, vec![]);
        ctx.auth = Some(&replacement);
        let record = merge(&record, &ctx).record;
        assert_eq!(record.auth, Some(replacement));

        // without --auth an explicit Authorization header is an ordinary header
        let record = merge(&SessionRecord::new(), &context(&url, &headers, &rules, vec![])).record;
        assert_eq!(record.headers.get("Authorization"), Some("Bearer x"));
    }

    #[test]
    fn test_set_cookie_merge() {
        let hop = Url::parse("http://example.com/cookies/set").unwrap();
        let last = Url::parse("http://example.com/cookies").unwrap();
        let rules = HeaderRules::default();
        let empty = HeaderMap::new();

        let mut record = SessionRecord::new();
        record.upsert_cookie(Cookie::new("old", "x").domain("example.com"));
        record.upsert_cookie(Cookie::new("gone", "x").domain("example.com"));

        let set_cookies = vec![
            (&hop, "hello=world; Path=/"),
            (&hop, "broken"),
            (&last, "gone=; Path=/; Max-Age=0"),
            (&last, "hello=again; Path=/"),
        ];
        let outcome = merge(&record, &context(&last, &empty, &rules, set_cookies));

        let names: Vec<(&str, &str)> = outcome
            .record
            .cookies
            .iter()
            .map(|c| (c.name.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(names, vec![("old", "x"), ("hello", "again")]);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(outcome.skipped[0], Error::MalformedCookie { .. }));
    }

    #[test]
    fn test_huge_max_age_kept_with_other_cookies() {
        let url = Url::parse("http://example.com/").unwrap();
        let rules = HeaderRules::default();
        let empty = HeaderMap::new();
        let set_cookies = vec![
            (&url, "a=b; Max-Age=9223372036854775807"),
            (&url, "ok=1"),
        ];

        let outcome = merge(&SessionRecord::new(), &context(&url, &empty, &rules, set_cookies));

        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.record.cookies.len(), 2);
        assert_eq!(
            outcome.record.cookie("a", "example.com", "/").and_then(|c| c.expires),
            Some(DateTime::<Utc>::MAX_UTC)
        );
        assert!(outcome.record.cookie("ok", "example.com", "/").is_some());
    }

    #[test]
    fn test_expired_stored_cookies_dropped() {
        let url = Url::parse("http://example.com/").unwrap();
        let rules = HeaderRules::default();
        let empty = HeaderMap::new();

        let mut record = SessionRecord::new();
        record.upsert_cookie(
            Cookie::new("stale", "x")
                .domain("example.com")
                .expires(now() - chrono::Duration::hours(1)),
        );
        record.upsert_cookie(
            Cookie::new("fresh", "y")
                .domain("example.com")
                .expires(now() + chrono::Duration::hours(1)),
        );
        record.upsert_cookie(Cookie::new("session", "z").domain("example.com"));

        let outcome = merge(&record, &context(&url, &empty, &rules, vec![]));

        let names: Vec<&str> = outcome.record.cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["fresh", "session"]);
    }

    #[test]
    fn test_merge_idempotent() {
        let url = Url::parse("http://example.com/").unwrap();
        let rules = HeaderRules::default();
        let headers = header_map(&[("hello", "World"), ("content-type", "text/plain")]);
        let set_cookies = vec![(&url, "sid=1; Path=/"), (&url, "theme=dark; Path=/ui")];

        let once = merge(
            &SessionRecord::new(),
            &context(&url, &headers, &rules, set_cookies.clone()),
        )
        .record;
        let twice = merge(&once, &context(&url, &headers, &rules, set_cookies)).record;

        assert_eq!(once, twice);
    }
}
