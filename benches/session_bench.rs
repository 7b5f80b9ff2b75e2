// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kuriiri::session::{merge, HeaderRules, MergeContext, SessionRecord};
use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

fn merge_benchmark(c: &mut Criterion) {
    let url = Url::parse("https://api.example.com/v1/items?page=2").unwrap();
    let rules = HeaderRules::default();

    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", HeaderValue::from_static("secret"));
    headers.insert("accept", HeaderValue::from_static("application/json"));
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers.insert("if-none-match", HeaderValue::from_static("\"abc\""));
    headers.insert("cookie", HeaderValue::from_static("a=1; b=2"));

    let set_cookies = vec![
        (&url, "session=abc123; Path=/; HttpOnly; Secure"),
        (&url, "theme=dark; Path=/v1; Max-Age=3600"),
        (&url, "stale=; Path=/; Max-Age=0"),
        (&url, "broken"),
    ];

    let mut record = SessionRecord::new();
    for i in 0..20 {
        record.headers.insert(&format!("X-Stored-{}", i), "value");
    }

    c.bench_function("session_merge", |b| {
        b.iter(|| {
            let ctx = MergeContext {
                url: &url,
                headers: &headers,
                auth: None,
                set_cookies: set_cookies.clone(),
                now: Utc::now(),
                rules: &rules,
                default_user_agent: "kuriiri/bench",
            };
            black_box(merge(black_box(&record), &ctx))
        })
    });
}

fn header_rules_benchmark(c: &mut Criterion) {
    let rules = HeaderRules::default();
    let names = ["Content-Type", "If-Modified-Since", "X-Api-Key", "Host", "Authorization"];

    c.bench_function("header_rules_allows", |b| {
        b.iter(|| {
            for name in &names {
                black_box(rules.allows(name));
            }
        })
    });
}

criterion_group!(benches, merge_benchmark, header_rules_benchmark);
criterion_main!(benches);
