// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request items (`Name:Value`, `q==1`, `field=x`, `n:=1`) and URL shorthands

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

lazy_static! {
    static ref URL_SCHEME: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid scheme regex");
}

/// Separators, longest first so that `:=` wins over `:` at the same position
const SEPARATORS: [(&str, Separator); 5] = [
    (":=", Separator::RawJson),
    ("==", Separator::Query),
    ("=", Separator::Data),
    (":", Separator::Header),
    (";", Separator::EmptyHeader),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Header,
    EmptyHeader,
    Query,
    Data,
    RawJson,
}

/// One request item from the command line
#[derive(Debug, Clone, PartialEq)]
pub enum RequestItem {
    /// `Name:Value`
    Header { name: String, value: String },
    /// `Name;`
    EmptyHeader(String),
    /// `Name:`
    UnsetHeader(String),
    /// `name==value`
    Query { name: String, value: String },
    /// `name=value`
    Data { name: String, value: String },
    /// `name:=json`
    RawJson { name: String, value: Value },
}

impl RequestItem {
    /// Parse one item; the earliest separator decides its kind
    pub fn parse(item: &str) -> Result<Self> {
        let (idx, token, separator) = item
            .char_indices()
            .find_map(|(idx, _)| {
                SEPARATORS
                    .iter()
                    .find(|(token, _)| item[idx..].starts_with(token))
                    .map(|(token, separator)| (idx, *token, *separator))
            })
            .ok_or_else(|| Error::request_item(item, "expected a separator (: ; == = :=)"))?;

        let name = item[..idx].trim();
        let value = &item[idx + token.len()..];
        if name.is_empty() {
            return Err(Error::request_item(item, "missing name"));
        }
        let name = name.to_string();

        Ok(match separator {
            Separator::Header if value.trim().is_empty() => RequestItem::UnsetHeader(name),
            Separator::Header => RequestItem::Header {
                name,
                value: value.trim().to_string(),
            },
            Separator::EmptyHeader if value.trim().is_empty() => RequestItem::EmptyHeader(name),
            Separator::EmptyHeader => {
                return Err(Error::request_item(item, "unexpected value after ';'"))
            }
            Separator::Query => RequestItem::Query {
                name,
                value: value.to_string(),
            },
            Separator::Data => RequestItem::Data {
                name,
                value: value.to_string(),
            },
            Separator::RawJson => RequestItem::RawJson {
                name,
                value: serde_json::from_str(value)
                    .map_err(|e| Error::request_item(item, format!("invalid JSON: {}", e)))?,
            },
        })
    }
}

/// All request items of an invocation, grouped by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestItems {
    /// Headers in command-line order, empty values included
    pub headers: Vec<(String, String)>,
    /// Headers removed for this request
    pub unset: Vec<String>,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Body fields
    pub data: Vec<(String, Value)>,
}

impl RequestItems {
    /// Parse every item
    pub fn parse<S: AsRef<str>>(items: &[S]) -> Result<Self> {
        let mut parsed = Self::default();
        for item in items {
            match RequestItem::parse(item.as_ref())? {
                RequestItem::Header { name, value } => parsed.headers.push((name, value)),
                RequestItem::EmptyHeader(name) => parsed.headers.push((name, String::new())),
                RequestItem::UnsetHeader(name) => parsed.unset.push(name),
                RequestItem::Query { name, value } => parsed.query.push((name, value)),
                RequestItem::Data { name, value } => parsed.data.push((name, Value::String(value))),
                RequestItem::RawJson { name, value } => parsed.data.push((name, value)),
            }
        }
        Ok(parsed)
    }

    /// Whether a body will be sent
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// Body fields as a JSON object; later fields replace earlier ones
    pub fn json_body(&self) -> Value {
        Value::Object(self.data.iter().cloned().collect::<Map<String, Value>>())
    }

    /// Body fields as form pairs; only plain `name=value` fields are allowed
    pub fn form_body(&self) -> Result<Vec<(&str, &str)>> {
        self.data
            .iter()
            .map(|(name, value)| match value {
                Value::String(s) => Ok((name.as_str(), s.as_str())),
                _ => Err(Error::request_item(
                    format!("{}:={}", name, value),
                    "raw JSON fields cannot be sent as a form",
                )),
            })
            .collect()
    }
}

/// Whether a leading positional is an HTTP method rather than a URL
pub fn is_method(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_uppercase())
}

/// Expand `:3000/x` to `localhost:3000/x` and add the default scheme
pub fn normalize_url(raw: &str, default_scheme: &str) -> String {
    let url = match raw.strip_prefix(':') {
        Some(rest) if rest.starts_with('/') || rest.is_empty() => format!("localhost{}", rest),
        Some(rest) => format!("localhost:{}", rest),
        None => raw.to_string(),
    };
    if URL_SCHEME.is_match(&url) {
        url
    } else {
        format!("{}://{}", default_scheme, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_kinds() {
        assert_eq!(
            RequestItem::parse("Hello:World").unwrap(),
            RequestItem::Header {
                name: "Hello".into(),
                value: "World".into()
            }
        );
        assert_eq!(
            RequestItem::parse("Content-Type: text/plain").unwrap(),
            RequestItem::Header {
                name: "Content-Type".into(),
                value: "text/plain".into()
            }
        );
        assert_eq!(
            RequestItem::parse("Accept:").unwrap(),
            RequestItem::UnsetHeader("Accept".into())
        );
        assert_eq!(
            RequestItem::parse("X-Empty;").unwrap(),
            RequestItem::EmptyHeader("X-Empty".into())
        );
        assert_eq!(
            RequestItem::parse("q==a b").unwrap(),
            RequestItem::Query {
                name: "q".into(),
                value: "a b".into()
            }
        );
        assert_eq!(
            RequestItem::parse("n:=[1, 2]").unwrap(),
            RequestItem::RawJson {
                name: "n".into(),
                value: json!([1, 2])
            }
        );
    }

    #[test]
    fn test_earliest_separator_wins() {
        assert_eq!(
            RequestItem::parse("url=http://x").unwrap(),
            RequestItem::Data {
                name: "url".into(),
                value: "http://x".into()
            }
        );
        assert_eq!(
            RequestItem::parse("Referer:http://x/?a=b").unwrap(),
            RequestItem::Header {
                name: "Referer".into(),
                value: "http://x/?a=b".into()
            }
        );
    }

    #[test]
    fn test_invalid_items() {
        assert!(RequestItem::parse("novalue").is_err());
        assert!(RequestItem::parse(":value").is_err());
        assert!(RequestItem::parse("n:={bad").is_err());
        assert!(RequestItem::parse("X;y").is_err());
    }

    #[test]
    fn test_grouping_and_bodies() {
        let items =
            RequestItems::parse(&["a=1", "b:=true", "X-A:1", "X-B;", "Accept:", "p==2"]).unwrap();

        assert!(items.has_data());
        assert_eq!(items.json_body(), json!({"a": "1", "b": true}));
        assert_eq!(
            items.headers,
            vec![
                ("X-A".to_string(), "1".to_string()),
                ("X-B".to_string(), String::new())
            ]
        );
        assert_eq!(items.unset, vec!["Accept".to_string()]);
        assert_eq!(items.query, vec![("p".to_string(), "2".to_string())]);
        assert!(items.form_body().is_err());

        let form = RequestItems::parse(&["a=1", "b=2"]).unwrap();
        assert_eq!(form.form_body().unwrap(), vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_method_detection() {
        assert!(is_method("GET"));
        assert!(is_method("PURGE"));
        assert!(!is_method("get"));
        assert!(!is_method("example.com"));
        assert!(!is_method(""));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url(":3000/x", "http"), "http://localhost:3000/x");
        assert_eq!(normalize_url(":/x", "http"), "http://localhost/x");
        assert_eq!(normalize_url(":", "http"), "http://localhost");
        assert_eq!(normalize_url("example.com", "http"), "http://example.com");
        assert_eq!(normalize_url("https://example.com", "http"), "https://example.com");
    }
}
