// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Stored session headers and the rules deciding which headers are stored
//!
//! Header identity is case-insensitive everywhere; stored names use a
//! canonical casing so that serialized sessions are deterministic.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::http::headers;

/// Canonical header casing: `x-api-key` becomes `X-Api-Key`
pub fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

/// Ordered, case-insensitive header map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHeaders {
    entries: Vec<(String, String)>,
}

impl SessionHeaders {
    /// Create an empty header map
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }

    /// Get a header value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    /// Check whether a header is present
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Insert or overwrite a header, keeping the position of an existing entry
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(name) {
            Some(idx) => self.entries[idx] = (canonical_name(name), value),
            None => self.entries.push((canonical_name(name), value)),
        }
    }

    /// Remove a header
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Iterate headers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SessionHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SessionHeaders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = SessionHeaders;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut headers = SessionHeaders::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    headers.insert(&name, value);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// What to do with a header matched by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// Never store the header in a session
    Skip,
    /// Store the header, overriding a broader `Skip` rule
    Persist,
}

/// Header names a rule applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderPattern {
    /// One header name
    Exact(String),
    /// Every header starting with the prefix
    Prefix(String),
}

impl HeaderPattern {
    /// Parse a pattern; a trailing `-` or `*` makes it a prefix (`Content-`, `If-*`)
    pub fn parse(pattern: &str) -> Self {
        let lower = pattern.trim().to_ascii_lowercase();
        if let Some(prefix) = lower.strip_suffix('*') {
            HeaderPattern::Prefix(prefix.to_string())
        } else if lower.ends_with('-') {
            HeaderPattern::Prefix(lower)
        } else {
            HeaderPattern::Exact(lower)
        }
    }

    /// Match strength; exact beats any prefix, longer prefix beats shorter
    fn specificity(&self, name: &str) -> Option<usize> {
        match self {
            HeaderPattern::Exact(exact) if name.eq_ignore_ascii_case(exact) => Some(usize::MAX),
            HeaderPattern::Prefix(prefix) if name.to_ascii_lowercase().starts_with(prefix) => {
                Some(prefix.len())
            }
            _ => None,
        }
    }
}

impl fmt::Display for HeaderPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderPattern::Exact(name) => f.write_str(&canonical_name(name)),
            HeaderPattern::Prefix(prefix) => write!(f, "{}*", canonical_name(prefix)),
        }
    }
}

/// The table of headers that are never (or always) stored in sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRules {
    rules: Vec<(HeaderPattern, HeaderPolicy)>,
}

impl Default for HeaderRules {
    fn default() -> Self {
        Self::empty()
            .rule("Content-", HeaderPolicy::Skip)
            .rule("If-", HeaderPolicy::Skip)
            .rule(headers::HOST, HeaderPolicy::Skip)
            .rule(headers::COOKIE, HeaderPolicy::Skip)
    }
}

impl HeaderRules {
    /// A table without any rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add or replace the rule for a pattern
    pub fn rule(mut self, pattern: &str, policy: HeaderPolicy) -> Self {
        let pattern = HeaderPattern::parse(pattern);
        match self.rules.iter_mut().find(|(existing, _)| *existing == pattern) {
            Some(entry) => entry.1 = policy,
            None => self.rules.push((pattern, policy)),
        }
        self
    }

    /// Layer a `{pattern: policy}` table over these rules
    pub fn with_overrides<'a>(
        self,
        table: impl IntoIterator<Item = (&'a String, &'a HeaderPolicy)>,
    ) -> Self {
        table
            .into_iter()
            .fold(self, |rules, (pattern, policy)| rules.rule(pattern, *policy))
    }

    /// Policy of the most specific rule matching `name`
    pub fn policy_for(&self, name: &str) -> Option<HeaderPolicy> {
        self.rules
            .iter()
            .filter_map(|(pattern, policy)| pattern.specificity(name).map(|s| (s, *policy)))
            .max_by_key(|(specificity, _)| *specificity)
            .map(|(_, policy)| policy)
    }

    /// Whether a header may be stored in a session
    pub fn allows(&self, name: &str) -> bool {
        self.policy_for(name) != Some(HeaderPolicy::Skip)
    }

    /// Iterate the rules
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderPattern, HeaderPolicy)> {
        self.rules.iter().map(|(pattern, policy)| (pattern, *policy))
    }
}
