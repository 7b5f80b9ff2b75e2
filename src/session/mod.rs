// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Persistent sessions
//!
//! A session carries headers, cookies and credentials from one invocation
//! to the next. Each invocation resolves a selector to a file, loads it,
//! applies it to the outgoing request, merges the exchange back in and
//! saves the result atomically unless the session is read-only.
//!
//! Concurrent invocations sharing a session are last-writer-wins: the
//! atomic rename keeps the file intact but an interleaved update may be lost.

mod binding;
mod headers;
mod identifier;
mod merge;
mod record;
mod store;

pub use binding::{Prepared, Session, SessionSelector};
pub use headers::{canonical_name, HeaderPattern, HeaderPolicy, HeaderRules, SessionHeaders};
pub use identifier::{host_directory, resolve, IdentifierKind, SessionIdentifier};
pub use merge::{merge, MergeContext, MergeOutcome};
pub use record::{SessionMeta, SessionRecord};
pub use store::{load, save, stage, SessionState, StagedSave};
