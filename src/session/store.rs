// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Loading and atomically saving session files

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::record::{SessionMeta, SessionRecord};
use crate::error::{Error, Result};

/// What was found at a session location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing stored yet
    Fresh,
    /// A stored record
    Loaded(SessionRecord),
}

impl SessionState {
    /// Check if no file existed
    pub fn is_fresh(&self) -> bool {
        matches!(self, SessionState::Fresh)
    }

    /// The stored record, or an empty one
    pub fn into_record(self) -> SessionRecord {
        match self {
            SessionState::Fresh => SessionRecord::new(),
            SessionState::Loaded(record) => record,
        }
    }
}

/// Read the session stored at `path`
pub fn load(path: &Path) -> Result<SessionState> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound || blocked_by_file(path) => {
            debug!(path = %path.display(), "No session file, starting fresh");
            return Ok(SessionState::Fresh);
        }
        Err(e) => return Err(Error::corrupt_session(path, e)),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::corrupt_session(path, "file is empty"));
    }

    let record: SessionRecord =
        serde_json::from_slice(&bytes).map_err(|e| Error::corrupt_session(path, e))?;

    debug!(
        path = %path.display(),
        headers = record.headers.len(),
        cookies = record.cookies.len(),
        auth = record.auth.is_some(),
        "Loaded session"
    );
    Ok(SessionState::Loaded(record))
}

/// Whether the nearest ancestor of `path` that can be inspected is not a
/// directory, so nothing can be stored below it
fn blocked_by_file(path: &Path) -> bool {
    path.ancestors()
        .skip(1)
        .find_map(|ancestor| fs::metadata(ancestor).ok())
        .map_or(false, |meta| !meta.is_dir())
}

/// A fully written and synced session file waiting to replace its target
///
/// Dropping it without [`StagedSave::commit`] deletes the temporary file and
/// leaves the target untouched.
#[derive(Debug)]
pub struct StagedSave {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedSave {
    /// Location of the temporary file
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// File that `commit` replaces
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically rename the staged file over the target
    pub fn commit(self) -> Result<()> {
        let StagedSave { temp, target } = self;
        temp.persist(&target)
            .map_err(|e| Error::write_failure(&target, e.error))?;
        debug!(path = %target.display(), "Saved session");
        Ok(())
    }
}

/// Write `record` next to `path` without touching `path` itself
pub fn stage(path: &Path, record: &SessionRecord) -> Result<StagedSave> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let fail = |e: std::io::Error| Error::write_failure(path, e);

    fs::create_dir_all(dir).map_err(fail)?;
    let mut temp = NamedTempFile::new_in(dir).map_err(fail)?;

    let record = SessionRecord {
        meta: SessionMeta::default(),
        ..record.clone()
    };
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, &record).map_err(|e| fail(e.into()))?;
        writer.write_all(b"\n").map_err(fail)?;
        writer.flush().map_err(fail)?;
    }
    temp.as_file().sync_all().map_err(fail)?;

    Ok(StagedSave {
        temp,
        target: path.to_path_buf(),
    })
}

/// Atomically replace the session file at `path`
pub fn save(path: &Path, record: &SessionRecord) -> Result<()> {
    stage(path, record)?.commit()
}
