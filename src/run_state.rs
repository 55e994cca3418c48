/*!
 * Durable run-state counters.
 *
 * A run-state is a single non-negative integer kept in a flat file. It is the
 * only state that survives between independent invocations outside the
 * database. Two flavors exist:
 *
 * - chunked: how many fixed-size slices of a bounded work-list have been
 *   consumed. A missing file means zero. The counter is advanced once at the
 *   end of a run that ingested a slice.
 * - paginated: the next page of an unbounded feed. The file must exist. The
 *   counter is advanced and persisted *before* the page is fetched, so a
 *   failed fetch still moves the feed forward.
 */

use anyhow::Result;
use log::debug;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::errors::StartupError;
use crate::file_utils::FileManager;

/// Which flavor of counter a `RunState` represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStateMode {
    /// Slices of a bounded work-list
    Chunked,
    /// Pages of an unbounded feed
    Paginated,
}

/// A counter loaded from disk, passed explicitly to the pipeline that uses it
#[derive(Debug, Clone)]
pub struct RunState {
    path: PathBuf,
    position: u64,
    mode: RunStateMode,
}

impl RunState {
    /// Load a chunked counter, defaulting to 0 when the file is absent
    pub fn load_chunked<P: AsRef<Path>>(path: P) -> Result<Self, StartupError> {
        let path = path.as_ref().to_path_buf();
        let position = match read_counter(&path) {
            Ok(position) => position,
            Err(StartupError::MissingRunState(_)) => {
                debug!("No run-state at {:?}, starting from 0", path);
                0
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            position,
            mode: RunStateMode::Chunked,
        })
    }

    /// Load a paginated counter. Its absence is fatal.
    pub fn load_paginated<P: AsRef<Path>>(path: P) -> Result<Self, StartupError> {
        let path = path.as_ref().to_path_buf();
        let position = read_counter(&path)?;

        Ok(Self {
            path,
            position,
            mode: RunStateMode::Paginated,
        })
    }

    /// Read the page to fetch this run and persist the following page
    /// immediately, before anything is fetched.
    pub fn claim_page<P: AsRef<Path>>(path: P) -> Result<u64> {
        let mut state = Self::load_paginated(path)?;
        let page = state.current_position();
        state.advance()?;
        Ok(page)
    }

    pub fn current_position(&self) -> u64 {
        self.position
    }

    pub fn mode(&self) -> RunStateMode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Increment the counter by one and write it back
    pub fn advance(&mut self) -> Result<()> {
        self.position += 1;
        FileManager::write_to_file(&self.path, &self.position.to_string())?;
        debug!("Run-state {:?} advanced to {}", self.path, self.position);
        Ok(())
    }

    /// Slice bounds of the current chunk in a list of `len` items, or `None`
    /// once the whole list has been consumed
    pub fn chunk(&self, len: usize, chunk_size: usize) -> Option<Range<usize>> {
        let start = (self.position as usize).checked_mul(chunk_size)?;
        if start >= len {
            return None;
        }
        let end = start.saturating_add(chunk_size).min(len);
        Some(start..end)
    }
}

fn read_counter(path: &Path) -> Result<u64, StartupError> {
    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => StartupError::MissingRunState(path.to_path_buf()),
        _ => StartupError::UnreadableRunState {
            path: path.to_path_buf(),
            source,
        },
    })?;

    content
        .trim()
        .parse::<u64>()
        .map_err(|_| StartupError::InvalidRunState {
            path: path.to_path_buf(),
            content,
        })
}
