//! Shared store plumbing: lifecycle state and error type
//!
//! Both content stores hold their collection in a [`Slot`]. A slot starts
//! out [`LoadState::Unloaded`] and is filled by a single atomic swap, so a
//! reader either sees the previous collection or the complete new one.

use arc_swap::ArcSwapOption;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading or querying the content stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Content directory {path:?} is unavailable: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed post filename: {0}")]
    MalformedFilename(String),

    #[error("Failed to parse metadata in {path:?}: {message}")]
    MetadataParse { path: PathBuf, message: String },

    #[error("Failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse project descriptor {path:?}: {message}")]
    ProjectParse { path: PathBuf, message: String },

    #[error("Blog posts were queried before they were parsed")]
    PostsNotLoaded,

    #[error("Projects were queried before they were parsed")]
    ProjectsNotLoaded,

    #[error("No post dated {date} with slug {slug:?}")]
    PostNotFound { date: NaiveDate, slug: String },
}

impl StoreError {
    /// True for errors that a request handler should answer with "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::PostNotFound { .. })
    }
}

/// A file left out of a scan, and why
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: StoreError,
}

/// Outcome of scanning a content directory
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Lifecycle of a store's collection
#[derive(Debug)]
pub enum LoadState<T> {
    Unloaded,
    Loaded(Arc<T>),
}

/// An atomically replaceable, initially empty collection holder
#[derive(Debug)]
pub struct Slot<T> {
    inner: ArcSwapOption<T>,
}

impl<T> Slot<T> {
    /// Create an unloaded slot
    pub fn unloaded() -> Self {
        Self {
            inner: ArcSwapOption::empty(),
        }
    }

    /// Replace the held collection in one swap
    pub fn replace(&self, value: T) {
        self.inner.store(Some(Arc::new(value)));
    }

    /// Current state of the slot
    pub fn state(&self) -> LoadState<T> {
        match self.inner.load_full() {
            Some(value) => LoadState::Loaded(value),
            None => LoadState::Unloaded,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.load().is_some()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::unloaded()
    }
}
