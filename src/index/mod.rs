//! Lazily built, fetch-once checksum index.
//!
//! The first lookup (or an explicit [`ChecksumIndex::initialize`]) pulls the
//! bulk listing from the [`ListingSource`], keeps the entries accepted by the
//! [`RetentionFilter`] and freezes them. After that every lookup is a
//! lock-free map read keyed by [`ArtifactCoordinate::repository_path`].

mod filter;
mod gate;

pub use filter::RetentionFilter;
pub use gate::Phase;

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::config::IndexConfig;
use crate::coordinate::ArtifactCoordinate;
use crate::error::IndexError;
use crate::listing::{Credentials, FileRecord, ListingSource, RemoteListingClient};

use gate::{Entry, InitGate, LeaderGuard};

/// Path -> checksum record map, built at most once per successful fetch.
///
/// Share it by reference or `Arc`; it is `Sync` whenever the source is.
pub struct ChecksumIndex<S> {
    source: S,
    filter: RetentionFilter,
    gate: InitGate,
    records: OnceLock<HashMap<String, FileRecord>>,
}

impl ChecksumIndex<RemoteListingClient> {
    /// Index backed by the HTTP listing client described by `cfg`.
    pub fn from_config(cfg: &IndexConfig, credentials: Option<Credentials>) -> Self {
        Self::with_filter(
            RemoteListingClient::from_config(cfg, credentials),
            cfg.retention_filter(),
        )
    }
}

impl<S: ListingSource> ChecksumIndex<S> {
    pub fn new(source: S) -> Self {
        Self::with_filter(source, RetentionFilter::default())
    }

    pub fn with_filter(source: S, filter: RetentionFilter) -> Self {
        Self {
            source,
            filter,
            gate: InitGate::new(),
            records: OnceLock::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    pub fn is_ready(&self) -> bool {
        self.records.get().is_some()
    }

    /// Number of retained records; 0 until ready. Never triggers a fetch.
    pub fn len(&self) -> usize {
        self.records.get().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Eagerly run the initialization protocol and return the retained count.
    ///
    /// Unlike the lazy path this is not idempotent: calling it while the index
    /// is initializing or ready returns [`IndexError::AlreadyInitialized`].
    pub fn initialize(&self) -> Result<usize, IndexError> {
        self.gate.begin()?;
        self.build(LeaderGuard::new(&self.gate))
    }

    /// Full record for `coordinate`, initializing the index if needed.
    /// `Ok(None)` means the listing has no such file.
    pub fn record(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<Option<&FileRecord>, IndexError> {
        let records = self.ensure_initialized()?;
        let path = coordinate.repository_path();
        let found = records.get(&path);
        if found.is_none() {
            tracing::warn!(artifact = %coordinate, path = %path, "no artifact in checksum index");
        }
        Ok(found)
    }

    pub fn get_sha1(&self, coordinate: &ArtifactCoordinate) -> Result<Option<String>, IndexError> {
        let Some(record) = self.record(coordinate)? else {
            return Ok(None);
        };
        if record.sha1.is_none() {
            tracing::debug!(artifact = %coordinate, "no SHA-1 recorded");
        }
        Ok(record.sha1.clone())
    }

    /// SHA-256 for `coordinate`. Older artifacts carry none, which is `Ok(None)`
    /// just like a missing record.
    pub fn get_sha256(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<Option<String>, IndexError> {
        let Some(record) = self.record(coordinate)? else {
            return Ok(None);
        };
        if record.sha256.is_none() {
            tracing::debug!(artifact = %coordinate, "no SHA-256 recorded");
        }
        Ok(record.sha256.clone())
    }

    fn ensure_initialized(&self) -> Result<&HashMap<String, FileRecord>, IndexError> {
        if let Some(records) = self.records.get() {
            return Ok(records);
        }
        match self.gate.enter() {
            Entry::Leader => {
                self.build(LeaderGuard::new(&self.gate))?;
            }
            Entry::Ready => {}
            Entry::Failed(message) => return Err(IndexError::InitializationFailed(message)),
        }
        self.records.get().ok_or_else(|| {
            IndexError::InitializationFailed("gate ready but no records stored".to_string())
        })
    }

    /// Fetch, filter and freeze. Only called by the gate leader.
    fn build(&self, guard: LeaderGuard<'_>) -> Result<usize, IndexError> {
        let listing = match self.source.fetch() {
            Ok(listing) => listing,
            Err(e) => {
                guard.fail(e.to_string());
                return Err(e.into());
            }
        };

        let total = listing.files.len();
        let mut records = HashMap::new();
        for file in listing.files {
            if self.filter.retains(&file.path) {
                records.insert(file.path.clone(), file);
            }
        }
        let retained = records.len();

        if self.records.set(records).is_err() {
            guard.fail("records already stored".to_string());
            return Err(IndexError::AlreadyInitialized);
        }
        guard.succeed();

        tracing::info!(total, retained, "checksum index ready");
        Ok(retained)
    }
}
