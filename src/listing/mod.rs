//! Bulk storage listing retrieval.
//!
//! Uses the curl crate (libcurl) to issue a single authenticated GET for a
//! deep listing of the release tree, then parses the JSON body into file
//! records.

mod credentials;
mod parse;

pub use credentials::{Credentials, PASSWORD_VAR, USERNAME_VAR};
pub use parse::{parse_listing, FileRecord, Listing};

use std::time::{Duration, Instant};

use crate::config::IndexConfig;
use crate::error::FetchError;

/// Source of the bulk listing consumed by [`crate::ChecksumIndex`].
///
/// Implementations are called at most once per successful index build.
pub trait ListingSource: Send + Sync {
    fn fetch(&self) -> Result<Listing, FetchError>;
}

impl<S: ListingSource + ?Sized> ListingSource for Box<S> {
    fn fetch(&self) -> Result<Listing, FetchError> {
        (**self).fetch()
    }
}

impl<S: ListingSource + ?Sized> ListingSource for std::sync::Arc<S> {
    fn fetch(&self) -> Result<Listing, FetchError> {
        (**self).fetch()
    }
}

/// Curl-level limits for the listing request.
#[derive(Debug, Clone, Copy)]
pub struct TransferLimits {
    pub connect_timeout: Duration,
    /// Hard cap on the whole request; the deep listing body is large.
    pub timeout: Duration,
    /// Abort if throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for TransferLimits {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(600),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

/// Fetches the deep listing over HTTP(S) with optional Basic auth.
#[derive(Debug, Clone)]
pub struct RemoteListingClient {
    url: String,
    credentials: Option<Credentials>,
    limits: TransferLimits,
}

impl RemoteListingClient {
    pub fn new(url: impl Into<String>, credentials: Option<Credentials>) -> Self {
        Self {
            url: url.into(),
            credentials,
            limits: TransferLimits::default(),
        }
    }

    pub fn from_config(cfg: &IndexConfig, credentials: Option<Credentials>) -> Self {
        Self {
            url: cfg.listing_url.clone(),
            credentials,
            limits: cfg.transfer_limits(),
        }
    }

    pub fn with_limits(mut self, limits: TransferLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs the GET and returns the raw response body.
    /// Runs in the current thread; call from `spawn_blocking` if used from async code.
    fn get_body(&self) -> Result<Vec<u8>, FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.limits.connect_timeout)?;
        easy.timeout(self.limits.timeout)?;
        easy.low_speed_limit(self.limits.low_speed_limit)?;
        easy.low_speed_time(self.limits.low_speed_time)?;
        easy.accept_encoding("")?; // any encoding libcurl can decode

        if let Some(creds) = &self.credentials {
            let mut auth = curl::easy::Auth::new();
            auth.basic(true);
            easy.http_auth(&auth)?;
            easy.username(&creds.username)?;
            easy.password(&creds.password)?;
        }

        let mut list = curl::easy::List::new();
        list.append("Accept: application/json")?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::from_status(code));
        }
        Ok(body)
    }
}

impl ListingSource for RemoteListingClient {
    fn fetch(&self) -> Result<Listing, FetchError> {
        let started = Instant::now();
        tracing::info!(
            url = %self.url,
            authenticated = self.credentials.is_some(),
            "fetching storage listing"
        );
        let body = self.get_body().map_err(|e| {
            tracing::error!(url = %self.url, "storage listing fetch failed: {}", e);
            e
        })?;
        let listing = parse_listing(&body)?;
        tracing::info!(
            bytes = body.len(),
            entries = listing.files.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "storage listing received"
        );
        Ok(listing)
    }
}
