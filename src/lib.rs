//! Checksum lookup for artifacts published to a remote Maven-layout repository.
//!
//! The whole release tree is listed once per process through the repository's
//! storage API; every later lookup is an in-memory map read keyed by the
//! artifact's repository path.

pub mod config;
pub mod coordinate;
pub mod error;
pub mod index;
pub mod listing;
pub mod logging;

pub use coordinate::ArtifactCoordinate;
pub use error::{FetchError, IndexError};
pub use index::{ChecksumIndex, RetentionFilter};
pub use listing::{Credentials, FileRecord, Listing, ListingSource, RemoteListingClient};
