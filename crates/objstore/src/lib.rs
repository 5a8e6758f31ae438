//! # objstore
//!
//! A deliberately small object-store interface: conditional create
//! (`PUT` with `If-None-Match: *`), metadata lookup (`HEAD`) and `DELETE`
//! on a single key. This is the full surface the orchestration lock needs,
//! and keeping it this narrow makes backends trivial to swap.
//!
//! ## Backends
//!
//! - `s3` (default): Amazon S3 via the official AWS SDK. S3 honours
//!   `If-None-Match: *` on `PutObject`, which gives the atomic
//!   create-if-absent semantics the lock protocol relies on.
//! - `memory`: process-local store used by tests and as a protocol
//!   reference implementation.
//!
//! Object stores commonly lowercase user metadata keys on the read path, so
//! [`ObjectMeta`] always exposes lowercased keys regardless of backend.

/// Backend implementations.
pub mod backend;
/// Error types for object-store operations.
pub mod error;

pub use backend::memory::MemoryStore;
pub use backend::s3::S3Store;
pub use error::{Error, Result};

use std::collections::BTreeMap;

/// Metadata returned by a `HEAD` request.
///
/// Keys are normalized to lowercase; values are returned verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMeta {
    pub metadata: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Look up a metadata value by case-insensitive key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(&key.to_ascii_lowercase()).map(String::as_str)
    }
}

/// The capability interface: conditional create, metadata lookup, delete.
pub trait ObjectStore: Send + Sync {
    /// Create the object at `key` only if it does not already exist.
    ///
    /// Returns [`Error::AlreadyExists`] when the key is present.
    fn put_if_absent(
        &self,
        key: &str,
        body: &[u8],
        metadata: &BTreeMap<String, String>,
    ) -> Result<()>;

    /// Fetch the metadata of the object at `key`.
    ///
    /// Returns [`Error::NotFound`] when the key is absent.
    fn head(&self, key: &str) -> Result<ObjectMeta>;

    /// Delete the object at `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// Lowercase every metadata key, keeping values untouched.
pub(crate) fn normalize_metadata(metadata: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    metadata
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
        .collect()
}
