//! In-memory object store used by tests and as a protocol reference.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::{normalize_metadata, ObjectMeta, ObjectStore};

#[derive(Debug, Clone)]
struct StoredObject {
    #[allow(dead_code)]
    body: Vec<u8>,
    metadata: BTreeMap<String, String>,
}

/// A process-local object store with create-if-absent semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects, for test assertions.
    pub fn len(&self) -> usize {
        self.objects.lock().expect("memory store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite metadata for an existing key, for test setups that need to
    /// simulate locks written by other actors.
    pub fn set_metadata(&self, key: &str, metadata: BTreeMap<String, String>) {
        let mut objects = self.objects.lock().expect("memory store poisoned");
        if let Some(object) = objects.get_mut(key) {
            object.metadata = metadata;
        }
    }
}

impl ObjectStore for MemoryStore {
    fn put_if_absent(
        &self,
        key: &str,
        body: &[u8],
        metadata: &BTreeMap<String, String>,
    ) -> Result<()> {
        let mut objects = self.objects.lock().expect("memory store poisoned");
        if objects.contains_key(key) {
            return Err(Error::AlreadyExists(key.to_string()));
        }
        objects.insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }

    fn head(&self, key: &str) -> Result<ObjectMeta> {
        let objects = self.objects.lock().expect("memory store poisoned");
        let object = objects
            .get(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        Ok(ObjectMeta {
            metadata: normalize_metadata(&object.metadata),
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut objects = self.objects.lock().expect("memory store poisoned");
        objects.remove(key);
        Ok(())
    }
}
