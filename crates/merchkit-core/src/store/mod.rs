//! Document store and object store contracts.
//!
//! The hosted backend is an external collaborator. The customizer only needs
//! collection/document addressing for typed records and a byte store keyed by
//! path that hands back a retrievable URL. In-memory implementations back the
//! tests and the headless tooling.

mod catalog;
mod records;

pub use catalog::{CatalogStore, ProductCatalog};
pub use records::{
    decode_record, CustomizationRecord, OrderLine, OrderRecord, OrderStatus, ProductRecord,
    Record, SchemaRecord, ORDERS, PRODUCTS, SCHEMAS,
};

use crate::error::StoreError;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Address of a document: collection plus document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    pub collection: String,
    pub id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub(crate) fn not_found(&self) -> StoreError {
        StoreError::NotFound {
            collection: self.collection.clone(),
            id: self.id.clone(),
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Key-value document store with collection/document addressing.
pub trait DocumentStore: Send + Sync {
    /// Raw document at `path`, `None` when absent.
    fn get(&self, path: &DocumentPath) -> StoreResult<Option<Value>>;

    /// Create or replace the document at `path`.
    fn set(&self, path: &DocumentPath, value: Value) -> StoreResult<()>;

    /// Delete the document at `path`; returns whether it existed.
    fn delete(&self, path: &DocumentPath) -> StoreResult<bool>;

    /// Ids of all documents in `collection`, sorted.
    fn list(&self, collection: &str) -> StoreResult<Vec<String>>;

    /// Typed record at `path`, validated against the record schema.
    fn get_record(&self, path: &DocumentPath) -> StoreResult<Record> {
        let value = self.get(path)?.ok_or_else(|| path.not_found())?;
        decode_record(path, value)
    }

    /// Store a typed record at `path`.
    fn put_record(&self, path: &DocumentPath, record: &Record) -> StoreResult<()> {
        let value = serde_json::to_value(record).map_err(|e| StoreError::Backend {
            message: format!("failed to encode {}: {}", path, e),
        })?;
        self.set(path, value)
    }
}

/// In-memory document store.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<BTreeMap<DocumentPath, Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, path: &DocumentPath) -> StoreResult<Option<Value>> {
        Ok(self.documents.read().get(path).cloned())
    }

    fn set(&self, path: &DocumentPath, value: Value) -> StoreResult<()> {
        tracing::debug!("store set {}", path);
        self.documents.write().insert(path.clone(), value);
        Ok(())
    }

    fn delete(&self, path: &DocumentPath) -> StoreResult<bool> {
        Ok(self.documents.write().remove(path).is_some())
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .documents
            .read()
            .keys()
            .filter(|p| p.collection == collection)
            .map(|p| p.id.clone())
            .collect())
    }
}

/// Bytes plus content type as held by an object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Object store keyed by path, returning a retrievable URL on upload.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `path` and return the URL to retrieve them.
    fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String>;

    /// Fetch an object by the URL returned from `put` (or by its bare path).
    fn get(&self, url: &str) -> StoreResult<StoredObject>;
}

/// URL scheme used by [`MemoryObjectStore`].
pub const MEMORY_SCHEME: &str = "memory://";

/// In-memory object store handing out `memory://` URLs.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        let key = path.trim_start_matches('/').to_string();
        if key.is_empty() {
            return Err(StoreError::Backend {
                message: "object path must not be empty".to_string(),
            });
        }
        tracing::debug!("object put {} ({} bytes)", key, bytes.len());
        self.objects.write().insert(
            key.clone(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("{}{}", MEMORY_SCHEME, key))
    }

    fn get(&self, url: &str) -> StoreResult<StoredObject> {
        let key = url.strip_prefix(MEMORY_SCHEME).unwrap_or(url);
        self.objects
            .read()
            .get(key.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| StoreError::ObjectNotFound {
                path: url.to_string(),
            })
    }
}
