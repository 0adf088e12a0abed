//! Asynchronous artwork fetching and decoding.
//!
//! Loading is the only suspension point of the customizer. A load is
//! identified by a [`LoadTicket`]; the session compares the ticket of a
//! finished load against its current one and drops stale results.

use crate::renderer::{rgba_to_pixmap, Artwork};
use async_trait::async_trait;
use base64::Engine;
use merchkit_core::{ArtworkError, ArtworkReference, ObjectStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Largest accepted edge length of decoded artwork, in pixels.
pub const MAX_ARTWORK_DIMENSION: u32 = 8192;

/// Identity of one artwork load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub reference: ArtworkReference,
    pub epoch: u64,
}

/// Outcome of a finished load, handed back to the session.
#[derive(Debug)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub result: Result<Artwork, ArtworkError>,
}

/// Source of raw artwork bytes.
#[async_trait]
pub trait ArtworkSource: Send + Sync {
    /// Fetches the bytes behind `reference`.
    async fn fetch(&self, reference: &ArtworkReference) -> Result<Vec<u8>, ArtworkError>;
}

fn unsupported(reference: &ArtworkReference) -> ArtworkError {
    ArtworkError::UnsupportedReference {
        reference: reference.to_string(),
    }
}

/// Inline `data:` URIs with base64 payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUriSource;

impl DataUriSource {
    pub fn decode(reference: &ArtworkReference) -> Result<Vec<u8>, ArtworkError> {
        let rest = reference
            .as_str()
            .strip_prefix("data:")
            .ok_or_else(|| unsupported(reference))?;
        let (meta, payload) = rest.split_once(',').ok_or_else(|| unsupported(reference))?;
        if !meta.ends_with(";base64") {
            return Err(unsupported(reference));
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ArtworkError::Fetch {
                reference: reference.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl ArtworkSource for DataUriSource {
    async fn fetch(&self, reference: &ArtworkReference) -> Result<Vec<u8>, ArtworkError> {
        Self::decode(reference)
    }
}

/// Local files, as `file://` URLs or plain paths.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn resolve(&self, reference: &ArtworkReference) -> Option<PathBuf> {
        let raw = match reference.scheme() {
            Some("file") => reference.as_str().strip_prefix("file://")?,
            Some(_) => return None,
            None => reference.as_str(),
        };
        let path = PathBuf::from(raw);
        Some(match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        })
    }
}

#[async_trait]
impl ArtworkSource for FileSource {
    async fn fetch(&self, reference: &ArtworkReference) -> Result<Vec<u8>, ArtworkError> {
        let path = self.resolve(reference).ok_or_else(|| unsupported(reference))?;
        debug!("reading artwork from {}", path.display());
        tokio::fs::read(&path)
            .await
            .map_err(|e| ArtworkError::Fetch {
                reference: reference.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Objects previously uploaded to an [`ObjectStore`].
#[derive(Clone)]
pub struct ObjectStoreSource {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreSource {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for ObjectStoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreSource").finish_non_exhaustive()
    }
}

#[async_trait]
impl ArtworkSource for ObjectStoreSource {
    async fn fetch(&self, reference: &ArtworkReference) -> Result<Vec<u8>, ArtworkError> {
        self.store
            .get(reference.as_str())
            .map(|object| object.bytes)
            .map_err(|e| ArtworkError::Fetch {
                reference: reference.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Dispatches on the reference form: `data:`, `file://` or plain paths,
/// `memory://` when an object store is attached.
#[derive(Debug, Clone, Default)]
pub struct CompositeSource {
    files: FileSource,
    objects: Option<ObjectStoreSource>,
}

impl CompositeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(mut self, files: FileSource) -> Self {
        self.files = files;
        self
    }

    pub fn with_object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.objects = Some(ObjectStoreSource::new(store));
        self
    }
}

#[async_trait]
impl ArtworkSource for CompositeSource {
    async fn fetch(&self, reference: &ArtworkReference) -> Result<Vec<u8>, ArtworkError> {
        match reference.scheme() {
            Some("data") => DataUriSource::decode(reference),
            Some("file") | None => self.files.fetch(reference).await,
            Some("memory") => match &self.objects {
                Some(objects) => objects.fetch(reference).await,
                None => Err(unsupported(reference)),
            },
            Some(_) => Err(unsupported(reference)),
        }
    }
}

/// Decodes raw image bytes into drawable artwork.
pub fn decode_artwork(
    bytes: &[u8],
    reference: ArtworkReference,
    epoch: u64,
) -> Result<Artwork, ArtworkError> {
    if bytes.is_empty() {
        return Err(ArtworkError::Decode {
            reason: "artwork data is empty".to_string(),
        });
    }
    let decoded = image::load_from_memory(bytes).map_err(|e| ArtworkError::Decode {
        reason: e.to_string(),
    })?;
    let (width, height) = (decoded.width(), decoded.height());
    if width > MAX_ARTWORK_DIMENSION || height > MAX_ARTWORK_DIMENSION {
        return Err(ArtworkError::TooLarge {
            width,
            height,
            max: MAX_ARTWORK_DIMENSION,
        });
    }
    let pixmap = rgba_to_pixmap(&decoded.to_rgba8()).ok_or_else(|| ArtworkError::Decode {
        reason: format!("artwork has no pixels ({width}x{height})"),
    })?;
    Ok(Artwork::new(reference, pixmap, epoch))
}

/// Fetches and decodes the artwork named by `ticket`.
pub async fn load_artwork<S>(source: &S, ticket: LoadTicket) -> LoadCompletion
where
    S: ArtworkSource + ?Sized,
{
    let result = match source.fetch(&ticket.reference).await {
        Ok(bytes) => decode_artwork(&bytes, ticket.reference.clone(), ticket.epoch),
        Err(e) => Err(e),
    };
    match &result {
        Ok(artwork) => info!(
            "artwork {} loaded ({}x{})",
            ticket.reference,
            artwork.width(),
            artwork.height()
        ),
        Err(e) => warn!("artwork {} failed to load: {}", ticket.reference, e),
    }
    LoadCompletion { ticket, result }
}
