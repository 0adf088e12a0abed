//! Error handling for merchkit
//!
//! Provides error types for the layers that sit around the customizer engine:
//! - Store errors (document store / object store collaborators)
//! - Artwork errors (fetching and decoding uploaded images)
//! - Auth errors (identity provider)
//!
//! All error types use `thiserror` for ergonomic error handling. None of them
//! is fatal to a customization session; callers degrade to a "no artwork" or
//! "custom position" state instead.

use thiserror::Error;

/// Store error type
///
/// Represents failures of the document store and object store collaborators,
/// including records whose shape does not match the expected kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The document does not exist
    #[error("Document not found: {collection}/{id}")]
    NotFound {
        /// The collection that was searched.
        collection: String,
        /// The document identifier.
        id: String,
    },

    /// The document exists but does not have the expected shape
    #[error("Document {collection}/{id} has unexpected shape: {reason}")]
    ShapeMismatch {
        /// The collection holding the document.
        collection: String,
        /// The document identifier.
        id: String,
        /// Why the document was rejected.
        reason: String,
    },

    /// The document has a different record kind than requested
    #[error("Document {collection}/{id} is a {actual} record, expected {expected}")]
    WrongKind {
        /// The collection holding the document.
        collection: String,
        /// The document identifier.
        id: String,
        /// The kind the caller asked for.
        expected: String,
        /// The kind found in the store.
        actual: String,
    },

    /// An object was not found in the object store
    #[error("Object not found: {path}")]
    ObjectNotFound {
        /// The object path or URL.
        path: String,
    },

    /// The catalog for a product is missing a side
    #[error("Product {product} has no print area for side {side}")]
    MissingPrintArea {
        /// The product key.
        product: String,
        /// The requested side.
        side: String,
    },

    /// Generic backend failure
    #[error("Store backend error: {message}")]
    Backend {
        /// The error message.
        message: String,
    },
}

/// Artwork error type
///
/// Represents failures while fetching or decoding user-uploaded artwork.
/// These are always recovered locally: renderers fall back to the
/// "no artwork" state and the transform is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArtworkError {
    /// The artwork reference could not be interpreted
    #[error("Unsupported artwork reference: {reference}")]
    UnsupportedReference {
        /// The offending reference.
        reference: String,
    },

    /// The artwork bytes could not be fetched
    #[error("Failed to fetch artwork {reference}: {reason}")]
    Fetch {
        /// The artwork reference.
        reference: String,
        /// The reason the fetch failed.
        reason: String,
    },

    /// The artwork bytes could not be decoded as an image
    #[error("Failed to decode artwork: {reason}")]
    Decode {
        /// The reason the decode failed.
        reason: String,
    },

    /// The decoded image exceeds the supported dimensions
    #[error("Artwork is {width}x{height}, larger than the {max}px limit")]
    TooLarge {
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
        /// Maximum supported edge length in pixels.
        max: u32,
    },
}

/// Auth error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No user is signed in
    #[error("No user is signed in")]
    NotSignedIn,

    /// The signed-in user lacks the required role
    #[error("User {uid} is not allowed to {action}")]
    Forbidden {
        /// The user identifier.
        uid: String,
        /// The action that was attempted.
        action: String,
    },
}

/// Main error type for merchkit
///
/// A unified error type that can represent any error from the core layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Artwork error
    #[error(transparent)]
    Artwork(#[from] ArtworkError),

    /// Auth error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a "not found" error from either store
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Store(StoreError::NotFound { .. })
                | Error::Store(StoreError::ObjectNotFound { .. })
        )
    }

    /// Check if this is an artwork error
    pub fn is_artwork_error(&self) -> bool {
        matches!(self, Error::Artwork(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::ShapeMismatch {
            collection: "products".to_string(),
            id: "tee".to_string(),
            reason: "missing field `name`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Document products/tee has unexpected shape: missing field `name`"
        );
    }

    #[test]
    fn test_artwork_error_display() {
        let err = ArtworkError::TooLarge {
            width: 9000,
            height: 10,
            max: 8192,
        };
        assert_eq!(err.to_string(), "Artwork is 9000x10, larger than the 8192px limit");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = StoreError::NotFound {
            collection: "orders".to_string(),
            id: "42".to_string(),
        }
        .into();
        assert!(err.is_not_found());
        assert!(!err.is_artwork_error());

        let err: Error = ArtworkError::Decode {
            reason: "bad header".to_string(),
        }
        .into();
        assert!(err.is_artwork_error());
    }
}
