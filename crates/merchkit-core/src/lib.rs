//! # merchkit Core
//!
//! Core types, store contracts and utilities for merchkit.
//! Provides the placement data model shared by the customizer engine, the
//! typed records exchanged with the hosted document store, and the
//! identity context consumed by account and admin features.

pub mod auth;
pub mod data;
pub mod error;
pub mod store;
pub mod units;

pub use auth::{AuthSession, SubscriptionId, User};

pub use data::{
    normalize_degrees, ArtworkReference, PresetPosition, PresetTransform, PrintArea, Side,
    SurfaceKind, Transform, MAX_SCALE, MIN_SCALE,
};

pub use error::{ArtworkError, AuthError, Error, Result, StoreError};

pub use store::{
    CatalogStore, CustomizationRecord, DocumentPath, DocumentStore, MemoryDocumentStore,
    MemoryObjectStore, ObjectStore, ProductCatalog, Record, StoreResult, StoredObject,
};
