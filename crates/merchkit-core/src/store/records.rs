//! Typed document records.
//!
//! Every document carries a `kind` discriminator and is validated when it
//! crosses the store boundary; a document that does not match its declared
//! kind is rejected instead of being read field by field.

use super::DocumentPath;
use crate::data::{ArtworkReference, PresetPosition, PrintArea, Side, SurfaceKind, Transform};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Collection holding [`ProductRecord`]s.
pub const PRODUCTS: &str = "products";
/// Collection holding [`SchemaRecord`]s.
pub const SCHEMAS: &str = "schemas";
/// Collection holding [`OrderRecord`]s.
pub const ORDERS: &str = "orders";

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub category: String,
    pub price_cents: u64,
    /// Id of the customization schema in [`SCHEMAS`].
    pub schema: String,
    #[serde(default)]
    pub surface: SurfaceKind,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Customization schema for a product category: print areas and presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRecord {
    pub category: String,
    pub print_areas: BTreeMap<Side, PrintArea>,
    #[serde(default)]
    pub presets: Vec<PresetPosition>,
}

/// The persisted customization of one order line.
///
/// Re-opening this record must reproduce the identical render, so the
/// transform is stored exactly as the session holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomizationRecord {
    pub artwork: ArtworkReference,
    pub transform: Transform,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProduction,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: String,
    pub quantity: u32,
    #[serde(default)]
    pub customization: Option<CustomizationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub customer_uid: String,
    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A validated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Product(ProductRecord),
    Schema(SchemaRecord),
    Order(OrderRecord),
}

impl Record {
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Product(_) => "product",
            Record::Schema(_) => "schema",
            Record::Order(_) => "order",
        }
    }

    pub fn into_product(self, path: &DocumentPath) -> Result<ProductRecord, StoreError> {
        match self {
            Record::Product(product) => Ok(product),
            other => Err(wrong_kind(path, "product", other.kind())),
        }
    }

    pub fn into_schema(self, path: &DocumentPath) -> Result<SchemaRecord, StoreError> {
        match self {
            Record::Schema(schema) => Ok(schema),
            other => Err(wrong_kind(path, "schema", other.kind())),
        }
    }

    pub fn into_order(self, path: &DocumentPath) -> Result<OrderRecord, StoreError> {
        match self {
            Record::Order(order) => Ok(order),
            other => Err(wrong_kind(path, "order", other.kind())),
        }
    }
}

fn wrong_kind(path: &DocumentPath, expected: &str, actual: &str) -> StoreError {
    StoreError::WrongKind {
        collection: path.collection.clone(),
        id: path.id.clone(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

/// Validate a raw document against the record schema.
pub fn decode_record(path: &DocumentPath, value: Value) -> Result<Record, StoreError> {
    let record: Record = serde_json::from_value(value).map_err(|e| {
        tracing::warn!("rejecting document {}: {}", path, e);
        StoreError::ShapeMismatch {
            collection: path.collection.clone(),
            id: path.id.clone(),
            reason: e.to_string(),
        }
    })?;

    if let Record::Schema(schema) = &record {
        if let Some((side, _)) = schema.print_areas.iter().find(|(_, a)| !a.is_valid()) {
            return Err(StoreError::ShapeMismatch {
                collection: path.collection.clone(),
                id: path.id.clone(),
                reason: format!("print area for side {} must have positive dimensions", side),
            });
        }
    }

    Ok(record)
}
