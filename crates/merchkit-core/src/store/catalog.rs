//! Catalog accessor: print areas and preset positions for a product.

use super::{DocumentPath, DocumentStore, StoreResult, PRODUCTS, SCHEMAS};
use crate::data::{PresetPosition, PrintArea, Side, SurfaceKind};
use crate::error::StoreError;
use std::collections::BTreeMap;

/// Everything a customization session needs from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCatalog {
    pub product: String,
    pub surface: SurfaceKind,
    pub print_areas: BTreeMap<Side, PrintArea>,
    pub presets: Vec<PresetPosition>,
}

impl ProductCatalog {
    pub fn new(product: impl Into<String>, surface: SurfaceKind) -> Self {
        Self {
            product: product.into(),
            surface,
            print_areas: BTreeMap::new(),
            presets: Vec::new(),
        }
    }

    pub fn with_print_area(mut self, side: Side, area: PrintArea) -> Self {
        self.print_areas.insert(side, area);
        self
    }

    pub fn with_presets(mut self, presets: Vec<PresetPosition>) -> Self {
        self.presets = presets;
        self
    }

    pub fn print_area(&self, side: Side) -> Option<&PrintArea> {
        self.print_areas.get(&side)
    }

    /// Print area for `side`, or an error naming the product and side.
    pub fn require_print_area(&self, side: Side) -> StoreResult<PrintArea> {
        self.print_area(side)
            .copied()
            .ok_or_else(|| StoreError::MissingPrintArea {
                product: self.product.clone(),
                side: side.to_string(),
            })
    }

    pub fn sides(&self) -> impl Iterator<Item = Side> + '_ {
        self.print_areas.keys().copied()
    }
}

/// Synchronous accessor returning print areas and presets for a product key.
pub trait CatalogStore {
    fn load_catalog(&self, product_key: &str) -> StoreResult<ProductCatalog>;
}

impl<S: DocumentStore + ?Sized> CatalogStore for S {
    fn load_catalog(&self, product_key: &str) -> StoreResult<ProductCatalog> {
        let product_path = DocumentPath::new(PRODUCTS, product_key);
        let product = self.get_record(&product_path)?.into_product(&product_path)?;

        let schema_path = DocumentPath::new(SCHEMAS, product.schema.clone());
        let schema = self.get_record(&schema_path)?.into_schema(&schema_path)?;

        if schema.print_areas.is_empty() {
            return Err(StoreError::ShapeMismatch {
                collection: schema_path.collection,
                id: schema_path.id,
                reason: "schema declares no print areas".to_string(),
            });
        }

        tracing::debug!(
            "loaded catalog for {}: {} sides, {} presets",
            product_key,
            schema.print_areas.len(),
            schema.presets.len()
        );

        Ok(ProductCatalog {
            product: product_key.to_string(),
            surface: product.surface,
            print_areas: schema.print_areas,
            presets: schema.presets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use serde_json::json;

    fn seeded_store() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        store
            .set(
                &DocumentPath::new(PRODUCTS, "mug-11oz"),
                json!({
                    "kind": "product",
                    "name": "Mug 11oz",
                    "category": "drinkware",
                    "price_cents": 1299,
                    "schema": "drinkware",
                    "surface": "cylindrical"
                }),
            )
            .unwrap();
        store
            .set(
                &DocumentPath::new(SCHEMAS, "drinkware"),
                json!({
                    "kind": "schema",
                    "category": "drinkware",
                    "print_areas": {"front": {"width_mm": 210, "height_mm": 95}},
                    "presets": [{
                        "id": "wrap-center",
                        "label": "Wrap center",
                        "transform": {"x": 50, "y": 50, "scale": 0.8},
                        "side": "front"
                    }]
                }),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_load_catalog() {
        let catalog = seeded_store().load_catalog("mug-11oz").unwrap();
        assert_eq!(catalog.surface, SurfaceKind::Cylindrical);
        assert_eq!(
            catalog.print_area(Side::Front).map(|a| a.pixel_size()),
            Some((794, 359))
        );
        assert_eq!(catalog.presets.len(), 1);
        assert_eq!(catalog.sides().collect::<Vec<_>>(), vec![Side::Front]);
        assert!(matches!(
            catalog.require_print_area(Side::Back),
            Err(StoreError::MissingPrintArea { .. })
        ));
    }

    #[test]
    fn test_missing_schema() {
        let store = seeded_store();
        store
            .delete(&DocumentPath::new(SCHEMAS, "drinkware"))
            .unwrap();
        assert!(matches!(
            store.load_catalog("mug-11oz"),
            Err(StoreError::NotFound { .. })
        ));
    }
}
