use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "ProductName")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Tags", default)]
    pub tags: Vec<String>,
}

/// Catalog store, preserving the file's ordering.
pub struct ProductStore {
    products: Vec<Product>,
}

impl ProductStore {
    pub fn load(path: &Path) -> Self {
        let products = match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|text| serde_json::from_str(&text).map_err(Into::into))
        {
            Ok(products) => products,
            Err(e) => {
                error!("Error loading product data from {}: {}", path.display(), e);
                Vec::new()
            }
        };

        Self { products }
    }

    pub fn get(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku == sku)
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// TODO: rank by real popularity metrics once order volume is recorded;
    /// for now the head of the catalog stands in.
    pub fn popular(&self, limit: usize) -> Vec<Product> {
        self.products.iter().take(limit).cloned().collect()
    }
}
