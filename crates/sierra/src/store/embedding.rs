use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

use super::product::{Product, ProductStore};
use crate::providers::embeddings::EmbeddingProvider;

/// Embedding index over the product catalog.
///
/// Vectors are cached in a JSON file keyed by SKU; catalog entries without a
/// cached vector are embedded at construction and the file is rewritten.
pub struct ProductEmbeddingStore {
    product_store: Arc<ProductStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    embeddings: HashMap<String, Vec<f32>>,
}

impl ProductEmbeddingStore {
    pub async fn load(
        product_store: Arc<ProductStore>,
        embeddings_file: PathBuf,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let mut embeddings: HashMap<String, Vec<f32>> = match fs::read_to_string(&embeddings_file)
        {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                error!("Error parsing embeddings file: {}", e);
                HashMap::new()
            }),
            Err(e) => {
                error!("Error loading embeddings file: {}", e);
                HashMap::new()
            }
        };

        let mut updated = false;
        for product in product_store.all() {
            if embeddings.contains_key(&product.sku) {
                continue;
            }
            let text = format!(
                "{} {} {}",
                product.name,
                product.description,
                product.tags.join(" ")
            );
            match embedder.embed(&text).await {
                Ok(embedding) => {
                    embeddings.insert(product.sku.clone(), embedding);
                    updated = true;
                }
                Err(e) => {
                    // Keep whatever we have; missing vectors just never rank
                    error!("Error generating embedding for {}: {}", product.sku, e);
                    break;
                }
            }
        }

        if updated {
            if let Err(e) = persist(&embeddings_file, &embeddings) {
                error!("Error writing embeddings file: {}", e);
            }
        }

        Self {
            product_store,
            embedder,
            embeddings,
        }
    }

    /// Rank catalog entries by cosine similarity to the query text.
    pub async fn top_k_similar(&self, query: &str, top_k: usize) -> Result<Vec<Product>> {
        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<(f32, &str)> = self
            .embeddings
            .iter()
            .map(|(sku, embedding)| (cosine_similarity(&query_embedding, embedding), sku.as_str()))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .filter_map(|(_, sku)| self.product_store.get(sku).cloned())
            .collect())
    }
}

fn persist(path: &Path, embeddings: &HashMap<String, Vec<f32>>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(embeddings)?)?;
    Ok(())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
