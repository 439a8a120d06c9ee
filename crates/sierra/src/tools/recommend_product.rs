use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use super::FunctionTool;
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::Provider;
use crate::store::embedding::ProductEmbeddingStore;
use crate::store::product::{Product, ProductStore};

const TOP_K: usize = 3;
const POPULAR_LIMIT: usize = 3;

const RELEVANCE_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that evaluates product relevance.";

/// Recommend catalog products matching a free-text preference.
pub struct RecommendProduct {
    product_store: Arc<ProductStore>,
    embedding_store: Arc<ProductEmbeddingStore>,
    provider: Arc<dyn Provider>,
}

impl RecommendProduct {
    pub fn new(
        product_store: Arc<ProductStore>,
        embedding_store: Arc<ProductEmbeddingStore>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self {
            product_store,
            embedding_store,
            provider,
        }
    }

    /// Ask the model whether each candidate matches the stated preferences.
    /// A failed judgment call keeps the candidate rather than dropping it,
    /// to avoid false negatives.
    async fn filter_with_model(&self, preferences: &str, candidates: Vec<Product>) -> Vec<Product> {
        let mut kept = Vec::new();

        for product in candidates {
            let product_info = format!(
                "Product Name: {}, Description: {}, Tags: {}",
                product.name,
                product.description,
                product.tags.join(", ")
            );
            let prompt = format!(
                "USER PREFERENCES: {}\n\nPRODUCT DETAILS: {}\n\n\
                 Is this product relevant to the user's preferences? Consider the product \
                 features, description, and intended use.\n\
                 Respond with only 'YES' if the product is relevant or 'NO' if it is not relevant.",
                preferences, product_info
            );

            let messages = vec![
                Message::system(RELEVANCE_SYSTEM_PROMPT),
                Message::user(prompt),
            ];

            match self.provider.complete(&messages, &[]).await {
                Ok((reply, _)) => {
                    if reply.content.trim().to_uppercase() == "YES" {
                        kept.push(product);
                    }
                }
                Err(e) => {
                    error!("Error in relevance evaluation: {}", e);
                    kept.push(product);
                }
            }
        }

        kept
    }
}

#[async_trait]
impl FunctionTool for RecommendProduct {
    fn name(&self) -> &str {
        "recommend_product"
    }

    fn definition(&self) -> Tool {
        Tool::new(
            "recommend_product",
            "Get product recommendations based on user preferences",
            json!({
                "type": "object",
                "properties": {
                    "preferences": {"type": "string", "description": "User's product preferences or requirements"}
                },
                "required": ["preferences"],
                "additionalProperties": false
            }),
        )
    }

    async fn execute(&self, arguments: Value) -> Result<Value> {
        let preferences = arguments
            .get("preferences")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        // 'general' preferences skip similarity search and return the
        // popular picks unfiltered
        if preferences.eq_ignore_ascii_case("general") {
            return Ok(json!({
                "recommendations": self.product_store.popular(POPULAR_LIMIT)
            }));
        }

        let candidates = self.embedding_store.top_k_similar(preferences, TOP_K).await?;
        let filtered = self.filter_with_model(preferences, candidates).await;

        Ok(json!({
            "recommendations": filtered
        }))
    }
}
