use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::FunctionTool;
use crate::models::tool::Tool;
use crate::store::order::OrderStore;

/// Look up order status using email and order number.
pub struct LookupOrder {
    order_store: Arc<OrderStore>,
}

impl LookupOrder {
    pub fn new(order_store: Arc<OrderStore>) -> Self {
        Self { order_store }
    }
}

#[async_trait]
impl FunctionTool for LookupOrder {
    fn name(&self) -> &str {
        "lookup_order"
    }

    fn definition(&self) -> Tool {
        Tool::new(
            "lookup_order",
            "Look up order status using email and order number",
            json!({
                "type": "object",
                "properties": {
                    "email": {"type": "string", "description": "Customer's email address"},
                    "order_number": {"type": "string", "description": "Order number or ID"}
                },
                "required": ["email", "order_number"],
                "additionalProperties": false
            }),
        )
    }

    async fn execute(&self, arguments: Value) -> Result<Value> {
        let email = arguments
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let order_number = arguments
            .get("order_number")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        match self.order_store.find_by_email_and_number(email, order_number) {
            Some(order) => Ok(json!({
                "found": true,
                "order": order
            })),
            None => Ok(json!({
                "found": false,
                "message": "Order not found."
            })),
        }
    }
}
