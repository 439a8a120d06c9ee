use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::error;

const USPS_TRACKING_URL: &str = "https://tools.usps.com/go/TrackConfirmAction?tLabels=";

#[derive(Debug, Clone, Deserialize)]
struct OrderRecord {
    #[serde(rename = "Email", default)]
    email: String,
    #[serde(rename = "OrderNumber", default)]
    order_number: String,
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "TrackingNumber", default)]
    tracking_number: Option<String>,
}

/// The customer-facing view of a matched order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    #[serde(rename = "OrderNumber")]
    pub order_number: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "TrackingNumber")]
    pub tracking_number: Option<String>,
    #[serde(rename = "TrackingLink")]
    pub tracking_link: Option<String>,
}

/// JSON-backed order lookup, loaded once at construction.
pub struct OrderStore {
    orders: Vec<OrderRecord>,
}

impl OrderStore {
    /// Load orders from a JSON file. The file may be a bare array or an
    /// object with an "orders" key. A load failure yields an empty store.
    pub fn load(path: &Path) -> Self {
        let orders = match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|text| serde_json::from_str::<Value>(&text).map_err(Into::into))
        {
            Ok(data) => Self::parse_records(data),
            Err(e) => {
                error!("Error loading data from {}: {}", path.display(), e);
                Vec::new()
            }
        };

        Self { orders }
    }

    fn parse_records(data: Value) -> Vec<OrderRecord> {
        let entries = match data {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove("orders") {
                Some(Value::Array(entries)) => entries,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect()
    }

    /// Find an order by customer email and order number.
    ///
    /// The order number is normalized to the catalog's leading `#` form and
    /// both fields match case-insensitively. Absence is a None, not an error.
    pub fn find_by_email_and_number(&self, email: &str, order_number: &str) -> Option<OrderSummary> {
        let normalized = if !order_number.is_empty() && !order_number.starts_with('#') {
            format!("#{}", order_number)
        } else {
            order_number.to_string()
        };

        self.orders
            .iter()
            .find(|order| {
                order.email.eq_ignore_ascii_case(email)
                    && order.order_number.to_uppercase() == normalized.to_uppercase()
            })
            .map(|order| {
                let tracking_link = order
                    .tracking_number
                    .as_ref()
                    .map(|tn| format!("{}{}", USPS_TRACKING_URL, tn));
                OrderSummary {
                    order_number: order.order_number.clone(),
                    status: order.status.clone(),
                    tracking_number: order.tracking_number.clone(),
                    tracking_link,
                }
            })
    }
}
