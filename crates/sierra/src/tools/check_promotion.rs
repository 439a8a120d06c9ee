use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveTime, Utc};
use chrono_tz::US::Pacific;
use rand::Rng;
use serde_json::{json, Value};

use super::FunctionTool;
use crate::models::tool::Tool;

const PROMOTION_HOURS: &str = "8:00 AM - 10:00 AM Pacific Time";
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 4;

/// Check whether the Early Risers Promotion is currently active.
pub struct CheckPromotionEligibility;

impl CheckPromotionEligibility {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CheckPromotionEligibility {
    fn default() -> Self {
        Self::new()
    }
}

/// The window is inclusive on both ends.
fn within_promotion_window(time: NaiveTime) -> bool {
    let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    let end = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
    time >= start && time <= end
}

fn generate_discount_code() -> String {
    let mut rng = rand::thread_rng();
    let unique: String = (0..CODE_LEN)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect();
    format!("EARLY-{}", unique)
}

#[async_trait]
impl FunctionTool for CheckPromotionEligibility {
    fn name(&self) -> &str {
        "check_promotion_eligibility"
    }

    fn definition(&self) -> Tool {
        Tool::new(
            "check_promotion_eligibility",
            "Check if the Early Risers Promotion is currently active",
            json!({
                "type": "object",
                "properties": {},
                "required": [],
                "additionalProperties": false
            }),
        )
    }

    async fn execute(&self, _arguments: Value) -> Result<Value> {
        let now = Utc::now().with_timezone(&Pacific);
        let is_valid_time = within_promotion_window(now.time());

        let discount_code = if is_valid_time {
            Some(generate_discount_code())
        } else {
            None
        };

        Ok(json!({
            "is_valid_time": is_valid_time,
            "current_time": now.format("%I:%M %p %Z").to_string(),
            "promotion_hours": PROMOTION_HOURS,
            "discount_code": discount_code
        }))
    }
}
