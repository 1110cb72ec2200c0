//! Subscription request sent once per connection, right after connect

use serde::{Deserialize, Serialize};

/// Channel carrying the snapshot + l2update stream
pub const LEVEL2_CHANNEL: &str = "level2";

/// `{"type":"subscribe","product_ids":[...],"channels":[...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    #[serde(rename = "type")]
    pub request_type: String,
    pub product_ids: Vec<String>,
    pub channels: Vec<String>,
}

impl SubscribeRequest {
    /// Subscribe `product_id` to `channel`
    pub fn new(product_id: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            request_type: "subscribe".to_string(),
            product_ids: vec![product_id.into()],
            channels: vec![channel.into()],
        }
    }

    /// Subscribe `product_id` to the `level2` channel
    pub fn level2(product_id: impl Into<String>) -> Self {
        Self::new(product_id, LEVEL2_CHANNEL)
    }

    /// JSON text frame for this request
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
