//! Quote model matching the frontend Quote interface.

use serde::{Deserialize, Serialize};

/// A single line item on a quote.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub total: f64,
}

/// A price quote offered to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub project_name: String,
    pub status: String,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub items: Vec<QuoteItem>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new quote.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    #[serde(default)]
    pub client_id: Option<String>,
    pub project_name: String,
    #[serde(default = "default_quote_status")]
    pub status: String,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub items: Vec<QuoteItem>,
}

fn default_quote_status() -> String {
    "draft".to_string()
}

/// Request body for updating an existing quote.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuoteRequest {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<QuoteItem>>,
}
