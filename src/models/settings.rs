//! Company settings model, a singleton record.

use serde::{Deserialize, Serialize};

/// Business-wide settings shown on invoices and quotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    pub id: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub currency: String,
    pub tax_rate: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for saving company settings (upsert).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettingsRequest {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub tax_rate: f64,
}

fn default_currency() -> String {
    "USD".to_string()
}
