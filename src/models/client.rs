//! Client model matching the frontend Client interface.

use serde::{Deserialize, Serialize};

/// A customer of the siding business.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: String,
    pub preferred_contact: String,
    pub total_projects_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub preferred_contact: String,
    #[serde(default)]
    pub total_projects_value: f64,
    #[serde(default)]
    pub last_contact: Option<String>,
}

/// Request body for updating an existing client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub preferred_contact: Option<String>,
    #[serde(default)]
    pub total_projects_value: Option<f64>,
    #[serde(default)]
    pub last_contact: Option<String>,
}
