//! Crew model matching the frontend Team interface.

use serde::{Deserialize, Serialize};

/// An installation crew with performance metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub availability: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
    /// Performance ratings, 0-100
    pub safety: i64,
    pub quality: i64,
    pub efficiency: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_project: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new team.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub safety: i64,
    #[serde(default)]
    pub quality: i64,
    #[serde(default)]
    pub efficiency: i64,
    #[serde(default)]
    pub current_project: Option<String>,
}

/// Request body for updating an existing team.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub specialties: Option<Vec<String>>,
    #[serde(default)]
    pub members: Option<Vec<String>>,
    #[serde(default)]
    pub safety: Option<i64>,
    #[serde(default)]
    pub quality: Option<i64>,
    #[serde(default)]
    pub efficiency: Option<i64>,
    #[serde(default)]
    pub current_project: Option<String>,
}
