//! Aggregated numbers for the dashboard landing page.

use serde::{Deserialize, Serialize};

/// Summary counts and totals across all collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_clients: i64,
    pub total_projects: i64,
    pub total_teams: i64,
    pub total_quotes: i64,
    /// Mean of project progress values, 0 when there are no projects
    pub average_project_progress: f64,
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_quote_value: f64,
}
