//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use crate::backup::RecordStore;
use crate::errors::AppError;
use crate::models::{
    BackupEntry, Client, CompanySettings, CreateClientRequest, CreateProjectRequest,
    CreateQuoteRequest, CreateTeamRequest, DashboardSummary, Project, Quote, QuoteItem,
    SaveSettingsRequest, Team, UpdateClientRequest, UpdateProjectRequest, UpdateQuoteRequest,
    UpdateTeamRequest,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== CLIENT OPERATIONS ====================

    /// List all clients.
    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, email, phone, address, status, preferred_contact, total_projects_value, last_contact, created_at, updated_at FROM clients ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(client_from_row).collect())
    }

    /// Get a client by ID.
    pub async fn get_client(&self, id: &str) -> Result<Option<Client>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, email, phone, address, status, preferred_contact, total_projects_value, last_contact, created_at, updated_at FROM clients WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(client_from_row))
    }

    /// Create a new client.
    pub async fn create_client(&self, request: &CreateClientRequest) -> Result<Client, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO clients (id, name, email, phone, address, status, preferred_contact, total_projects_value, last_contact, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.status)
        .bind(&request.preferred_contact)
        .bind(request.total_projects_value)
        .bind(&request.last_contact)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Client {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
            status: request.status.clone(),
            preferred_contact: request.preferred_contact.clone(),
            total_projects_value: request.total_projects_value,
            last_contact: request.last_contact.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a client. Absent fields keep their current values.
    pub async fn update_client(
        &self,
        id: &str,
        request: &UpdateClientRequest,
    ) -> Result<Client, AppError> {
        let existing = self
            .get_client(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client {} not found", id)))?;

        let now = Utc::now().to_rfc3339();

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let email = request.email.as_ref().unwrap_or(&existing.email);
        let phone = request.phone.as_ref().unwrap_or(&existing.phone);
        let address = request.address.as_ref().unwrap_or(&existing.address);
        let status = request.status.as_ref().unwrap_or(&existing.status);
        let preferred_contact = request
            .preferred_contact
            .as_ref()
            .unwrap_or(&existing.preferred_contact);
        let total_projects_value = request
            .total_projects_value
            .unwrap_or(existing.total_projects_value);
        let last_contact = request.last_contact.clone().or(existing.last_contact.clone());

        sqlx::query(
            "UPDATE clients SET name = ?, email = ?, phone = ?, address = ?, status = ?, preferred_contact = ?, total_projects_value = ?, last_contact = ?, updated_at = ? WHERE id = ?"
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .bind(status)
        .bind(preferred_contact)
        .bind(total_projects_value)
        .bind(&last_contact)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Client {
            id: id.to_string(),
            name: name.clone(),
            email: email.clone(),
            phone: phone.clone(),
            address: address.clone(),
            status: status.clone(),
            preferred_contact: preferred_contact.clone(),
            total_projects_value,
            last_contact,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a client.
    pub async fn delete_client(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Client {} not found", id)));
        }

        Ok(())
    }

    // ==================== PROJECT OPERATIONS ====================

    /// List all projects.
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, client_id, client_name, address, status, progress, budget, spent, due_date, start_date, team, created_at, updated_at FROM projects ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    /// Get a project by ID.
    pub async fn get_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, client_id, client_name, address, status, progress, budget, spent, due_date, start_date, team, created_at, updated_at FROM projects WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(project_from_row))
    }

    /// Create a new project.
    pub async fn create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<Project, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let team_json = serde_json::to_string(&request.team).unwrap_or_default();

        sqlx::query(
            "INSERT INTO projects (id, name, client_id, client_name, address, status, progress, budget, spent, due_date, start_date, team, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.client_id)
        .bind(&request.client_name)
        .bind(&request.address)
        .bind(&request.status)
        .bind(request.progress)
        .bind(request.budget)
        .bind(request.spent)
        .bind(&request.due_date)
        .bind(&request.start_date)
        .bind(&team_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Project {
            id,
            name: request.name.clone(),
            client_id: request.client_id.clone(),
            client_name: request.client_name.clone(),
            address: request.address.clone(),
            status: request.status.clone(),
            progress: request.progress,
            budget: request.budget,
            spent: request.spent,
            due_date: request.due_date.clone(),
            start_date: request.start_date.clone(),
            team: request.team.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a project. Absent fields keep their current values.
    pub async fn update_project(
        &self,
        id: &str,
        request: &UpdateProjectRequest,
    ) -> Result<Project, AppError> {
        let existing = self
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

        let now = Utc::now().to_rfc3339();

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let client_id = request.client_id.clone().or(existing.client_id.clone());
        let client_name = request.client_name.as_ref().unwrap_or(&existing.client_name);
        let address = request.address.as_ref().unwrap_or(&existing.address);
        let status = request.status.as_ref().unwrap_or(&existing.status);
        let progress = request.progress.unwrap_or(existing.progress);
        let budget = request.budget.unwrap_or(existing.budget);
        let spent = request.spent.unwrap_or(existing.spent);
        let due_date = request.due_date.clone().or(existing.due_date.clone());
        let start_date = request.start_date.clone().or(existing.start_date.clone());
        let team = request.team.clone().unwrap_or(existing.team.clone());
        let team_json = serde_json::to_string(&team).unwrap_or_default();

        sqlx::query(
            "UPDATE projects SET name = ?, client_id = ?, client_name = ?, address = ?, status = ?, progress = ?, budget = ?, spent = ?, due_date = ?, start_date = ?, team = ?, updated_at = ? WHERE id = ?"
        )
        .bind(name)
        .bind(&client_id)
        .bind(client_name)
        .bind(address)
        .bind(status)
        .bind(progress)
        .bind(budget)
        .bind(spent)
        .bind(&due_date)
        .bind(&start_date)
        .bind(&team_json)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Project {
            id: id.to_string(),
            name: name.clone(),
            client_id,
            client_name: client_name.clone(),
            address: address.clone(),
            status: status.clone(),
            progress,
            budget,
            spent,
            due_date,
            start_date,
            team,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a project.
    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project {} not found", id)));
        }

        Ok(())
    }

    // ==================== TEAM OPERATIONS ====================

    /// List all teams.
    pub async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, availability, specialties, members, safety, quality, efficiency, current_project, created_at, updated_at FROM teams ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(team_from_row).collect())
    }

    /// Get a team by ID.
    pub async fn get_team(&self, id: &str) -> Result<Option<Team>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, availability, specialties, members, safety, quality, efficiency, current_project, created_at, updated_at FROM teams WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(team_from_row))
    }

    /// Create a new team.
    pub async fn create_team(&self, request: &CreateTeamRequest) -> Result<Team, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let specialties_json = serde_json::to_string(&request.specialties).unwrap_or_default();
        let members_json = serde_json::to_string(&request.members).unwrap_or_default();

        sqlx::query(
            "INSERT INTO teams (id, name, availability, specialties, members, safety, quality, efficiency, current_project, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.availability)
        .bind(&specialties_json)
        .bind(&members_json)
        .bind(request.safety)
        .bind(request.quality)
        .bind(request.efficiency)
        .bind(&request.current_project)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Team {
            id,
            name: request.name.clone(),
            availability: request.availability.clone(),
            specialties: request.specialties.clone(),
            members: request.members.clone(),
            safety: request.safety,
            quality: request.quality,
            efficiency: request.efficiency,
            current_project: request.current_project.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a team. Absent fields keep their current values.
    pub async fn update_team(
        &self,
        id: &str,
        request: &UpdateTeamRequest,
    ) -> Result<Team, AppError> {
        let existing = self
            .get_team(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))?;

        let now = Utc::now().to_rfc3339();

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let availability = request.availability.as_ref().unwrap_or(&existing.availability);
        let specialties = request
            .specialties
            .clone()
            .unwrap_or(existing.specialties.clone());
        let members = request.members.clone().unwrap_or(existing.members.clone());
        let safety = request.safety.unwrap_or(existing.safety);
        let quality = request.quality.unwrap_or(existing.quality);
        let efficiency = request.efficiency.unwrap_or(existing.efficiency);
        let current_project = request
            .current_project
            .clone()
            .or(existing.current_project.clone());
        let specialties_json = serde_json::to_string(&specialties).unwrap_or_default();
        let members_json = serde_json::to_string(&members).unwrap_or_default();

        sqlx::query(
            "UPDATE teams SET name = ?, availability = ?, specialties = ?, members = ?, safety = ?, quality = ?, efficiency = ?, current_project = ?, updated_at = ? WHERE id = ?"
        )
        .bind(name)
        .bind(availability)
        .bind(&specialties_json)
        .bind(&members_json)
        .bind(safety)
        .bind(quality)
        .bind(efficiency)
        .bind(&current_project)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Team {
            id: id.to_string(),
            name: name.clone(),
            availability: availability.clone(),
            specialties,
            members,
            safety,
            quality,
            efficiency,
            current_project,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a team.
    pub async fn delete_team(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Team {} not found", id)));
        }

        Ok(())
    }

    // ==================== QUOTE OPERATIONS ====================

    /// List all quotes.
    pub async fn list_quotes(&self) -> Result<Vec<Quote>, AppError> {
        let rows = sqlx::query(
            "SELECT id, client_id, project_name, status, total_amount, valid_until, items, created_at, updated_at FROM quotes ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(quote_from_row).collect())
    }

    /// Get a quote by ID.
    pub async fn get_quote(&self, id: &str) -> Result<Option<Quote>, AppError> {
        let row = sqlx::query(
            "SELECT id, client_id, project_name, status, total_amount, valid_until, items, created_at, updated_at FROM quotes WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(quote_from_row))
    }

    /// Create a new quote.
    pub async fn create_quote(&self, request: &CreateQuoteRequest) -> Result<Quote, AppError> {
        let id = crate::backup::generate_quote_id();
        let now = Utc::now().to_rfc3339();
        let items_json = serde_json::to_string(&request.items).unwrap_or_default();

        sqlx::query(
            "INSERT INTO quotes (id, client_id, project_name, status, total_amount, valid_until, items, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.client_id)
        .bind(&request.project_name)
        .bind(&request.status)
        .bind(request.total_amount)
        .bind(&request.valid_until)
        .bind(&items_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Quote {
            id,
            client_id: request.client_id.clone(),
            project_name: request.project_name.clone(),
            status: request.status.clone(),
            total_amount: request.total_amount,
            valid_until: request.valid_until.clone(),
            items: request.items.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a quote. Absent fields keep their current values.
    pub async fn update_quote(
        &self,
        id: &str,
        request: &UpdateQuoteRequest,
    ) -> Result<Quote, AppError> {
        let existing = self
            .get_quote(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quote {} not found", id)))?;

        let now = Utc::now().to_rfc3339();

        let client_id = request.client_id.clone().or(existing.client_id.clone());
        let project_name = request.project_name.as_ref().unwrap_or(&existing.project_name);
        let status = request.status.as_ref().unwrap_or(&existing.status);
        let total_amount = request.total_amount.unwrap_or(existing.total_amount);
        let valid_until = request.valid_until.clone().or(existing.valid_until.clone());
        let items = request.items.clone().unwrap_or(existing.items.clone());
        let items_json = serde_json::to_string(&items).unwrap_or_default();

        sqlx::query(
            "UPDATE quotes SET client_id = ?, project_name = ?, status = ?, total_amount = ?, valid_until = ?, items = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&client_id)
        .bind(project_name)
        .bind(status)
        .bind(total_amount)
        .bind(&valid_until)
        .bind(&items_json)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Quote {
            id: id.to_string(),
            client_id,
            project_name: project_name.clone(),
            status: status.clone(),
            total_amount,
            valid_until,
            items,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a quote.
    pub async fn delete_quote(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Quote {} not found", id)));
        }

        Ok(())
    }

    // ==================== SETTINGS OPERATIONS ====================

    /// Get the company settings singleton, if it has been saved.
    pub async fn get_settings(&self) -> Result<Option<CompanySettings>, AppError> {
        let row = sqlx::query(
            "SELECT id, company_name, email, phone, address, currency, tax_rate, created_at, updated_at FROM company_settings LIMIT 1"
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(settings_from_row))
    }

    /// Save company settings, creating the singleton on first save.
    pub async fn save_settings(
        &self,
        request: &SaveSettingsRequest,
    ) -> Result<CompanySettings, AppError> {
        let now = Utc::now().to_rfc3339();

        if let Some(existing) = self.get_settings().await? {
            sqlx::query(
                "UPDATE company_settings SET company_name = ?, email = ?, phone = ?, address = ?, currency = ?, tax_rate = ?, updated_at = ? WHERE id = ?"
            )
            .bind(&request.company_name)
            .bind(&request.email)
            .bind(&request.phone)
            .bind(&request.address)
            .bind(&request.currency)
            .bind(request.tax_rate)
            .bind(&now)
            .bind(&existing.id)
            .execute(&self.pool)
            .await?;

            return Ok(CompanySettings {
                id: existing.id,
                company_name: request.company_name.clone(),
                email: request.email.clone(),
                phone: request.phone.clone(),
                address: request.address.clone(),
                currency: request.currency.clone(),
                tax_rate: request.tax_rate,
                created_at: existing.created_at,
                updated_at: now,
            });
        }

        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO company_settings (id, company_name, email, phone, address, currency, tax_rate, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.company_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.currency)
        .bind(request.tax_rate)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(CompanySettings {
            id,
            company_name: request.company_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
            currency: request.currency.clone(),
            tax_rate: request.tax_rate,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    // ==================== DASHBOARD OPERATIONS ====================

    /// Aggregate counts and totals for the dashboard landing page.
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, AppError> {
        let row = sqlx::query(
            r#"SELECT
                (SELECT COUNT(*) FROM clients) AS total_clients,
                (SELECT COUNT(*) FROM projects) AS total_projects,
                (SELECT COUNT(*) FROM teams) AS total_teams,
                (SELECT COUNT(*) FROM quotes) AS total_quotes,
                (SELECT COALESCE(AVG(progress), 0.0) FROM projects) AS average_project_progress,
                (SELECT COALESCE(SUM(budget), 0.0) FROM projects) AS total_budget,
                (SELECT COALESCE(SUM(spent), 0.0) FROM projects) AS total_spent,
                (SELECT COALESCE(SUM(total_amount), 0.0) FROM quotes) AS total_quote_value"#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardSummary {
            total_clients: row.get("total_clients"),
            total_projects: row.get("total_projects"),
            total_teams: row.get("total_teams"),
            total_quotes: row.get("total_quotes"),
            average_project_progress: row.get("average_project_progress"),
            total_budget: row.get("total_budget"),
            total_spent: row.get("total_spent"),
            total_quote_value: row.get("total_quote_value"),
        })
    }

    // ==================== BACKUP HISTORY OPERATIONS ====================

    /// Insert a backup history entry together with its snapshot payload.
    pub async fn insert_backup_entry(
        &self,
        entry: &BackupEntry,
        payload: &str,
    ) -> Result<(), AppError> {
        let included_json = serde_json::to_string(&entry.included_tables).unwrap_or_default();

        sqlx::query(
            "INSERT INTO backup_history (id, name, created_at, file_size, backup_data, included_tables, version) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&entry.id)
        .bind(&entry.name)
        .bind(&entry.created_at)
        .bind(entry.file_size)
        .bind(payload)
        .bind(&included_json)
        .bind(&entry.version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List backup history entries, most recent first.
    pub async fn list_backup_entries(&self, limit: i64) -> Result<Vec<BackupEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, created_at, file_size, included_tables, version FROM backup_history ORDER BY created_at DESC LIMIT ?"
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(backup_entry_from_row).collect())
    }

    /// Get a backup history entry by ID, without its payload.
    pub async fn get_backup_entry(&self, id: &str) -> Result<Option<BackupEntry>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, created_at, file_size, included_tables, version FROM backup_history WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(backup_entry_from_row))
    }

    /// Get the raw snapshot payload of a backup history entry.
    pub async fn get_backup_payload(&self, id: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT backup_data FROM backup_history WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("backup_data")))
    }

    /// Delete a backup history entry.
    pub async fn delete_backup_entry(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM backup_history WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Backup {} not found", id)));
        }

        Ok(())
    }

    // ==================== RECORD STORE HELPERS ====================

    async fn insert_client_values(&self, rows: &[Value]) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                "INSERT INTO clients (id, name, email, phone, address, status, preferred_contact, total_projects_value, last_contact, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(value_str(row, "id"))
            .bind(value_str(row, "name"))
            .bind(value_str(row, "email"))
            .bind(value_str(row, "phone"))
            .bind(value_str(row, "address"))
            .bind(value_str(row, "status"))
            .bind(value_str(row, "preferred_contact"))
            .bind(value_f64(row, "total_projects_value"))
            .bind(value_opt_str(row, "last_contact"))
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn insert_project_values(&self, rows: &[Value]) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                "INSERT INTO projects (id, name, client_id, client_name, address, status, progress, budget, spent, due_date, start_date, team, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(value_str(row, "id"))
            .bind(value_str(row, "name"))
            .bind(value_opt_str(row, "client_id"))
            .bind(value_str(row, "client_name"))
            .bind(value_str(row, "address"))
            .bind(value_str(row, "status"))
            .bind(value_i64(row, "progress"))
            .bind(value_f64(row, "budget"))
            .bind(value_f64(row, "spent"))
            .bind(value_opt_str(row, "due_date"))
            .bind(value_opt_str(row, "start_date"))
            .bind(value_array_text(row, "team"))
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn insert_team_values(&self, rows: &[Value]) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                "INSERT INTO teams (id, name, availability, specialties, members, safety, quality, efficiency, current_project, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(value_str(row, "id"))
            .bind(value_str(row, "name"))
            .bind(value_str(row, "availability"))
            .bind(value_array_text(row, "specialties"))
            .bind(value_array_text(row, "members"))
            .bind(value_i64(row, "safety"))
            .bind(value_i64(row, "quality"))
            .bind(value_i64(row, "efficiency"))
            .bind(value_opt_str(row, "current_project"))
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn insert_quote_values(&self, rows: &[Value]) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                "INSERT INTO quotes (id, client_id, project_name, status, total_amount, valid_until, items, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(value_str(row, "id"))
            .bind(value_opt_str(row, "client_id"))
            .bind(value_str(row, "project_name"))
            .bind(value_str(row, "status"))
            .bind(value_f64(row, "total_amount"))
            .bind(value_opt_str(row, "valid_until"))
            .bind(value_array_text(row, "items"))
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for Repository {
    async fn select_all(&self, table: &str) -> Result<Vec<Value>, AppError> {
        match table {
            "clients" => {
                let rows = sqlx::query(
                    "SELECT id, name, email, phone, address, status, preferred_contact, total_projects_value, last_contact, created_at, updated_at FROM clients ORDER BY name"
                )
                .fetch_all(&self.pool)
                .await?;
                Ok(rows.iter().map(client_row_to_value).collect())
            }
            "projects" => {
                let rows = sqlx::query(
                    "SELECT id, name, client_id, client_name, address, status, progress, budget, spent, due_date, start_date, team, created_at, updated_at FROM projects ORDER BY name"
                )
                .fetch_all(&self.pool)
                .await?;
                Ok(rows.iter().map(project_row_to_value).collect())
            }
            "teams" => {
                let rows = sqlx::query(
                    "SELECT id, name, availability, specialties, members, safety, quality, efficiency, current_project, created_at, updated_at FROM teams ORDER BY name"
                )
                .fetch_all(&self.pool)
                .await?;
                Ok(rows.iter().map(team_row_to_value).collect())
            }
            "quotes" => {
                let rows = sqlx::query(
                    "SELECT id, client_id, project_name, status, total_amount, valid_until, items, created_at, updated_at FROM quotes ORDER BY created_at DESC"
                )
                .fetch_all(&self.pool)
                .await?;
                Ok(rows.iter().map(quote_row_to_value).collect())
            }
            _ => Err(AppError::Validation(format!("Unknown table: {}", table))),
        }
    }

    async fn delete_all(&self, table: &str) -> Result<(), AppError> {
        let sql = match table {
            "clients" => "DELETE FROM clients",
            "projects" => "DELETE FROM projects",
            "teams" => "DELETE FROM teams",
            "quotes" => "DELETE FROM quotes",
            _ => return Err(AppError::Validation(format!("Unknown table: {}", table))),
        };

        sqlx::query(sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_rows(&self, table: &str, rows: &[Value]) -> Result<(), AppError> {
        match table {
            "clients" => self.insert_client_values(rows).await,
            "projects" => self.insert_project_values(rows).await,
            "teams" => self.insert_team_values(rows).await,
            "quotes" => self.insert_quote_values(rows).await,
            _ => Err(AppError::Validation(format!("Unknown table: {}", table))),
        }
    }

    async fn count_rows(&self, table: &str) -> Result<i64, AppError> {
        let sql = match table {
            "clients" => "SELECT COUNT(*) AS n FROM clients",
            "projects" => "SELECT COUNT(*) AS n FROM projects",
            "teams" => "SELECT COUNT(*) AS n FROM teams",
            "quotes" => "SELECT COUNT(*) AS n FROM quotes",
            _ => return Err(AppError::Validation(format!("Unknown table: {}", table))),
        };

        let row = sqlx::query(sql).fetch_one(&self.pool).await?;
        Ok(row.get("n"))
    }

    async fn fetch_settings(&self) -> Result<Option<Value>, AppError> {
        let row = sqlx::query(
            "SELECT id, company_name, email, phone, address, currency, tax_rate, created_at, updated_at FROM company_settings LIMIT 1"
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(settings_row_to_value))
    }

    async fn replace_settings(&self, settings: &Value) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let id = match settings.get("id").and_then(|v| v.as_str()) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM company_settings")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO company_settings (id, company_name, email, phone, address, currency, tax_rate, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(value_str(settings, "company_name"))
        .bind(value_str(settings, "email"))
        .bind(value_str(settings, "phone"))
        .bind(value_str(settings, "address"))
        .bind(value_str(settings, "currency"))
        .bind(value_f64(settings, "tax_rate"))
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

// Helper functions for row conversion

fn client_from_row(row: &sqlx::sqlite::SqliteRow) -> Client {
    Client {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        status: row.get("status"),
        preferred_contact: row.get("preferred_contact"),
        total_projects_value: row.get("total_projects_value"),
        last_contact: row.get("last_contact"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn project_from_row(row: &sqlx::sqlite::SqliteRow) -> Project {
    let team_str: Option<String> = row.get("team");
    Project {
        id: row.get("id"),
        name: row.get("name"),
        client_id: row.get("client_id"),
        client_name: row.get("client_name"),
        address: row.get("address"),
        status: row.get("status"),
        progress: row.get("progress"),
        budget: row.get("budget"),
        spent: row.get("spent"),
        due_date: row.get("due_date"),
        start_date: row.get("start_date"),
        team: team_str.map(|s| parse_json_array(&s)).unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn team_from_row(row: &sqlx::sqlite::SqliteRow) -> Team {
    let specialties_str: Option<String> = row.get("specialties");
    let members_str: Option<String> = row.get("members");
    Team {
        id: row.get("id"),
        name: row.get("name"),
        availability: row.get("availability"),
        specialties: specialties_str
            .map(|s| parse_json_array(&s))
            .unwrap_or_default(),
        members: members_str.map(|s| parse_json_array(&s)).unwrap_or_default(),
        safety: row.get("safety"),
        quality: row.get("quality"),
        efficiency: row.get("efficiency"),
        current_project: row.get("current_project"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn quote_from_row(row: &sqlx::sqlite::SqliteRow) -> Quote {
    let items_str: Option<String> = row.get("items");
    Quote {
        id: row.get("id"),
        client_id: row.get("client_id"),
        project_name: row.get("project_name"),
        status: row.get("status"),
        total_amount: row.get("total_amount"),
        valid_until: row.get("valid_until"),
        items: items_str.map(|s| parse_quote_items(&s)).unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn settings_from_row(row: &sqlx::sqlite::SqliteRow) -> CompanySettings {
    CompanySettings {
        id: row.get("id"),
        company_name: row.get("company_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        currency: row.get("currency"),
        tax_rate: row.get("tax_rate"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn backup_entry_from_row(row: &sqlx::sqlite::SqliteRow) -> BackupEntry {
    let included_str: String = row.get("included_tables");
    BackupEntry {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        file_size: row.get("file_size"),
        included_tables: parse_json_array(&included_str),
        version: row.get("version"),
    }
}

// Snapshot rows use the persisted snake_case column names.

fn client_row_to_value(row: &sqlx::sqlite::SqliteRow) -> Value {
    let id: String = row.get("id");
    let name: String = row.get("name");
    let email: String = row.get("email");
    let phone: String = row.get("phone");
    let address: String = row.get("address");
    let status: String = row.get("status");
    let preferred_contact: String = row.get("preferred_contact");
    let total_projects_value: f64 = row.get("total_projects_value");
    let last_contact: Option<String> = row.get("last_contact");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    serde_json::json!({
        "id": id,
        "name": name,
        "email": email,
        "phone": phone,
        "address": address,
        "status": status,
        "preferred_contact": preferred_contact,
        "total_projects_value": total_projects_value,
        "last_contact": last_contact,
        "created_at": created_at,
        "updated_at": updated_at,
    })
}

fn project_row_to_value(row: &sqlx::sqlite::SqliteRow) -> Value {
    let id: String = row.get("id");
    let name: String = row.get("name");
    let client_id: Option<String> = row.get("client_id");
    let client_name: String = row.get("client_name");
    let address: String = row.get("address");
    let status: String = row.get("status");
    let progress: i64 = row.get("progress");
    let budget: f64 = row.get("budget");
    let spent: f64 = row.get("spent");
    let due_date: Option<String> = row.get("due_date");
    let start_date: Option<String> = row.get("start_date");
    let team_str: Option<String> = row.get("team");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    serde_json::json!({
        "id": id,
        "name": name,
        "client_id": client_id,
        "client_name": client_name,
        "address": address,
        "status": status,
        "progress": progress,
        "budget": budget,
        "spent": spent,
        "due_date": due_date,
        "start_date": start_date,
        "team": parse_json_value_array(team_str.as_deref()),
        "created_at": created_at,
        "updated_at": updated_at,
    })
}

fn team_row_to_value(row: &sqlx::sqlite::SqliteRow) -> Value {
    let id: String = row.get("id");
    let name: String = row.get("name");
    let availability: String = row.get("availability");
    let specialties_str: Option<String> = row.get("specialties");
    let members_str: Option<String> = row.get("members");
    let safety: i64 = row.get("safety");
    let quality: i64 = row.get("quality");
    let efficiency: i64 = row.get("efficiency");
    let current_project: Option<String> = row.get("current_project");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    serde_json::json!({
        "id": id,
        "name": name,
        "availability": availability,
        "specialties": parse_json_value_array(specialties_str.as_deref()),
        "members": parse_json_value_array(members_str.as_deref()),
        "safety": safety,
        "quality": quality,
        "efficiency": efficiency,
        "current_project": current_project,
        "created_at": created_at,
        "updated_at": updated_at,
    })
}

fn quote_row_to_value(row: &sqlx::sqlite::SqliteRow) -> Value {
    let id: String = row.get("id");
    let client_id: Option<String> = row.get("client_id");
    let project_name: String = row.get("project_name");
    let status: String = row.get("status");
    let total_amount: f64 = row.get("total_amount");
    let valid_until: Option<String> = row.get("valid_until");
    let items_str: Option<String> = row.get("items");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    serde_json::json!({
        "id": id,
        "client_id": client_id,
        "project_name": project_name,
        "status": status,
        "total_amount": total_amount,
        "valid_until": valid_until,
        "items": parse_json_value_array(items_str.as_deref()),
        "created_at": created_at,
        "updated_at": updated_at,
    })
}

fn settings_row_to_value(row: &sqlx::sqlite::SqliteRow) -> Value {
    let id: String = row.get("id");
    let company_name: String = row.get("company_name");
    let email: String = row.get("email");
    let phone: String = row.get("phone");
    let address: String = row.get("address");
    let currency: String = row.get("currency");
    let tax_rate: f64 = row.get("tax_rate");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    serde_json::json!({
        "id": id,
        "company_name": company_name,
        "email": email,
        "phone": phone,
        "address": address,
        "currency": currency,
        "tax_rate": tax_rate,
        "created_at": created_at,
        "updated_at": updated_at,
    })
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

fn parse_quote_items(s: &str) -> Vec<QuoteItem> {
    serde_json::from_str(s).unwrap_or_default()
}

fn parse_json_value_array(s: Option<&str>) -> Value {
    s.and_then(|s| serde_json::from_str(s).ok())
        .filter(Value::is_array)
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

// Field accessors for normalized snapshot rows.

fn value_str(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn value_opt_str(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}

fn value_f64(v: &Value, key: &str) -> f64 {
    v.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn value_i64(v: &Value, key: &str) -> i64 {
    v.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn value_array_text(v: &Value, key: &str) -> String {
    match v.get(key) {
        Some(x) if x.is_array() => x.to_string(),
        _ => "[]".to_string(),
    }
}
