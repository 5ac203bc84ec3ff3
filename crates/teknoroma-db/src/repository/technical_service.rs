//! # Technical Service Repository
//!
//! Repair / support tickets. Status writes are guarded by the expected
//! current status, like sales.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use teknoroma_core::{TechnicalService, TicketPriority, TicketStatus, Visibility};

#[derive(Debug, Clone, Default)]
pub struct TechnicalServiceFilter {
    pub store_id: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assigned_to_id: Option<String>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone)]
pub struct TechnicalServiceRepository {
    pool: SqlitePool,
}

impl TechnicalServiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TechnicalServiceRepository { pool }
    }

    pub async fn insert_in(conn: &mut SqliteConnection, ticket: &TechnicalService) -> DbResult<()> {
        debug!(id = %ticket.id, number = %ticket.ticket_number, "Opening ticket");

        sqlx::query(
            r#"
            INSERT INTO technical_services (
                id, ticket_number, store_id, customer_id, product_id,
                reported_by_id, assigned_to_id, title, description, priority, status,
                resolution, reported_at, resolved_at, is_deleted, created_at, modified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ticket.id)
        .bind(&ticket.ticket_number)
        .bind(&ticket.store_id)
        .bind(&ticket.customer_id)
        .bind(&ticket.product_id)
        .bind(&ticket.reported_by_id)
        .bind(&ticket.assigned_to_id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.priority)
        .bind(ticket.status)
        .bind(&ticket.resolution)
        .bind(ticket.reported_at)
        .bind(ticket.resolved_at)
        .bind(ticket.is_deleted)
        .bind(ticket.created_at)
        .bind(ticket.modified_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str, visibility: Visibility) -> DbResult<Option<TechnicalService>> {
        let ticket = sqlx::query_as::<_, TechnicalService>(
            "SELECT * FROM technical_services WHERE id = ? AND (? OR is_deleted = 0)",
        )
        .bind(id)
        .bind(visibility.includes_deleted())
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Lists tickets, most urgent and oldest first.
    pub async fn list(&self, filter: &TechnicalServiceFilter) -> DbResult<Vec<TechnicalService>> {
        let tickets = sqlx::query_as::<_, TechnicalService>(
            r#"
            SELECT * FROM technical_services
            WHERE (? OR is_deleted = 0)
              AND (? IS NULL OR store_id = ?)
              AND (? IS NULL OR status = ?)
              AND (? IS NULL OR priority = ?)
              AND (? IS NULL OR assigned_to_id = ?)
            ORDER BY
                CASE priority
                    WHEN 'critical' THEN 0 WHEN 'high' THEN 1
                    WHEN 'normal' THEN 2 ELSE 3
                END,
                reported_at
            "#,
        )
        .bind(filter.visibility.includes_deleted())
        .bind(&filter.store_id)
        .bind(&filter.store_id)
        .bind(filter.status)
        .bind(filter.status)
        .bind(filter.priority)
        .bind(filter.priority)
        .bind(&filter.assigned_to_id)
        .bind(&filter.assigned_to_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// Changes status, optionally setting assignee, resolution and resolved date.
    ///
    /// `None` arguments leave the stored value unchanged.
    ///
    /// ## Returns
    /// * `Ok(false)` - the ticket was no longer in `from`
    pub async fn transition(
        &self,
        id: &str,
        from: TicketStatus,
        to: TicketStatus,
        assigned_to_id: Option<&str>,
        resolution: Option<&str>,
        resolved_at: Option<DateTime<Utc>>,
    ) -> DbResult<bool> {
        debug!(id = %id, from = %from, to = %to, "Changing ticket status");

        let result = sqlx::query(
            r#"
            UPDATE technical_services SET
                status = ?,
                assigned_to_id = COALESCE(?, assigned_to_id),
                resolution = COALESCE(?, resolution),
                resolved_at = COALESCE(?, resolved_at),
                modified_at = ?
            WHERE id = ? AND status = ? AND is_deleted = 0
            "#,
        )
        .bind(to)
        .bind(assigned_to_id)
        .bind(resolution)
        .bind(resolved_at)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
