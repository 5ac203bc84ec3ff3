//! # Technical-Service Tickets
//!
//! ```text
//!            assign             resolve
//!   Open ──────────► InProgress ───────► Resolved ──► Closed
//!    │                 │    ▲               │
//!    │                 ▼    │               └──► InProgress (reopened)
//!    │           WaitingForParts
//!    └──────────────┴──────┴──► Cancelled
//! ```
//!
//! | Operation     | Notifies                          |
//! |---------------|-----------------------------------|
//! | open          | `Role(TechnicalService)` NewTicket |
//! | assign        | `User(assignee)` TicketAssigned    |
//! | resolve       | `User(reporter)` TicketResolved    |

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::info;

use teknoroma_core::lifecycle::ensure_ticket_transition;
use teknoroma_core::validation::validate_name;
use teknoroma_core::{
    CoreError, DocumentKind, Role, TechnicalService, TicketPriority, TicketStatus, ValidationError, Visibility,
};
use teknoroma_db::repository::new_id;
use teknoroma_db::{
    CustomerRepository, Database, EmployeeRepository, ProductRepository, SequenceRepository, StoreRepository,
    TechnicalServiceFilter, TechnicalServiceRepository,
};

use crate::error::ServiceResult;
use crate::services::notification::{Event, Notifier, Topic};

#[derive(Debug, Clone, Deserialize)]
pub struct OpenTicketRequest {
    pub store_id: String,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    pub reported_by_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: TicketPriority,
}

#[derive(Clone)]
pub struct TicketService {
    db: Database,
    notifier: Arc<dyn Notifier>,
}

impl TicketService {
    pub fn new(db: Database, notifier: Arc<dyn Notifier>) -> Self {
        TicketService { db, notifier }
    }

    pub async fn open(&self, req: OpenTicketRequest) -> ServiceResult<TechnicalService> {
        let title = validate_name("title", &req.title, 200)?;
        let description = validate_name("description", &req.description, 2000)?;
        let now = Utc::now();

        let mut uow = self.db.begin().await?;

        StoreRepository::get_active_in(uow.conn(), &req.store_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Store", &req.store_id))?;
        EmployeeRepository::get_active_in(uow.conn(), &req.reported_by_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Employee", &req.reported_by_id))?;
        if let Some(customer_id) = &req.customer_id {
            CustomerRepository::get_active_in(uow.conn(), customer_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Customer", customer_id))?;
        }
        if let Some(product_id) = &req.product_id {
            ProductRepository::get_active_in(uow.conn(), product_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Product", product_id))?;
        }

        let ticket = TechnicalService {
            id: new_id(),
            ticket_number: SequenceRepository::next_in(uow.conn(), DocumentKind::TechnicalService, now.year())
                .await?,
            store_id: req.store_id,
            customer_id: req.customer_id,
            product_id: req.product_id,
            reported_by_id: req.reported_by_id,
            assigned_to_id: None,
            title,
            description,
            priority: req.priority,
            status: TicketStatus::Open,
            resolution: None,
            reported_at: now,
            resolved_at: None,
            is_deleted: false,
            created_at: now,
            modified_at: None,
        };
        TechnicalServiceRepository::insert_in(uow.conn(), &ticket).await?;
        uow.commit().await?;

        info!(ticket_number = %ticket.ticket_number, priority = ?ticket.priority, "Ticket opened");
        self.notifier.notify(
            Topic::Role(Role::TechnicalService),
            Event::NewTicket {
                ticket_id: ticket.id.clone(),
                ticket_number: ticket.ticket_number.clone(),
                title: ticket.title.clone(),
                priority: ticket.priority,
            },
        );

        Ok(ticket)
    }

    pub async fn assign(&self, id: &str, employee_id: &str) -> ServiceResult<TechnicalService> {
        let ticket = self.get(id, Visibility::Active).await?;
        self.db
            .employees()
            .get_by_id(employee_id, Visibility::Active)
            .await?
            .filter(|e| e.is_active)
            .ok_or_else(|| CoreError::not_found("Employee", employee_id))?;

        let updated = self
            .apply(&ticket, TicketStatus::InProgress, Some(employee_id), None)
            .await?;

        self.notifier.notify(
            Topic::User(employee_id.to_string()),
            Event::TicketAssigned {
                ticket_id: updated.id.clone(),
                ticket_number: updated.ticket_number.clone(),
                title: updated.title.clone(),
            },
        );
        Ok(updated)
    }

    /// Moves along the ticket state machine. Use [`Self::resolve`] to resolve.
    pub async fn update_status(&self, id: &str, status: TicketStatus) -> ServiceResult<TechnicalService> {
        if status == TicketStatus::Resolved {
            return Err(ValidationError::invalid_format("status", "resolve with a resolution instead").into());
        }
        let ticket = self.get(id, Visibility::Active).await?;
        self.apply(&ticket, status, None, None).await
    }

    pub async fn resolve(&self, id: &str, resolution: &str) -> ServiceResult<TechnicalService> {
        let resolution = validate_name("resolution", resolution, 2000)?;
        let ticket = self.get(id, Visibility::Active).await?;

        let updated = self
            .apply(&ticket, TicketStatus::Resolved, None, Some(&resolution))
            .await?;

        self.notifier.notify(
            Topic::User(updated.reported_by_id.clone()),
            Event::TicketResolved {
                ticket_id: updated.id.clone(),
                ticket_number: updated.ticket_number.clone(),
                resolution,
            },
        );
        Ok(updated)
    }

    async fn apply(
        &self,
        ticket: &TechnicalService,
        to: TicketStatus,
        assigned_to_id: Option<&str>,
        resolution: Option<&str>,
    ) -> ServiceResult<TechnicalService> {
        ensure_ticket_transition(&ticket.ticket_number, ticket.status, to)?;

        let resolved_at = (to == TicketStatus::Resolved).then(Utc::now);
        let moved = self
            .db
            .technical_services()
            .transition(&ticket.id, ticket.status, to, assigned_to_id, resolution, resolved_at)
            .await?;

        if !moved {
            return Err(CoreError::InvalidStateTransition {
                entity: "TechnicalService".to_string(),
                id: ticket.ticket_number.clone(),
                from: ticket.status.to_string(),
                to: to.to_string(),
            }
            .into());
        }

        info!(ticket_number = %ticket.ticket_number, from = %ticket.status, to = %to, "Ticket status changed");
        self.get(&ticket.id, Visibility::Active).await
    }

    pub async fn get(&self, id: &str, visibility: Visibility) -> ServiceResult<TechnicalService> {
        Ok(self
            .db
            .technical_services()
            .get_by_id(id, visibility)
            .await?
            .ok_or_else(|| CoreError::not_found("TechnicalService", id))?)
    }

    pub async fn list(&self, filter: &TechnicalServiceFilter) -> ServiceResult<Vec<TechnicalService>> {
        Ok(self.db.technical_services().list(filter).await?)
    }
}
