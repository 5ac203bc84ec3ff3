//! # Status Lifecycles
//!
//! Allowed status transitions for sales and technical-service tickets.
//!
//! ## Sale
//! ```text
//! ┌──────────┐ confirm ┌───────────┐ complete ┌───────────┐
//! │ Pending  │────────►│ Preparing │─────────►│ Completed │
//! └────┬─────┘         └─────┬─────┘          └───────────┘
//!      │ cancel              │ cancel
//!      ▼                     ▼
//! ┌──────────────────────────────┐
//! │          Cancelled           │
//! └──────────────────────────────┘
//! ```
//!
//! ## Ticket
//! ```text
//! Open ──► InProgress ◄──► WaitingForParts
//!  │          │   ▲
//!  │          ▼   │ reopen
//!  │       Resolved ──► Closed
//!  │          │
//!  └──────────┴──► Cancelled   (also from WaitingForParts)
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{SaleStatus, TicketStatus};

// =============================================================================
// Sale
// =============================================================================

impl SaleStatus {
    /// Completed and Cancelled accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SaleStatus::Completed | SaleStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: SaleStatus) -> bool {
        use SaleStatus::*;
        matches!(
            (self, next),
            (Pending, Preparing) | (Preparing, Completed) | (Pending, Cancelled) | (Preparing, Cancelled)
        )
    }
}

/// Checks a sale transition, naming the sale in the error.
pub fn ensure_sale_transition(sale_number: &str, from: SaleStatus, to: SaleStatus) -> CoreResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::InvalidStateTransition {
            entity: "Sale".to_string(),
            id: sale_number.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

// =============================================================================
// Ticket
// =============================================================================

impl TicketStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Closed | TicketStatus::Cancelled)
    }

    /// Whether the ticket still counts as open work on dashboards.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            TicketStatus::Open | TicketStatus::InProgress | TicketStatus::WaitingForParts
        )
    }

    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Open, InProgress)
                | (Open, Cancelled)
                | (InProgress, WaitingForParts)
                | (InProgress, Resolved)
                | (InProgress, Cancelled)
                | (WaitingForParts, InProgress)
                | (WaitingForParts, Cancelled)
                | (Resolved, Closed)
                | (Resolved, InProgress)
        )
    }
}

pub fn ensure_ticket_transition(
    ticket_number: &str,
    from: TicketStatus,
    to: TicketStatus,
) -> CoreResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::InvalidStateTransition {
            entity: "TechnicalService".to_string(),
            id: ticket_number.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_sale_happy_path() {
        assert!(ensure_sale_transition("S-2024-00001", SaleStatus::Pending, SaleStatus::Preparing).is_ok());
        assert!(ensure_sale_transition("S-2024-00001", SaleStatus::Preparing, SaleStatus::Completed).is_ok());
    }

    #[test]
    fn test_sale_cancel_rules() {
        assert!(SaleStatus::Pending.can_transition_to(SaleStatus::Cancelled));
        assert!(SaleStatus::Preparing.can_transition_to(SaleStatus::Cancelled));
        assert!(!SaleStatus::Completed.can_transition_to(SaleStatus::Cancelled));
        assert!(!SaleStatus::Cancelled.can_transition_to(SaleStatus::Cancelled));

        let err = ensure_sale_transition("S-2024-00007", SaleStatus::Completed, SaleStatus::Cancelled)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
    }

    #[test]
    fn test_sale_cannot_skip_payment() {
        assert!(!SaleStatus::Pending.can_transition_to(SaleStatus::Completed));
        assert!(!SaleStatus::Preparing.can_transition_to(SaleStatus::Preparing));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for next in [
            SaleStatus::Pending,
            SaleStatus::Preparing,
            SaleStatus::Completed,
            SaleStatus::Cancelled,
        ] {
            assert!(!SaleStatus::Completed.can_transition_to(next));
            assert!(!SaleStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_ticket_transitions() {
        use TicketStatus::*;
        assert!(Open.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(WaitingForParts));
        assert!(WaitingForParts.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Resolved));
        assert!(Resolved.can_transition_to(Closed));
        assert!(Resolved.can_transition_to(InProgress));

        assert!(!Open.can_transition_to(Resolved));
        assert!(!Closed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Open));
        assert!(ensure_ticket_transition("TS-2024-00001", Closed, Open).is_err());
    }

    #[test]
    fn test_ticket_open_work() {
        assert!(TicketStatus::WaitingForParts.is_open());
        assert!(!TicketStatus::Resolved.is_open());
        assert!(TicketStatus::Cancelled.is_terminal());
    }
}
