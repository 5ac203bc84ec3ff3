//! # Document Sequences
//!
//! Per (kind, year) counters behind `S-YYYY-NNNNN` style numbers.
//!
//! ```text
//! INSERT INTO document_sequences (kind, year, last_value) VALUES ('sale', 2024, 1)
//! ON CONFLICT (kind, year) DO UPDATE SET last_value = last_value + 1
//! RETURNING last_value
//! ```
//!
//! The upsert runs on the creating transaction's connection, so a rolled
//! back sale also rolls back its number, while a committed-then-cancelled
//! sale keeps it forever.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use teknoroma_core::DocumentKind;

/// Allocates document numbers. Stateless; every call takes a connection.
#[derive(Debug, Clone, Copy)]
pub struct SequenceRepository;

impl SequenceRepository {
    /// Bumps the counter for (kind, year) and returns the formatted number.
    pub async fn next_in(conn: &mut SqliteConnection, kind: DocumentKind, year: i32) -> DbResult<String> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO document_sequences (kind, year, last_value) VALUES (?, ?, 1)
            ON CONFLICT (kind, year) DO UPDATE SET last_value = last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(kind.as_str())
        .bind(year)
        .fetch_one(conn)
        .await?;

        let number = kind.format(year, value);
        debug!(kind = kind.as_str(), year = year, number = %number, "Allocated document number");
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_sequences_are_per_kind_and_year() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut uow = db.begin().await.unwrap();

        let conn = uow.conn();
        assert_eq!(SequenceRepository::next_in(conn, DocumentKind::Sale, 2024).await.unwrap(), "S-2024-00001");
        assert_eq!(SequenceRepository::next_in(conn, DocumentKind::Sale, 2024).await.unwrap(), "S-2024-00002");
        assert_eq!(SequenceRepository::next_in(conn, DocumentKind::Expense, 2024).await.unwrap(), "G-2024-00001");
        assert_eq!(SequenceRepository::next_in(conn, DocumentKind::Sale, 2025).await.unwrap(), "S-2025-00001");

        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_rolled_back_number_is_reissued() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        SequenceRepository::next_in(uow.conn(), DocumentKind::TechnicalService, 2024).await.unwrap();
        uow.rollback().await.unwrap();

        let mut uow = db.begin().await.unwrap();
        let n = SequenceRepository::next_in(uow.conn(), DocumentKind::TechnicalService, 2024).await.unwrap();
        uow.commit().await.unwrap();
        assert_eq!(n, "TS-2024-00001");
    }
}
