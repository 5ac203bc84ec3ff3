//! # Unit of Work
//!
//! One SQLite transaction spanning several repository calls.
//!
//! ```text
//! db.begin() ──► UnitOfWork ──► Repo::x_in(uow.conn()) ... ──► commit()
//!                     │                                          │
//!                     └── dropped without commit ──► ROLLBACK    └─► DbResult<()>
//! ```
//!
//! `commit` returns the failure instead of a flag, so a failed commit can
//! never be mistaken for success.
//!
//! Units open with `BEGIN IMMEDIATE`: the write lock is taken before the
//! first read, so two units racing for it queue on the connection's busy
//! timeout instead of failing with `SQLITE_BUSY` on their first write.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// An open write transaction.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work started");
        Ok(UnitOfWork { tx })
    }

    /// The connection every statement of this unit must run on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Commits every change made through [`UnitOfWork::conn`].
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Discards every change. Dropping the unit does the same.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work rolled back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    async fn count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM stores")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn insert_store(conn: &mut sqlx::SqliteConnection) {
        sqlx::query(
            "INSERT INTO stores (id, name, city, created_at) VALUES (?, 'Kadıköy', 'İstanbul', ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(chrono::Utc::now())
        .execute(conn)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_commit_persists() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        insert_store(uow.conn()).await;
        uow.commit().await.unwrap();

        assert_eq!(count(&db).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_units_on_file_database() {
        let path = std::env::temp_dir().join(format!("teknoroma-uow-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(8)).await.unwrap();

        // Read-then-write, like the sale workflow's stock check.
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move {
                    let mut uow = db.begin().await?;
                    let _: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores")
                        .fetch_one(uow.conn())
                        .await?;
                    insert_store(uow.conn()).await;
                    uow.commit().await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(count(&db).await, 16);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        {
            let mut uow = db.begin().await.unwrap();
            insert_store(uow.conn()).await;
        }

        assert_eq!(count(&db).await, 0);

        let mut uow = db.begin().await.unwrap();
        insert_store(uow.conn()).await;
        uow.rollback().await.unwrap();
        assert_eq!(count(&db).await, 0);
    }
}
