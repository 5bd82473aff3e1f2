use sea_orm::{sea_query::TableCreateStatement, ConnectionTrait, Database, DatabaseConnection};
use std::sync::Arc;
use time::Duration;
use tower_sessions::{Expiry, Session};
use tower_sessions_sqlx_store::SqliteStore;

use crate::error::TestError;

/// Isolated test environment backed by an in-memory SQLite database.
///
/// Each context owns its own `sqlite::memory:` connection, so tests never
/// share state. The database and the session are both created on first use
/// and live as long as the context does.
pub struct TestContext {
    /// Connection to the per-test in-memory SQLite instance, once opened.
    pub db: Option<DatabaseConnection>,

    /// Session backed by the same in-memory database, once created.
    pub session: Option<Session>,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            db: None,
            session: None,
        }
    }

    /// Returns the database connection, opening the in-memory instance on
    /// first call.
    pub async fn database(&mut self) -> Result<&DatabaseConnection, TestError> {
        if self.db.is_none() {
            let db = Database::connect("sqlite::memory:").await?;
            self.db = Some(db);
        }

        Ok(self.db.as_ref().unwrap())
    }

    /// Runs the given CREATE TABLE statements against the test database.
    ///
    /// Statements are executed in order, so callers must list tables in
    /// dependency order (referenced tables first). `TestBuilder::build()`
    /// calls this; tests rarely need it directly.
    pub async fn with_tables(&mut self, stmts: Vec<TableCreateStatement>) -> Result<(), TestError> {
        let db = self.database().await?;

        for stmt in stmts {
            db.execute(&stmt).await?;
        }

        Ok(())
    }

    /// Returns the test session, creating it on first call.
    ///
    /// The session store lives in the same in-memory database as the test
    /// data; its table is migrated here before the session is handed out.
    pub async fn session(&mut self) -> Result<&Session, TestError> {
        if self.session.is_none() {
            let db = self.database().await?;

            let pool = db.get_sqlite_connection_pool();
            let store = SqliteStore::new(pool.clone());
            store
                .migrate()
                .await
                .map_err(|e| sea_orm::DbErr::Custom(e.to_string()))?;

            self.session = Some(Session::new(
                None,
                Arc::new(store),
                Some(Expiry::OnInactivity(Duration::days(7))),
            ));
        }

        Ok(self.session.as_ref().unwrap())
    }

    /// Initializes both the database and the session and returns immutable
    /// references to each.
    ///
    /// Needed by tests that use both at once: calling `database()` and
    /// `session()` back to back holds overlapping mutable borrows, so this
    /// initializes first and re-borrows after.
    pub async fn db_and_session(&mut self) -> Result<(&DatabaseConnection, &Session), TestError> {
        self.database().await?;
        self.session().await?;

        Ok((self.db.as_ref().unwrap(), self.session.as_ref().unwrap()))
    }
}
