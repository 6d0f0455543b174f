//! Test database helper utilities

use std::sync::Once;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

static INIT: Once = Once::new();

/// Tables truncated between tests, children first
const TABLES: &[&str] = &[
    "devis",
    "message_templates",
    "reviews",
    "share_tokens",
    "contacts",
    "inscriptions",
    "concerts",
    "organisateurs",
    "groupes",
    "users",
];

/// Migrated test database, emptied on connect
pub struct TestDatabase {
    pub pool: PgPool,
}

impl TestDatabase {
    /// `None` when `TEST_DATABASE_URL` is unset, so callers can skip
    pub async fn connect() -> Option<Self> {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        });

        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        };

        let pool = PgPoolOptions::new()
            .max_connections(16)
            .connect(&url)
            .await
            .expect("Failed to connect to test database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let db = Self { pool };
        db.cleanup().await.expect("Failed to clean test database");
        Some(db)
    }

    /// Remove all rows and reset identities
    pub async fn cleanup(&self) -> Result<(), sqlx::Error> {
        sqlx::query(&format!("TRUNCATE {} RESTART IDENTITY CASCADE", TABLES.join(", ")))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count_records(&self, table: &str) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Confirmed party-size sum, read straight from the table
    pub async fn confirmed_seats(&self, concert_id: i64) -> Result<i64, sqlx::Error> {
        let sum: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(party_size), 0)::BIGINT FROM inscriptions WHERE concert_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(concert_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(sum.0)
    }

    /// Force a share token past its expiry
    pub async fn expire_share_token(&self, token_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE share_tokens SET expires_at = NOW() - INTERVAL '1 minute' WHERE id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Move a concert's start time into the past without touching its status
    pub async fn backdate_concert(&self, concert_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE concerts SET starts_at = NOW() - INTERVAL '1 day' WHERE id = $1")
            .bind(concert_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
