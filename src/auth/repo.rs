use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{User, UserRow};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact, case-sensitive email match.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, name, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("select user by email")?;

        row.map(User::try_from)
            .transpose()
            .context("decode user row")
    }
}
