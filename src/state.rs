use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserRepository, UserRepository},
    },
    config::AppConfig,
    products::repo::{PgProductRepository, ProductRepository},
};

/// Per-process handles shared by every request. The repositories are the
/// only path to the database.
#[derive(Clone)]
pub struct AppState {
    pub keys: JwtKeys,
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
}

impl AppState {
    pub fn new(config: &AppConfig, db: PgPool) -> Self {
        Self::from_parts(
            JwtKeys::from_config(&config.jwt),
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgProductRepository::new(db)),
        )
    }

    pub fn from_parts(
        keys: JwtKeys,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            keys,
            users,
            products,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::JwtConfig;
        use crate::testing::{MemoryProducts, MemoryUsers};

        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60 * 24 * 7,
        });
        Self::from_parts(
            keys,
            Arc::new(MemoryUsers::default()),
            Arc::new(MemoryProducts::default()),
        )
    }
}
