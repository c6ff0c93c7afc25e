//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::ports::{
    GroupRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use yatube_infra::database::DatabaseConfig;
use yatube_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

use crate::config::{AppConfig, SessionConfig};

#[cfg(feature = "postgres")]
use yatube_infra::database::{
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub session: SessionConfig,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (users, groups, posts) = Self::repositories(config.database.as_ref()).await;

        tracing::info!("Application state initialized");

        Self {
            users,
            groups,
            posts,
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            session: config.session.clone(),
        }
    }

    /// State backed by a fresh in-memory store.
    #[cfg(test)]
    pub fn in_memory(
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        session: SessionConfig,
    ) -> Self {
        let (users, groups, posts) = in_memory_repositories();
        Self {
            users,
            groups,
            posts,
            tokens,
            passwords,
            session,
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(
        db_config: Option<&DatabaseConfig>,
    ) -> (
        Arc<dyn UserRepository>,
        Arc<dyn GroupRepository>,
        Arc<dyn PostRepository>,
    ) {
        let Some(config) = db_config else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return in_memory_repositories();
        };

        match yatube_infra::database::connect(config).await {
            Ok(conn) => {
                let users: Arc<dyn UserRepository> =
                    Arc::new(PostgresUserRepository::new(conn.clone()));
                let groups: Arc<dyn GroupRepository> =
                    Arc::new(PostgresGroupRepository::new(conn.clone()));
                let posts: Arc<dyn PostRepository> = Arc::new(PostgresPostRepository::new(conn));
                (users, groups, posts)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                in_memory_repositories()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(
        _db_config: Option<&DatabaseConfig>,
    ) -> (
        Arc<dyn UserRepository>,
        Arc<dyn GroupRepository>,
        Arc<dyn PostRepository>,
    ) {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        in_memory_repositories()
    }
}

fn in_memory_repositories() -> (
    Arc<dyn UserRepository>,
    Arc<dyn GroupRepository>,
    Arc<dyn PostRepository>,
) {
    let store = Arc::new(InMemoryStore::new());
    (store.clone(), store.clone(), store)
}
