//! Application state - shared across all handlers.

use std::sync::Arc;

use piazza_core::PostService;
use piazza_core::ports::{
    Clock, PasswordService, PostRepository, SystemClock, TokenService, UserRepository,
};
use piazza_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, JwtTokenService,
};

#[cfg(feature = "postgres")]
use piazza_infra::database::{DatabaseConnections, PostgresPostRepository, PostgresUserRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

type Stores = (Arc<dyn PostRepository>, Arc<dyn UserRepository>);

fn in_memory_stores() -> Stores {
    (
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
    )
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        #[cfg(feature = "postgres")]
        let (db, (post_repo, user_repo)) = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let conn = Arc::new(connections);
                    let stores: Stores = (
                        Arc::new(PostgresPostRepository::new(conn.main.clone())),
                        Arc::new(PostgresUserRepository::new(conn.main.clone())),
                    );
                    (Some(conn), stores)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory stores.",
                        e
                    );
                    (None, in_memory_stores())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (None, in_memory_stores())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (post_repo, user_repo) = {
            if config.database.is_some() {
                tracing::warn!("Built without postgres feature - ignoring DATABASE_URL");
            }
            in_memory_stores()
        };

        tracing::info!("Application state initialized");

        Self {
            posts: PostService::new(post_repo, clock),
            users: user_repo,
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
            #[cfg(feature = "postgres")]
            db,
        }
    }

    /// In-memory state driven by `clock`, for handler tests.
    #[cfg(test)]
    pub fn for_tests(clock: Arc<dyn Clock>) -> Self {
        let (post_repo, user_repo) = in_memory_stores();
        Self {
            posts: PostService::new(post_repo, clock),
            users: user_repo,
            tokens: Arc::new(JwtTokenService::new(piazza_infra::JwtConfig::default())),
            passwords: Arc::new(Argon2PasswordService::new()),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }
}
