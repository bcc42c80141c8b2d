//! PostgreSQL repository layer.
//!
//! `Database` owns a deadpool connection pool; the entity specific queries
//! live in the sibling modules as additional `impl Database` blocks.

mod comments;
mod events;
mod folders;
mod instagram;
mod paintings;
mod posts;
mod users;

use crate::config::DatabaseConfig;
use crate::error::ApiError;
use deadpool_postgres::{Config, ManagerConfig, Object, Pool, PoolConfig, RecyclingMethod, Runtime, SslMode};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use postgres_types::ToSql;
use tracing::{error, info, warn};
use uuid::Uuid;

pub use instagram::StoredInstagramToken;

/// Schema statements, applied in order on every start. Each one is idempotent.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "users table",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            google_sub VARCHAR(255) UNIQUE NOT NULL,
            email VARCHAR(255) UNIQUE NOT NULL,
            name VARCHAR(255) NOT NULL,
            image_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "folders table",
        r#"
        CREATE TABLE IF NOT EXISTS folders (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            slug VARCHAR(120) UNIQUE NOT NULL,
            description TEXT,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "paintings table",
        r#"
        CREATE TABLE IF NOT EXISTS paintings (
            id UUID PRIMARY KEY,
            folder_id UUID REFERENCES folders(id) ON DELETE SET NULL,
            title VARCHAR(255) NOT NULL,
            description TEXT,
            medium VARCHAR(255),
            width_cm DOUBLE PRECISION,
            height_cm DOUBLE PRECISION,
            year INTEGER,
            price INTEGER CHECK (price IS NULL OR price >= 0),
            sold BOOLEAN NOT NULL DEFAULT FALSE,
            featured BOOLEAN NOT NULL DEFAULT FALSE,
            image_urls TEXT[] NOT NULL DEFAULT '{}',
            instagram_media_id VARCHAR(64),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "paintings folder index",
        "CREATE INDEX IF NOT EXISTS idx_paintings_folder_id ON paintings(folder_id)",
    ),
    (
        "paintings created_at index",
        "CREATE INDEX IF NOT EXISTS idx_paintings_created_at ON paintings(created_at DESC)",
    ),
    (
        "posts table",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id UUID PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            slug VARCHAR(120) UNIQUE NOT NULL,
            content TEXT NOT NULL,
            cover_image_url TEXT,
            published BOOLEAN NOT NULL DEFAULT FALSE,
            published_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "posts published index",
        "CREATE INDEX IF NOT EXISTS idx_posts_published_at ON posts(published, published_at DESC)",
    ),
    (
        "events table",
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id UUID PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            description TEXT,
            location VARCHAR(255) NOT NULL,
            starts_at TIMESTAMPTZ NOT NULL,
            ends_at TIMESTAMPTZ,
            url TEXT,
            image_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CHECK (ends_at IS NULL OR ends_at >= starts_at)
        )
        "#,
    ),
    (
        "events starts_at index",
        "CREATE INDEX IF NOT EXISTS idx_events_starts_at ON events(starts_at)",
    ),
    (
        "comments table",
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id UUID PRIMARY KEY,
            painting_id UUID NOT NULL REFERENCES paintings(id) ON DELETE CASCADE,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "comments painting index",
        "CREATE INDEX IF NOT EXISTS idx_comments_painting_id ON comments(painting_id, created_at)",
    ),
    (
        "post_comments table",
        r#"
        CREATE TABLE IF NOT EXISTS post_comments (
            id UUID PRIMARY KEY,
            post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "post_comments post index",
        "CREATE INDEX IF NOT EXISTS idx_post_comments_post_id ON post_comments(post_id, created_at)",
    ),
    (
        "instagram_credentials table",
        r#"
        CREATE TABLE IF NOT EXISTS instagram_credentials (
            id SMALLINT PRIMARY KEY CHECK (id = 1),
            access_token TEXT NOT NULL,
            expires_at TIMESTAMPTZ,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
];

/// Repository over the portfolio's PostgreSQL database.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Build the pool and make sure a connection can be established.
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Creating PostgreSQL connection pool for host: {}:{}", config.host, config.port);

        let db = Self::connect_lazy(config)?;
        db.test_connection().await?;

        Ok(db)
    }

    /// Build the pool without opening a connection. Connections are created
    /// on first use.
    pub fn connect_lazy(config: DatabaseConfig) -> Result<Self, ApiError> {
        let pool = Self::create_pool(config)?;
        Ok(Database { pool })
    }

    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);

        pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
            "disable" => SslMode::Disable,
            "prefer" => SslMode::Prefer,
            "require" => SslMode::Require,
            other => {
                warn!("Unknown SSL mode '{}', defaulting to 'require'", other);
                SslMode::Require
            }
        });

        pg_config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pool_config.timeouts.create = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        let tls_connector = TlsConnector::builder().build().map_err(|e| {
            error!("Failed to create TLS connector: {}", e);
            ApiError::Database(format!("TLS connector creation failed: {}", e))
        })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls).map_err(|e| {
            error!("Failed to create connection pool: {}", e);
            ApiError::Database(format!("Connection pool creation failed: {}", e))
        })
    }

    pub(crate) async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    pub async fn health_check(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[]).await.map_err(|e| {
            error!("Database health check failed: {}", e);
            ApiError::Database(format!("Health check failed: {}", e))
        })?;

        Ok(())
    }

    pub async fn test_connection(&self) -> Result<(), ApiError> {
        self.health_check().await?;
        info!("Database connection test successful");
        Ok(())
    }

    pub async fn migrate(&self) -> Result<(), ApiError> {
        info!("Running database migrations");

        let client = self.get_connection().await?;

        for (name, statement) in MIGRATIONS {
            client.execute(*statement, &[]).await.map_err(|e| {
                error!("Migration '{}' failed: {}", name, e);
                ApiError::Database(format!("Migration '{}' failed: {}", name, e))
            })?;
        }

        info!("Applied {} migration statements", MIGRATIONS.len());
        Ok(())
    }
}

/// Collects `column = $n` assignments for a partial UPDATE.
///
/// Parameters are boxed so the statement can be assembled from optional
/// request fields of different types.
pub(crate) struct UpdateSet {
    assignments: Vec<String>,
    params: Vec<Box<dyn ToSql + Sync + Send>>,
}

impl UpdateSet {
    pub(crate) fn new() -> Self {
        UpdateSet {
            assignments: Vec::new(),
            params: Vec::new(),
        }
    }

    pub(crate) fn set<T>(&mut self, column: &str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Box::new(value));
        self.assignments.push(format!("{} = ${}", column, self.params.len()));
        self
    }

    pub(crate) fn set_if<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    /// Add an assignment built from a SQL expression rather than a parameter.
    pub(crate) fn set_expression(&mut self, assignment: &str) -> &mut Self {
        self.assignments.push(assignment.to_string());
        self
    }

    /// Render `UPDATE table SET ... , updated_at = $n WHERE id = $m RETURNING columns`.
    pub(crate) fn into_statement(
        mut self,
        table: &str,
        id: Uuid,
        returning: &str,
    ) -> (String, Vec<Box<dyn ToSql + Sync + Send>>) {
        self.set("updated_at", chrono::Utc::now());
        self.params.push(Box::new(id));

        let query = format!(
            "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
            table,
            self.assignments.join(", "),
            self.params.len(),
            returning
        );

        (query, self.params)
    }
}

/// Borrow boxed parameters in the shape `tokio_postgres` expects.
pub(crate) fn param_refs(params: &[Box<dyn ToSql + Sync + Send>]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| p.as_ref() as &(dyn ToSql + Sync))
        .collect()
}
