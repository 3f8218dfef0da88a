//! Schema connector - columns and indexes over a sqlx `Any` pool.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use ensure_core::{AuthRequirement, Connector, ConnectorError, Presence, ResourceDefinition};

use crate::config::SchemaSettings;
use crate::dialect::{CountQuery, Dialect};
use crate::error::{Result, SchemaError};
use crate::object::SchemaObject;

/// Connector for relational schema objects.
///
/// The pool is opened by `authenticate` and closed by `close`.
pub struct SchemaConnector {
    settings: SchemaSettings,
    dialect: Dialect,
    pool: RwLock<Option<AnyPool>>,
}

impl SchemaConnector {
    pub fn new(settings: SchemaSettings) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let dialect = Dialect::from_url(&settings.url)?;
        Ok(Self {
            settings,
            dialect,
            pool: RwLock::new(None),
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn pool(&self) -> Option<AnyPool> {
        self.pool.read().await.clone()
    }

    async fn connect(&self) -> Result<AnyPool> {
        let pool = AnyPoolOptions::new()
            .max_connections(self.settings.max_connections)
            .acquire_timeout(self.settings.acquire_timeout)
            .connect(&self.settings.url)
            .await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(pool)
    }

    async fn count(pool: &AnyPool, query: CountQuery) -> Result<i64> {
        let mut q = sqlx::query_scalar::<_, i64>(query.sql);
        for bind in query.binds {
            q = q.bind(bind);
        }
        Ok(q.fetch_one(pool).await?)
    }

    /// Whether `table` exists in the connected database.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let pool = self.pool().await.ok_or(SchemaError::NotConnected)?;
        let n = Self::count(&pool, self.dialect.table_exists(table)).await?;
        Ok(n > 0)
    }

    /// Run `query` and render the first column of up to `limit` rows as text.
    pub async fn sample_rows(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let pool = self.pool().await.ok_or(SchemaError::NotConnected)?;
        let mut rows = sqlx::query(query).fetch(&pool);
        let mut out = Vec::new();
        while out.len() < limit {
            match rows.try_next().await? {
                Some(row) => out.push(first_column_text(&row)),
                None => break,
            }
        }
        Ok(out)
    }
}

fn first_column_text(row: &AnyRow) -> String {
    if row.columns().is_empty() {
        return String::new();
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(0) {
        return v.unwrap_or_else(|| "NULL".to_string());
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(0) {
        return v.map_or_else(|| "NULL".to_string(), |n| n.to_string());
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(0) {
        return v.map_or_else(|| "NULL".to_string(), |n| n.to_string());
    }
    "<binary>".to_string()
}

/// Sort driver errors into the connector taxonomy.
fn classify(e: sqlx::Error) -> ConnectorError {
    match e {
        sqlx::Error::Database(db) => ConnectorError::Rejected(db.message().to_string()),
        sqlx::Error::PoolClosed => ConnectorError::Connectivity("connection pool closed".into()),
        other => ConnectorError::Transport(other.to_string()),
    }
}

#[async_trait]
impl Connector for SchemaConnector {
    type Payload = SchemaObject;

    fn name(&self) -> &str {
        "schema"
    }

    fn auth_requirement(&self) -> AuthRequirement {
        AuthRequirement::Mandatory
    }

    async fn authenticate(&self) -> bool {
        let target = self.settings.redacted_url();
        match self.connect().await {
            Ok(pool) => {
                info!(target_url = %target, dialect = ?self.dialect, "Connected to database");
                *self.pool.write().await = Some(pool);
                true
            }
            Err(e) => {
                error!(target_url = %target, error = %e, "Database connection failed");
                false
            }
        }
    }

    async fn exists(&self, def: &ResourceDefinition<SchemaObject>) -> Presence {
        let Some(pool) = self.pool().await else {
            return Presence::Unknown("not connected".to_string());
        };
        let query = self.dialect.object_exists(&def.id, &def.payload);
        match Self::count(&pool, query).await {
            Ok(0) => Presence::Absent,
            Ok(_) => Presence::Present,
            Err(e) => {
                warn!(resource = %def.id, error = %e, "Existence check failed");
                Presence::Unknown(e.to_string())
            }
        }
    }

    async fn create(&self, def: &ResourceDefinition<SchemaObject>) -> std::result::Result<(), ConnectorError> {
        let pool = self
            .pool()
            .await
            .ok_or_else(|| ConnectorError::Connectivity("not connected".into()))?;
        let object = &def.payload;
        let table = object.table();

        let lookup = |e: SchemaError| match e {
            SchemaError::Database(e) => classify(e),
            other => ConnectorError::Transport(other.to_string()),
        };

        let table_present = Self::count(&pool, self.dialect.table_exists(table))
            .await
            .map_err(lookup)?;
        if table_present == 0 {
            return Err(ConnectorError::Rejected(format!(
                "table {} does not exist",
                table
            )));
        }
        if let SchemaObject::Index { columns, .. } = object {
            for column in columns {
                let n = Self::count(&pool, self.dialect.column_exists(table, column))
                    .await
                    .map_err(lookup)?;
                if n == 0 {
                    return Err(ConnectorError::Rejected(format!(
                        "column {} does not exist in table {}",
                        column, table
                    )));
                }
            }
        }

        let ddl = self
            .dialect
            .create_statement(&def.id, object)
            .map_err(|e| ConnectorError::Rejected(e.to_string()))?;
        debug!(resource = %def.id, sql = %ddl, "Executing DDL");

        let mut tx = pool.begin().await.map_err(classify)?;
        if let Err(e) = sqlx::query(&ddl).execute(&mut *tx).await {
            if let Err(rb) = tx.rollback().await {
                warn!(resource = %def.id, error = %rb, "Rollback failed");
            }
            return Err(classify(e));
        }
        tx.commit().await.map_err(classify)?;

        info!(resource = %def.id, kind = object.kind(), table = %table, "Created schema object");
        Ok(())
    }

    async fn close(&self) {
        if let Some(pool) = self.pool.write().await.take() {
            pool.close().await;
            info!("Database connection closed");
        }
    }
}
