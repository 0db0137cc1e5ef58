//! PostgreSQL-backed document store. Each aggregate is stored whole as a
//! JSONB document; interviewer/candidate key columns exist only for
//! filtering, the document is the source of truth.

use chrono::Utc;
use deadpool_postgres::{Config, Pool, Runtime};
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_postgres::NoTls;
use uuid::Uuid;

use super::{DocumentStore, Result, StoreError};
use crate::config::DatabaseConfig;
use crate::models::{Candidate, InterviewSession, Principal};

#[derive(Debug)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Builds a pool from config and verifies connectivity. The pool is
    /// owned by the caller and injected here; there is no global singleton.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.dbname = Some(config.dbname.clone());
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
        cfg.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        info!(
            "Connecting to database: {}@{}:{}/{}",
            config.user, config.host, config.port, config.dbname
        );

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StoreError::ConnectionFailed(format!("Pool creation failed: {}", e)))?;

        let _client = pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(format!("Connection test failed: {}", e)))?;

        info!("Database connection established");
        Ok(PgStore { pool })
    }

    /// Creates the document tables if they do not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        client
            .batch_execute(
                r#"
                CREATE TABLE IF NOT EXISTS candidates (
                    id UUID PRIMARY KEY,
                    created_at TIMESTAMPTZ NOT NULL,
                    doc JSONB NOT NULL
                );
                CREATE TABLE IF NOT EXISTS principals (
                    id UUID PRIMARY KEY,
                    email TEXT NOT NULL UNIQUE,
                    role TEXT NOT NULL,
                    doc JSONB NOT NULL
                );
                CREATE TABLE IF NOT EXISTS interviews (
                    id UUID PRIMARY KEY,
                    interviewer UUID NOT NULL,
                    candidate UUID NOT NULL,
                    date TIMESTAMPTZ NOT NULL,
                    doc JSONB NOT NULL
                );
                CREATE INDEX IF NOT EXISTS interviews_interviewer_idx ON interviews (interviewer);
                "#,
            )
            .await
            .map_err(|e| {
                error!("Schema initialization failed: {}", e);
                StoreError::QueryFailed(format!("Schema initialization failed: {}", e))
            })?;

        info!("Schema initialized");
        Ok(())
    }

    fn to_doc<T: Serialize>(value: &T) -> Result<serde_json::Value> {
        serde_json::to_value(value)
            .map_err(|e| StoreError::QueryFailed(format!("Document encoding failed: {}", e)))
    }

    fn from_doc<T: DeserializeOwned>(doc: serde_json::Value) -> Result<T> {
        serde_json::from_value(doc)
            .map_err(|e| StoreError::QueryFailed(format!("Document decoding failed: {}", e)))
    }
}

#[async_trait::async_trait]
impl DocumentStore for PgStore {
    async fn create_candidate(&self, candidate: &Candidate) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        client
            .execute(
                "INSERT INTO candidates (id, created_at, doc) VALUES ($1, $2, $3)",
                &[&candidate.id, &candidate.created_at, &Self::to_doc(candidate)?],
            )
            .await
            .map_err(|e| {
                error!("Failed to insert candidate: {}", e);
                StoreError::QueryFailed(format!("Failed to insert candidate: {}", e))
            })?;

        info!("Candidate {} created", candidate.id);
        Ok(())
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let row = client
            .query_opt("SELECT doc FROM candidates WHERE id = $1", &[&id])
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        row.map(|r| Self::from_doc(r.get(0))).transpose()
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let rows = client
            .query("SELECT doc FROM candidates ORDER BY created_at DESC", &[])
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(|r| Self::from_doc(r.get(0))).collect()
    }

    async fn create_session(&self, session: &InterviewSession) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        client
            .execute(
                r#"
                INSERT INTO interviews (id, interviewer, candidate, date, doc)
                VALUES ($1, $2, $3, $4, $5)
                "#,
                &[
                    &session.id,
                    &session.interviewer,
                    &session.candidate,
                    &session.date,
                    &Self::to_doc(session)?,
                ],
            )
            .await
            .map_err(|e| {
                error!("Failed to insert interview: {}", e);
                StoreError::QueryFailed(format!("Failed to insert interview: {}", e))
            })?;

        info!("Interview {} created", session.id);
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<InterviewSession>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let row = client
            .query_opt("SELECT doc FROM interviews WHERE id = $1", &[&id])
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        row.map(|r| Self::from_doc(r.get(0))).transpose()
    }

    async fn save_session(&self, session: &InterviewSession) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let rows_affected = client
            .execute(
                "UPDATE interviews SET doc = $1 WHERE id = $2",
                &[&Self::to_doc(session)?, &session.id],
            )
            .await
            .map_err(|e| {
                error!("Failed to save interview {}: {}", session.id, e);
                StoreError::QueryFailed(format!("Failed to save interview: {}", e))
            })?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound("Interview".to_string()));
        }
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<InterviewSession>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let rows = client
            .query("SELECT doc FROM interviews ORDER BY date DESC", &[])
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(|r| Self::from_doc(r.get(0))).collect()
    }

    async fn list_sessions_by_interviewer(
        &self,
        interviewer: Uuid,
    ) -> Result<Vec<InterviewSession>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let rows = client
            .query(
                "SELECT doc FROM interviews WHERE interviewer = $1 ORDER BY date DESC",
                &[&interviewer],
            )
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(|r| Self::from_doc(r.get(0))).collect()
    }

    async fn create_principal(&self, principal: &Principal) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        client
            .execute(
                "INSERT INTO principals (id, email, role, doc) VALUES ($1, $2, $3, $4)",
                &[
                    &principal.id,
                    &principal.email,
                    &principal.role.as_str(),
                    &Self::to_doc(principal)?,
                ],
            )
            .await
            .map_err(|e| {
                error!("Failed to insert principal: {}", e);
                StoreError::QueryFailed(format!("Failed to insert principal: {}", e))
            })?;

        info!("Principal {} ({}) created", principal.id, principal.email);
        Ok(())
    }

    async fn get_principal(&self, id: Uuid) -> Result<Option<Principal>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let row = client
            .query_opt("SELECT doc FROM principals WHERE id = $1", &[&id])
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        row.map(|r| Self::from_doc(r.get(0))).transpose()
    }

    async fn find_principal_by_email(&self, email: &str) -> Result<Option<Principal>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let row = client
            .query_opt("SELECT doc FROM principals WHERE email = $1", &[&email])
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        row.map(|r| Self::from_doc(r.get(0))).transpose()
    }

    async fn list_principals(&self) -> Result<Vec<Principal>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let rows = client
            .query("SELECT doc FROM principals ORDER BY email", &[])
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(|r| Self::from_doc(r.get(0))).collect()
    }

    async fn any_admin_exists(&self) -> Result<bool> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let row = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM principals WHERE role = 'admin')",
                &[],
            )
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(row.get(0))
    }

    async fn set_principal_active(&self, id: Uuid, is_active: bool) -> Result<Principal> {
        let mut principal = self
            .get_principal(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Principal".to_string()))?;

        principal.is_active = is_active;
        principal.updated_at = Utc::now();

        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        client
            .execute(
                "UPDATE principals SET doc = $1 WHERE id = $2",
                &[&Self::to_doc(&principal)?, &id],
            )
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Failed to update principal: {}", e)))?;

        info!(
            "Principal {} is_active set to {}",
            principal.email, is_active
        );
        Ok(principal)
    }
}
