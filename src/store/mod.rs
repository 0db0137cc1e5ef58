pub mod postgres;

pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Candidate, InterviewSession, Principal};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("{0} not found")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Document-oriented persistence boundary. Aggregates are read and written
/// whole; referential fields are opaque ids resolved by explicit reads.
///
/// `save_session` replaces the entire session document. Two writers racing
/// on the same session are last-write-wins; the later save clobbers the
/// earlier one's sibling fields. Accepted limitation, pinned by test.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_candidate(&self, candidate: &Candidate) -> Result<()>;
    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>>;
    async fn list_candidates(&self) -> Result<Vec<Candidate>>;

    async fn create_session(&self, session: &InterviewSession) -> Result<()>;
    async fn get_session(&self, id: Uuid) -> Result<Option<InterviewSession>>;
    /// Whole-document replace.
    async fn save_session(&self, session: &InterviewSession) -> Result<()>;
    /// All sessions, newest first.
    async fn list_sessions(&self) -> Result<Vec<InterviewSession>>;
    /// Sessions owned by one interviewer, newest first.
    async fn list_sessions_by_interviewer(
        &self,
        interviewer: Uuid,
    ) -> Result<Vec<InterviewSession>>;

    async fn create_principal(&self, principal: &Principal) -> Result<()>;
    async fn get_principal(&self, id: Uuid) -> Result<Option<Principal>>;
    async fn find_principal_by_email(&self, email: &str) -> Result<Option<Principal>>;
    async fn list_principals(&self) -> Result<Vec<Principal>>;
    async fn any_admin_exists(&self) -> Result<bool>;
    /// Soft activation flag; principals are never deleted.
    async fn set_principal_active(&self, id: Uuid, is_active: bool) -> Result<Principal>;
}
