//! Shared test doubles: an in-memory document store, a canned completion
//! client and fixture builders.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use intervue::completion::{CompletionService, TokenSink};
use intervue::error::Result as AppResult;
use intervue::models::{
    Candidate, Difficulty, FinalAssessment, InterviewLevel, InterviewSession, Position,
    Principal, QuestionRecord, Role, SelfAssessment,
};
use intervue::orchestrator::{AuthProvider, NewCandidate, Orchestrator};
use intervue::prompts::PromptTemplate;
use intervue::store::{DocumentStore, Result, StoreError};

/// In-memory document store with the same whole-document-replace semantics
/// as the Postgres implementation.
#[derive(Default)]
pub struct MemStore {
    candidates: RwLock<HashMap<Uuid, Candidate>>,
    sessions: RwLock<HashMap<Uuid, InterviewSession>>,
    principals: RwLock<HashMap<Uuid, Principal>>,
}

#[async_trait]
impl DocumentStore for MemStore {
    async fn create_candidate(&self, candidate: &Candidate) -> Result<()> {
        self.candidates
            .write()
            .await
            .insert(candidate.id, candidate.clone());
        Ok(())
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        Ok(self.candidates.read().await.get(&id).cloned())
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let mut all: Vec<_> = self.candidates.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn create_session(&self, session: &InterviewSession) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<InterviewSession>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn save_session(&self, session: &InterviewSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(&session.id) {
            return Err(StoreError::NotFound("Interview".to_string()));
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<InterviewSession>> {
        let mut all: Vec<_> = self.sessions.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(all)
    }

    async fn list_sessions_by_interviewer(
        &self,
        interviewer: Uuid,
    ) -> Result<Vec<InterviewSession>> {
        let mut owned: Vec<_> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.interviewer == interviewer)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(owned)
    }

    async fn create_principal(&self, principal: &Principal) -> Result<()> {
        self.principals
            .write()
            .await
            .insert(principal.id, principal.clone());
        Ok(())
    }

    async fn get_principal(&self, id: Uuid) -> Result<Option<Principal>> {
        Ok(self.principals.read().await.get(&id).cloned())
    }

    async fn find_principal_by_email(&self, email: &str) -> Result<Option<Principal>> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn list_principals(&self) -> Result<Vec<Principal>> {
        let mut all: Vec<_> = self.principals.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(all)
    }

    async fn any_admin_exists(&self) -> Result<bool> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .any(|p| p.role == Role::Admin))
    }

    async fn set_principal_active(&self, id: Uuid, is_active: bool) -> Result<Principal> {
        let mut principals = self.principals.write().await;
        let principal = principals
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("Principal".to_string()))?;
        principal.is_active = is_active;
        principal.updated_at = Utc::now();
        Ok(principal.clone())
    }
}

/// Completion client that always answers with one canned reply. The
/// streaming variant delivers the reply in small chunks through the token
/// sink before returning the assembled text.
pub struct CannedCompletion {
    pub reply: String,
}

impl CannedCompletion {
    pub fn new(reply: impl Into<String>) -> Self {
        CannedCompletion {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl CompletionService for CannedCompletion {
    async fn complete(
        &self,
        _template: PromptTemplate,
        _vars: &[(&str, String)],
    ) -> AppResult<String> {
        Ok(self.reply.clone())
    }

    async fn complete_stream(
        &self,
        _template: PromptTemplate,
        _vars: &[(&str, String)],
        on_token: TokenSink<'_>,
    ) -> AppResult<String> {
        let chars: Vec<char> = self.reply.chars().collect();
        for chunk in chars.chunks(7) {
            let token: String = chunk.iter().collect();
            on_token(&token);
        }
        Ok(self.reply.clone())
    }
}

/// Token -> principal lookup standing in for the external auth provider.
pub struct StaticAuth {
    pub principals: HashMap<String, Principal>,
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn current_principal(&self, token: &str) -> AppResult<Option<Principal>> {
        Ok(self.principals.get(token).cloned())
    }
}

pub fn orchestrator_with(reply: &str) -> (Orchestrator, Arc<MemStore>) {
    let store = Arc::new(MemStore::default());
    let orchestrator = Orchestrator::new(
        store.clone(),
        Arc::new(CannedCompletion::new(reply)),
    );
    (orchestrator, store)
}

pub fn principal(role: Role) -> Principal {
    let now = Utc::now();
    let id = Uuid::new_v4();
    Principal {
        id,
        name: format!("Principal {}", id),
        email: format!("{}@example.com", id.simple()),
        role,
        department: "Engineering".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn new_candidate() -> NewCandidate {
    NewCandidate {
        name: "Ada Lovelace".to_string(),
        email: format!("{}@example.com", Uuid::new_v4().simple()),
        position: Position::FullTime,
        skills: vec!["Rust".to_string(), "SQL".to_string()],
        self_assessment: SelfAssessment {
            backend: 8,
            frontend: 5,
        },
        resume_url: None,
        interview_level: InterviewLevel::High,
    }
}

pub fn question(skill: &str) -> QuestionRecord {
    QuestionRecord {
        skill: skill.to_string(),
        difficulty: Difficulty::Medium,
        question: "## Problem Statement\nImplement an LRU cache.".to_string(),
        candidate_code: None,
        evaluation: None,
        interviewer_notes: None,
    }
}

pub fn assessment() -> FinalAssessment {
    FinalAssessment {
        technical_proficiency: 8,
        problem_solving: 7,
        code_quality: 8,
        overall_score: 8,
        strengths: vec!["Clean abstractions".to_string()],
        areas_for_improvement: vec!["Edge cases".to_string()],
        comments: "Recommend hire".to_string(),
    }
}

/// A well-formed evaluation reply wrapped the way the model usually wraps
/// it.
pub fn fenced_evaluation_reply() -> String {
    r#"Here is my evaluation of the submitted code:

```json
{
    "overall_assessment": "Correct solution with room for polish",
    "correctness": 85,
    "code_quality": 75,
    "efficiency": "O(n) time complexity, O(1) space complexity",
    "edge_case_handling": 70,
    "overall_rating": 80
}
```
"#
    .to_string()
}
