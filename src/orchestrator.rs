//! Composition root. Every external operation comes through here: the
//! orchestrator authenticates the principal, consults the access guard,
//! runs the state machine for mutations, calls the completion service for
//! AI operations and persists through the document store.

use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::access::AccessGuard;
use crate::aggregate;
use crate::completion::{CompletionService, TokenSink};
use crate::error::{Error, Result};
use crate::extract::{extract, Extracted};
use crate::models::{
    Candidate, Difficulty, EvaluationRecord, EvaluationSummary, FinalAssessment,
    InterviewLevel, InterviewSession, PopulatedSession, Position, Principal, Role,
    SelfAssessment,
};
use crate::session::{apply_action, SessionAction};
use crate::store::{DocumentStore, StoreError};

/// Resolves the calling principal from whatever transport credential the
/// outer layer carries. Authentication itself is out of scope; this is the
/// consumed boundary only.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_principal(&self, token: &str) -> Result<Option<Principal>>;
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCandidate {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub position: Position,
    #[validate(length(min = 1))]
    pub skills: Vec<String>,
    pub self_assessment: SelfAssessment,
    pub resume_url: Option<String>,
    pub interview_level: InterviewLevel,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPrincipal {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub department: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionRequest {
    #[validate(length(min = 1))]
    pub skills: Vec<String>,
    pub difficulty: Difficulty,
    pub level: InterviewLevel,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateCodeRequest {
    #[validate(length(min = 1))]
    pub question: String,
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub position: String,
    #[validate(length(min = 1))]
    pub skills: Vec<String>,
    #[validate(length(min = 1))]
    pub question_evaluations: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpRequest {
    #[validate(length(min = 1))]
    pub question: String,
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub evaluation: String,
    #[validate(length(min = 1))]
    pub skills: Vec<String>,
}

/// The assessment object the final-assessment prompt returns. The model is
/// loose with types here, so scores tolerate numbers or numeric strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentEnvelope {
    pub final_assessment: AssessmentDraft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDraft {
    #[serde(deserialize_with = "score_from_number_or_string")]
    pub technical_proficiency: i32,
    #[serde(deserialize_with = "score_from_number_or_string")]
    pub problem_solving_approach: i32,
    #[serde(deserialize_with = "score_from_number_or_string")]
    pub code_quality_and_efficiency: i32,
    #[serde(deserialize_with = "score_from_number_or_string")]
    pub overall_score: i32,
    #[serde(default)]
    pub areas_of_strength: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub summary_comments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpSet {
    pub follow_up_questions: Vec<FollowUpQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpQuestion {
    pub question: String,
    pub focus: String,
    pub difficulty: String,
}

fn score_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n as i32),
        NumberOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub struct Orchestrator {
    store: Arc<dyn DocumentStore>,
    completion: Arc<dyn CompletionService>,
    guard: AccessGuard,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn DocumentStore>, completion: Arc<dyn CompletionService>) -> Self {
        let guard = AccessGuard::new(Arc::clone(&store));
        Orchestrator {
            store,
            completion,
            guard,
        }
    }

    fn require<'a>(&self, principal: Option<&'a Principal>) -> Result<&'a Principal> {
        match principal {
            Some(p) if p.is_active => Ok(p),
            Some(_) => Err(Error::Unauthorized),
            None => Err(Error::Unauthorized),
        }
    }

    fn require_admin<'a>(&self, principal: Option<&'a Principal>) -> Result<&'a Principal> {
        let principal = self.require(principal)?;
        if principal.is_admin() {
            Ok(principal)
        } else {
            Err(Error::Forbidden)
        }
    }

    // ---- candidates ----

    pub async fn create_candidate(
        &self,
        principal: Option<&Principal>,
        new: NewCandidate,
    ) -> Result<Candidate> {
        self.require(principal)?;
        new.validate().map_err(Error::from_validation)?;
        for score in [new.self_assessment.backend, new.self_assessment.frontend] {
            if !(1..=10).contains(&score) {
                return Err(Error::Validation(format!(
                    "Self-assessment scores must be between 1 and 10, got {}",
                    score
                )));
            }
        }

        let candidate = Candidate {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            position: new.position,
            skills: new.skills,
            self_assessment: new.self_assessment,
            resume_url: new.resume_url,
            interview_level: new.interview_level,
            created_at: chrono::Utc::now(),
        };
        self.store.create_candidate(&candidate).await?;
        Ok(candidate)
    }

    pub async fn get_candidate(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
    ) -> Result<Candidate> {
        let principal = self.require(principal)?;
        self.guard.check_candidate(principal, id).await?;
        self.store
            .get_candidate(id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate".to_string()))
    }

    pub async fn list_candidates(&self, principal: Option<&Principal>) -> Result<Vec<Candidate>> {
        let principal = self.require(principal)?;
        let visible = self.guard.visible_candidate_ids(principal).await?;
        let all = self.store.list_candidates().await?;
        Ok(match visible {
            None => all,
            Some(ids) => all.into_iter().filter(|c| ids.contains(&c.id)).collect(),
        })
    }

    // ---- sessions ----

    pub async fn create_session(
        &self,
        principal: Option<&Principal>,
        candidate_id: Uuid,
    ) -> Result<InterviewSession> {
        let principal = self.require(principal)?;
        if self.store.get_candidate(candidate_id).await?.is_none() {
            return Err(Error::NotFound("Candidate".to_string()));
        }

        let session = InterviewSession::new(candidate_id, principal.id);
        self.store.create_session(&session).await?;
        info!(
            "Interview {} created by {} for candidate {}",
            session.id, principal.id, candidate_id
        );
        Ok(session)
    }

    pub async fn get_session(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
    ) -> Result<PopulatedSession> {
        let principal = self.require(principal)?;
        let session = self
            .store
            .get_session(id)
            .await?
            .ok_or_else(|| Error::NotFound("Interview".to_string()))?;
        self.guard.check_session(principal, &session)?;
        self.populate(session).await
    }

    pub async fn list_sessions(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Vec<InterviewSession>> {
        let principal = self.require(principal)?;
        self.guard.visible_sessions(principal).await
    }

    /// Services the `PATCH session {action, data}` operation. The state
    /// machine decides legality; the store then replaces the whole
    /// document.
    pub async fn patch_session(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        action: SessionAction,
    ) -> Result<InterviewSession> {
        let principal = self.require(principal)?;
        let mut session = self
            .store
            .get_session(id)
            .await?
            .ok_or_else(|| Error::NotFound("Interview".to_string()))?;
        self.guard.check_session(principal, &session)?;

        apply_action(&mut session, action)?;
        self.store.save_session(&session).await?;
        Ok(session)
    }

    /// Aggregates per-question evaluations into an editable assessment
    /// draft. Advisory only; nothing is persisted until the interviewer
    /// completes the session.
    pub async fn seed_assessment(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
    ) -> Result<FinalAssessment> {
        let principal = self.require(principal)?;
        let session = self
            .store
            .get_session(id)
            .await?
            .ok_or_else(|| Error::NotFound("Interview".to_string()))?;
        self.guard.check_session(principal, &session)?;
        Ok(aggregate::seed_assessment(&session.questions))
    }

    async fn populate(&self, session: InterviewSession) -> Result<PopulatedSession> {
        let candidate = self
            .store
            .get_candidate(session.candidate)
            .await?
            .ok_or_else(|| {
                Error::Store(StoreError::QueryFailed(format!(
                    "Interview {} references missing candidate {}",
                    session.id, session.candidate
                )))
            })?;
        let interviewer = self
            .store
            .get_principal(session.interviewer)
            .await?
            .ok_or_else(|| {
                Error::Store(StoreError::QueryFailed(format!(
                    "Interview {} references missing interviewer {}",
                    session.id, session.interviewer
                )))
            })?;
        Ok(PopulatedSession {
            session,
            candidate_details: candidate,
            interviewer_details: interviewer,
        })
    }

    // ---- principals ----

    pub async fn create_principal(
        &self,
        principal: Option<&Principal>,
        new: NewPrincipal,
    ) -> Result<Principal> {
        self.require_admin(principal)?;
        new.validate().map_err(Error::from_validation)?;

        if self.store.find_principal_by_email(&new.email).await?.is_some() {
            return Err(Error::Validation(format!(
                "A principal with email {} already exists",
                new.email
            )));
        }

        let now = chrono::Utc::now();
        let created = Principal {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            role: new.role,
            department: new.department,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.create_principal(&created).await?;
        Ok(created)
    }

    pub async fn list_principals(&self, principal: Option<&Principal>) -> Result<Vec<Principal>> {
        self.require_admin(principal)?;
        Ok(self.store.list_principals().await?)
    }

    /// `PATCH principal {isActive}`. Deactivation is a soft flag; nothing
    /// is ever deleted.
    pub async fn set_principal_active(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        is_active: bool,
    ) -> Result<Principal> {
        self.require_admin(principal)?;
        Ok(self.store.set_principal_active(id, is_active).await?)
    }

    /// Bootstrap: creates the very first admin. Refused once any admin
    /// exists, so it is safe to call on every startup.
    pub async fn ensure_admin(&self, new: NewPrincipal) -> Result<Principal> {
        new.validate().map_err(Error::from_validation)?;
        if self.store.any_admin_exists().await? {
            return Err(Error::InvalidState(
                "An admin principal already exists".to_string(),
            ));
        }

        let now = chrono::Utc::now();
        let admin = Principal {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            role: Role::Admin,
            department: new.department,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.create_principal(&admin).await?;
        info!("Bootstrap admin {} created", admin.email);
        Ok(admin)
    }

    // ---- AI operations ----

    /// Generates a coding question as markdown text. No extraction; the
    /// question body is free-form by design.
    pub async fn generate_question(
        &self,
        principal: Option<&Principal>,
        request: GenerateQuestionRequest,
    ) -> Result<String> {
        self.require(principal)?;
        request.validate().map_err(Error::from_validation)?;

        self.completion
            .complete(
                crate::prompts::PromptTemplate::GenerateQuestion,
                &[
                    ("skills", request.skills.join(", ")),
                    ("difficulty", request.difficulty.as_str().to_string()),
                    ("level", request.level.as_str().to_string()),
                ],
            )
            .await
    }

    /// Evaluates submitted code. A null parse is recovered locally: the
    /// record still carries the raw text and the caller decides how to
    /// display it.
    pub async fn evaluate_code(
        &self,
        principal: Option<&Principal>,
        request: EvaluateCodeRequest,
    ) -> Result<EvaluationRecord> {
        self.require(principal)?;
        request.validate().map_err(Error::from_validation)?;

        let text = self
            .completion
            .complete(
                crate::prompts::PromptTemplate::EvaluateCode,
                &Self::evaluation_vars(&request),
            )
            .await?;
        Ok(Self::evaluation_record(text))
    }

    /// Streaming variant of [`evaluate_code`](Self::evaluate_code).
    /// Tokens go to `on_token` as they arrive; extraction runs on the
    /// assembled text exactly as in the blocking path.
    pub async fn stream_evaluation(
        &self,
        principal: Option<&Principal>,
        request: EvaluateCodeRequest,
        on_token: TokenSink<'_>,
    ) -> Result<EvaluationRecord> {
        self.require(principal)?;
        request.validate().map_err(Error::from_validation)?;

        let text = self
            .completion
            .complete_stream(
                crate::prompts::PromptTemplate::EvaluateCode,
                &Self::evaluation_vars(&request),
                on_token,
            )
            .await?;
        Ok(Self::evaluation_record(text))
    }

    fn evaluation_vars(request: &EvaluateCodeRequest) -> [(&'static str, String); 3] {
        [
            ("question", request.question.clone()),
            ("code", request.code.clone()),
            ("skills", request.skills.join(", ")),
        ]
    }

    fn evaluation_record(text: String) -> EvaluationRecord {
        let extracted: Extracted<EvaluationSummary> = extract(&text);
        if extracted.parsed.is_none() {
            warn!("Evaluation response had no decodable summary; keeping raw text only");
        }
        EvaluationRecord {
            summary: extracted.parsed,
            raw: extracted.raw,
        }
    }

    /// Generates a final-assessment draft from the model. The caller gets
    /// the extraction result as-is: a typed draft when decoding worked,
    /// and always the raw text.
    pub async fn generate_assessment(
        &self,
        principal: Option<&Principal>,
        request: AssessmentRequest,
    ) -> Result<Extracted<AssessmentEnvelope>> {
        self.require(principal)?;
        request.validate().map_err(Error::from_validation)?;

        let text = self
            .completion
            .complete(
                crate::prompts::PromptTemplate::FinalAssessment,
                &[
                    ("name", request.name.clone()),
                    ("position", request.position.clone()),
                    ("skills", request.skills.join(", ")),
                    ("questionEvaluations", request.question_evaluations.clone()),
                ],
            )
            .await?;
        Ok(extract(&text))
    }

    pub async fn generate_follow_up(
        &self,
        principal: Option<&Principal>,
        request: FollowUpRequest,
    ) -> Result<Extracted<FollowUpSet>> {
        self.require(principal)?;
        request.validate().map_err(Error::from_validation)?;

        let text = self
            .completion
            .complete(
                crate::prompts::PromptTemplate::FollowUp,
                &[
                    ("question", request.question.clone()),
                    ("code", request.code.clone()),
                    ("evaluation", request.evaluation.clone()),
                    ("skills", request.skills.join(", ")),
                ],
            )
            .await?;
        Ok(extract(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_draft_accepts_string_scores() {
        let json = r#"{
            "finalAssessment": {
                "technicalProficiency": "8",
                "problemSolvingApproach": 7,
                "codeQualityAndEfficiency": "6",
                "overallScore": 7,
                "areasOfStrength": ["APIs"],
                "areasForImprovement": ["Testing"],
                "summaryComments": "Good."
            }
        }"#;
        let envelope: AssessmentEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.final_assessment.technical_proficiency, 8);
        assert_eq!(envelope.final_assessment.code_quality_and_efficiency, 6);
    }

    #[test]
    fn assessment_draft_rejects_non_numeric_strings() {
        let json = r#"{
            "finalAssessment": {
                "technicalProficiency": "excellent",
                "problemSolvingApproach": 7,
                "codeQualityAndEfficiency": 6,
                "overallScore": 7
            }
        }"#;
        assert!(serde_json::from_str::<AssessmentEnvelope>(json).is_err());
    }
}
